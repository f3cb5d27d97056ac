/// Wrappers around the external analysis tools.
///
/// Each module translates engine-provided parameters (file paths, thread
/// count, a free-form option string, a log path) into one or more shell
/// command lines and runs them with combined output appended to the
/// per-rule log file. The engine decides when a wrapper runs; the wrappers
/// never inspect or retry tool failures beyond surfacing the exit status.
extern crate clap;
extern crate csv;
extern crate tempdir;

#[macro_use]
extern crate error_chain;

#[macro_use]
extern crate slog;

extern crate lib_shared;

pub mod bamqc;
pub mod concat_fastq;
pub mod count_merge;
pub mod fastqc;
pub mod genomecov;
pub mod minimap2;
pub mod nanopolish;
pub mod salmon;
pub mod samtools_filter;
pub mod sniffles;

mod errors {
    // Create the Error, ErrorKind, ResultExt, and Result types
    error_chain!{
        links {
            Shared(::lib_shared::Error, ::lib_shared::ErrorKind);
        }
    }
}

pub use errors::*;
