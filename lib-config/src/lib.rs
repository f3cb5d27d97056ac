/// Validation of the user-provided configuration artifacts: the YAML
/// configuration document, the tab-separated sample sheet, and the
/// reference file, plus generation of template files.
extern crate csv;
extern crate serde_yaml;

#[macro_use]
extern crate error_chain;

#[macro_use]
extern crate slog;

extern crate lib_shared;

pub mod config;
pub mod reference;
pub mod samples;
pub mod templates;

pub use config::Config;
pub use samples::SampleSheet;

mod errors {
    // Create the Error, ErrorKind, ResultExt, and Result types
    error_chain!{
        links {
            Shared(::lib_shared::Error, ::lib_shared::ErrorKind);
        }
    }
}

pub use errors::*;
