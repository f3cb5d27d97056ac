/// Module with shared code.
#[macro_use]
extern crate error_chain;

#[macro_use]
extern crate slog;

pub mod fs_utils;
pub mod shell;

mod errors {
    // Create the Error, ErrorKind, ResultExt, and Result types
    error_chain!{}
}

pub use errors::*;
