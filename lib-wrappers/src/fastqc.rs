/// Read-level QC with fastqc.
use std::path::Path;

use clap::ArgMatches;
use slog::Logger;

use lib_shared::shell;

use super::errors::*;

/// Options for the "fastqc" wrapper.
#[derive(Clone, Debug)]
pub struct FastqcOptions {
    /// Path to the merged FASTQ file.
    pub fastq: String,
    /// Path of the HTML report output.
    pub html: String,
    /// Path of the zipped report output.
    pub archive: String,
    /// Number of threads.
    pub threads: u32,
    /// Extra options passed to fastqc.
    pub opt: String,
    /// Path of the log file.
    pub log: String,
}

impl FastqcOptions {
    /// Build options from ArgMatches.
    pub fn new(matches: &ArgMatches) -> Self {
        FastqcOptions {
            fastq: matches.value_of("fastq").unwrap().to_string(),
            html: matches.value_of("html").unwrap().to_string(),
            archive: matches.value_of("archive").unwrap().to_string(),
            threads: matches
                .value_of("threads")
                .unwrap()
                .parse::<u32>()
                .unwrap(),
            opt: matches.value_of("opt").unwrap_or("").to_string(),
            log: matches.value_of("log").unwrap().to_string(),
        }
    }
}

/// fastqc names its reports after the input file inside the output
/// directory, so the directory of the HTML output is handed to `-o`.
fn build_command(options: &FastqcOptions) -> String {
    let outdir = Path::new(&options.html)
        .parent()
        .and_then(|p| p.to_str())
        .unwrap_or(".");
    format!(
        "fastqc -t {} {} -o {} {}",
        options.threads, options.opt, outdir, options.fastq
    )
}

/// Main entry point for the "fastqc" wrapper.
pub fn run(logger: &mut Logger, options: &FastqcOptions) -> Result<()> {
    info!(logger, "Running: snakepore wrapper fastqc");

    shell::log_banner(&options.log, "FASTQC LOG")?;
    shell::run_to_log(logger, &build_command(options), &options.log)?;

    Ok(())
}
