/// Genome-wide coverage tracks with bedtools.
use clap::ArgMatches;
use slog::Logger;

use lib_shared::shell;

use super::errors::*;

/// Options for the "genomecov" wrapper.
#[derive(Clone, Debug)]
pub struct GenomecovOptions {
    /// Path to the filtered BAM file.
    pub bam: String,
    /// Path of the bedgraph output.
    pub bedgraph: String,
    /// Reporting options passed to `bedtools genomecov`, e.g. `-bga`.
    pub opt: String,
    /// Path of the log file.
    pub log: String,
}

impl GenomecovOptions {
    /// Build options from ArgMatches.
    pub fn new(matches: &ArgMatches) -> Self {
        GenomecovOptions {
            bam: matches.value_of("bam").unwrap().to_string(),
            bedgraph: matches.value_of("bedgraph").unwrap().to_string(),
            opt: matches.value_of("opt").unwrap_or("").to_string(),
            log: matches.value_of("log").unwrap().to_string(),
        }
    }
}

/// Command line producing the coverage track.
fn build_command(options: &GenomecovOptions) -> String {
    format!(
        "bedtools genomecov -ibam {} {} > {}",
        options.bam, options.opt, options.bedgraph
    )
}

/// Main entry point for the "genomecov" wrapper.
pub fn run(logger: &mut Logger, options: &GenomecovOptions) -> Result<()> {
    info!(logger, "Running: snakepore wrapper genomecov");

    shell::log_banner(&options.log, "BEDTOOLS GENOMECOV LOG")?;
    shell::run_to_log(logger, &build_command(options), &options.log)?;

    Ok(())
}
