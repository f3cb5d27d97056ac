/// Alignment filtering with samtools.
use clap::ArgMatches;
use slog::Logger;

use lib_shared::shell;

use super::errors::*;

/// Options for the "samtools-filter" wrapper.
#[derive(Clone, Debug)]
pub struct SamtoolsFilterOptions {
    /// Path to the BAM file to filter.
    pub input: String,
    /// Path of the filtered BAM output.
    pub output: String,
    /// Number of threads.
    pub threads: u32,
    /// Filter options passed to `samtools view`, e.g. `-F 2308 -q 10`.
    pub opt: String,
    /// Path of the log file.
    pub log: String,
}

impl SamtoolsFilterOptions {
    /// Build options from ArgMatches.
    pub fn new(matches: &ArgMatches) -> Self {
        SamtoolsFilterOptions {
            input: matches.value_of("input").unwrap().to_string(),
            output: matches.value_of("output").unwrap().to_string(),
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

/// Command lines filtering the BAM file and indexing the result.
fn build_commands(options: &SamtoolsFilterOptions) -> Vec<String> {
    vec![
        format!(
            "samtools view -bh -@ {} {} {} > {}",
            options.threads, options.opt, options.input, options.output
        ),
        format!("samtools index {}", options.output),
    ]
}

/// Main entry point for the "samtools-filter" wrapper.
pub fn run(logger: &mut Logger, options: &SamtoolsFilterOptions) -> Result<()> {
    info!(logger, "Running: snakepore wrapper samtools-filter");

    shell::log_banner(&options.log, "SAMTOOLS FILTER LOG")?;
    shell::run_all_to_log(logger, &build_commands(options), &options.log)?;

    Ok(())
}
