/// Merging of the per-sample raw FASTQ files into one file.
use clap::ArgMatches;
use slog::Logger;

use lib_shared::shell;

use super::errors::*;

/// Options for the "concat-fastq" wrapper.
#[derive(Clone, Debug)]
pub struct ConcatFastqOptions {
    /// Paths of the FASTQ files to merge.
    pub input: Vec<String>,
    /// Path of the merged FASTQ file.
    pub output: String,
    /// Path of the log file.
    pub log: String,
}

impl ConcatFastqOptions {
    /// Build options from ArgMatches.
    pub fn new(matches: &ArgMatches) -> Self {
        ConcatFastqOptions {
            input: matches
                .values_of("input")
                .expect("Problem getting input args from command line")
                .map(|s| s.to_string())
                .collect::<Vec<String>>(),
            output: matches.value_of("output").unwrap().to_string(),
            log: matches.value_of("log").unwrap().to_string(),
        }
    }
}

/// Command line concatenating the inputs into the output.
fn build_command(options: &ConcatFastqOptions) -> String {
    format!("cat {} > {}", options.input.join(" "), options.output)
}

/// Main entry point for the "concat-fastq" wrapper.
pub fn run(logger: &mut Logger, options: &ConcatFastqOptions) -> Result<()> {
    info!(logger, "Running: snakepore wrapper concat-fastq");

    shell::log_banner(&options.log, "CONCAT FASTQ LOG")?;
    shell::run_to_log(logger, &build_command(options), &options.log)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_are_concatenated_in_order() {
        let options = ConcatFastqOptions {
            input: vec![
                "/data/S1_run1.fastq".to_string(),
                "/data/S1_run2.fastq".to_string(),
            ],
            output: "results/merge_fastq/S1.fastq".to_string(),
            log: "logs/merge_fastq/S1.log".to_string(),
        };

        assert_eq!(
            build_command(&options),
            "cat /data/S1_run1.fastq /data/S1_run2.fastq > results/merge_fastq/S1.fastq"
        );
    }
}
