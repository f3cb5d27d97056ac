/// Transcript quantification with salmon in alignment mode.
use std::path::Path;

use clap::ArgMatches;
use slog::Logger;
use tempdir::TempDir;

use lib_shared::shell;

use super::errors::*;

/// Options for the "salmon-count" wrapper.
#[derive(Clone, Debug)]
pub struct SalmonCountOptions {
    /// Path to the transcriptome-aligned BAM file.
    pub bam: String,
    /// Path to the transcriptome FASTA file.
    pub transcriptome: String,
    /// Path of the per-sample count table output.
    pub output: String,
    /// Number of threads.
    pub threads: u32,
    /// Extra options passed to `salmon quant`.
    pub opt: String,
    /// Path of the log file.
    pub log: String,
}

impl SalmonCountOptions {
    /// Build options from ArgMatches.
    pub fn new(matches: &ArgMatches) -> Self {
        SalmonCountOptions {
            bam: matches.value_of("bam").unwrap().to_string(),
            transcriptome: matches.value_of("transcriptome").unwrap().to_string(),
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

/// Command lines quantifying into a scratch directory and moving the
/// count table to the rule output, so the file stem is the sample id.
fn build_commands(options: &SalmonCountOptions, quant_dir: &str) -> Vec<String> {
    vec![
        format!(
            "salmon quant -p {} {} -t {} -l U -a {} -o {}",
            options.threads, options.opt, options.transcriptome, options.bam, quant_dir
        ),
        format!("cp {}/quant.sf {}", quant_dir, options.output),
    ]
}

/// Main entry point for the "salmon-count" wrapper.
pub fn run(logger: &mut Logger, options: &SalmonCountOptions) -> Result<()> {
    info!(logger, "Running: snakepore wrapper salmon-count");

    let outdir = Path::new(&options.output)
        .parent()
        .and_then(|p| p.to_str())
        .unwrap_or(".");
    let quant_dir = TempDir::new_in(outdir, "salmon_quant")
        .chain_err(|| "Could not create temporary quantification directory")?;

    shell::log_banner(&options.log, "SALMON QUANT LOG")?;
    let cmds = build_commands(options, quant_dir.path().to_str().unwrap());
    shell::run_all_to_log(logger, &cmds, &options.log)?;

    Ok(())
}
