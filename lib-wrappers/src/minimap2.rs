/// Reference indexing and long-read alignment with minimap2 and samtools.
use std::path::Path;

use clap::ArgMatches;
use slog::Logger;
use tempdir::TempDir;

use lib_shared::shell;

use super::errors::*;

/// Options for the "minimap2-index" wrapper.
#[derive(Clone, Debug)]
pub struct Minimap2IndexOptions {
    /// Path to the reference FASTA file.
    pub reference: String,
    /// Path of the index output.
    pub index: String,
    /// Number of threads.
    pub threads: u32,
    /// Extra options passed to minimap2.
    pub opt: String,
    /// Path of the log file.
    pub log: String,
}

impl Minimap2IndexOptions {
    /// Build options from ArgMatches.
    pub fn new(matches: &ArgMatches) -> Self {
        Minimap2IndexOptions {
            reference: matches.value_of("reference").unwrap().to_string(),
            index: matches.value_of("index").unwrap().to_string(),
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

/// Command line building the reference index.
fn build_index_command(options: &Minimap2IndexOptions) -> String {
    format!(
        "minimap2 -t {} {} -d {} {}",
        options.threads, options.opt, options.index, options.reference
    )
}

/// Main entry point for the "minimap2-index" wrapper.
pub fn run_index(logger: &mut Logger, options: &Minimap2IndexOptions) -> Result<()> {
    info!(logger, "Running: snakepore wrapper minimap2-index");

    shell::log_banner(&options.log, "MINIMAP2 INDEX LOG")?;
    shell::run_to_log(logger, &build_index_command(options), &options.log)?;

    Ok(())
}

/// Options for the "minimap2-align" wrapper.
#[derive(Clone, Debug)]
pub struct Minimap2AlignOptions {
    /// Path to the reference index.
    pub index: String,
    /// Paths of the FASTQ files to align.
    pub fastq: Vec<String>,
    /// Path of the sorted BAM output.
    pub bam: String,
    /// Number of threads shared by aligner, view and sort.
    pub threads: u32,
    /// Extra options passed to minimap2.
    pub opt: String,
    /// Path of the log file.
    pub log: String,
}

impl Minimap2AlignOptions {
    /// Build options from ArgMatches.
    pub fn new(matches: &ArgMatches) -> Self {
        Minimap2AlignOptions {
            index: matches.value_of("index").unwrap().to_string(),
            fastq: matches
                .values_of("fastq")
                .expect("Problem getting fastq args from command line")
                .map(|s| s.to_string())
                .collect::<Vec<String>>(),
            bam: matches.value_of("bam").unwrap().to_string(),
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

/// Split the thread budget across aligner, view and sort.
///
/// The budget is raised to 4 if fewer threads were provided; view and
/// sort each take a quarter and the aligner keeps the rest.
fn split_threads(total: u32) -> (u32, u32, u32) {
    let total = if total < 4 { 4 } else { total };
    let view = total / 4;
    let sort = total / 4;
    (total - view - sort, view, sort)
}

/// Command lines aligning the reads into a sorted, indexed BAM file.
fn build_align_commands(options: &Minimap2AlignOptions, sort_dir: &str) -> Vec<String> {
    let (align_threads, view_threads, sort_threads) = split_threads(options.threads);
    vec![
        format!(
            "minimap2 -a -t {} {} {} {} | samtools view -@ {} -bh | \
             samtools sort -@ {} -T {} -O bam > {}",
            align_threads,
            options.opt,
            options.index,
            options.fastq.join(" "),
            view_threads,
            sort_threads,
            sort_dir,
            options.bam
        ),
        format!("samtools index {}", options.bam),
    ]
}

/// Main entry point for the "minimap2-align" wrapper.
pub fn run_align(logger: &mut Logger, options: &Minimap2AlignOptions) -> Result<()> {
    info!(logger, "Running: snakepore wrapper minimap2-align");

    // Sort in a scratch directory next to the output.
    let outdir = Path::new(&options.bam)
        .parent()
        .and_then(|p| p.to_str())
        .unwrap_or(".");
    let sort_dir = TempDir::new_in(outdir, "minimap2_sort")
        .chain_err(|| "Could not create temporary sort directory")?;

    shell::log_banner(&options.log, "MINIMAP2 + SAMTOOLS LOG")?;
    let sort_path = sort_dir.path().join("sorted");
    let cmds = build_align_commands(options, sort_path.to_str().unwrap());
    shell::run_all_to_log(logger, &cmds, &options.log)?;

    Ok(())
}
