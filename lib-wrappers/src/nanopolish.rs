/// Methylation calling from raw signal with nanopolish.
use clap::ArgMatches;
use slog::Logger;

use lib_shared::shell;

use super::errors::*;

/// Options for the "nanopolish-index" wrapper.
#[derive(Clone, Debug)]
pub struct NanopolishIndexOptions {
    /// Path to the merged FASTQ file; the index files are created next to it.
    pub fastq: String,
    /// Path to the directory holding the raw FAST5 files.
    pub fast5_dir: String,
    /// Optional path to the sequencing summary file, speeds up indexing.
    pub seq_summary: Option<String>,
    /// Path of the log file.
    pub log: String,
}

impl NanopolishIndexOptions {
    /// Build options from ArgMatches.
    pub fn new(matches: &ArgMatches) -> Self {
        NanopolishIndexOptions {
            fastq: matches.value_of("fastq").unwrap().to_string(),
            fast5_dir: matches.value_of("fast5_dir").unwrap().to_string(),
            seq_summary: matches.value_of("seq_summary").map(|s| s.to_string()),
            log: matches.value_of("log").unwrap().to_string(),
        }
    }
}

/// Command line indexing the raw signal against the merged FASTQ.
fn build_index_command(options: &NanopolishIndexOptions) -> String {
    match options.seq_summary {
        Some(ref seq_summary) => format!(
            "nanopolish index -d {} -s {} {}",
            options.fast5_dir, seq_summary, options.fastq
        ),
        None => format!("nanopolish index -d {} {}", options.fast5_dir, options.fastq),
    }
}

/// Main entry point for the "nanopolish-index" wrapper.
pub fn run_index(logger: &mut Logger, options: &NanopolishIndexOptions) -> Result<()> {
    info!(logger, "Running: snakepore wrapper nanopolish-index");

    shell::log_banner(&options.log, "NANOPOLISH INDEX LOG")?;
    shell::run_to_log(logger, &build_index_command(options), &options.log)?;

    Ok(())
}

/// Options for the "nanopolish-call-methylation" wrapper.
#[derive(Clone, Debug)]
pub struct NanopolishCallOptions {
    /// Path to the merged, indexed FASTQ file.
    pub fastq: String,
    /// Path to the filtered BAM file.
    pub bam: String,
    /// Path to the reference FASTA file.
    pub reference: String,
    /// Path of the per-read methylation call output.
    pub call: String,
    /// Path of the per-site frequency bed output.
    pub bed: String,
    /// Path of the per-site frequency tsv output.
    pub tsv: String,
    /// Number of threads.
    pub threads: u32,
    /// Extra options passed to `nanopolish call-methylation`.
    pub opt: String,
    /// Extra options passed to the frequency aggregation step.
    pub freq_opt: String,
    /// Path of the log file.
    pub log: String,
}

impl NanopolishCallOptions {
    /// Build options from ArgMatches.
    pub fn new(matches: &ArgMatches) -> Self {
        NanopolishCallOptions {
            fastq: matches.value_of("fastq").unwrap().to_string(),
            bam: matches.value_of("bam").unwrap().to_string(),
            reference: matches.value_of("reference").unwrap().to_string(),
            call: matches.value_of("call").unwrap().to_string(),
            bed: matches.value_of("bed").unwrap().to_string(),
            tsv: matches.value_of("tsv").unwrap().to_string(),
            threads: matches
                .value_of("threads")
                .unwrap()
                .parse::<u32>()
                .unwrap(),
            opt: matches.value_of("opt").unwrap_or("").to_string(),
            freq_opt: matches.value_of("freq_opt").unwrap_or("").to_string(),
            log: matches.value_of("log").unwrap().to_string(),
        }
    }
}

/// Command lines calling per-read methylation and aggregating per-site
/// frequencies.
fn build_call_commands(options: &NanopolishCallOptions) -> Vec<String> {
    vec![
        format!(
            "nanopolish call-methylation -t {} {} -r {} -b {} -g {} > {}",
            options.threads,
            options.opt,
            options.fastq,
            options.bam,
            options.reference,
            options.call
        ),
        format!(
            "NanopolishComp Freq_meth_calculate -i {} -b {} -t {} {}",
            options.call, options.bed, options.tsv, options.freq_opt
        ),
    ]
}

/// Main entry point for the "nanopolish-call-methylation" wrapper.
pub fn run_call(logger: &mut Logger, options: &NanopolishCallOptions) -> Result<()> {
    info!(logger, "Running: snakepore wrapper nanopolish-call-methylation");

    let cmds = build_call_commands(options);
    shell::log_banner(&options.log, "NANOPOLISH CALL METHYLATION LOG")?;
    shell::run_to_log(logger, &cmds[0], &options.log)?;
    shell::log_banner(&options.log, "NANOPOLISHCOMP FREQ METH CALCULATE LOG")?;
    shell::run_to_log(logger, &cmds[1], &options.log)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequencing_summary_is_optional() {
        let mut options = NanopolishIndexOptions {
            fastq: "results/merge_fastq/S1.fastq".to_string(),
            fast5_dir: "/data/S1_fast5".to_string(),
            seq_summary: Some("/data/S1_summary.txt".to_string()),
            log: "logs/merge_fastq/S1_nanopolish_index.log".to_string(),
        };

        assert_eq!(
            build_index_command(&options),
            "nanopolish index -d /data/S1_fast5 -s /data/S1_summary.txt \
             results/merge_fastq/S1.fastq"
        );

        options.seq_summary = None;
        assert_eq!(
            build_index_command(&options),
            "nanopolish index -d /data/S1_fast5 results/merge_fastq/S1.fastq"
        );
    }

    #[test]
    fn calls_are_aggregated_into_frequencies() {
        let options = NanopolishCallOptions {
            fastq: "results/merge_fastq/S1.fastq".to_string(),
            bam: "results/samtools_filter/S1.bam".to_string(),
            reference: "/data/ref.fa".to_string(),
            call: "results/nanopolish/S1_call_methylation.tsv".to_string(),
            bed: "results/nanopolish/S1_freq_meth_calculate.bed".to_string(),
            tsv: "results/nanopolish/S1_freq_meth_calculate.tsv".to_string(),
            threads: 8,
            opt: "".to_string(),
            freq_opt: "--min_depth 10".to_string(),
            log: "logs/nanopolish/S1.log".to_string(),
        };

        let cmds = build_call_commands(&options);
        assert_eq!(
            cmds[0],
            "nanopolish call-methylation -t 8  -r results/merge_fastq/S1.fastq \
             -b results/samtools_filter/S1.bam -g /data/ref.fa > \
             results/nanopolish/S1_call_methylation.tsv"
        );
        assert_eq!(
            cmds[1],
            "NanopolishComp Freq_meth_calculate -i results/nanopolish/S1_call_methylation.tsv \
             -b results/nanopolish/S1_freq_meth_calculate.bed \
             -t results/nanopolish/S1_freq_meth_calculate.tsv --min_depth 10"
        );
    }
}
