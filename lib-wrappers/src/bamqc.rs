/// Alignment-level QC with samtools.
use clap::ArgMatches;
use slog::Logger;

use lib_shared::shell;

use super::errors::*;

/// Options for the "bamqc" wrapper.
#[derive(Clone, Debug)]
pub struct BamqcOptions {
    /// Path to the BAM file.
    pub bam: String,
    /// Path of the `samtools stats` output.
    pub stats: String,
    /// Path of the `samtools flagstat` output.
    pub flagstat: String,
    /// Path of the `samtools idxstats` output.
    pub idxstats: String,
    /// Path of the log file.
    pub log: String,
}

impl BamqcOptions {
    /// Build options from ArgMatches.
    pub fn new(matches: &ArgMatches) -> Self {
        BamqcOptions {
            bam: matches.value_of("bam").unwrap().to_string(),
            stats: matches.value_of("stats").unwrap().to_string(),
            flagstat: matches.value_of("flagstat").unwrap().to_string(),
            idxstats: matches.value_of("idxstats").unwrap().to_string(),
            log: matches.value_of("log").unwrap().to_string(),
        }
    }
}

/// Command lines for the three samtools reports.
fn build_commands(options: &BamqcOptions) -> Vec<String> {
    vec![
        format!("samtools stats {} > {}", options.bam, options.stats),
        format!("samtools flagstat {} > {}", options.bam, options.flagstat),
        format!("samtools idxstats {} > {}", options.bam, options.idxstats),
    ]
}

/// Main entry point for the "bamqc" wrapper.
pub fn run(logger: &mut Logger, options: &BamqcOptions) -> Result<()> {
    info!(logger, "Running: snakepore wrapper bamqc");

    shell::log_banner(&options.log, "SAMTOOLS QC LOG")?;
    shell::run_all_to_log(logger, &build_commands(options), &options.log)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_report_is_redirected_to_its_output() {
        let options = BamqcOptions {
            bam: "results/minimap2_align/S1.bam".to_string(),
            stats: "results/bamqc/S1_samtools_stats.txt".to_string(),
            flagstat: "results/bamqc/S1_samtools_flagstat.txt".to_string(),
            idxstats: "results/bamqc/S1_samtools_idxstats.txt".to_string(),
            log: "logs/bamqc/S1.log".to_string(),
        };

        let cmds = build_commands(&options);
        assert_eq!(
            cmds,
            vec![
                "samtools stats results/minimap2_align/S1.bam > \
                 results/bamqc/S1_samtools_stats.txt",
                "samtools flagstat results/minimap2_align/S1.bam > \
                 results/bamqc/S1_samtools_flagstat.txt",
                "samtools idxstats results/minimap2_align/S1.bam > \
                 results/bamqc/S1_samtools_idxstats.txt",
            ]
        );
    }
}
