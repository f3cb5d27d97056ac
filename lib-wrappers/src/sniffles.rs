/// Structural variant calling with sniffles.
use clap::ArgMatches;
use slog::Logger;
use tempdir::TempDir;

use lib_shared::shell;

use super::errors::*;

/// Options for the "sniffles" wrapper.
#[derive(Clone, Debug)]
pub struct SnifflesOptions {
    /// Path to the filtered BAM file.
    pub bam: String,
    /// Path of the sorted VCF output.
    pub vcf: String,
    /// Optional VCF of known variants to re-genotype.
    pub input_vcf: Option<String>,
    /// Number of threads.
    pub threads: u32,
    /// Extra options passed to sniffles.
    pub opt: String,
    /// Path of the log file.
    pub log: String,
}

impl SnifflesOptions {
    /// Build options from ArgMatches.
    pub fn new(matches: &ArgMatches) -> Self {
        SnifflesOptions {
            bam: matches.value_of("bam").unwrap().to_string(),
            vcf: matches.value_of("vcf").unwrap().to_string(),
            input_vcf: matches.value_of("input_vcf").map(|s| s.to_string()),
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

/// Command lines calling variants into a scratch directory and sorting
/// the result.
fn build_commands(options: &SnifflesOptions, temp_dir: &str) -> Vec<String> {
    let temp_vcf = format!("{}/temp.vcf", temp_dir);
    let temp_snf = format!("{}/temp.snf", temp_dir);

    let call = match options.input_vcf {
        Some(ref input_vcf) => format!(
            "sniffles {} -t {} -m {} --Ivcf {} -v {} --tmp_file {}",
            options.opt, options.threads, options.bam, input_vcf, temp_vcf, temp_snf
        ),
        None => format!(
            "sniffles {} -t {} -m {} -v {} --tmp_file {}",
            options.opt, options.threads, options.bam, temp_vcf, temp_snf
        ),
    };
    let sort = format!(
        "bcftools sort {} -o {} -O v -T {}",
        temp_vcf, options.vcf, temp_dir
    );

    vec![call, sort]
}

/// Main entry point for the "sniffles" wrapper.
pub fn run(logger: &mut Logger, options: &SnifflesOptions) -> Result<()> {
    info!(logger, "Running: snakepore wrapper sniffles");

    let temp_dir =
        TempDir::new("sniffles").chain_err(|| "Could not create temporary directory")?;
    let cmds = build_commands(options, temp_dir.path().to_str().unwrap());

    shell::log_banner(&options.log, "SNIFFLES LOG")?;
    shell::run_to_log(logger, &cmds[0], &options.log)?;
    shell::log_banner(&options.log, "BCFTOOLS SORT LOG")?;
    shell::run_to_log(logger, &cmds[1], &options.log)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> SnifflesOptions {
        SnifflesOptions {
            bam: "results/samtools_filter/S1.bam".to_string(),
            vcf: "results/sniffles/S1.vcf".to_string(),
            input_vcf: None,
            threads: 4,
            opt: "--min_support 4".to_string(),
            log: "logs/sniffles/S1.log".to_string(),
        }
    }

    #[test]
    fn variants_are_called_and_sorted() {
        let cmds = build_commands(&options(), "/tmp/scratch");

        assert_eq!(
            cmds,
            vec![
                "sniffles --min_support 4 -t 4 -m results/samtools_filter/S1.bam \
                 -v /tmp/scratch/temp.vcf --tmp_file /tmp/scratch/temp.snf",
                "bcftools sort /tmp/scratch/temp.vcf -o results/sniffles/S1.vcf -O v \
                 -T /tmp/scratch",
            ]
        );
    }

    #[test]
    fn known_variants_are_re_genotyped() {
        let mut options = options();
        options.input_vcf = Some("/data/known.vcf".to_string());
        let cmds = build_commands(&options, "/tmp/scratch");

        assert!(cmds[0].contains("--Ivcf /data/known.vcf"));
    }
}
