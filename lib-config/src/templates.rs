/// Template files deployed into the working directory.
///
/// The templates are compiled into the binary so that a fresh analysis can
/// be bootstrapped without any installed data files.
use std::fs::File;
use std::io::Write;
use std::path::Path;

use slog::Logger;

use lib_shared::fs_utils;

use super::errors::*;

/// The template files that can be deployed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TemplateKind {
    Config,
    SampleSheet,
    ClusterConfig,
}

impl TemplateKind {
    /// Parse `TemplateKind` from `&str`.
    pub fn from_str(s: &str) -> Option<TemplateKind> {
        match s {
            "config" => Some(TemplateKind::Config),
            "sample_sheet" => Some(TemplateKind::SampleSheet),
            "cluster_config" => Some(TemplateKind::ClusterConfig),
            _ => None,
        }
    }

    /// All known template kinds.
    pub fn all() -> Vec<TemplateKind> {
        vec![
            TemplateKind::Config,
            TemplateKind::SampleSheet,
            TemplateKind::ClusterConfig,
        ]
    }

    /// File name the template is written to.
    pub fn file_name(&self) -> &'static str {
        match *self {
            TemplateKind::Config => "config.yaml",
            TemplateKind::SampleSheet => "sample_sheet.tsv",
            TemplateKind::ClusterConfig => "cluster_config.yaml",
        }
    }
}

/// Template text for `kind` of the workflow named `workflow`.
pub fn content(workflow: &str, kind: TemplateKind) -> Result<&'static str> {
    match (workflow, kind) {
        ("dna", TemplateKind::Config) => Ok(DNA_CONFIG),
        ("dna", TemplateKind::SampleSheet) => Ok(DNA_SAMPLE_SHEET),
        ("rna", TemplateKind::Config) => Ok(RNA_CONFIG),
        ("rna", TemplateKind::SampleSheet) => Ok(RNA_SAMPLE_SHEET),
        (_, TemplateKind::ClusterConfig) => Ok(CLUSTER_CONFIG),
        _ => bail!("No {:?} template for workflow {}", kind, workflow),
    }
}

/// Deploy the selected template files into `workdir`.
///
/// Existing files are left alone unless `overwrite` is set; each skipped
/// file is reported.
pub fn generate(
    logger: &Logger,
    workflow: &str,
    kinds: &[TemplateKind],
    workdir: &str,
    overwrite: bool,
) -> Result<()> {
    fs_utils::ensure_dir(workdir)?;

    for kind in kinds {
        let dest = Path::new(workdir).join(kind.file_name());
        if dest.is_file() && !overwrite {
            warn!(
                logger,
                "Template file {} already exists in the working directory, use \
                 --overwrite-template to replace it",
                dest.display()
            );
            continue;
        }

        let text = content(workflow, *kind)?;
        let mut file = File::create(&dest)
            .chain_err(|| format!("Could not create template file {}", dest.display()))?;
        file.write_all(text.as_bytes())
            .chain_err(|| format!("Could not write template file {}", dest.display()))?;
        info!(logger, "Created template file {}", dest.display());
    }

    Ok(())
}

/// Configuration template of the DNA methylation workflow.
const DNA_CONFIG: &'static str = r#"# Configuration of the DNA methylation workflow.
#
# One section per rule. Supported keys:
#   outdir:  subdirectory below results/ and logs/ (default: rule name)
#   threads: thread count handed to the engine (default: 1)
#   opt:     extra options passed verbatim to the wrapped tool (default: "")
#   mem:     memory budget in MB, used in cluster mode (default: 1000)

merge_fastq:
    outdir: "merge_fastq"

fastqc:
    outdir: "fastqc"
    threads: 2
    opt: ""

minimap2_index:
    outdir: "minimap2_index"
    threads: 4
    opt: "-x map-ont"

minimap2_align:
    outdir: "minimap2_align"
    threads: 8
    opt: "-x map-ont"
    mem: 16000

bamqc:
    outdir: "bamqc"

samtools_filter:
    outdir: "samtools_filter"
    threads: 2
    opt: "-F 2308 -q 10"

genomecov:
    outdir: "genomecov"
    opt: "-bga"

nanopolish_index:
    threads: 1

nanopolish_call_methylation:
    outdir: "nanopolish"
    threads: 8
    opt_nanopolish: ""
    opt_nanopolishcomp: "--min_depth 10"
    mem: 16000

sniffles_call:
    outdir: "sniffles"
    threads: 4
    opt: "--min_support 4"
"#;

/// Sample sheet template of the DNA methylation workflow.
const DNA_SAMPLE_SHEET: &'static str =
    "# Tab separated sample description file\n\
     # Required fields: sample_id, fastq, fast5_dir, seq_summary\n\
     # The fastq field may list several whitespace separated paths\n\
     sample_id\tfastq\tfast5_dir\tseq_summary\n\
     S1\t/path/to/S1.fastq\t/path/to/S1_fast5\t/path/to/S1_sequencing_summary.txt\n";

/// Configuration template of the RNA counts workflow.
const RNA_CONFIG: &'static str = r#"# Configuration of the RNA counts workflow.
#
# One section per rule. Supported keys:
#   outdir:  subdirectory below results/ and logs/ (default: rule name)
#   threads: thread count handed to the engine (default: 1)
#   opt:     extra options passed verbatim to the wrapped tool (default: "")
#   mem:     memory budget in MB, used in cluster mode (default: 1000)

merge_fastq:
    outdir: "merge_fastq"

fastqc:
    outdir: "fastqc"
    threads: 2
    opt: ""

minimap2_index:
    outdir: "minimap2_index"
    threads: 4
    opt: "-x map-ont"

minimap2_align:
    outdir: "minimap2_align"
    threads: 8
    opt: "-x map-ont -p 0 -N 10"
    mem: 16000

samtools_filter:
    outdir: "samtools_filter"
    threads: 2
    opt: "-F 2320"

salmon_count:
    outdir: "salmon_count"
    threads: 4
    opt: "--noErrorModel"

salmon_count_merge:
    outdir: "salmon_count_merge"
"#;

/// Sample sheet template of the RNA counts workflow.
const RNA_SAMPLE_SHEET: &'static str =
    "# Tab separated sample description file\n\
     # Required fields: sample_id, fastq\n\
     # The fastq field may list several whitespace separated paths\n\
     sample_id\tfastq\n\
     S1\t/path/to/S1.fastq\n";

/// Cluster configuration template shared by all workflows.
const CLUSTER_CONFIG: &'static str = r#"# Cluster configuration.
#
# Values below __default__ apply to every rule and can be overridden in a
# per-rule section. The submission command given with --cluster can refer
# to them, e.g.:
#   --cluster "sbatch --mem {cluster.mem} --time {cluster.time} -c {threads}"

__default__:
    mem: 4000
    time: "08:00:00"

minimap2_align:
    mem: 16000

nanopolish_call_methylation:
    mem: 16000
"#;

#[cfg(test)]
mod tests {
    extern crate tempdir;

    use self::tempdir::TempDir;
    use std::fs;
    use std::fs::File;
    use std::io::Write;

    use slog;
    use slog::Drain;
    use slog::Logger;

    use super::*;

    fn discard_logger() -> Logger {
        Logger::root(slog::Discard.fuse(), o!())
    }

    #[test]
    fn all_templates_are_generated() {
        let tmp = TempDir::new("templates").unwrap();
        let workdir = tmp.path().to_str().unwrap();

        generate(
            &discard_logger(),
            "dna",
            &TemplateKind::all(),
            workdir,
            false,
        ).unwrap();

        for name in &["config.yaml", "sample_sheet.tsv", "cluster_config.yaml"] {
            assert!(tmp.path().join(name).is_file());
        }
        let config = fs::read_to_string(tmp.path().join("config.yaml")).unwrap();
        assert!(config.contains("nanopolish_call_methylation:"));
    }

    #[test]
    fn existing_file_is_not_overwritten() {
        let tmp = TempDir::new("templates").unwrap();
        let workdir = tmp.path().to_str().unwrap();
        let dest = tmp.path().join("config.yaml");
        File::create(&dest)
            .unwrap()
            .write_all(b"keep me\n")
            .unwrap();

        generate(
            &discard_logger(),
            "dna",
            &[TemplateKind::Config],
            workdir,
            false,
        ).unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "keep me\n");
    }

    #[test]
    fn overwrite_flag_replaces_existing_file() {
        let tmp = TempDir::new("templates").unwrap();
        let workdir = tmp.path().to_str().unwrap();
        let dest = tmp.path().join("config.yaml");
        File::create(&dest)
            .unwrap()
            .write_all(b"replace me\n")
            .unwrap();

        generate(
            &discard_logger(),
            "dna",
            &[TemplateKind::Config],
            workdir,
            true,
        ).unwrap();

        let text = fs::read_to_string(&dest).unwrap();
        assert!(text.contains("merge_fastq:"));
    }

    #[test]
    fn workdir_is_created_if_missing() {
        let tmp = TempDir::new("templates").unwrap();
        let workdir = tmp.path().join("analysis");
        let workdir = workdir.to_str().unwrap().to_string();

        generate(
            &discard_logger(),
            "rna",
            &[TemplateKind::SampleSheet],
            &workdir,
            false,
        ).unwrap();

        let sheet =
            fs::read_to_string(tmp.path().join("analysis").join("sample_sheet.tsv")).unwrap();
        assert!(sheet.starts_with("# Tab separated"));
        assert!(sheet.contains("sample_id\tfastq\n"));
    }

    #[test]
    fn unknown_workflow_is_an_error() {
        assert!(content("metagenomics", TemplateKind::Config).is_err());
    }
}
