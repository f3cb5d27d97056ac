/// Declarative rule graphs of the analysis workflows.
///
/// Each rule names its inputs and outputs per sample; the graphs are
/// interpreted by the external engine after rendering. The `{sample}`
/// wildcard is expanded by the engine at run time and by `targets` when
/// computing the expected outputs.
use lib_config::Config;

use super::Workflow;

/// Where a rule input comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum PathSpec {
    /// A concrete path, possibly holding the `{sample}` wildcard.
    File(String),
    /// The whitespace-separated paths listed in a sample sheet column.
    SheetColumn(&'static str),
    /// A `{sample}` pattern expanded over all samples of the sheet.
    Expand(String),
}

/// One rule of the graph.
#[derive(Clone, Debug)]
pub struct Rule {
    /// Rule name, also the configuration section it draws its values from.
    pub name: &'static str,
    /// Named inputs.
    pub inputs: Vec<(&'static str, PathSpec)>,
    /// Named outputs.
    pub outputs: Vec<(&'static str, String)>,
    /// Log file path.
    pub log: String,
    /// Parameters forwarded to the wrapper.
    pub params: Vec<(&'static str, String)>,
    /// Thread count handed to the engine.
    pub threads: u32,
    /// Memory budget in MB.
    pub mem: u32,
    /// Shell line invoking the matching wrapper subcommand.
    pub shell: &'static str,
}

impl Rule {
    /// Whether the rule produces one output set per sample.
    pub fn per_sample(&self) -> bool {
        self.outputs
            .iter()
            .any(|&(_, ref path)| path.contains("{sample}"))
    }
}

/// Output path below `results/`.
fn results(outdir: &str, file: &str) -> String {
    format!("results/{}/{}", outdir, file)
}

/// Log path below `logs/`.
fn logs(outdir: &str, file: &str) -> String {
    format!("logs/{}/{}", outdir, file)
}

/// The rule graph of `workflow` under the given configuration.
pub fn rules(workflow: Workflow, config: &Config, reference: &str) -> Vec<Rule> {
    match workflow {
        Workflow::Dna => dna_rules(config, reference),
        Workflow::Rna => rna_rules(config, reference),
    }
}

/// All expected outputs with `{sample}` expanded; the `rule all` inputs.
pub fn targets(rules: &[Rule], sample_ids: &[String]) -> Vec<String> {
    let mut targets = Vec::new();
    for rule in rules {
        for &(_, ref path) in &rule.outputs {
            if rule.per_sample() {
                for id in sample_ids {
                    targets.push(path.replace("{sample}", id));
                }
            } else {
                targets.push(path.clone());
            }
        }
    }
    targets
}

/// Rules shared by both workflows: FASTQ merging and read-level QC.
fn common_head_rules(config: &Config) -> Vec<Rule> {
    let merge_dir = config.outdir("merge_fastq");
    let fastqc_dir = config.outdir("fastqc");

    vec![
        Rule {
            name: "merge_fastq",
            inputs: vec![("fastq", PathSpec::SheetColumn("fastq"))],
            outputs: vec![("fastq", results(&merge_dir, "{sample}.fastq"))],
            log: logs(&merge_dir, "{sample}.log"),
            params: vec![],
            threads: config.threads("merge_fastq"),
            mem: config.mem("merge_fastq"),
            shell: "snakepore wrapper concat-fastq --input {input.fastq} \
                    --output {output.fastq} --log {log}",
        },
        Rule {
            name: "fastqc",
            inputs: vec![(
                "fastq",
                PathSpec::File(results(&merge_dir, "{sample}.fastq")),
            )],
            outputs: vec![
                ("html", results(&fastqc_dir, "{sample}_fastqc.html")),
                ("zip", results(&fastqc_dir, "{sample}_fastqc.zip")),
            ],
            log: logs(&fastqc_dir, "{sample}.log"),
            params: vec![("opt", config.opt("fastqc"))],
            threads: config.threads("fastqc"),
            mem: config.mem("fastqc"),
            shell: "snakepore wrapper fastqc --fastq {input.fastq} --html {output.html} \
                    --archive {output.zip} --threads {threads} --opt '{params.opt}' \
                    --log {log}",
        },
    ]
}

/// Alignment rules shared by both workflows: indexing, mapping, filtering.
fn alignment_rules(config: &Config, reference: &str) -> Vec<Rule> {
    let merge_dir = config.outdir("merge_fastq");
    let index_dir = config.outdir("minimap2_index");
    let align_dir = config.outdir("minimap2_align");
    let filter_dir = config.outdir("samtools_filter");

    vec![
        Rule {
            name: "minimap2_index",
            inputs: vec![("reference", PathSpec::File(reference.to_string()))],
            outputs: vec![("index", results(&index_dir, "ref.mmi"))],
            log: logs(&index_dir, "ref.log"),
            params: vec![("opt", config.opt("minimap2_index"))],
            threads: config.threads("minimap2_index"),
            mem: config.mem("minimap2_index"),
            shell: "snakepore wrapper minimap2-index --reference {input.reference} \
                    --index {output.index} --threads {threads} --opt '{params.opt}' \
                    --log {log}",
        },
        Rule {
            name: "minimap2_align",
            inputs: vec![
                ("index", PathSpec::File(results(&index_dir, "ref.mmi"))),
                (
                    "fastq",
                    PathSpec::File(results(&merge_dir, "{sample}.fastq")),
                ),
            ],
            outputs: vec![("bam", results(&align_dir, "{sample}.bam"))],
            log: logs(&align_dir, "{sample}.log"),
            params: vec![("opt", config.opt("minimap2_align"))],
            threads: config.threads("minimap2_align"),
            mem: config.mem("minimap2_align"),
            shell: "snakepore wrapper minimap2-align --index {input.index} \
                    --fastq {input.fastq} --bam {output.bam} --threads {threads} \
                    --opt '{params.opt}' --log {log}",
        },
        Rule {
            name: "samtools_filter",
            inputs: vec![(
                "bam",
                PathSpec::File(results(&align_dir, "{sample}.bam")),
            )],
            outputs: vec![("bam", results(&filter_dir, "{sample}.bam"))],
            log: logs(&filter_dir, "{sample}.log"),
            params: vec![("opt", config.opt("samtools_filter"))],
            threads: config.threads("samtools_filter"),
            mem: config.mem("samtools_filter"),
            shell: "snakepore wrapper samtools-filter --input {input.bam} \
                    --output {output.bam} --threads {threads} --opt '{params.opt}' \
                    --log {log}",
        },
    ]
}

/// Rule graph of the DNA methylation workflow.
fn dna_rules(config: &Config, reference: &str) -> Vec<Rule> {
    let merge_dir = config.outdir("merge_fastq");
    let align_dir = config.outdir("minimap2_align");
    let bamqc_dir = config.outdir("bamqc");
    let filter_dir = config.outdir("samtools_filter");
    let genomecov_dir = config.outdir("genomecov");
    let nanopolish_dir = config.outdir("nanopolish_call_methylation");
    let sniffles_dir = config.outdir("sniffles_call");

    let mut rules = common_head_rules(config);
    rules.extend(alignment_rules(config, reference));
    rules.extend(vec![
        Rule {
            name: "bamqc",
            inputs: vec![(
                "bam",
                PathSpec::File(results(&align_dir, "{sample}.bam")),
            )],
            outputs: vec![
                (
                    "stats",
                    results(&bamqc_dir, "{sample}_samtools_stats.txt"),
                ),
                (
                    "flagstat",
                    results(&bamqc_dir, "{sample}_samtools_flagstat.txt"),
                ),
                (
                    "idxstats",
                    results(&bamqc_dir, "{sample}_samtools_idxstats.txt"),
                ),
            ],
            log: logs(&bamqc_dir, "{sample}.log"),
            params: vec![],
            threads: config.threads("bamqc"),
            mem: config.mem("bamqc"),
            shell: "snakepore wrapper bamqc --bam {input.bam} --stats {output.stats} \
                    --flagstat {output.flagstat} --idxstats {output.idxstats} --log {log}",
        },
        Rule {
            name: "genomecov",
            inputs: vec![(
                "bam",
                PathSpec::File(results(&filter_dir, "{sample}.bam")),
            )],
            outputs: vec![(
                "bedgraph",
                results(&genomecov_dir, "{sample}.bedgraph"),
            )],
            log: logs(&genomecov_dir, "{sample}.log"),
            params: vec![("opt", config.opt("genomecov"))],
            threads: config.threads("genomecov"),
            mem: config.mem("genomecov"),
            shell: "snakepore wrapper genomecov --bam {input.bam} \
                    --bedgraph {output.bedgraph} --opt '{params.opt}' --log {log}",
        },
        Rule {
            name: "nanopolish_index",
            inputs: vec![
                (
                    "fastq",
                    PathSpec::File(results(&merge_dir, "{sample}.fastq")),
                ),
                ("fast5_dir", PathSpec::SheetColumn("fast5_dir")),
                ("seq_summary", PathSpec::SheetColumn("seq_summary")),
            ],
            outputs: vec![
                (
                    "index",
                    results(&merge_dir, "{sample}.fastq.index"),
                ),
                ("fai", results(&merge_dir, "{sample}.fastq.index.fai")),
                ("gzi", results(&merge_dir, "{sample}.fastq.index.gzi")),
                (
                    "readdb",
                    results(&merge_dir, "{sample}.fastq.index.readdb"),
                ),
            ],
            log: logs(&merge_dir, "{sample}_nanopolish_index.log"),
            params: vec![],
            threads: config.threads("nanopolish_index"),
            mem: config.mem("nanopolish_index"),
            shell: "snakepore wrapper nanopolish-index --fastq {input.fastq} \
                    --fast5-dir {input.fast5_dir} --seq-summary {input.seq_summary} \
                    --log {log}",
        },
        Rule {
            name: "nanopolish_call_methylation",
            inputs: vec![
                (
                    "fastq",
                    PathSpec::File(results(&merge_dir, "{sample}.fastq")),
                ),
                (
                    "readdb",
                    PathSpec::File(results(&merge_dir, "{sample}.fastq.index.readdb")),
                ),
                (
                    "bam",
                    PathSpec::File(results(&filter_dir, "{sample}.bam")),
                ),
                ("reference", PathSpec::File(reference.to_string())),
            ],
            outputs: vec![
                (
                    "call",
                    results(&nanopolish_dir, "{sample}_call_methylation.tsv"),
                ),
                (
                    "bed",
                    results(&nanopolish_dir, "{sample}_freq_meth_calculate.bed"),
                ),
                (
                    "tsv",
                    results(&nanopolish_dir, "{sample}_freq_meth_calculate.tsv"),
                ),
            ],
            log: logs(&nanopolish_dir, "{sample}.log"),
            params: vec![
                (
                    "opt_nanopolish",
                    config.str_value("nanopolish_call_methylation", "opt_nanopolish", ""),
                ),
                (
                    "opt_nanopolishcomp",
                    config.str_value("nanopolish_call_methylation", "opt_nanopolishcomp", ""),
                ),
            ],
            threads: config.threads("nanopolish_call_methylation"),
            mem: config.mem("nanopolish_call_methylation"),
            shell: "snakepore wrapper nanopolish-call-methylation --fastq {input.fastq} \
                    --bam {input.bam} --reference {input.reference} --call {output.call} \
                    --bed {output.bed} --tsv {output.tsv} --threads {threads} \
                    --opt '{params.opt_nanopolish}' --freq-opt '{params.opt_nanopolishcomp}' \
                    --log {log}",
        },
        Rule {
            name: "sniffles_call",
            inputs: vec![(
                "bam",
                PathSpec::File(results(&filter_dir, "{sample}.bam")),
            )],
            outputs: vec![("vcf", results(&sniffles_dir, "{sample}.vcf"))],
            log: logs(&sniffles_dir, "{sample}.log"),
            params: vec![("opt", config.opt("sniffles_call"))],
            threads: config.threads("sniffles_call"),
            mem: config.mem("sniffles_call"),
            shell: "snakepore wrapper sniffles --bam {input.bam} --vcf {output.vcf} \
                    --threads {threads} --opt '{params.opt}' --log {log}",
        },
    ]);

    rules
}

/// Rule graph of the RNA counts workflow.
fn rna_rules(config: &Config, reference: &str) -> Vec<Rule> {
    let filter_dir = config.outdir("samtools_filter");
    let salmon_dir = config.outdir("salmon_count");
    let merge_counts_dir = config.outdir("salmon_count_merge");

    let mut rules = common_head_rules(config);
    rules.extend(alignment_rules(config, reference));
    rules.extend(vec![
        Rule {
            name: "salmon_count",
            inputs: vec![
                (
                    "bam",
                    PathSpec::File(results(&filter_dir, "{sample}.bam")),
                ),
                ("transcriptome", PathSpec::File(reference.to_string())),
            ],
            outputs: vec![("counts", results(&salmon_dir, "{sample}.tsv"))],
            log: logs(&salmon_dir, "{sample}.log"),
            params: vec![("opt", config.opt("salmon_count"))],
            threads: config.threads("salmon_count"),
            mem: config.mem("salmon_count"),
            shell: "snakepore wrapper salmon-count --bam {input.bam} \
                    --transcriptome {input.transcriptome} --output {output.counts} \
                    --threads {threads} --opt '{params.opt}' --log {log}",
        },
        Rule {
            name: "salmon_count_merge",
            inputs: vec![(
                "counts",
                PathSpec::Expand(results(&salmon_dir, "{sample}.tsv")),
            )],
            outputs: vec![
                ("counts", results(&merge_counts_dir, "counts.tsv")),
                ("tpm", results(&merge_counts_dir, "tpm.tsv")),
            ],
            log: logs(&merge_counts_dir, "salmon_count_merge.log"),
            params: vec![],
            threads: config.threads("salmon_count_merge"),
            mem: config.mem("salmon_count_merge"),
            shell: "snakepore wrapper salmon-merge --input {input.counts} \
                    --counts {output.counts} --tpm {output.tpm} --log {log}",
        },
    ]);

    rules
}

#[cfg(test)]
mod tests {
    extern crate tempdir;

    use self::tempdir::TempDir;
    use std::fs::File;
    use std::io::Write;

    use super::*;

    fn config(text: &str) -> Config {
        let tmp = TempDir::new("plan").unwrap();
        let path = tmp.path().join("config.yaml");
        File::create(&path).unwrap().write_all(text.as_bytes()).unwrap();
        Config::from_path(path.to_str().unwrap()).unwrap()
    }

    fn sample_ids() -> Vec<String> {
        vec!["S1".to_string(), "S2".to_string()]
    }

    #[test]
    fn dna_graph_lists_all_stages() {
        let rules = rules(Workflow::Dna, &config("{}"), "/data/ref.fa");
        let names = rules.iter().map(|rule| rule.name).collect::<Vec<_>>();

        assert_eq!(
            names,
            vec![
                "merge_fastq",
                "fastqc",
                "minimap2_index",
                "minimap2_align",
                "samtools_filter",
                "bamqc",
                "genomecov",
                "nanopolish_index",
                "nanopolish_call_methylation",
                "sniffles_call",
            ]
        );
    }

    #[test]
    fn rna_graph_ends_with_the_count_merge() {
        let rules = rules(Workflow::Rna, &config("{}"), "/data/transcripts.fa");
        let names = rules.iter().map(|rule| rule.name).collect::<Vec<_>>();

        assert_eq!(names.last().unwrap(), &"salmon_count_merge");
        assert!(names.contains(&"salmon_count"));
        assert!(!names.contains(&"nanopolish_index"));
    }

    #[test]
    fn targets_expand_the_sample_wildcard() {
        let rules = rules(Workflow::Dna, &config("{}"), "/data/ref.fa");
        let targets = targets(&rules, &sample_ids());

        assert!(targets.contains(&"results/merge_fastq/S1.fastq".to_string()));
        assert!(targets.contains(&"results/merge_fastq/S2.fastq".to_string()));
        assert!(targets.contains(&"results/sniffles/S2.vcf".to_string()));
        // The index is built once, not per sample.
        assert_eq!(
            targets
                .iter()
                .filter(|t| t.as_str() == "results/minimap2_index/ref.mmi")
                .count(),
            1
        );
        assert!(targets.iter().all(|t| !t.contains("{sample}")));
    }

    #[test]
    fn rna_targets_include_the_merged_tables_once() {
        let rules = rules(Workflow::Rna, &config("{}"), "/data/transcripts.fa");
        let targets = targets(&rules, &sample_ids());

        assert!(targets.contains(&"results/salmon_count/S1.tsv".to_string()));
        assert_eq!(
            targets
                .iter()
                .filter(|t| t.as_str() == "results/salmon_count_merge/counts.tsv")
                .count(),
            1
        );
        assert!(targets.contains(&"results/salmon_count_merge/tpm.tsv".to_string()));
    }

    #[test]
    fn configured_outdir_moves_rule_outputs() {
        let config = config("minimap2_align:\n  outdir: \"mapping\"\n");
        let rules = rules(Workflow::Dna, &config, "/data/ref.fa");
        let align = rules
            .iter()
            .find(|rule| rule.name == "minimap2_align")
            .unwrap();

        assert_eq!(align.outputs[0].1, "results/mapping/{sample}.bam");
        assert_eq!(align.log, "logs/mapping/{sample}.log");
        // Downstream rules read from the moved directory.
        let filter = rules
            .iter()
            .find(|rule| rule.name == "samtools_filter")
            .unwrap();
        assert_eq!(
            filter.inputs[0].1,
            PathSpec::File("results/mapping/{sample}.bam".to_string())
        );
    }

    #[test]
    fn nanopolish_outputs_sit_next_to_the_merged_fastq() {
        let rules = rules(Workflow::Dna, &config("{}"), "/data/ref.fa");
        let index = rules
            .iter()
            .find(|rule| rule.name == "nanopolish_index")
            .unwrap();

        for &(_, ref path) in &index.outputs {
            assert!(path.starts_with("results/merge_fastq/"));
        }
    }
}
