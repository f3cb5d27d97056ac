/// Rendering of a rule graph into the engine's declarative syntax and
/// deployment into the working directory.
use std::fs::File;
use std::io::Write;
use std::path::Path;

use slog::Logger;

use lib_shared::fs_utils;

use plan::{targets, PathSpec, Rule};
use super::errors::*;

/// Prelude shared by all rendered rule graphs.
///
/// The sample sheet is loaded by the engine itself so that the raw input
/// locations (FASTQ files, FAST5 directories) can be resolved per sample
/// at job time.
const PRELUDE: &'static str = r##"from snakemake.utils import min_version

import pandas as pd

min_version("5.4.2")

sample_df = pd.read_csv(
    config["sample_sheet"], comment="#", skip_blank_lines=True, sep="\t",
    index_col=0, dtype=str)
sample_list = list(sample_df.index)


def sheet_paths(column):
    def lookup(wildcards):
        return sample_df.loc[wildcards.sample, column].split()
    return lookup
"##;

/// Render the rule graph in the engine's declarative syntax.
pub fn render(workflow_name: &str, rules: &[Rule], sample_ids: &[String]) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "# {} workflow, deployed by snakepore.\n\
         # Edit the configuration file rather than this file: it is\n\
         # rewritten on every launch.\n\n",
        workflow_name
    ));
    out.push_str(PRELUDE);
    out.push_str("\n\n");

    out.push_str("rule all:\n    input:\n");
    for target in targets(rules, sample_ids) {
        out.push_str(&format!("        \"{}\",\n", target));
    }
    out.push_str("\n");

    for rule in rules {
        out.push_str("\n");
        out.push_str(&render_rule(rule, sample_ids));
    }

    out
}

/// Render one rule block.
fn render_rule(rule: &Rule, sample_ids: &[String]) -> String {
    let mut out = String::new();

    out.push_str(&format!("rule {}:\n", rule.name));

    out.push_str("    input:\n");
    for &(name, ref spec) in &rule.inputs {
        match *spec {
            PathSpec::File(ref path) => {
                out.push_str(&format!("        {}=\"{}\",\n", name, path));
            }
            PathSpec::SheetColumn(column) => {
                out.push_str(&format!("        {}=sheet_paths(\"{}\"),\n", name, column));
            }
            PathSpec::Expand(ref pattern) => {
                let paths = sample_ids
                    .iter()
                    .map(|id| format!("\"{}\"", pattern.replace("{sample}", id)))
                    .collect::<Vec<String>>();
                out.push_str(&format!("        {}=[{}],\n", name, paths.join(", ")));
            }
        }
    }

    out.push_str("    output:\n");
    for &(name, ref path) in &rule.outputs {
        out.push_str(&format!("        {}=\"{}\",\n", name, path));
    }

    out.push_str(&format!("    log:\n        \"{}\"\n", rule.log));

    if !rule.params.is_empty() {
        out.push_str("    params:\n");
        for &(name, ref value) in &rule.params {
            out.push_str(&format!(
                "        {}=\"{}\",\n",
                name,
                value.replace('"', "\\\"")
            ));
        }
    }

    out.push_str(&format!("    threads: {}\n", rule.threads));
    out.push_str(&format!(
        "    resources:\n        mem_mb={}\n",
        rule.mem
    ));
    out.push_str(&format!("    shell:\n        \"{}\"\n", rule.shell));

    out
}

/// Write the rendered rule graph into `workdir` and return its path.
pub fn deploy(
    logger: &Logger,
    workflow_name: &str,
    rules: &[Rule],
    sample_ids: &[String],
    workdir: &str,
) -> Result<String> {
    fs_utils::ensure_dir(workdir)?;
    let path = Path::new(workdir).join(format!("{}.smk", workflow_name));

    let text = render(workflow_name, rules, sample_ids);
    let mut file = File::create(&path)
        .chain_err(|| format!("Could not create workflow file {}", path.display()))?;
    file.write_all(text.as_bytes())
        .chain_err(|| format!("Could not write workflow file {}", path.display()))?;

    let path = match path.to_str() {
        Some(path) => fs_utils::abs_path(path)?,
        None => bail!("Workflow file path is not valid UTF-8: {:?}", path),
    };
    debug!(logger, "Deployed workflow file {}", path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    extern crate tempdir;

    use self::tempdir::TempDir;
    use std::fs;
    use std::fs::File;
    use std::io::Write;

    use lib_config::Config;

    use super::super::Workflow;
    use super::*;
    use plan;

    fn config() -> Config {
        let tmp = TempDir::new("snakefile").unwrap();
        let path = tmp.path().join("config.yaml");
        File::create(&path).unwrap().write_all(b"{}").unwrap();
        Config::from_path(path.to_str().unwrap()).unwrap()
    }

    fn sample_ids() -> Vec<String> {
        vec!["S1".to_string(), "S2".to_string()]
    }

    #[test]
    fn rendered_graph_contains_every_rule() {
        let rules = plan::rules(Workflow::Dna, &config(), "/data/ref.fa");
        let text = render("dna", &rules, &sample_ids());

        for rule in &rules {
            assert!(text.contains(&format!("rule {}:", rule.name)));
        }
        assert!(text.starts_with("# dna workflow"));
        assert!(text.contains("rule all:"));
    }

    #[test]
    fn rule_all_lists_the_expanded_targets() {
        let rules = plan::rules(Workflow::Dna, &config(), "/data/ref.fa");
        let text = render("dna", &rules, &sample_ids());

        assert!(text.contains("        \"results/merge_fastq/S1.fastq\",\n"));
        assert!(text.contains("        \"results/nanopolish/S2_freq_meth_calculate.bed\",\n"));
    }

    #[test]
    fn sheet_columns_become_lookup_functions() {
        let rules = plan::rules(Workflow::Dna, &config(), "/data/ref.fa");
        let text = render("dna", &rules, &sample_ids());

        assert!(text.contains("fastq=sheet_paths(\"fastq\"),"));
        assert!(text.contains("fast5_dir=sheet_paths(\"fast5_dir\"),"));
    }

    #[test]
    fn expanded_inputs_are_rendered_as_a_list() {
        let rules = plan::rules(Workflow::Rna, &config(), "/data/transcripts.fa");
        let text = render("rna", &rules, &sample_ids());

        assert!(text.contains(
            "counts=[\"results/salmon_count/S1.tsv\", \"results/salmon_count/S2.tsv\"]"
        ));
    }

    #[test]
    fn shell_lines_invoke_the_wrappers() {
        let rules = plan::rules(Workflow::Dna, &config(), "/data/ref.fa");
        let text = render("dna", &rules, &sample_ids());

        assert!(text.contains("snakepore wrapper minimap2-align --index {input.index}"));
        assert!(text.contains("snakepore wrapper sniffles --bam {input.bam}"));
    }

    #[test]
    fn deploy_writes_the_workflow_file() {
        let tmp = TempDir::new("snakefile").unwrap();
        let workdir = tmp.path().to_str().unwrap();
        let rules = plan::rules(Workflow::Dna, &config(), "/data/ref.fa");

        let logger = ::slog::Logger::root(::slog::Discard, o!());
        let path = deploy(&logger, "dna", &rules, &sample_ids(), workdir).unwrap();

        assert!(path.ends_with("dna.smk"));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("rule nanopolish_call_methylation:"));
    }
}
