/// Pass-through options for the external workflow engine.
///
/// The engine owns dependency resolution, scheduling, retries and cluster
/// submission; this module only translates the subcommand options into the
/// engine's command line and launches the executable.
use std::process::Command;

use clap::ArgMatches;
use shlex;
use slog::Logger;

use super::errors::*;

/// Name of the engine executable.
pub const ENGINE_BIN: &'static str = "snakemake";

/// Engine command-line options this front end knows how to forward.
///
/// Free-form extra arguments (`--engine-args`) are checked against this
/// table before delegation; anything unknown is dropped.
pub const KNOWN_ENGINE_FLAGS: &'static [&'static str] = &[
    "--cores",
    "--jobs",
    "--local-cores",
    "--dryrun",
    "--touch",
    "--force",
    "--forceall",
    "--forcerun",
    "--keep-going",
    "--cluster",
    "--cluster-config",
    "--jobname",
    "--immediate-submit",
    "--unlock",
    "--printshellcmds",
    "--reason",
    "--nocolor",
    "--latency-wait",
    "--restart-times",
    "--max-jobs-per-second",
    "--stats",
    "--report",
    "--list",
    "--list-target-rules",
    "--rerun-incomplete",
    "--ignore-incomplete",
    "--notemp",
    "--delete-all-output",
    "--delete-temp-output",
    "--summary",
    "--detailed-summary",
    "--wait-for-files",
    "--keep-target-files",
    "--quiet",
    "--verbose",
];

/// Options forwarded to the engine.
#[derive(Clone, Debug, Default)]
pub struct EngineOptions {
    // Core and job counts
    /// Number of provided cores (local mode) or local cores (cluster mode).
    pub cores: u32,
    /// Number of cluster nodes, ignored without cluster support.
    pub nodes: u32,

    /// Rule or file names to build instead of the default target.
    pub targets: Vec<String>,

    // Execution switches
    /// Only dry-run the workflow.
    pub dryrun: bool,
    /// Only touch existing output files.
    pub touch: bool,
    /// Force the given targets to be re-created.
    pub force_targets: bool,
    /// Force all output files to be re-created.
    pub force_all: bool,
    /// Files and rules that shall be re-created/re-executed.
    pub force_run: Vec<String>,
    /// Keep going upon errors.
    pub keep_going: bool,
    /// Just unlock the working directory.
    pub unlock: bool,

    // Cluster submission
    /// Submission command of a cluster or batch system, e.g. qsub.
    pub cluster: Option<String>,
    /// Naming scheme for cluster job scripts.
    pub job_name: Option<String>,
    /// Immediately submit all jobs, regardless of dependencies.
    pub immediate_submit: bool,
    /// Maximal number of cluster jobs per second.
    pub max_jobs_per_second: Option<u32>,

    // Reporting
    /// Print the shell command of each job.
    pub print_shell_cmds: bool,
    /// Print the reason for the execution of each job.
    pub print_reason: bool,
    /// Do not print colored output.
    pub no_color: bool,
    /// Path of the workflow execution stats file.
    pub stats: Option<String>,
    /// Create an HTML report for a previous run at the given path.
    pub report: Option<String>,
    /// List rules and exit.
    pub list_rules: bool,
    /// List target rules and exit.
    pub list_target_rules: bool,
    /// List a summary of all output files and their status.
    pub summary: bool,
    /// List a detailed summary including input files and shell commands.
    pub detailed_summary: bool,

    // Incomplete and temporary files
    /// Re-create incomplete output files.
    pub rerun_incomplete: bool,
    /// Ignore incomplete output files.
    pub ignore_incomplete: bool,
    /// Ignore temp file flags.
    pub no_temp: bool,
    /// Remove all files generated by the workflow.
    pub delete_all_output: bool,
    /// Remove all temporary files generated by the workflow.
    pub delete_temp_output: bool,

    // Filesystem latency
    /// Seconds to wait for output files to appear after a job.
    pub latency_wait: u32,
    /// Number of times to restart failing jobs.
    pub restart_times: u32,
    /// Wait for the given files before executing the workflow.
    pub wait_for_files: Vec<String>,

    /// Free-form extra engine arguments, filtered against the known table.
    pub extra: Vec<String>,
}

impl EngineOptions {
    /// Build options from ArgMatches.
    pub fn new(matches: &ArgMatches) -> Self {
        EngineOptions {
            cores: matches
                .value_of("cores")
                .unwrap()
                .parse::<u32>()
                .unwrap_or(1),
            nodes: matches
                .value_of("nodes")
                .unwrap()
                .parse::<u32>()
                .unwrap_or(1),

            targets: collect(matches, "targets"),

            dryrun: matches.is_present("dryrun"),
            touch: matches.is_present("touch"),
            force_targets: matches.is_present("forcetargets"),
            force_all: matches.is_present("forceall"),
            force_run: collect(matches, "forcerun"),
            keep_going: matches.is_present("keepgoing"),
            unlock: matches.is_present("unlock"),

            cluster: matches.value_of("cluster").map(|s| s.to_string()),
            job_name: matches.value_of("jobname").map(|s| s.to_string()),
            immediate_submit: matches.is_present("immediate_submit"),
            max_jobs_per_second: matches
                .value_of("max_jobs_per_second")
                .and_then(|s| s.parse::<u32>().ok()),

            print_shell_cmds: matches.is_present("printshellcmds"),
            print_reason: matches.is_present("printreason"),
            no_color: matches.is_present("nocolor"),
            stats: matches.value_of("stats").map(|s| s.to_string()),
            report: matches.value_of("report").map(|s| s.to_string()),
            list_rules: matches.is_present("listrules"),
            list_target_rules: matches.is_present("list_target_rules"),
            summary: matches.is_present("summary"),
            detailed_summary: matches.is_present("detailed_summary"),

            rerun_incomplete: matches.is_present("force_incomplete"),
            ignore_incomplete: matches.is_present("ignore_incomplete"),
            no_temp: matches.is_present("notemp"),
            delete_all_output: matches.is_present("delete_all_output"),
            delete_temp_output: matches.is_present("delete_temp_output"),

            latency_wait: matches
                .value_of("latency_wait")
                .unwrap()
                .parse::<u32>()
                .unwrap_or(3),
            restart_times: matches
                .value_of("restart_times")
                .unwrap()
                .parse::<u32>()
                .unwrap_or(0),
            wait_for_files: collect(matches, "wait_for_files"),

            extra: collect(matches, "engine_args"),
        }
    }

    /// Build the engine argv for a deployed workflow.
    ///
    /// In cluster mode the configuration file doubles as the engine's
    /// cluster config, the node count maps to the engine's job count, and
    /// the core count is forwarded as the local core count.
    pub fn to_args(
        &self,
        snakefile: &str,
        configfile: &str,
        workdir: &str,
        config_values: &[(String, String)],
    ) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();

        args.push("--snakefile".to_string());
        args.push(snakefile.to_string());
        args.push("--directory".to_string());
        args.push(workdir.to_string());
        args.push("--configfile".to_string());
        args.push(configfile.to_string());
        if !config_values.is_empty() {
            args.push("--config".to_string());
            for &(ref key, ref value) in config_values {
                args.push(format!("{}={}", key, value));
            }
        }

        if let Some(ref cluster) = self.cluster {
            args.push("--cluster".to_string());
            args.push(cluster.clone());
            args.push("--cluster-config".to_string());
            args.push(configfile.to_string());
            args.push("--jobs".to_string());
            args.push(self.nodes.to_string());
            args.push("--local-cores".to_string());
            args.push(self.cores.to_string());
            if let Some(ref job_name) = self.job_name {
                args.push("--jobname".to_string());
                args.push(job_name.clone());
            }
            if self.immediate_submit {
                args.push("--immediate-submit".to_string());
            }
            if let Some(max) = self.max_jobs_per_second {
                args.push("--max-jobs-per-second".to_string());
                args.push(max.to_string());
            }
        } else {
            args.push("--cores".to_string());
            args.push(self.cores.to_string());
        }

        let switches = [
            ("--dryrun", self.dryrun),
            ("--touch", self.touch),
            ("--force", self.force_targets),
            ("--forceall", self.force_all),
            ("--keep-going", self.keep_going),
            ("--unlock", self.unlock),
            ("--printshellcmds", self.print_shell_cmds),
            ("--reason", self.print_reason),
            ("--nocolor", self.no_color),
            ("--list", self.list_rules),
            ("--list-target-rules", self.list_target_rules),
            ("--summary", self.summary),
            ("--detailed-summary", self.detailed_summary),
            ("--rerun-incomplete", self.rerun_incomplete),
            ("--ignore-incomplete", self.ignore_incomplete),
            ("--notemp", self.no_temp),
            ("--delete-all-output", self.delete_all_output),
            ("--delete-temp-output", self.delete_temp_output),
        ];
        for &(flag, on) in switches.iter() {
            if on {
                args.push(flag.to_string());
            }
        }

        if !self.force_run.is_empty() {
            args.push("--forcerun".to_string());
            args.extend(self.force_run.iter().cloned());
        }
        if !self.wait_for_files.is_empty() {
            args.push("--wait-for-files".to_string());
            args.extend(self.wait_for_files.iter().cloned());
        }

        args.push("--latency-wait".to_string());
        args.push(self.latency_wait.to_string());
        args.push("--restart-times".to_string());
        args.push(self.restart_times.to_string());

        if let Some(ref stats) = self.stats {
            args.push("--stats".to_string());
            args.push(stats.clone());
        }
        if let Some(ref report) = self.report {
            args.push("--report".to_string());
            args.push(report.clone());
        }

        let (kept, _) = filter_extra_args(&self.extra);
        args.extend(kept);

        args.extend(self.targets.iter().cloned());

        args
    }
}

/// Collect a repeated string option from ArgMatches.
fn collect(matches: &ArgMatches, name: &str) -> Vec<String> {
    matches
        .values_of(name)
        .map(|values| values.map(|s| s.to_string()).collect())
        .unwrap_or_else(Vec::new)
}

/// Split free-form engine arguments into forwarded and dropped parts.
///
/// A token is kept if it is a known engine flag or a value belonging to
/// the closest preceding kept flag, so `--latency-wait 10` keeps both
/// tokens while `--bogus 10` drops both.
pub fn filter_extra_args(extra: &[String]) -> (Vec<String>, Vec<String>) {
    let mut kept = Vec::new();
    let mut dropped = Vec::new();
    let mut keep_values = false;

    for arg in extra {
        if arg.starts_with('-') {
            let flag = arg.split('=').next().unwrap();
            if KNOWN_ENGINE_FLAGS.contains(&flag) {
                keep_values = true;
                kept.push(arg.clone());
            } else {
                keep_values = false;
                dropped.push(arg.clone());
            }
        } else if keep_values {
            kept.push(arg.clone());
        } else {
            dropped.push(arg.clone());
        }
    }

    (kept, dropped)
}

/// Launch the engine and wait for it to finish.
pub fn run_engine(logger: &mut Logger, args: &[String]) -> Result<()> {
    info!(
        logger,
        "Engine command: {} {}",
        ENGINE_BIN,
        args.iter()
            .map(|arg| shlex::quote(arg).to_string())
            .collect::<Vec<String>>()
            .join(" ")
    );

    let status = Command::new(ENGINE_BIN)
        .args(args)
        .status()
        .chain_err(|| format!("Could not launch the workflow engine ({})", ENGINE_BIN))?;

    if !status.success() {
        bail!("The workflow engine exited with {}", status);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_options() -> EngineOptions {
        EngineOptions {
            cores: 4,
            nodes: 1,
            latency_wait: 3,
            ..Default::default()
        }
    }

    #[test]
    fn local_mode_forwards_cores() {
        let args = base_options().to_args("wd/dna.smk", "config.yaml", "wd", &[]);

        let cores = args.iter().position(|a| a == "--cores").unwrap();
        assert_eq!(args[cores + 1], "4");
        assert!(!args.contains(&"--cluster".to_string()));
        assert!(!args.contains(&"--jobs".to_string()));
    }

    #[test]
    fn cluster_mode_reuses_the_config_file() {
        let mut options = base_options();
        options.cluster = Some("sbatch".to_string());
        options.nodes = 16;
        let args = options.to_args("wd/dna.smk", "config.yaml", "wd", &[]);

        let cluster = args.iter().position(|a| a == "--cluster").unwrap();
        assert_eq!(args[cluster + 1], "sbatch");
        let cluster_config = args.iter().position(|a| a == "--cluster-config").unwrap();
        assert_eq!(args[cluster_config + 1], "config.yaml");
        let jobs = args.iter().position(|a| a == "--jobs").unwrap();
        assert_eq!(args[jobs + 1], "16");
        let local_cores = args.iter().position(|a| a == "--local-cores").unwrap();
        assert_eq!(args[local_cores + 1], "4");
        assert!(!args.contains(&"--cores".to_string()));
    }

    #[test]
    fn switches_are_only_emitted_when_set() {
        let mut options = base_options();
        options.dryrun = true;
        options.keep_going = true;
        let args = options.to_args("wd/dna.smk", "config.yaml", "wd", &[]);

        assert!(args.contains(&"--dryrun".to_string()));
        assert!(args.contains(&"--keep-going".to_string()));
        assert!(!args.contains(&"--touch".to_string()));
        assert!(!args.contains(&"--forceall".to_string()));
    }

    #[test]
    fn config_values_follow_the_config_flag() {
        let values = vec![
            ("reference".to_string(), "/data/ref.fa".to_string()),
            ("sample_sheet".to_string(), "/data/sheet.tsv".to_string()),
        ];
        let args = base_options().to_args("wd/dna.smk", "config.yaml", "wd", &values);

        let config = args.iter().position(|a| a == "--config").unwrap();
        assert_eq!(args[config + 1], "reference=/data/ref.fa");
        assert_eq!(args[config + 2], "sample_sheet=/data/sheet.tsv");
    }

    #[test]
    fn targets_come_last() {
        let mut options = base_options();
        options.targets = vec!["results/merge_fastq/S1.fastq".to_string()];
        let args = options.to_args("wd/dna.smk", "config.yaml", "wd", &[]);

        assert_eq!(args.last().unwrap(), "results/merge_fastq/S1.fastq");
    }

    #[test]
    fn unknown_extra_arguments_are_dropped() {
        let extra = vec![
            "--latency-wait".to_string(),
            "10".to_string(),
            "--use-conda".to_string(),
            "env".to_string(),
            "--notemp".to_string(),
        ];
        let (kept, dropped) = filter_extra_args(&extra);

        assert_eq!(kept, vec!["--latency-wait", "10", "--notemp"]);
        assert_eq!(dropped, vec!["--use-conda", "env"]);
    }

    #[test]
    fn extra_arguments_with_equals_are_recognized() {
        let extra = vec!["--restart-times=2".to_string(), "--bogus=1".to_string()];
        let (kept, dropped) = filter_extra_args(&extra);

        assert_eq!(kept, vec!["--restart-times=2"]);
        assert_eq!(dropped, vec!["--bogus=1"]);
    }

    #[test]
    fn forwarded_extra_arguments_end_up_in_the_argv() {
        let mut options = base_options();
        options.extra = vec!["--keep-target-files".to_string(), "--no-such-flag".to_string()];
        let args = options.to_args("wd/dna.smk", "config.yaml", "wd", &[]);

        assert!(args.contains(&"--keep-target-files".to_string()));
        assert!(!args.contains(&"--no-such-flag".to_string()));
    }
}
