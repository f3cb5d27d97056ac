/// Deployment and launch of the analysis workflows.
///
/// A workflow launch validates the user-provided artifacts, renders the
/// rule graph into the working directory, and hands control to the
/// external engine, which owns dependency resolution, scheduling, and
/// cluster submission.
extern crate clap;

#[macro_use]
extern crate error_chain;

extern crate shlex;

#[macro_use]
extern crate slog;
use slog::Logger;

extern crate lib_config;
extern crate lib_shared;

use lib_config::templates::{self, TemplateKind};
use lib_config::{reference, Config, SampleSheet};

pub mod engine;
pub mod options;
pub mod plan;
pub mod snakefile;

pub use options::WorkflowOptions;

mod errors {
    // Create the Error, ErrorKind, ResultExt, and Result types
    error_chain!{
        links {
            Config(::lib_config::Error, ::lib_config::ErrorKind);
            Shared(::lib_shared::Error, ::lib_shared::ErrorKind);
        }
    }
}

pub use errors::*;

/// The pipelines this front end can deploy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Workflow {
    Dna,
    Rna,
}

impl Workflow {
    /// Workflow name as used on the command line and in file names.
    pub fn name(&self) -> &'static str {
        match *self {
            Workflow::Dna => "dna",
            Workflow::Rna => "rna",
        }
    }

    /// Sample sheet columns the workflow cannot run without.
    pub fn required_sheet_columns(&self) -> &'static [&'static str] {
        match *self {
            Workflow::Dna => &["sample_id", "fastq", "fast5_dir", "seq_summary"],
            Workflow::Rna => &["sample_id", "fastq"],
        }
    }
}

/// Main entry point of the workflow subcommands.
pub fn run(logger: &mut Logger, workflow: Workflow, options: &WorkflowOptions) -> Result<()> {
    info!(logger, "Running: snakepore {}", workflow.name());
    info!(logger, "Options: {:?}", options);

    // Template generation replaces the launch entirely.
    if !options.generate_template.is_empty() {
        info!(logger, "Generating template files in the working directory");
        let kinds = template_kinds(&options.generate_template)?;
        templates::generate(
            logger,
            workflow.name(),
            &kinds,
            &options.workdir,
            options.overwrite_template,
        ).chain_err(|| "Could not generate template files")?;
        return Ok(());
    }

    info!(logger, "Checking configuration files...");
    let config_path = match options.config {
        Some(ref path) => path,
        None => bail!("Option --config is required to run the workflow"),
    };
    let config = Config::from_path(config_path)?;

    let sheet_path = match options.sample_sheet {
        Some(ref path) => path,
        None => bail!("Option --sample-sheet is required to run the workflow"),
    };
    let samples = SampleSheet::from_path(sheet_path, workflow.required_sheet_columns())?;
    info!(logger, "Valid sample sheet ({} samples)", samples.len());

    let reference = match options.reference {
        Some(ref path) => path,
        None => bail!("Option --reference is required to run the workflow"),
    };
    let reference = reference::check_reference(reference)?;
    info!(logger, "Valid reference file");

    let rules = plan::rules(workflow, &config, &reference);
    let sample_ids = samples.ids();
    let snakefile = snakefile::deploy(logger, workflow.name(), &rules, &sample_ids, &options.workdir)?;
    info!(
        logger,
        "Deployed {} rules for {} samples ({} targets)",
        rules.len(),
        sample_ids.len(),
        plan::targets(&rules, &sample_ids).len()
    );

    if options.engine.cluster.is_some() {
        info!(logger, "Initialising workflow in cluster mode");
    } else {
        info!(logger, "Initialising workflow in local mode");
    }

    let (_, dropped) = engine::filter_extra_args(&options.engine.extra);
    for arg in &dropped {
        warn!(logger, "Dropping unsupported engine argument: {}", arg);
    }

    let config_values = vec![
        ("reference".to_string(), reference),
        ("sample_sheet".to_string(), samples.path.clone()),
    ];
    let args = options
        .engine
        .to_args(&snakefile, &config.path, &options.workdir, &config_values);
    engine::run_engine(logger, &args)?;

    info!(logger, "=> OK");
    Ok(())
}

/// Resolve the `--generate-template` values into template kinds.
fn template_kinds(values: &[String]) -> Result<Vec<TemplateKind>> {
    if values.iter().any(|value| value == "all") {
        return Ok(TemplateKind::all());
    }

    let mut kinds = Vec::new();
    for value in values {
        match TemplateKind::from_str(value) {
            Some(kind) => kinds.push(kind),
            None => bail!("Unknown template kind: {}", value),
        }
    }
    Ok(kinds)
}
