/// Types for configuring the workflow subcommands.
use clap::ArgMatches;

use engine::EngineOptions;

/// Options shared by the workflow launch subcommands.
#[derive(Clone, Debug)]
pub struct WorkflowOptions {
    // I/O related
    /// Path to the reference FASTA file used for mapping.
    pub reference: Option<String>,
    /// Path to the tab-separated sample sheet.
    pub sample_sheet: Option<String>,
    /// Path to the configuration YAML file.
    pub config: Option<String>,
    /// Directory the workflow is deployed into.
    pub workdir: String,

    // Template generation
    /// Template kinds to generate instead of launching the workflow.
    pub generate_template: Vec<String>,
    /// Whether existing template files are replaced.
    pub overwrite_template: bool,

    /// Engine pass-through options.
    pub engine: EngineOptions,
}

impl WorkflowOptions {
    /// Build options from ArgMatches.
    pub fn new(matches: &ArgMatches) -> Self {
        WorkflowOptions {
            reference: matches.value_of("reference").map(|s| s.to_string()),
            sample_sheet: matches.value_of("sample_sheet").map(|s| s.to_string()),
            config: matches.value_of("config").map(|s| s.to_string()),
            workdir: matches.value_of("workdir").unwrap().to_string(),

            generate_template: matches
                .values_of("generate_template")
                .map(|values| values.map(|s| s.to_string()).collect())
                .unwrap_or_else(Vec::new),
            overwrite_template: matches.is_present("overwrite_template"),

            engine: EngineOptions::new(matches),
        }
    }
}
