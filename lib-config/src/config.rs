/// Loading and access to the per-rule YAML configuration document.
use std::fs::File;

use serde_yaml::Value;

use lib_shared::fs_utils;

use super::errors::*;

/// The parsed workflow configuration.
///
/// The document is one mapping per rule name; each section is a free-form
/// mapping with the conventional keys `outdir`, `threads`, `opt` and `mem`.
/// Missing sections and missing keys fall back to defaults, so a minimal
/// configuration file is valid.
#[derive(Clone, Debug)]
pub struct Config {
    /// Absolute path to the configuration file.
    pub path: String,
    /// The parsed document.
    doc: Value,
}

impl Config {
    /// Load and validate the configuration file at `path`.
    pub fn from_path(path: &str) -> Result<Self> {
        let abs = fs_utils::readable_abs_path(path)
            .chain_err(|| format!("The config file {} is not readable", path))?;
        let file =
            File::open(&abs).chain_err(|| format!("Could not open config file {}", abs))?;
        let doc: Value = ::serde_yaml::from_reader(file)
            .chain_err(|| format!("The config file {} is not a valid YAML file", abs))?;

        Ok(Config { path: abs, doc: doc })
    }

    /// String value of `key` in the section of `rule`, with a default.
    pub fn str_value(&self, rule: &str, key: &str, default: &str) -> String {
        self.doc
            .get(rule)
            .and_then(|section| section.get(key))
            .and_then(|value| value.as_str())
            .unwrap_or(default)
            .to_string()
    }

    /// Integer value of `key` in the section of `rule`, with a default.
    fn int_value(&self, rule: &str, key: &str, default: u32) -> u32 {
        self.doc
            .get(rule)
            .and_then(|section| section.get(key))
            .and_then(|value| value.as_u64())
            .unwrap_or(default as u64) as u32
    }

    /// Output directory of `rule` below `results/` and `logs/`.
    pub fn outdir(&self, rule: &str) -> String {
        self.str_value(rule, "outdir", rule)
    }

    /// Thread count handed to the engine for `rule`.
    pub fn threads(&self, rule: &str) -> u32 {
        self.int_value(rule, "threads", 1)
    }

    /// Free-form option string forwarded to the wrapped tool of `rule`.
    pub fn opt(&self, rule: &str) -> String {
        self.str_value(rule, "opt", "")
    }

    /// Memory budget of `rule` in MB.
    pub fn mem(&self, rule: &str) -> u32 {
        self.int_value(rule, "mem", 1000)
    }
}
