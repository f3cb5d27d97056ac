/// Parsing and validation of the tab-separated sample sheet.
use std::collections::BTreeMap;
use std::collections::HashSet;

use csv::ReaderBuilder;

use lib_shared::fs_utils;

use super::errors::*;

/// A parsed sample sheet.
///
/// One record per sample; lines starting with `#` and blank lines are
/// skipped. The `sample_id` column is always required, the remaining
/// required columns depend on the workflow.
#[derive(Clone, Debug)]
pub struct SampleSheet {
    /// Absolute path to the sheet.
    pub path: String,
    /// Column names in file order.
    pub columns: Vec<String>,
    /// One record per sample, keyed by column name.
    records: Vec<BTreeMap<String, String>>,
}

impl SampleSheet {
    /// Parse the sheet at `path` and check that `required` columns exist.
    pub fn from_path(path: &str, required: &[&str]) -> Result<Self> {
        let abs = fs_utils::readable_abs_path(path)
            .chain_err(|| format!("The sample sheet {} is not readable", path))?;

        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .comment(Some(b'#'))
            .has_headers(true)
            .trim(::csv::Trim::All)
            .from_path(&abs)
            .chain_err(|| format!("Could not open sample sheet {}", abs))?;

        let columns = reader
            .headers()
            .chain_err(|| format!("Could not read the header of sample sheet {}", abs))?
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<String>>();

        for field in required {
            if !columns.iter().any(|column| column == field) {
                bail!(
                    "The sample sheet {} does not contain the required field: {}",
                    abs,
                    field
                );
            }
        }

        let mut records = Vec::new();
        for record in reader.records() {
            let record =
                record.chain_err(|| format!("Could not parse sample sheet {}", abs))?;
            let mut fields = BTreeMap::new();
            for (column, value) in columns.iter().zip(record.iter()) {
                fields.insert(column.clone(), value.to_string());
            }
            records.push(fields);
        }

        if records.is_empty() {
            bail!("The sample sheet {} does not list any sample", abs);
        }

        let sheet = SampleSheet {
            path: abs,
            columns: columns,
            records: records,
        };
        sheet.check_unique_ids()?;

        Ok(sheet)
    }

    /// Fail on duplicated sample identifiers.
    fn check_unique_ids(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for id in self.ids() {
            if !seen.insert(id.clone()) {
                bail!(
                    "The sample sheet {} lists sample {} more than once",
                    self.path,
                    id
                );
            }
        }
        Ok(())
    }

    /// Sample identifiers in sheet order.
    pub fn ids(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|record| record.get("sample_id").cloned())
            .collect()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Value of `column` for sample `id`.
    pub fn field(&self, id: &str, column: &str) -> Result<&str> {
        let record = self.records
            .iter()
            .find(|record| record.get("sample_id").map(|s| s.as_str()) == Some(id));
        match record {
            Some(record) => match record.get(column) {
                Some(value) => Ok(value),
                None => bail!("Sample {} has no value for column {}", id, column),
            },
            None => bail!("The sample sheet does not list a sample named {}", id),
        }
    }
}
