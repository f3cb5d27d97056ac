/// Merging of the per-sample count tables into one table per metric.
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use clap::ArgMatches;
use csv::{ReaderBuilder, WriterBuilder};
use slog::Logger;

use lib_shared::shell;

use super::errors::*;

/// Options for the "salmon-merge" wrapper.
#[derive(Clone, Debug)]
pub struct SalmonMergeOptions {
    /// Paths of the per-sample count tables.
    pub input: Vec<String>,
    /// Path of the merged read count table, if requested.
    pub counts: Option<String>,
    /// Path of the merged TPM table, if requested.
    pub tpm: Option<String>,
    /// Path of the log file.
    pub log: String,
}

impl SalmonMergeOptions {
    /// Build options from ArgMatches.
    pub fn new(matches: &ArgMatches) -> Self {
        SalmonMergeOptions {
            input: matches
                .values_of("input")
                .expect("Problem getting input args from command line")
                .map(|s| s.to_string())
                .collect::<Vec<String>>(),
            counts: matches.value_of("counts").map(|s| s.to_string()),
            tpm: matches.value_of("tpm").map(|s| s.to_string()),
            log: matches.value_of("log").unwrap().to_string(),
        }
    }
}

/// Sample name of a count table: the input file stem.
fn sample_name(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Read the `column` values of one per-sample table, keyed by feature name.
///
/// Rows without any read support and rows with missing values are
/// dropped before joining.
fn read_count_table(path: &str, column: &str) -> Result<BTreeMap<String, String>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_path(path)
        .chain_err(|| format!("Could not open count table {}", path))?;

    let headers = reader
        .headers()
        .chain_err(|| format!("Could not read the header of count table {}", path))?
        .clone();
    let name_idx = index_of(&headers, "Name", path)?;
    let reads_idx = index_of(&headers, "NumReads", path)?;
    let value_idx = index_of(&headers, column, path)?;

    let mut table = BTreeMap::new();
    for record in reader.records() {
        let record = record.chain_err(|| format!("Could not parse count table {}", path))?;

        let name = record.get(name_idx).unwrap_or("");
        let reads = record.get(reads_idx).unwrap_or("");
        let value = record.get(value_idx).unwrap_or("");

        // Missing values drop the whole row.
        let reads = match reads.parse::<f64>() {
            Ok(reads) if reads.is_finite() => reads,
            _ => continue,
        };
        if name.is_empty() || value.parse::<f64>().map(|v| !v.is_finite()).unwrap_or(true) {
            continue;
        }
        // Only features with read support contribute to the join.
        if reads <= 0.0 {
            continue;
        }

        table.insert(name.to_string(), value.to_string());
    }

    Ok(table)
}

/// Position of `column` in the table header.
fn index_of(headers: &::csv::StringRecord, column: &str, path: &str) -> Result<usize> {
    match headers.iter().position(|header| header == column) {
        Some(idx) => Ok(idx),
        None => bail!(
            "The count table {} does not contain the required column: {}",
            path,
            column
        ),
    }
}

/// Outer-join the `column` values of all inputs into one table.
///
/// Rows are the union of all feature names, one column per sample in
/// input order; cells without a value are filled with zero.
pub fn merge_count_tables(inputs: &[String], column: &str, output: &str) -> Result<()> {
    let mut per_sample = Vec::new();
    for input in inputs {
        let table = read_count_table(input, column)?;
        per_sample.push((sample_name(input), table));
    }

    let mut features = BTreeSet::new();
    for &(_, ref table) in &per_sample {
        for name in table.keys() {
            features.insert(name.clone());
        }
    }

    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(output)
        .chain_err(|| format!("Could not open merged table {} for writing", output))?;

    let mut header = vec!["Name".to_string()];
    header.extend(per_sample.iter().map(|&(ref sample, _)| sample.clone()));
    writer
        .write_record(&header)
        .chain_err(|| format!("Could not write merged table {}", output))?;

    for name in &features {
        let mut row = vec![name.clone()];
        for &(_, ref table) in &per_sample {
            row.push(
                table
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| "0".to_string()),
            );
        }
        writer
            .write_record(&row)
            .chain_err(|| format!("Could not write merged table {}", output))?;
    }

    writer
        .flush()
        .chain_err(|| format!("Could not write merged table {}", output))?;
    Ok(())
}

/// Main entry point for the "salmon-merge" wrapper.
pub fn run(logger: &mut Logger, options: &SalmonMergeOptions) -> Result<()> {
    info!(logger, "Running: snakepore wrapper salmon-merge");

    shell::log_banner(&options.log, "SALMON COUNT MERGE LOG")?;
    if let Some(ref counts) = options.counts {
        merge_count_tables(&options.input, "NumReads", counts)?;
        debug!(logger, "Wrote merged read counts to {}", counts);
    }
    if let Some(ref tpm) = options.tpm {
        merge_count_tables(&options.input, "TPM", tpm)?;
        debug!(logger, "Wrote merged TPM values to {}", tpm);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::fs::File;
    use std::io::Write;

    use tempdir::TempDir;

    use super::*;

    const HEADER: &'static str = "Name\tLength\tEffectiveLength\tTPM\tNumReads\n";

    fn write_table(dir: &TempDir, name: &str, rows: &str) -> String {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        file.write_all(rows.as_bytes()).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn rows_are_the_union_of_all_samples_with_zero_fills() {
        let tmp = TempDir::new("count_merge").unwrap();
        let s1 = write_table(
            &tmp,
            "S1.tsv",
            "tx1\t1000\t900\t10.5\t42\n\
             tx2\t500\t400\t2.0\t7\n",
        );
        let s2 = write_table(
            &tmp,
            "S2.tsv",
            "tx2\t500\t400\t3.5\t12\n\
             tx3\t800\t700\t1.5\t3\n",
        );
        let output = tmp.path().join("counts.tsv");
        let output = output.to_str().unwrap().to_string();

        merge_count_tables(&[s1, s2], "NumReads", &output).unwrap();

        let text = fs::read_to_string(&output).unwrap();
        assert_eq!(
            text,
            "Name\tS1\tS2\n\
             tx1\t42\t0\n\
             tx2\t7\t12\n\
             tx3\t0\t3\n"
        );
    }

    #[test]
    fn features_without_read_support_are_dropped() {
        let tmp = TempDir::new("count_merge").unwrap();
        let s1 = write_table(
            &tmp,
            "S1.tsv",
            "tx1\t1000\t900\t10.5\t42\n\
             tx2\t500\t400\t0.0\t0\n",
        );
        let output = tmp.path().join("counts.tsv");
        let output = output.to_str().unwrap().to_string();

        merge_count_tables(&[s1], "NumReads", &output).unwrap();

        let text = fs::read_to_string(&output).unwrap();
        assert!(!text.contains("tx2"));
    }

    #[test]
    fn rows_with_missing_values_are_dropped() {
        let tmp = TempDir::new("count_merge").unwrap();
        let s1 = write_table(
            &tmp,
            "S1.tsv",
            "tx1\t1000\t900\t\t42\n\
             tx2\t500\t400\t2.0\t7\n",
        );
        let output = tmp.path().join("tpm.tsv");
        let output = output.to_str().unwrap().to_string();

        merge_count_tables(&[s1], "TPM", &output).unwrap();

        let text = fs::read_to_string(&output).unwrap();
        assert!(!text.contains("tx1"));
        assert!(text.contains("tx2\t2.0\n"));
    }

    #[test]
    fn tpm_values_come_from_the_tpm_column() {
        let tmp = TempDir::new("count_merge").unwrap();
        let s1 = write_table(&tmp, "S1.tsv", "tx1\t1000\t900\t10.5\t42\n");
        let output = tmp.path().join("tpm.tsv");
        let output = output.to_str().unwrap().to_string();

        merge_count_tables(&[s1], "TPM", &output).unwrap();

        let text = fs::read_to_string(&output).unwrap();
        assert_eq!(text, "Name\tS1\ntx1\t10.5\n");
    }

    #[test]
    fn sample_names_are_the_file_stems() {
        assert_eq!(sample_name("results/salmon_count/S1.tsv"), "S1");
        assert_eq!(sample_name("S2.tsv"), "S2");
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let tmp = TempDir::new("count_merge").unwrap();
        let path = tmp.path().join("bad.tsv");
        File::create(&path)
            .unwrap()
            .write_all(b"Gene\tCount\ntx1\t5\n")
            .unwrap();
        let path = path.to_str().unwrap().to_string();
        let output = tmp.path().join("counts.tsv");

        let result = merge_count_tables(
            &[path],
            "NumReads",
            output.to_str().unwrap(),
        );
        assert!(result.is_err());
    }
}
