//! Batch runner - normalize every export in a directory.
//!
//! ## Process
//!
//! 1. Discover `*.csv` inputs (skipping earlier `*_canonical.csv` outputs)
//! 2. Normalize each file on its own worker; a bad file only fails itself
//! 3. Write `{stem}_canonical.csv` per file
//! 4. Combine all successful outputs into one file

use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{NormalizeError, Result};
use crate::pipeline::normalize_table;
use crate::provider::Provider;
use crate::table::{read_csv, write_csv, Table};
use crate::taxonomy::ActivityTaxonomy;

pub const OUTPUT_SUFFIX: &str = "_canonical.csv";
pub const COMBINED_FILE: &str = "all_providers_canonical.csv";

/// Batch options.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Write the combined file after per-file outputs
    pub combine: bool,
}

impl BatchOptions {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            combine: true,
        }
    }
}

/// Outcome for one input file.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Normalized {
        input: String,
        output: String,
        provider: Provider,
        rows: usize,
    },
    Failed {
        input: String,
        provider: Provider,
        error: String,
    },
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Normalized { .. })
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, Serialize, Default)]
pub struct BatchSummary {
    pub taxonomy_fingerprint: String,
    /// One entry per input file, sorted by file name
    pub files: Vec<FileOutcome>,
    pub combined_output: Option<String>,
    pub combined_rows: usize,
}

impl BatchSummary {
    pub fn success_count(&self) -> usize {
        self.files.iter().filter(|f| f.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.files.len() - self.success_count()
    }
}

/// List input CSV files, sorted by name.
pub fn discover_inputs(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_input_csv(path))
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn is_input_csv(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".csv") && !name.ends_with(OUTPUT_SUFFIX)
}

/// Output file name for an input path: `{stem}_canonical.csv`.
pub fn output_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}{}", stem, OUTPUT_SUFFIX)
}

/// Normalize every input file in `options.input_dir`.
///
/// Per-file errors are recorded in the summary; only directory access
/// failures abort the batch.
pub fn run_batch(options: &BatchOptions, taxonomy: &ActivityTaxonomy) -> Result<BatchSummary> {
    let inputs = discover_inputs(&options.input_dir)?;
    let mut summary = BatchSummary {
        taxonomy_fingerprint: taxonomy.fingerprint.clone(),
        ..Default::default()
    };

    if inputs.is_empty() {
        tracing::warn!(dir = %options.input_dir.display(), "no CSV files found");
        return Ok(summary);
    }

    std::fs::create_dir_all(&options.output_dir)?;

    // par_iter().map().collect() keeps input order
    let results: Vec<(FileOutcome, Option<Table>)> = inputs
        .par_iter()
        .map(|input| process_file(input, &options.output_dir, taxonomy))
        .collect();

    let mut outputs = Vec::new();
    for (outcome, table) in results {
        if let Some(table) = table {
            outputs.push(table);
        }
        summary.files.push(outcome);
    }

    if options.combine && !outputs.is_empty() {
        let combined = combine_tables(COMBINED_FILE, &outputs);
        let path = options.output_dir.join(COMBINED_FILE);
        write_csv(&combined, &path)?;
        tracing::info!(path = %path.display(), rows = combined.len(), "wrote combined output");
        summary.combined_output = Some(COMBINED_FILE.to_string());
        summary.combined_rows = combined.len();
    }

    tracing::info!(
        succeeded = summary.success_count(),
        failed = summary.failure_count(),
        "batch complete"
    );

    Ok(summary)
}

fn process_file(
    input: &Path,
    output_dir: &Path,
    taxonomy: &ActivityTaxonomy,
) -> (FileOutcome, Option<Table>) {
    let input_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let provider = Provider::from_file_name(&input_name);

    match normalize_file(input, output_dir, provider, taxonomy) {
        Ok((output, table)) => (
            FileOutcome::Normalized {
                input: input_name,
                output,
                provider,
                rows: table.len(),
            },
            Some(table),
        ),
        Err(err) => {
            tracing::warn!(file = %input_name, error = %err, "skipping file");
            (
                FileOutcome::Failed {
                    input: input_name,
                    provider,
                    error: err.to_string(),
                },
                None,
            )
        }
    }
}

fn normalize_file(
    input: &Path,
    output_dir: &Path,
    provider: Provider,
    taxonomy: &ActivityTaxonomy,
) -> std::result::Result<(String, Table), NormalizeError> {
    let table = read_csv(input)?;
    let normalized = normalize_table(&table, provider.tag(), taxonomy)?;

    let output = output_name(input);
    write_csv(&normalized.table, &output_dir.join(&output))?;
    Ok((output, normalized.table))
}

/// Stack tables with different schemas.
///
/// Headers are the union in first-appearance order; cells a table does not
/// have are left empty. A header repeated within one table is matched by
/// occurrence, so the second `Note` of a table lands in the second `Note`
/// column. Rows keep table order, then row order.
pub fn combine_tables(name: &str, tables: &[Table]) -> Table {
    let mut headers: Vec<String> = Vec::new();
    for table in tables {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for header in &table.headers {
            let nth = occurrence(&mut seen, header);
            if nth_position(&headers, header, nth).is_none() {
                headers.push(header.clone());
            }
        }
    }

    let mut combined = Table::new(name, headers);
    for table in tables {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let positions: Vec<usize> = table
            .headers
            .iter()
            .filter_map(|h| nth_position(&combined.headers, h, occurrence(&mut seen, h)))
            .collect();
        for values in &table.rows {
            let mut row = vec![String::new(); combined.headers.len()];
            for (pos, value) in positions.iter().zip(values) {
                row[*pos] = value.clone();
            }
            combined.rows.push(row);
        }
    }
    combined
}

/// Zero-based count of earlier occurrences of `header`, then record this one.
fn occurrence<'a>(seen: &mut HashMap<&'a str, usize>, header: &'a str) -> usize {
    let count = seen.entry(header).or_insert(0);
    let nth = *count;
    *count += 1;
    nth
}

fn nth_position(headers: &[String], header: &str, nth: usize) -> Option<usize> {
    headers
        .iter()
        .enumerate()
        .filter(|(_, h)| *h == header)
        .nth(nth)
        .map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_output_name() {
        assert_eq!(output_name(Path::new("in/azure_log.csv")), "azure_log_canonical.csv");
    }

    #[test]
    fn test_discover_skips_outputs_and_sorts() {
        let dir = tempdir().unwrap();
        for name in ["b.csv", "a.csv", "a_canonical.csv", "notes.txt"] {
            std::fs::write(dir.path().join(name), "x\n").unwrap();
        }
        let names: Vec<String> = discover_inputs(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn test_combine_tables_unions_headers() {
        let a = Table::new("a", headers(&["op", "Provider"])).with_row(&["x", "Azure"]);
        let b = Table::new("b", headers(&["event", "Provider"])).with_row(&["y", "Aws"]);
        let combined = combine_tables("all", &[a, b]);

        assert_eq!(combined.headers, headers(&["op", "Provider", "event"]));
        assert_eq!(combined.rows[0], headers(&["x", "Azure", ""]));
        assert_eq!(combined.rows[1], headers(&["", "Aws", "y"]));
    }

    #[test]
    fn test_combine_keeps_duplicate_headers_apart() {
        let a = Table::new("a", headers(&["Operation", "Note", "Note"])).with_row(&["x", "first", "second"]);
        let b = Table::new("b", headers(&["Note", "Operation"])).with_row(&["only", "y"]);
        let combined = combine_tables("all", &[a, b]);

        assert_eq!(combined.headers, headers(&["Operation", "Note", "Note"]));
        assert_eq!(combined.rows[0], headers(&["x", "first", "second"]));
        assert_eq!(combined.rows[1], headers(&["y", "only", ""]));
    }

    #[test]
    fn test_summary_counts() {
        let summary = BatchSummary {
            files: vec![
                FileOutcome::Normalized {
                    input: "a.csv".to_string(),
                    output: "a_canonical.csv".to_string(),
                    provider: Provider::Generic,
                    rows: 1,
                },
                FileOutcome::Failed {
                    input: "b.csv".to_string(),
                    provider: Provider::Aws,
                    error: "boom".to_string(),
                },
            ],
            ..Default::default()
        };
        assert_eq!(summary.success_count(), 1);
        assert_eq!(summary.failure_count(), 1);
    }
}
