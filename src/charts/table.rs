//! Column-keyed table of per-subject CSA measurements.
//!
//! The CSV holds one row per subject and one column per
//! `{method}_{contrast}` measurement. Two derivations feed the charts:
//! pairwise percentage difference against a reference contrast, and
//! per-subject standard deviation across contrasts.

use crate::models::{mean, population_std};
use anyhow::{anyhow, bail, Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Suffix of the derived pairwise-difference performance columns.
pub const PWD_SUFFIX: &str = "_perf_pwd";

/// Suffix of the derived per-subject-SD performance columns.
pub const SD_SUFFIX: &str = "_perf_sd";

/// Numeric columns of the per-subject measurement CSV.
#[derive(Debug, Clone, Default)]
pub struct CsaTable {
    n_rows: usize,
    /// Column names in insertion order.
    columns: Vec<String>,
    values: HashMap<String, Vec<f64>>,
}

impl CsaTable {
    /// Read the table from a CSV file with a header row.
    ///
    /// Columns with non-numeric cells (subject identifiers, session labels)
    /// are dropped; only fully numeric columns take part in the charts.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

        let headers: Vec<String> = reader
            .headers()
            .with_context(|| format!("Failed to read CSV header: {}", path.display()))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut raw: Vec<Vec<Option<f64>>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record =
                record.with_context(|| format!("Failed to read CSV row: {}", path.display()))?;
            if record.len() != headers.len() {
                bail!(
                    "CSV row has {} fields, expected {}: {}",
                    record.len(),
                    headers.len(),
                    path.display()
                );
            }
            for (column, field) in raw.iter_mut().zip(record.iter()) {
                column.push(field.trim().parse::<f64>().ok());
            }
        }

        let n_rows = raw.first().map(Vec::len).unwrap_or(0);
        let mut table = Self {
            n_rows,
            columns: Vec::new(),
            values: HashMap::new(),
        };

        for (name, cells) in headers.into_iter().zip(raw) {
            match cells.into_iter().collect::<Option<Vec<f64>>>() {
                Some(column) => table.insert_column(name, column),
                None => debug!("Dropping non-numeric CSV column `{}`", name),
            }
        }

        Ok(table)
    }

    /// Number of rows (subjects).
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values of one column.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.values.get(name).map(Vec::as_slice)
    }

    /// Add or replace a column; panics if the length disagrees with the table.
    pub fn insert_column(&mut self, name: String, column: Vec<f64>) {
        if self.columns.is_empty() && self.values.is_empty() {
            self.n_rows = column.len();
        }
        assert_eq!(column.len(), self.n_rows, "column length mismatch");
        if self.values.insert(name.clone(), column).is_none() {
            self.columns.push(name);
        }
    }

    fn require_column(&self, name: &str) -> Result<&[f64]> {
        self.column(name)
            .ok_or_else(|| anyhow!("Missing CSV column `{}`", name))
    }

    /// Pairwise percentage difference against the reference contrast.
    ///
    /// Each `{method}_{contrast}` column is replaced by
    /// `100 * (ref - value) / ref` row-wise, and a `{method}_perf_pwd`
    /// column is added with the per-subject mean across the given contrasts.
    /// `contrasts` must exclude the reference contrast. Returns the derived
    /// table and the performance column names.
    pub fn pairwise_diff(
        &self,
        methods: &[String],
        contrasts: &[String],
        ref_contrast: &str,
    ) -> Result<(CsaTable, Vec<String>)> {
        let mut out = self.clone();
        let mut perf_columns = Vec::with_capacity(methods.len());

        for method in methods {
            let ref_values = self
                .require_column(&format!("{}_{}", method, ref_contrast))?
                .to_vec();

            let mut per_row: Vec<Vec<f64>> = vec![Vec::with_capacity(contrasts.len()); self.n_rows];
            for contrast in contrasts {
                let name = format!("{}_{}", method, contrast);
                let column = self.require_column(&name)?;

                let diffs: Vec<f64> = column
                    .iter()
                    .zip(&ref_values)
                    .map(|(value, reference)| 100.0 * (reference - value) / reference)
                    .collect();
                for (row, diff) in per_row.iter_mut().zip(&diffs) {
                    row.push(*diff);
                }
                out.insert_column(name, diffs);
            }

            let perf_name = format!("{}{}", method, PWD_SUFFIX);
            out.insert_column(perf_name.clone(), per_row.iter().map(|r| mean(r)).collect());
            perf_columns.push(perf_name);
        }

        Ok((out, perf_columns))
    }

    /// Per-subject standard deviation across contrasts.
    ///
    /// Adds a `{method}_perf_sd` column holding, for each subject, the
    /// population SD of that method's values across all given contrasts.
    /// Returns the derived table and the performance column names.
    pub fn per_subject_sd(
        &self,
        methods: &[String],
        contrasts: &[String],
    ) -> Result<(CsaTable, Vec<String>)> {
        let mut out = self.clone();
        let mut perf_columns = Vec::with_capacity(methods.len());

        for method in methods {
            let mut per_row: Vec<Vec<f64>> = vec![Vec::with_capacity(contrasts.len()); self.n_rows];
            for contrast in contrasts {
                let column = self.require_column(&format!("{}_{}", method, contrast))?;
                for (row, value) in per_row.iter_mut().zip(column) {
                    row.push(*value);
                }
            }

            let perf_name = format!("{}{}", method, SD_SUFFIX);
            out.insert_column(
                perf_name.clone(),
                per_row.iter().map(|r| population_std(r)).collect(),
            );
            perf_columns.push(perf_name);
        }

        Ok((out, perf_columns))
    }

    /// Extract `(column, values)` series for plotting, in the given order.
    pub fn series(&self, columns: &[String]) -> Result<Vec<(String, Vec<f64>)>> {
        columns
            .iter()
            .map(|name| Ok((name.clone(), self.require_column(name)?.to_vec())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn sample_table() -> CsaTable {
        let mut table = CsaTable::default();
        table.insert_column("deepseg_t2w".into(), vec![80.0, 100.0]);
        table.insert_column("deepseg_t1w".into(), vec![60.0, 90.0]);
        table.insert_column("deepseg_t2star".into(), vec![40.0, 80.0]);
        table
    }

    #[test]
    fn test_pairwise_diff_columns() {
        let table = sample_table();
        let (out, perf) = table
            .pairwise_diff(
                &strings(&["deepseg"]),
                &strings(&["t1w", "t2star"]),
                "t2w",
            )
            .unwrap();

        // Row 1: 100*(80-60)/80 = 25, 100*(80-40)/80 = 50, mean 37.5.
        // Row 2: 100*(100-90)/100 = 10, 100*(100-80)/100 = 20, mean 15.
        assert_eq!(out.column("deepseg_t1w"), Some(&[25.0, 10.0][..]));
        assert_eq!(out.column("deepseg_t2star"), Some(&[50.0, 20.0][..]));
        assert_eq!(perf, vec!["deepseg_perf_pwd"]);
        assert_eq!(out.column("deepseg_perf_pwd"), Some(&[37.5, 15.0][..]));

        // Reference column is untouched.
        assert_eq!(out.column("deepseg_t2w"), Some(&[80.0, 100.0][..]));
    }

    #[test]
    fn test_per_subject_sd_columns() {
        let table = sample_table();
        let (out, perf) = table
            .per_subject_sd(&strings(&["deepseg"]), &strings(&["t2w", "t1w", "t2star"]))
            .unwrap();

        assert_eq!(perf, vec!["deepseg_perf_sd"]);
        let sd = out.column("deepseg_perf_sd").unwrap();
        // Row 1: population SD of [80, 60, 40] = sqrt(800/3).
        assert!((sd[0] - (800.0_f64 / 3.0).sqrt()).abs() < 1e-9);
        // Row 2: population SD of [100, 90, 80] = sqrt(200/3).
        assert!((sd[1] - (200.0_f64 / 3.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let table = sample_table();
        assert!(table
            .pairwise_diff(&strings(&["unet"]), &strings(&["t1w"]), "t2w")
            .is_err());
    }

    #[test]
    fn test_from_csv_drops_non_numeric_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("csa.csv");
        std::fs::write(
            &path,
            "subject,deepseg_t2w,deepseg_t1w\nsub-001,80.0,60.0\nsub-002,100.0,90.0\n",
        )
        .unwrap();

        let table = CsaTable::from_csv_path(&path).unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.column("subject"), None);
        assert_eq!(table.column("deepseg_t2w"), Some(&[80.0, 100.0][..]));
        assert_eq!(table.columns(), &["deepseg_t2w", "deepseg_t1w"]);
    }

    #[test]
    fn test_series_preserves_requested_order() {
        let table = sample_table();
        let series = table
            .series(&strings(&["deepseg_t1w", "deepseg_t2w"]))
            .unwrap();
        assert_eq!(series[0].0, "deepseg_t1w");
        assert_eq!(series[1].0, "deepseg_t2w");
        assert_eq!(series[1].1, vec![80.0, 100.0]);
    }
}
