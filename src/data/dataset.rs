//! In-memory tabular dataset backed by CSV

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A table of string cells with named columns
///
/// Cells stay untyped until an engine encodes them according to the
/// feature types declared in the model configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dataset {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
}

impl Dataset {
    /// Build a dataset, checking that every record matches the header width
    pub fn new(headers: Vec<String>, records: Vec<Vec<String>>) -> Result<Self> {
        if let Some((i, record)) = records
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != headers.len())
        {
            return Err(Error::Dataset(format!(
                "Record {i} has {} fields, expected {}",
                record.len(),
                headers.len()
            )));
        }
        Ok(Self { headers, records })
    }

    /// Parse CSV with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let mut records = Vec::new();
        for record in csv_reader.records() {
            records.push(record?.iter().map(str::to_string).collect());
        }

        Self::new(headers, records)
    }

    /// Parse CSV text
    pub fn from_csv_str(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }

    /// Read a CSV file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Write the dataset as CSV with a header row
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(true)
            .from_path(path.as_ref())?;
        writer.write_record(&self.headers)?;
        for record in &self.records {
            writer.write_record(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[Vec<String>] {
        &self.records
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// All cells of a column, in row order
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.records.iter().map(|r| r[idx].as_str()).collect())
    }

    /// Rename columns; names that are not present are ignored
    pub fn rename_columns(&mut self, renames: &[(&str, &str)]) {
        for header in &mut self.headers {
            if let Some((_, to)) = renames.iter().find(|(from, _)| header == from) {
                *header = (*to).to_string();
            }
        }
    }

    /// New dataset containing the given rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> Dataset {
        Dataset {
            headers: self.headers.clone(),
            records: indices
                .iter()
                .filter_map(|&i| self.records.get(i).cloned())
                .collect(),
        }
    }
}
