// Header-indexed reader for the tab-separated metadata inputs.
//
// Both the removal list and the assignment file are TSV with a header row
// and standard double-quote quoting (a quoted field may hold tabs or
// commas). Callers look columns up by name and then read fields by index.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};

use crate::error::CorpusError;

/// A TSV file positioned just after its header row.
pub struct TsvTable<R> {
    path: PathBuf,
    headers: StringRecord,
    records: StringRecordsIntoIter<R>,
}

/// One data row. `line` is 1-based and counts the header.
#[derive(Debug, Clone, PartialEq)]
pub struct TsvRow {
    pub line: usize,
    pub fields: Vec<String>,
}

impl TsvRow {
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }
}

impl TsvTable<File> {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        Self::from_reader(file, path)
    }
}

impl<R: Read> TsvTable<R> {
    /// Read the header row. `path` is only used in error messages.
    ///
    /// Rows may be shorter or longer than the header; missing cells read
    /// as absent.
    pub fn from_reader(reader: R, path: &Path) -> anyhow::Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read header of {}", path.display()))?
            .clone();
        if headers.is_empty() {
            anyhow::bail!("{} is empty", path.display());
        }

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            records: reader.into_records(),
        })
    }

    /// Index of a required column.
    pub fn column(&self, name: &str) -> Result<usize, CorpusError> {
        self.headers
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| CorpusError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }
}

impl<R: Read> Iterator for TsvTable<R> {
    type Item = csv::Result<TsvRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e)),
            };
            if is_blank(&record) {
                continue;
            }
            return Some(Ok(TsvRow {
                line: record.position().map_or(0, |p| p.line() as usize),
                fields: record.iter().map(str::to_string).collect(),
            }));
        }
    }
}

/// Whitespace-only lines parse as a single blank field.
fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|f| f.trim().is_empty())
}
