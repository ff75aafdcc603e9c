//! Append-only CSV table holding every accepted record across runs.
//!
//! The file always starts with the header `id,subject,body,tone,intent`. Rows
//! are only ever appended, so an interrupted run resumes by re-reading the file.
use serde::Deserialize;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::dedupe::DedupStore;
use crate::model::EmailRecord;

pub const HEADER: [&str; 5] = ["id", "subject", "body", "tone", "intent"];

#[derive(Debug, Error)]
pub enum TableError {
    #[error("table file I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("table file CSV error at {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Starting state derived from an existing table file.
#[derive(Debug, Clone)]
pub struct Resume {
    pub next_id: u64,
    pub existing_rows: usize,
    pub dedup: DedupStore,
}

#[derive(Debug, Clone)]
pub struct TableFile {
    path: PathBuf,
}

// Rows written by hand or by older runs may carry blanks or non-numeric ids.
#[derive(Debug, Deserialize)]
struct StoredRow {
    #[serde(default)]
    id: String,
    #[serde(default)]
    body: String,
}

impl TableFile {
    /// Create the file with its header when missing, otherwise scan the rows
    /// to find the next id and seed the fingerprint store.
    ///
    /// `next_id` is one past the larger of the row count and the highest id,
    /// so ids skipped by exhausted items are never issued twice.
    #[instrument(skip_all)]
    pub fn initialize(path: impl AsRef<Path>) -> Result<(TableFile, Resume), TableError> {
        let table = TableFile {
            path: path.as_ref().to_path_buf(),
        };

        let is_empty = match fs::metadata(&table.path) {
            Ok(meta) => meta.len() == 0,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => true,
            Err(source) => return Err(table.io_err(source)),
        };
        if is_empty {
            table.write_header()?;
            info!(path = %table.path.display(), "created table file");
            return Ok((
                table,
                Resume {
                    next_id: 1,
                    existing_rows: 0,
                    dedup: DedupStore::default(),
                },
            ));
        }
        table.terminate_last_line()?;

        let mut reader = csv::Reader::from_path(&table.path).map_err(|e| table.csv_err(e))?;
        let mut rows = 0usize;
        let mut max_id = 0u64;
        let mut bodies = Vec::new();
        for row in reader.deserialize::<StoredRow>() {
            let row = row.map_err(|e| table.csv_err(e))?;
            rows += 1;
            if let Ok(id) = row.id.trim().parse::<u64>() {
                max_id = max_id.max(id);
            }
            bodies.push(row.body);
        }

        let dedup = DedupStore::seed(bodies.iter().map(String::as_str));
        let next_id = (rows as u64).max(max_id) + 1;
        info!(
            path = %table.path.display(),
            rows,
            next_id,
            fingerprints = dedup.len(),
            "resuming table file"
        );
        Ok((
            table,
            Resume {
                next_id,
                existing_rows: rows,
                dedup,
            },
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append exactly one row and flush it.
    pub fn append(&self, record: &EmailRecord) -> Result<(), TableError> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);
        writer.serialize(record).map_err(|e| self.csv_err(e))?;
        writer.flush().map_err(|e| self.io_err(e))
    }

    /// A file cut off mid-line (crash, hand edit) would glue the next
    /// appended row onto its last row.
    fn terminate_last_line(&self) -> Result<(), TableError> {
        let mut file = File::open(&self.path).map_err(|e| self.io_err(e))?;
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1)).map_err(|e| self.io_err(e))?;
        file.read_exact(&mut last).map_err(|e| self.io_err(e))?;
        if last[0] == b'\n' {
            return Ok(());
        }
        warn!(path = %self.path.display(), "table file lacks a trailing newline; adding one");
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;
        file.write_all(b"\n").map_err(|e| self.io_err(e))
    }

    fn write_header(&self) -> Result<(), TableError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
            }
        }
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_path(&self.path)
            .map_err(|e| self.csv_err(e))?;
        writer.write_record(HEADER).map_err(|e| self.csv_err(e))?;
        writer.flush().map_err(|e| self.io_err(e))
    }

    fn io_err(&self, source: std::io::Error) -> TableError {
        TableError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn csv_err(&self, source: csv::Error) -> TableError {
        TableError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}

/// Read every row of a table file as a typed record.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<EmailRecord>, TableError> {
    let path = path.as_ref();
    let csv_err = |source: csv::Error| TableError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    reader
        .deserialize::<EmailRecord>()
        .map(|row| row.map_err(csv_err))
        .collect()
}
