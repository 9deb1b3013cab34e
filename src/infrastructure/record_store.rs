//! In-memory record accumulation with a single flush to JSON
//!
//! The store is owned by one run and passed explicitly into the walker. It is
//! append-only; `flush` writes the whole sequence as one JSON array.

#![allow(clippy::uninlined_format_args)]

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::Record;
use crate::infrastructure::config::WriteMode;

/// Output document could not be written
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to open output file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize records: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write output file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read records from {path}: {message}")]
    Read { path: String, message: String },
}

/// What to do with a record whose identifier is already stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Store every record, duplicates included
    #[default]
    Keep,
    /// Drop records whose identifier was already appended
    Skip,
}

impl DuplicatePolicy {
    pub fn from_flag(deduplicate: bool) -> Self {
        if deduplicate { Self::Skip } else { Self::Keep }
    }
}

/// Ordered, append-only record sequence for one run
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    seen: HashSet<String>,
    policy: DuplicatePolicy,
}

impl RecordStore {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            records: Vec::new(),
            seen: HashSet::new(),
            policy,
        }
    }

    /// Append at the end. Returns `false` when the record was dropped as a duplicate.
    pub fn append(&mut self, record: Record) -> bool {
        let first_time = self.seen.insert(record.id_name.clone());
        if !first_time {
            match self.policy {
                DuplicatePolicy::Skip => {
                    warn!("Skipping duplicate record {}", record.id_name);
                    return false;
                }
                DuplicatePolicy::Keep => debug!("Storing repeated identifier {}", record.id_name),
            }
        }
        self.records.push(record);
        true
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize every record as one JSON document and write it in one go.
    /// Returns the number of records written.
    pub fn flush(&self, destination: &Path, mode: WriteMode, indent: usize) -> Result<usize, PersistenceError> {
        let path = destination.display().to_string();

        let indent_bytes = vec![b' '; indent];
        let mut buffer = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(&indent_bytes));
        self.records
            .serialize(&mut serializer)
            .map_err(|source| PersistenceError::Serialize { source })?;

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| PersistenceError::Open {
                    path: path.clone(),
                    source,
                })?;
            }
        }

        let mut options = OpenOptions::new();
        match mode {
            WriteMode::Truncate => options.write(true).create(true).truncate(true),
            WriteMode::Append => options.append(true).create(true),
        };
        let mut file = options.open(destination).map_err(|source| PersistenceError::Open {
            path: path.clone(),
            source,
        })?;

        file.write_all(&buffer)
            .and_then(|()| file.flush())
            .map_err(|source| PersistenceError::Write { path: path.clone(), source })?;

        info!("💾 Wrote {} records to {}", self.records.len(), path);
        Ok(self.records.len())
    }

    /// Read back a document written with `WriteMode::Truncate`
    pub fn load(source: &Path) -> Result<Vec<Record>, PersistenceError> {
        let path = source.display().to_string();
        let content = std::fs::read_to_string(source).map_err(|e| PersistenceError::Read {
            path: path.clone(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| PersistenceError::Read {
            path,
            message: e.to_string(),
        })
    }
}
