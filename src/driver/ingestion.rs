//! Dataset Ingestion
//!
//! Discovers score files in the dataset directory and parses them into
//! record batches. Individual malformed lines are dropped silently; an
//! unusable dataset (missing directory, unreadable file, nothing to process)
//! is fatal before any work is dispatched.

use crate::protocol::types::Record;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File extension recognized as a score file.
const SCORE_FILE_EXTENSION: &str = "csv";

/// Fatal dataset problems. Any of these aborts the run before dispatch.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("cannot read dataset directory {}: {source}", .path.display())]
    UnreadableDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot read score file {}: {source}", .path.display())]
    UnreadableFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("no score files found in {}", .0.display())]
    NoEligibleFiles(PathBuf),
}

/// One score file worth of parsed records, dispatched as a unit.
///
/// A file whose lines were all invalid still yields a batch (with zero
/// records); it round-trips to an empty engine result instead of being
/// skipped.
#[derive(Debug, Clone)]
pub struct FileBatch {
    pub name: String,
    pub records: Vec<Record>,
}

/// Loads every eligible score file under `dataset_dir`.
///
/// Files are sorted by name so the round-robin assignment downstream is
/// reproducible across machines and filesystems.
pub fn load_dataset(dataset_dir: &Path) -> Result<Vec<FileBatch>, DataError> {
    let entries = fs::read_dir(dataset_dir).map_err(|source| DataError::UnreadableDirectory {
        path: dataset_dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| DataError::UnreadableDirectory {
            path: dataset_dir.to_path_buf(),
            source,
        })?;

        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some(SCORE_FILE_EXTENSION) {
            let name = entry.file_name().to_string_lossy().into_owned();
            files.push((name, path));
        }
    }

    if files.is_empty() {
        return Err(DataError::NoEligibleFiles(dataset_dir.to_path_buf()));
    }

    files.sort();

    let mut batches = Vec::with_capacity(files.len());
    for (name, path) in files {
        let contents = fs::read_to_string(&path).map_err(|source| DataError::UnreadableFile {
            path: path.clone(),
            source,
        })?;

        let records = parse_records(&contents);
        tracing::debug!("Parsed {} records from {}", records.len(), name);

        batches.push(FileBatch { name, records });
    }

    Ok(batches)
}

/// Parses `id,year,score` lines into records.
///
/// Blank lines, lines with the wrong field count, and lines whose year or
/// score fields are not numeric are dropped without being counted or
/// reported.
fn parse_records(contents: &str) -> Vec<Record> {
    let mut records = Vec::new();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split(',');
        let (Some(_id), Some(year), Some(score), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            continue;
        };

        let (Ok(year), Ok(score)) = (year.trim().parse::<i32>(), score.trim().parse::<f64>())
        else {
            continue;
        };

        records.push(Record { year, score });
    }

    records
}
