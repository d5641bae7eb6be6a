// This file is part of PLtR.
// Copyright (C) 2025-2026 PLtR contributors.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Reading tab-delimited training files.
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::*;

use crate::errors::IngestError;
use crate::types::TrainingExample;

/// A training corpus with its inferred shape.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrainingData {
    pub examples: Vec<TrainingExample>,
    pub num_users: usize,
    pub num_items: usize,
}

/// Read a tab-delimited training file (header row, then `user<TAB>item<TAB>...`).
pub fn read_training_file<P: AsRef<Path>>(path: P) -> Result<TrainingData, IngestError> {
    let path = path.as_ref();
    debug!("reading training data from {}", path.display());
    let file = File::open(path)?;
    read_training_tsv(file)
}

/// Read tab-delimited training data from any reader.
///
/// The first two columns are parsed as user and item IDs; further columns are
/// ignored. The shape is `max id + 1` along each axis.
pub fn read_training_tsv<R: Read>(reader: R) -> Result<TrainingData, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut data = TrainingData::default();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let field = |idx: usize, name: &str| -> Result<u32, IngestError> {
            let raw = record.get(idx).ok_or_else(|| IngestError::Malformed {
                line,
                message: format!("missing {} column", name),
            })?;
            raw.trim().parse::<u32>().map_err(|e| IngestError::Malformed {
                line,
                message: format!("invalid {} {:?}: {}", name, raw, e),
            })
        };
        let user = field(0, "user")?;
        let item = field(1, "item")?;

        data.num_users = data.num_users.max(user as usize + 1);
        data.num_items = data.num_items.max(item as usize + 1);
        data.examples.push(TrainingExample::new(user, item));
    }

    info!(
        "read {} examples for {} users and {} items",
        data.examples.len(),
        data.num_users,
        data.num_items
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_basic() {
        let src = "user\titem\trating\n0\t1\t5\n2\t0\t3\n0\t3\t1\n";
        let data = read_training_tsv(src.as_bytes()).unwrap();
        assert_eq!(data.examples.len(), 3);
        assert_eq!(data.examples[1], TrainingExample::new(2, 0));
        assert_eq!(data.num_users, 3);
        assert_eq!(data.num_items, 4);
    }

    #[test]
    fn test_read_two_columns() {
        let src = "u\ti\n4\t4\n";
        let data = read_training_tsv(src.as_bytes()).unwrap();
        assert_eq!(data.examples, vec![TrainingExample::new(4, 4)]);
        assert_eq!((data.num_users, data.num_items), (5, 5));
    }

    #[test]
    fn test_header_only() {
        let data = read_training_tsv("user\titem\n".as_bytes()).unwrap();
        assert!(data.examples.is_empty());
        assert_eq!(data.num_users, 0);
    }

    #[test]
    fn test_malformed_id() {
        let src = "user\titem\n0\t1\nx\t2\n";
        let err = read_training_tsv(src.as_bytes()).unwrap_err();
        match err {
            IngestError::Malformed { line, .. } => assert_eq!(line, 3),
            e => panic!("unexpected error {}", e),
        }
    }

    #[test]
    fn test_missing_column() {
        let src = "user\titem\n7\n";
        let err = read_training_tsv(src.as_bytes()).unwrap_err();
        assert!(matches!(err, IngestError::Malformed { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = read_training_file("/nonexistent/pltr/train.tsv").unwrap_err();
        assert!(matches!(err, IngestError::Io(_)));
    }
}
