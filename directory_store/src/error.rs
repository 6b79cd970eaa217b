//! Errors at the dataset-loading boundary.
//!
//! Store reads and mutations never fail; only bringing a dataset in from
//! outside the process can.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::invariants::InvariantViolation;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("dataset rejected: {0}")]
    Invariant(#[from] InvariantViolation),
}
