use std::path::PathBuf;

use thiserror::Error;

/// A required field in a report document was absent or had the wrong shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing field `{path}`")]
    Missing { path: &'static str },

    #[error("field `{path}` has wrong type: expected {expected}, found {found}")]
    WrongType {
        path: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

/// Loading one report from disk failed. The aggregator skips the report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to read report {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode report {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed report {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}
