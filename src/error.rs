//! Crate-wide error type
//!
//! Every fallible library call returns [`Result`]. The binary wraps these in
//! `anyhow` with file context, so variants only carry what the library knows.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to read csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: cannot parse {token:?} as a number")]
    Parse { line: usize, token: String },

    #[error("line {line}: expected {expected} columns, found {found}")]
    RaggedRow { line: usize, expected: usize, found: usize },

    #[error("table has no rows")]
    EmptyTable,

    #[error("column {0} not present in table")]
    MissingColumn(String),

    #[error("reference energy is zero, relative quantities are undefined")]
    ZeroReferenceEnergy,

    #[error("no input files found in {0}")]
    NoInputs(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("plotting failed: {0}")]
    Plot(String),
}

impl Error {
    /// Attach a path to an `io::Error`
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
