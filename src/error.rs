// src/error.rs
// Error and warning types for ISF decoding

use std::fmt;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IsfError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Missing header field: {0}")]
    MissingField(String),

    #[error("Invalid value for header field {name}: {value}")]
    InvalidField { name: String, value: String },

    #[error("Truncated data: expected {expected} payload bytes, got {available}")]
    TruncatedData { expected: usize, available: usize },
}

impl IsfError {
    pub fn malformed<S: Into<String>>(s: S) -> Self {
        Self::MalformedHeader(s.into())
    }

    pub fn unsupported<S: Into<String>>(s: S) -> Self {
        Self::UnsupportedFormat(s.into())
    }

    pub fn missing<S: Into<String>>(name: S) -> Self {
        Self::MissingField(name.into())
    }

    pub fn invalid<N: Into<String>, V: fmt::Display>(name: N, value: V) -> Self {
        Self::InvalidField {
            name: name.into(),
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IsfError>;

/// Recoverable conditions found while decoding. They are logged and kept on
/// the decoded file; none of them changes how the payload is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IsfWarning {
    /// `BYT_NR * NR_PT` disagrees with the length declared by the CURVE marker.
    SizeMismatch { expected: i128, declared: usize },
}

impl fmt::Display for IsfWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IsfWarning::SizeMismatch { expected, declared } => write!(
                f,
                "BYT_NR * NR_PT != CURVE data size: {} != {}",
                expected, declared
            ),
        }
    }
}
