use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed matrix: {0}")]
    MalformedMatrix(String),

    #[error("Invalid sequence at position {position}: {message}")]
    InvalidSequence { position: usize, message: String },

    #[error("Empty FASTA input")]
    EmptyFasta,

    #[error("Invalid FASTA format: {0}")]
    InvalidFasta(String),

    #[error("Invalid matrix file format: {0}")]
    InvalidFileFormat(String),

    #[error("Invalid parameter: {name} = {value}, {message}")]
    InvalidParameter {
        name: String,
        value: String,
        message: String,
    },
}

/// Type alias for Result with ScanError
pub type Result<T> = std::result::Result<T, ScanError>;

impl ScanError {
    /// Create a new MalformedMatrix error
    pub fn malformed_matrix(message: impl Into<String>) -> Self {
        ScanError::MalformedMatrix(message.into())
    }

    /// Create a new InvalidSequence error
    pub fn invalid_sequence(position: usize, message: impl Into<String>) -> Self {
        ScanError::InvalidSequence {
            position,
            message: message.into(),
        }
    }

    /// Create a new InvalidParameter error
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        ScanError::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            message: message.into(),
        }
    }
}
