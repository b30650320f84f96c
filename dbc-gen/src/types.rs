//! Core types for the DBC stub generator
//!
//! Errors and the result alias shared by every stage of the pipeline, plus the
//! small value types that flow between the resolver and the emitters.

use serde::Serialize;
use std::fmt;

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GenError>;

/// Errors that can occur while loading databases or generating code
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("Failed to read input file: {0}")]
    ReadError(String),

    #[error("Failed to parse DBC file: {0}")]
    DbcParseError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A resolved multiplex discriminator: the switch signal and the value it must hold
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discriminator {
    /// Name of the multiplexer switch signal
    pub switch: String,
    /// Representative switch value (range start for extended multiplexing)
    pub value: u64,
}

impl Discriminator {
    pub fn new(switch: impl Into<String>, value: u64) -> Self {
        Self {
            switch: switch.into(),
            value,
        }
    }
}

impl fmt::Display for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} == {}", self.switch, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminator_display() {
        let d = Discriminator::new("Mode", 3);
        assert_eq!(d.to_string(), "Mode == 3");
    }

    #[test]
    fn test_error_messages() {
        let err = GenError::DbcParseError("bad.dbc: unexpected token".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to parse DBC file: bad.dbc: unexpected token"
        );

        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err: GenError = io.into();
        assert!(matches!(err, GenError::IoError(_)));
    }
}
