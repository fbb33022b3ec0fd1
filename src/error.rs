//! Error module for the Rusty CosMIC library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
#[derive(Debug, PartialEq)]
pub enum CosmicError {
    /// Error for invalid parameters, e.g., a non-positive decay rate or sampling period.
    InvalidParameter(String),
    /// Error for invalid inputs to a mapping, e.g., a negative variance.
    InvalidInput(String),
    /// The Fisher information vanishes (or is not finite), so the Cramér-Rao bound is undefined.
    DegenerateModel(String),
    /// Error for event trains with non-finite, unsorted or duplicated times.
    MalformedEventTrain(String),
    /// Error while parsing a configuration.
    InvalidConfig(String),
}

impl fmt::Display for CosmicError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CosmicError::InvalidParameter(e) => write!(f, "Invalid parameters: {}", e),
            CosmicError::InvalidInput(e) => write!(f, "Invalid input: {}", e),
            CosmicError::DegenerateModel(e) => write!(f, "Degenerate sensor model: {}", e),
            CosmicError::MalformedEventTrain(e) => write!(f, "Malformed event train: {}", e),
            CosmicError::InvalidConfig(e) => write!(f, "Invalid configuration: {}", e),
        }
    }
}

impl Error for CosmicError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            CosmicError::InvalidParameter("alpha must be positive, got -1".to_string())
                .to_string(),
            "Invalid parameters: alpha must be positive, got -1"
        );
        assert_eq!(
            CosmicError::DegenerateModel("zero Fisher information".to_string()).to_string(),
            "Degenerate sensor model: zero Fisher information"
        );
    }
}
