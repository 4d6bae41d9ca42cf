use std::fmt;

/// Error mapping an extraction payload into the review aggregate.
#[derive(Debug)]
pub enum MappingError {
    /// The payload failed schema validation (missing/ill-typed fields).
    Schema(String),
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(msg) => write!(f, "extraction payload rejected: {msg}"),
        }
    }
}

impl std::error::Error for MappingError {}
