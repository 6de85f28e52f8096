use thiserror::Error;

/// Errors raised by the interpreter core and its collaborators.
///
/// Ordinary gameplay failures are never errors; they come back as an
/// `ActionResult` with `success == false`.
#[derive(Debug, Error)]
pub enum GameError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around JSON serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Wrapper around IO errors (reading world documents, creating directories).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when fetching a record that is not present, or when the
    /// world is queried before it has been loaded.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Malformed or incomplete world data. Fatal at load time.
    #[error("data integrity error in {document} [{id}]: {reason}")]
    DataIntegrity {
        document: &'static str,
        id: String,
        reason: String,
    },

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },

    /// Unexpected internal fault during dispatch (dangling ids, broken invariants).
    #[error("internal error: {0}")]
    Internal(String),
}

impl GameError {
    pub(crate) fn integrity(document: &'static str, id: &str, reason: impl Into<String>) -> Self {
        GameError::DataIntegrity {
            document,
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing_field(document: &'static str, id: &str, field: &str) -> Self {
        Self::integrity(document, id, format!("missing required field '{}'", field))
    }
}
