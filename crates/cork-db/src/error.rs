use thiserror::Error;

/// Failures surfaced by the persistence layer.
///
/// `NotFound` and `Constraint` are expected outcomes the HTTP layer maps to
/// client errors; everything else is a fault of the store itself.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("DB lock poisoned")]
    LockPoisoned,

    #[error("datastore error: {0}")]
    Sqlite(rusqlite::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: &str) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::SqliteFailure(err, msg)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Constraint(msg.unwrap_or_else(|| err.to_string()))
            }
            other => StoreError::Sqlite(other),
        }
    }
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, StoreError>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, StoreError> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
