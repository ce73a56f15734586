use thiserror::Error;

/// Failures surfaced by the glossary core.
///
/// Every variant renders a message fit for direct display, because the
/// transport layer forwards `to_string()` to the UI unchanged.
#[derive(Error, Debug)]
pub enum GlossaryError {
    #[error("{0}")]
    Validation(String),

    #[error("Term {0} not found")]
    NotFound(i64),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Failed to prepare default languages: {0}")]
    Seed(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for GlossaryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                GlossaryError::Conflict(db_err.message().to_string())
            }
            _ => GlossaryError::Database(err),
        }
    }
}

pub type GlossaryResult<T> = Result<T, GlossaryError>;
