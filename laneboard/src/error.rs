use thiserror::Error as ThisError;

/// Store-level error taxonomy. The web layer maps these onto HTTP statuses:
/// `Validation` -> 400, `NotFound` -> 404, `Sqlite` -> 500.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

pub fn validation(msg: impl Into<String>) -> Error {
    Error::Validation(msg.into())
}

pub fn not_found(msg: impl Into<String>) -> Error {
    Error::NotFound(msg.into())
}

pub fn internal(msg: impl Into<String>) -> Error {
    Error::Internal(msg.into())
}
