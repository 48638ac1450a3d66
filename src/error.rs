use thiserror::Error;

/// Error kinds surfaced to callers. The string payloads of `Conflict` and
/// `InvalidInput` are stable machine-readable codes, not prose.
#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("forbidden")]
    Forbidden,

    #[error("not_found")]
    NotFound,

    #[error("team_not_found")]
    TeamNotFound,

    #[error("{0}")]
    Conflict(&'static str),

    #[error("{0}")]
    InvalidInput(&'static str),
}

impl Error {
    /// Stable wire code for this error, as exposed in API responses.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Error::Database(_) | Error::Io(_) | Error::Config(_) => "internal",
            Error::Unauthenticated => "unauthenticated",
            Error::Forbidden => "forbidden",
            Error::NotFound => "not_found",
            Error::TeamNotFound => "team_not_found",
            Error::Conflict(code) | Error::InvalidInput(code) => code,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
