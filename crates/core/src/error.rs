//! Unified error types for jobscout.
//!
//! The variants mirror the pipeline's failure classes. Everything except
//! store faults is recovered close to where it happens; `Database` and
//! `MigrationFailed` are the only variants the orchestrator lets abort a
//! cycle, since a broken store risks silent duplicate processing or silent
//! data loss.

use tokio_rusqlite::rusqlite;

/// Unified error types for the jobscout pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A URL could not be parsed or normalized.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// A target site could not be navigated or never rendered its results.
    #[error("SITE_UNAVAILABLE: {0}")]
    SiteUnavailable(String),

    /// A second-level scan of a listing-style link failed.
    #[error("SUBPAGE_SCAN_FAILED: {0}")]
    SubPageScan(String),

    /// Description fetch or parse failed.
    #[error("EXTRACT_FAILED: {0}")]
    ExtractFailed(String),

    /// The scoring endpoint failed, timed out, or returned garbage.
    #[error("ORACLE_FAILED: {0}")]
    OracleFailed(String),

    /// Outbound notification could not be delivered.
    #[error("NOTIFY_FAILED: {0}")]
    NotifyFailed(String),

    /// HTTP error response or network failure.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Fetched response exceeded the configured size bound.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Headless browser launch, navigation, or session failure.
    #[error("BROWSER_FAILED: {0}")]
    BrowserFailed(String),

    /// Vacancy store operation failed.
    #[error("STORE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_ERROR: migration failed: {0}")]
    MigrationFailed(String),
}

impl Error {
    /// Whether this error must abort the remainder of a cycle.
    ///
    /// Only store faults qualify: every other class is recovered locally by
    /// treating the failed step as an empty result.
    pub fn is_store_fault(&self) -> bool {
        matches!(self, Error::Database(_) | Error::MigrationFailed(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
