use thiserror::Error;

/// Errors returned by remote generation service operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The service returned a non-success HTTP status.
    #[error("generation service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response was missing expected fields.
    #[error("{0}")]
    InvalidResponse(String),

    /// Network-level request failure with context.
    #[error("{context}: {source}")]
    Network {
        context: String,
        source: reqwest::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur in the artifact store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        StoreError::Other(err.to_string())
    }
}

/// Job-level errors surfaced by the orchestrator.
///
/// Per-output fetch and persistence failures are not job errors: they are
/// recorded in the [`JobSummary`](crate::JobSummary) and the remaining
/// outputs are still processed.
#[derive(Error, Debug)]
pub enum JobError {
    /// A job is already in flight; the new request was rejected unchanged.
    #[error("a generation job is already running")]
    AlreadyRunning,

    /// The remote order could not be created.
    #[error("order submission failed: {0}")]
    Submission(#[source] ClientError),

    /// The output descriptor list could not be resolved after the wait.
    #[error("order outputs unavailable: {0}")]
    OutputsUnavailable(#[source] ClientError),

    /// The job was cancelled while waiting.
    #[error("job was cancelled")]
    Cancelled,
}
