/// Failure to enumerate running processes. The tracker treats it as an
/// empty snapshot for that tick.
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("process enumeration failed: {0}")]
    Enumeration(String),
    #[error("process enumeration task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Failure to record a session open or close. Never retried by the tracker.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("session store request failed: {0}")]
    Remote(String),
    #[error("unknown or already closed session: {0}")]
    UnknownSession(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SinkError {
    pub(crate) fn remote(err: anyhow::Error) -> Self {
        Self::Remote(format!("{err:#}"))
    }
}
