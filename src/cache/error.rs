use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    /// No network and no cached copy: the request fails outright.
    #[error("offline and not cached: {0}")]
    Offline(String),

    #[error("origin returned status {status} for {path}")]
    Status { path: String, status: u16 },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("origin unreachable: {0}")]
    Unreachable(String),

    #[error("invalid asset path: {0}")]
    InvalidPath(String),

    #[error("install failed: {0}")]
    Install(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// True when the failure means the network is unusable for this request,
    /// which is when the cached fallback applies.
    pub fn is_network_failure(&self) -> bool {
        matches!(
            self,
            FetchError::Network(_)
                | FetchError::Unreachable(_)
                | FetchError::Status { .. }
                | FetchError::Offline(_)
        )
    }
}
