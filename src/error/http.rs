use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to build request: {source}")]
    BuildRequestFailed {
        #[source]
        source: http::Error,
    },
    #[error("Failed to convert request: {source}")]
    ConvertRequestFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Request failed: {source}")]
    Send {
        timed_out: bool,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Failed to read response body: {source}")]
    ReadBody {
        timed_out: bool,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl HttpError {
    /// Wraps a reqwest failure, keeping whether it was a timeout.
    pub(crate) fn send(err: reqwest::Error) -> Self {
        HttpError::Send {
            timed_out: err.is_timeout(),
            source: Box::new(err),
        }
    }

    pub(crate) fn read_body(err: reqwest::Error) -> Self {
        HttpError::ReadBody {
            timed_out: err.is_timeout(),
            source: Box::new(err),
        }
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        match self {
            HttpError::Send { timed_out, .. } | HttpError::ReadBody { timed_out, .. } => {
                *timed_out
            }
            HttpError::BuildRequestFailed { .. }
            | HttpError::ConvertRequestFailed { .. }
            | HttpError::BuildClientFailed { .. } => false,
        }
    }
}
