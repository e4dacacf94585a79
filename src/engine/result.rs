use std::time::Duration;

use reqwest::StatusCode;
use reqwest::Version;
use reqwest::header::HeaderMap;

use crate::error::HttpError;

/// What came back for a request whose transport call succeeded.
///
/// The body is drained by the worker; only its size is kept so pooled
/// connections can be reused.
#[derive(Debug, Clone)]
pub struct ResponseRecord {
    pub status: StatusCode,
    pub version: Version,
    pub headers: HeaderMap,
    pub body_bytes: u64,
}

#[derive(Debug)]
pub enum Outcome {
    /// Any HTTP status, 4xx/5xx included.
    Response(ResponseRecord),
    /// The request could not be built or the transport failed.
    Failed(HttpError),
    /// The run was shut down before or while this job executed.
    Cancelled,
}

/// Outcome of one job. `index` is the job's position in the dispatch order.
#[derive(Debug)]
pub struct RequestResult {
    pub index: u64,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

impl RequestResult {
    #[must_use]
    pub const fn response(&self) -> Option<&ResponseRecord> {
        match &self.outcome {
            Outcome::Response(record) => Some(record),
            Outcome::Failed(_) | Outcome::Cancelled => None,
        }
    }

    #[must_use]
    pub const fn error(&self) -> Option<&HttpError> {
        match &self.outcome {
            Outcome::Failed(err) => Some(err),
            Outcome::Response(_) | Outcome::Cancelled => None,
        }
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.outcome, Outcome::Cancelled)
    }
}
