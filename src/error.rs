use std::fmt;
use thiserror::Error;

/// The staking node could not be reached at all.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("invalid node endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("cannot reach staking node at {endpoint}: {source}")]
    Unreachable {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("staking node at {endpoint} answered the health check with HTTP {status}")]
    Unhealthy { endpoint: String, status: u16 },
}

/// A single page request against the staking node failed.
#[derive(Debug, Error)]
pub enum RemoteQueryError {
    #[error("{query} request failed: {source}")]
    Transport {
        query: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{query} returned HTTP {status}: {message}")]
    Status {
        query: &'static str,
        status: u16,
        message: String,
    },
    #[error("{query} got a continuation key it did not issue: {key:?}")]
    InvalidPageKey { query: &'static str, key: String },
    #[error("{query} returned a malformed body: {source}")]
    Decode {
        query: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A paginated fetch stopped on a failed page.
///
/// `partial` holds every record received before the failure, in page order.
/// Callers that cannot use an incomplete set should drop it.
#[derive(Debug)]
pub struct FetchError<T> {
    pub partial: Vec<T>,
    pub source: RemoteQueryError,
}

impl<T> FetchError<T> {
    pub fn new(partial: Vec<T>, source: RemoteQueryError) -> Self {
        Self { partial, source }
    }
}

impl<T> fmt::Display for FetchError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} records fetched before the failure)",
            self.source,
            self.partial.len()
        )
    }
}

impl<T: fmt::Debug> std::error::Error for FetchError<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Writing or flushing a report failed.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("cannot open report file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write report row: {0}")]
    Write(#[from] csv::Error),
    #[error("failed to flush report: {0}")]
    Flush(#[source] std::io::Error),
}

#[derive(Debug, Error)]
#[error("invalid value {value:?} for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}
