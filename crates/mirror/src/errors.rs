//! Port error and retry-policy types for the issue mirror domain.
//!
//! [`PortError`] is returned by every method of the port traits in
//! [`crate::ports`]. Adapters translate their transport failures into it;
//! orchestration code never sees HTTP or JSON details.
//!
//! [`RetryPolicy`] is a cross-cutting concern: every [`PortError`] can say
//! whether repeating the call could succeed. The sync itself never retries;
//! the classification is reported alongside failures so an operator knows
//! whether re-running is worthwhile.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// - `Retryable` errors: transport failures, rate limiting, server errors.
/// - `NonRetryable` errors: rejected credentials, malformed requests, missing
///   resources, unexpected payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt (from `Retry-After`).
        /// `None` means no hint was given.
        after: Option<Duration>,
    },
    /// Repeating the operation unchanged will fail the same way.
    NonRetryable,
}

impl RetryPolicy {
    /// Classifies an HTTP status code.
    pub fn for_status(status: u16, retry_after: Option<Duration>) -> Self {
        match status {
            429 | 500..=599 => Self::Retryable { after: retry_after },
            _ => Self::NonRetryable,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable { .. })
    }
}

// ---------------------------------------------------------------------------
// Port errors
// ---------------------------------------------------------------------------

/// External service a [`PortError`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    GitHub,
    Notion,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GitHub => f.write_str("GitHub"),
            Self::Notion => f.write_str("Notion"),
        }
    }
}

/// Failure of a single call to the issue source or the mirror store.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PortError {
    /// Credentials were missing, invalid, or lack access (HTTP 401/403).
    #[error("{service} rejected the credentials ({status}): {message}")]
    Unauthorized {
        service: Service,
        status: u16,
        message: String,
    },

    /// Any other non-success HTTP response.
    #[error("{service} request failed with status {status}: {message}")]
    Status {
        service: Service,
        status: u16,
        message: String,
        retry: RetryPolicy,
    },

    /// The request never produced a response (DNS, TLS, connection, timeout).
    #[error("{service} transport error: {message}")]
    Transport { service: Service, message: String },

    /// A response arrived but did not have the expected shape.
    #[error("{service} returned an unexpected payload: {message}")]
    Decode { service: Service, message: String },
}

impl PortError {
    pub fn service(&self) -> Service {
        match self {
            Self::Unauthorized { service, .. }
            | Self::Status { service, .. }
            | Self::Transport { service, .. }
            | Self::Decode { service, .. } => *service,
        }
    }

    /// Whether repeating the failed call could succeed.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Status { retry, .. } => retry.clone(),
            Self::Transport { .. } => RetryPolicy::Retryable { after: None },
            Self::Unauthorized { .. } | Self::Decode { .. } => RetryPolicy::NonRetryable,
        }
    }

    /// Builds the error for a non-success HTTP status.
    pub fn from_status(
        service: Service,
        status: u16,
        message: impl Into<String>,
        retry_after: Option<Duration>,
    ) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Unauthorized {
                service,
                status,
                message,
            },
            _ => Self::Status {
                service,
                status,
                message,
                retry: RetryPolicy::for_status(status, retry_after),
            },
        }
    }
}
