//! Application resolution errors.

use thiserror::Error;

/// No configured application claims the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No application found for {host} (request '{request_uri}')")]
pub struct UnknownApplicationError {
    pub host: String,
    pub request_uri: String,
}

/// The active application was requested before any resolution happened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Error)]
#[error("No application set")]
pub struct NoApplicationSetError;
