//! Backend HTTP client.
//!
//! Talks to the ordering backend over `reqwest` with a shared cookie jar, so
//! the anti-forgery cookie set by the catalog page is echoed back on the
//! order request the same way a browser would.

mod client;

pub use client::{BackendClient, REQUEST_ID_HEADER};

use thiserror::Error;

/// Errors that can occur when submitting an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request did not complete (connection, TLS, body read).
    #[error("order request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("order rejected with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },
}

impl OrderError {
    /// HTTP status of a rejected order.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(_) => None,
            Self::Rejected { status, .. } => Some(*status),
        }
    }
}
