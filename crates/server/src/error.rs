//! Server error types

use std::io;

use thiserror::Error;

/// Server shell errors
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind the listener
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// The HTTP server exited with an error
    #[error("http server error: {0}")]
    Http(#[source] io::Error),
}
