//! Error taxonomy for the data pipeline.
//!
//! Cache corruption is deliberately absent here: an unreadable cache entry is
//! recovered locally by refetching and never surfaces to the caller.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The provider API key is not configured. Fatal before any network call.
    #[error("api credential missing: set the `{var}` environment variable")]
    MissingCredential { var: String },

    /// An upstream provider failed: transport error, non-2xx status, or an
    /// explicit failure status in the response body. Not retried.
    #[error("{provider} is unavailable: {detail}")]
    ProviderUnavailable { provider: &'static str, detail: String },

    /// A provider answered, but the body does not carry the expected data.
    #[error("unexpected payload from {provider}: {detail}")]
    MalformedPayload { provider: &'static str, detail: String },

    /// A cache entry could not be serialized for persistence.
    #[error("failed to encode cache entry")]
    Encode(#[source] serde_json::Error),

    /// A cache file could not be written.
    #[error("failed to persist cache file {path}")]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
