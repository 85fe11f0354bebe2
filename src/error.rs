// Error types shared across the proxy pipeline
use thiserror::Error;

// Errors that abort a whole import (or reject it before any upstream work).
// Per-property failures are represented separately by MapError and counted
// by the import loop instead of propagating.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("vendor authentication failed: {0}")]
    Auth(String),

    #[error("upstream returned status {status} for {url}")]
    UpstreamFetch { status: u16, url: String },

    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("XML parse error: {0}")]
    XmlParse(String),

    #[error("Unauthorized")]
    Unauthorized,
}

// A single property failed to map; the batch carries on.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("property mapping failed: {0}")]
pub struct MapError(pub String);
