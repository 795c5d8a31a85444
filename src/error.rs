// =============================================================================
// Error taxonomy for upstream data and dashboard blocks
// =============================================================================
//
// Every dashboard block is independently guarded: a failure becomes one
// `BlockError` carrying the block key, a machine-readable reason code, and an
// operator-facing message. The aggregator merges these uniformly and renders
// each onto the wire in the legacy `"{key}: {message}"` string form the
// dashboard front end parses.

use serde::Serialize;
use thiserror::Error;

/// Machine-readable reason code for a degraded block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Non-2xx status or transport failure from an upstream endpoint.
    Fetch,
    /// Upstream JSON parsed but was missing an expected field or had the
    /// wrong type.
    Shape,
    /// A required credential or setting is absent.
    Config,
}

/// A failed upstream interaction, before attribution to a block.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Non-2xx HTTP status. The terse message is deliberate: it is what the
    /// front end shows operators.
    #[error("HTTP {0}")]
    Status(u16),

    /// Connect / timeout / body-decode failure below the HTTP layer.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("{0}")]
    Shape(String),
}

impl UpstreamError {
    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape(message.into())
    }

    fn kind(&self) -> ErrorKind {
        match self {
            Self::Status(_) | Self::Transport(_) => ErrorKind::Fetch,
            Self::Shape(_) => ErrorKind::Shape,
        }
    }
}

/// One degraded dashboard block: which block, why, and the message.
#[derive(Debug, Clone, Serialize, Error)]
#[error("{key}: {message}")]
pub struct BlockError {
    /// Block key as it appears on the wire: `A[15m]`, `C`, `D`, ...
    pub key: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl BlockError {
    /// Attribute an upstream failure to the block identified by `key`.
    pub fn upstream(key: impl Into<String>, err: UpstreamError) -> Self {
        Self {
            key: key.into(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// A missing-credential / missing-setting failure.
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: ErrorKind::Config,
            message: message.into(),
        }
    }
}
