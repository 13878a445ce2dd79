use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for pagesmith.
///
/// Library callers can match on these to decide recovery strategy; internal
/// code continues to use `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum PagesmithError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Refresh cycle ───────────────────────────────────────────────────
    #[error("cycle: {0}")]
    Cycle(#[from] CycleError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Cycle errors ───────────────────────────────────────────────────────────

/// Per-target failure taxonomy for one refresh pass.
///
/// All four kinds are caught at the per-target boundary inside a cycle and
/// recorded as that target's outcome; none abort sibling targets or the
/// process.
#[derive(Debug, Error)]
pub enum CycleError {
    /// Content source unreachable, returned non-success, or malformed body.
    #[error("fetch failed: {message}")]
    Fetch { message: String },

    /// Rewrite engine unreachable, non-success, or payload did not match the
    /// expected shape. `raw` keeps the unparsed payload for diagnostics.
    #[error("rewrite failed: {message}")]
    Rewrite {
        message: String,
        raw: Option<String>,
    },

    /// Rewritten payload empty or structurally invalid for the requested mode.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// Content source write failed.
    #[error("publish failed: {message}")]
    Publish { message: String },
}

impl CycleError {
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    pub fn rewrite(message: impl Into<String>) -> Self {
        Self::Rewrite {
            message: message.into(),
            raw: None,
        }
    }

    pub fn rewrite_with_raw(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::Rewrite {
            message: message.into(),
            raw: Some(raw.into()),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn publish(message: impl Into<String>) -> Self {
        Self::Publish {
            message: message.into(),
        }
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, PagesmithError>;
