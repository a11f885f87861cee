//! Error types for the conversation engine.

/// Errors surfaced by the engine and its collaborator seams.
///
/// `Config` and `Auth` abort the current turn and are reported through the
/// notification collaborator under their category label. `Backend` aborts
/// the turn and resolves the placeholder message to the fixed fallback
/// text; it is never retried automatically. `Resolution` failures are
/// non-fatal and only constructed for reporting.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("authentication error: {0}")]
    Auth(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("resolution error: {0}")]
    Resolution(String),
}

impl EngineError {
    /// Human-readable category label used when reporting through the
    /// notification collaborator. Never a raw error or stack trace.
    pub fn category(&self) -> &'static str {
        match self {
            EngineError::Config(_) => "Configuration",
            EngineError::Auth(_) => "Authentication",
            EngineError::Backend(_) => "Backend",
            EngineError::Resolution(_) => "Resolution",
        }
    }
}
