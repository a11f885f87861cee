//! Shared constants used across the engine

/// Maximum number of finalized transcript entries sent to the model backend
/// as conversation context for one turn.
pub const CONTEXT_WINDOW_MESSAGES: usize = 10;

/// Text a turn's placeholder message resolves to when the backend fails
/// mid-stream. Shown verbatim to the visitor; must never be empty.
pub const STREAM_FAILURE_FALLBACK: &str =
    "Something went wrong while generating a response. Please try again.";

/// Display message for a triggered action that has no configured trigger
/// message, and for action ids the active bot does not know.
pub const GENERIC_ACTION_MESSAGE: &str = "The requested action was triggered.";

/// Greeting seeded into a fresh session when the bot has none configured,
/// so the transcript never starts (or resets to) a blank entry.
pub const DEFAULT_GREETING: &str = "Hi! How can I help you today?";

/// Path of the streaming endpoint, relative to the API base URL.
pub const STREAM_ENDPOINT: &str = "widget/conversation/stream";

/// Path of the embeddable widget script, relative to the script base URL.
pub const WIDGET_SCRIPT_PATH: &str = "embed/widget.js";
