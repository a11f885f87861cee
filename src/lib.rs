//! Parlor is the conversation engine behind embeddable AI chat widgets: it
//! streams one model response per visitor turn, detects embedded function
//! calls and maps them to configured actions, and routes visitors between
//! department-specific bot configurations.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns per-session runtime state, the turn state machine,
//!   department routing, action resolution, and the widget bootstrap
//!   snapshot.
//! - [`api`] defines the wire payloads exchanged with the streaming model
//!   backend.
//! - [`utils`] holds small shared helpers for URL construction.
//!
//! There is no process boundary here: a host application (dashboard
//! playground or embedded widget runtime) owns the event loop, feeds
//! [`core::app::EngineAction`]s into an [`core::app::Engine`], and executes
//! the [`core::app::EngineCommand`]s it gets back.

pub mod api;
pub mod core;
pub mod logging;
pub mod utils;
