//! Tracing setup for host applications.
//!
//! The engine itself only emits `tracing` events; a host that wants them
//! on stderr calls [`init`] once at startup. Conversation transcripts are
//! not logged here; persisting those is the storage collaborator's job.

use tracing_subscriber::EnvFilter;

/// Install the global stderr subscriber, filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls keep the first subscriber.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
