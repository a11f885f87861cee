use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::core::config::{BotConfig, Endpoints};

/// Per-session runtime state: the immutable configuration snapshot this
/// session runs against, plus stream bookkeeping. One visitor or
/// playground session owns exactly one of these; nothing here is shared.
#[derive(Debug)]
pub struct SessionContext {
    pub client: Client,
    pub endpoints: Endpoints,
    /// Public site credential sent with every streaming call.
    pub public_key: String,
    /// The active bot. Replaced wholesale on department switch, never
    /// mutated; configuration edits elsewhere do not reach this copy.
    pub bot: BotConfig,
    /// Slug of the active department, if the visitor picked one.
    pub department: Option<String>,
    pub stream_cancel_token: Option<CancellationToken>,
    pub current_stream_id: u64,
}

impl SessionContext {
    pub fn new(endpoints: Endpoints, public_key: String, bot: BotConfig) -> Self {
        Self {
            client: Client::new(),
            endpoints,
            public_key,
            bot,
            department: None,
            stream_cancel_token: None,
            current_stream_id: 0,
        }
    }

    /// Swap in a new bot snapshot. Stream bookkeeping is left to the
    /// engine, which cancels before swapping.
    pub fn replace_bot(&mut self, bot: BotConfig, department: Option<String>) {
        self.bot = bot;
        self.department = department;
    }
}
