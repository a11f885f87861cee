//! The per-session coordinator.
//!
//! One [`Engine`] owns all mutable state for one visitor or playground
//! session. Hosts feed it [`EngineAction`]s through [`apply_action`] and
//! execute the [`EngineCommand`]s it returns; the engine itself never does
//! I/O beyond building the parameters for it.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::{TurnMessage, TurnRequest};
use crate::core::chat_stream::StreamParams;
use crate::core::config::{BotConfig, Endpoints, IntegrationConfig};
use crate::core::constants::DEFAULT_GREETING;
use crate::core::department::DepartmentDirectory;
use crate::core::error::EngineError;
use crate::core::history::HistoryWindow;
use crate::core::plan::PlanGate;
use crate::core::store::ConfigStore;

pub mod actions;
pub mod session;

pub use actions::{
    apply_action, apply_actions, EngineAction, EngineActionDispatcher, EngineCommand,
};
pub use session::SessionContext;

/// Bookkeeping for the turn currently in flight, reset when a stream
/// starts and when it terminates.
#[derive(Debug, Default)]
pub struct TurnState {
    /// A stream is open; new submissions are ignored until it terminates.
    pub in_flight: bool,
    /// A function call was applied this turn; all later chunks are
    /// ignored (first tool call wins).
    pub call_observed: bool,
}

#[derive(Debug)]
pub struct Engine {
    pub session: SessionContext,
    pub history: HistoryWindow,
    pub turn: TurnState,
    pub departments: DepartmentDirectory,
    /// Department switch awaiting its bot load, used to drop stale load
    /// completions when the visitor switches again mid-load.
    pub pending_department: Option<String>,
}

/// Everything a host needs after bootstrapping a session: the engine plus
/// the integration it was built from (for snapshot building).
#[derive(Debug)]
pub struct EngineBootstrap {
    pub engine: Engine,
    pub integration: IntegrationConfig,
}

impl Engine {
    /// Build an engine around an already-loaded session, seeding the
    /// transcript with the bot's greeting.
    pub fn new(session: SessionContext, departments: DepartmentDirectory) -> Self {
        let mut engine = Self {
            session,
            history: HistoryWindow::new(),
            turn: TurnState::default(),
            departments,
            pending_department: None,
        };
        let greeting = engine.greeting_text();
        engine.history.reset_with_greeting(&greeting);
        engine
    }

    fn greeting_text(&self) -> String {
        let greeting = self.session.bot.greeting.trim();
        if greeting.is_empty() {
            DEFAULT_GREETING.to_string()
        } else {
            greeting.to_string()
        }
    }

    pub fn is_current_stream(&self, stream_id: u64) -> bool {
        self.session.current_stream_id == stream_id
    }

    pub fn is_turn_in_flight(&self) -> bool {
        self.turn.in_flight
    }

    /// Cancel whatever stream is open and open a new one: fresh token,
    /// next id, turn bookkeeping reset.
    pub(crate) fn start_new_stream(&mut self) -> (CancellationToken, u64) {
        if let Some(token) = &self.session.stream_cancel_token {
            token.cancel();
        }

        self.session.current_stream_id += 1;
        let token = CancellationToken::new();
        self.session.stream_cancel_token = Some(token.clone());
        self.turn.in_flight = true;
        self.turn.call_observed = false;

        (token, self.session.current_stream_id)
    }

    /// Cancel the open stream without starting another. Never panics when
    /// no stream is open. Placeholder disposal is the caller's decision.
    pub(crate) fn cancel_current_stream(&mut self) {
        if let Some(token) = &self.session.stream_cancel_token {
            token.cancel();
        }
        self.session.stream_cancel_token = None;
        self.turn.in_flight = false;
    }

    /// Mark the in-flight turn as terminated without cancelling; used once
    /// the producer has signalled completion or failure.
    pub(crate) fn end_turn(&mut self) {
        self.session.stream_cancel_token = None;
        self.turn.in_flight = false;
    }

    /// Swap the session to a freshly loaded bot and reset the transcript
    /// to its greeting. The caller has already cancelled the old stream.
    pub(crate) fn adopt_bot(&mut self, bot: BotConfig, department: Option<String>) {
        debug!(bot = %bot.id, department = ?department, "adopting bot configuration");
        self.session.replace_bot(bot, department);
        self.turn = TurnState::default();
        let greeting = self.greeting_text();
        self.history.reset_with_greeting(&greeting);
    }

    /// Assemble the outbound request for the current turn from the bounded
    /// context window. The open placeholder never participates.
    pub(crate) fn build_turn_request(&self) -> TurnRequest {
        let bot = &self.session.bot;

        let mut instruction_parts = Vec::new();
        if !bot.system_instruction.trim().is_empty() {
            instruction_parts.push(bot.system_instruction.trim().to_string());
        }
        if !bot.knowledge_base.trim().is_empty() {
            instruction_parts.push(format!("Knowledge base:\n{}", bot.knowledge_base.trim()));
        }
        let system_instruction = if instruction_parts.is_empty() {
            None
        } else {
            Some(instruction_parts.join("\n\n"))
        };

        let messages = self
            .history
            .context_window()
            .into_iter()
            .map(|message| TurnMessage {
                role: message.role.as_str().to_string(),
                text: message.text.clone(),
            })
            .collect();

        TurnRequest {
            model: bot.model.clone(),
            provider: bot.provider.clone(),
            temperature: bot.temperature,
            system_instruction,
            messages,
            stream: true,
        }
    }

    pub(crate) fn build_stream_params(
        &self,
        request: TurnRequest,
        cancel_token: CancellationToken,
        stream_id: u64,
    ) -> StreamParams {
        StreamParams {
            client: self.session.client.clone(),
            base_url: self.session.endpoints.api_base_url.clone(),
            public_key: self.session.public_key.clone(),
            request,
            cancel_token,
            stream_id,
        }
    }
}

/// Load everything a fresh session needs through the collaborator seams
/// and build the engine around the integration's default bot.
///
/// Fails fast on configuration gaps: unknown integration, missing public
/// credential, or a default bot that cannot be loaded.
pub async fn new_for_integration(
    store: &dyn ConfigStore,
    gate: &dyn PlanGate,
    integration_id: &str,
    endpoints: Endpoints,
) -> Result<EngineBootstrap, EngineError> {
    let endpoints = endpoints.validated()?;

    let integration = store
        .get_integration_by_id(integration_id)
        .await?
        .ok_or_else(|| EngineError::Config(format!("unknown integration '{integration_id}'")))?;

    let public_key = integration
        .public_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            EngineError::Config(format!("integration '{integration_id}' has no public key"))
        })?;

    let bot = store
        .get_bot_by_id(&integration.default_bot_id)
        .await?
        .ok_or_else(|| {
            EngineError::Config(format!(
                "integration '{integration_id}' references unknown default bot '{}'",
                integration.default_bot_id
            ))
        })?
        .validated()?;

    let departments = DepartmentDirectory::from_integration(&integration, gate);
    let session = SessionContext::new(endpoints, public_key, bot);

    Ok(EngineBootstrap {
        engine: Engine::new(session, departments),
        integration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::plan::StaticPlanGate;
    use crate::core::store::InMemoryConfigStore;
    use crate::utils::test_utils::{test_bot, test_endpoints, test_engine, test_integration};

    #[test]
    fn new_engine_seeds_the_bot_greeting() {
        let engine = test_engine();
        assert_eq!(engine.history.len(), 1);
        let greeting = engine.history.last_model_message().expect("greeting");
        assert_eq!(greeting.text, "Hello from the test bot!");
        assert!(!greeting.streaming);
    }

    #[test]
    fn blank_greeting_falls_back_to_default() {
        let mut bot = test_bot("bot-1");
        bot.greeting = "   ".to_string();
        let session = SessionContext::new(test_endpoints(), "pub-key".to_string(), bot);
        let engine = Engine::new(session, DepartmentDirectory::default());

        let greeting = engine.history.last_model_message().expect("greeting");
        assert_eq!(greeting.text, DEFAULT_GREETING);
    }

    #[test]
    fn start_new_stream_rotates_token_and_id() {
        let mut engine = test_engine();
        let (first_token, first_id) = engine.start_new_stream();
        assert!(engine.is_turn_in_flight());
        assert!(engine.is_current_stream(first_id));

        let (_second_token, second_id) = engine.start_new_stream();
        assert!(first_token.is_cancelled());
        assert!(second_id > first_id);
        assert!(!engine.is_current_stream(first_id));
    }

    #[test]
    fn cancel_current_stream_is_idempotent() {
        let mut engine = test_engine();
        engine.cancel_current_stream();
        engine.cancel_current_stream();
        assert!(!engine.is_turn_in_flight());

        let (token, _) = engine.start_new_stream();
        engine.cancel_current_stream();
        assert!(token.is_cancelled());
        assert!(!engine.is_turn_in_flight());
    }

    #[test]
    fn turn_request_carries_bounded_context_and_bot_descriptor() {
        let mut engine = test_engine();
        for i in 0..20 {
            engine.history.push_user(format!("message {i}"));
        }
        engine.history.push_placeholder();

        let request = engine.build_turn_request();
        assert_eq!(request.model, engine.session.bot.model);
        assert_eq!(request.temperature, engine.session.bot.temperature);
        assert!(request.stream);
        assert_eq!(request.messages.len(), 10);
        assert_eq!(request.messages[9].text, "message 19");
        assert!(request
            .messages
            .iter()
            .all(|message| !message.text.is_empty()));
    }

    #[test]
    fn turn_request_merges_system_instruction_and_knowledge_base() {
        let mut bot = test_bot("bot-1");
        bot.system_instruction = "Be helpful.".to_string();
        bot.knowledge_base = "Opening hours: 9-17.".to_string();
        let session = SessionContext::new(test_endpoints(), "pub-key".to_string(), bot);
        let engine = Engine::new(session, DepartmentDirectory::default());

        let request = engine.build_turn_request();
        let instruction = request.system_instruction.expect("system instruction");
        assert!(instruction.starts_with("Be helpful."));
        assert!(instruction.contains("Opening hours: 9-17."));
    }

    #[test]
    fn adopt_bot_resets_transcript_and_turn_state() {
        let mut engine = test_engine();
        engine.history.push_user("old message");
        engine.turn.call_observed = true;

        let mut new_bot = test_bot("bot-sales");
        new_bot.greeting = "Welcome to sales!".to_string();
        engine.adopt_bot(new_bot, Some("sales".to_string()));

        assert_eq!(engine.history.len(), 1);
        assert_eq!(
            engine.history.last_model_message().unwrap().text,
            "Welcome to sales!"
        );
        assert!(!engine.turn.call_observed);
        assert_eq!(engine.session.department.as_deref(), Some("sales"));
        assert_eq!(engine.session.bot.id, "bot-sales");
    }

    #[tokio::test]
    async fn new_for_integration_loads_default_bot_and_directory() {
        let mut integration = test_integration("int-1");
        integration.department_bots = vec![crate::core::config::DepartmentBot {
            department_name: "sales".to_string(),
            department_label: "Sales".to_string(),
            bot_id: "bot-sales".to_string(),
        }];
        let store = InMemoryConfigStore::new()
            .with_bot(test_bot("bot-default"))
            .with_integration(integration);

        let bootstrap = new_for_integration(
            &store,
            &StaticPlanGate::allowing_departments(),
            "int-1",
            test_endpoints(),
        )
        .await
        .expect("bootstrap");

        assert_eq!(bootstrap.engine.session.bot.id, "bot-default");
        assert!(bootstrap.engine.departments.is_enabled());
        assert_eq!(bootstrap.integration.id, "int-1");
    }

    #[tokio::test]
    async fn new_for_integration_fails_fast_without_public_key() {
        let mut integration = test_integration("int-1");
        integration.public_key = None;
        let store = InMemoryConfigStore::new()
            .with_bot(test_bot("bot-default"))
            .with_integration(integration);

        let err = new_for_integration(
            &store,
            &StaticPlanGate::allowing_departments(),
            "int-1",
            test_endpoints(),
        )
        .await
        .expect_err("missing key");
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[tokio::test]
    async fn new_for_integration_rejects_unknown_integration() {
        let store = InMemoryConfigStore::new();
        let err = new_for_integration(
            &store,
            &StaticPlanGate::single_bot_only(),
            "int-missing",
            test_endpoints(),
        )
        .await
        .expect_err("unknown integration");
        assert!(matches!(err, EngineError::Config(_)));
    }
}
