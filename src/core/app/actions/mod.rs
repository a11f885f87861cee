mod department;
mod streaming;

use tokio::sync::mpsc;

use super::Engine;
use crate::api::FunctionCall;
use crate::core::chat_stream::{StreamFailure, StreamMessage, StreamParams};
use crate::core::config::BotConfig;
use crate::core::department::DepartmentRequest;
use crate::core::notice::Notice;

/// Everything that can happen to a session. UI events and stream events
/// funnel through the same queue so they apply to the engine in one total
/// order.
pub enum EngineAction {
    SubmitUtterance {
        text: String,
    },
    StreamDelta {
        text: String,
        stream_id: u64,
    },
    StreamFunctionCall {
        call: FunctionCall,
        stream_id: u64,
    },
    StreamFailed {
        failure: StreamFailure,
        stream_id: u64,
    },
    StreamCompleted {
        stream_id: u64,
    },
    CancelStreaming,
    SwitchDepartment {
        department: String,
    },
    DepartmentLoaded {
        department: String,
        bot: BotConfig,
    },
    DepartmentLoadFailed {
        department: String,
        error: String,
    },
}

impl EngineAction {
    /// Bridge one stream event from the chat stream channel into the
    /// action queue.
    pub fn from_stream_message(message: StreamMessage, stream_id: u64) -> Self {
        match message {
            StreamMessage::Delta(text) => EngineAction::StreamDelta { text, stream_id },
            StreamMessage::FunctionCall(call) => {
                EngineAction::StreamFunctionCall { call, stream_id }
            }
            StreamMessage::Error(failure) => EngineAction::StreamFailed { failure, stream_id },
            StreamMessage::End => EngineAction::StreamCompleted { stream_id },
        }
    }
}

/// Side effects the host must carry out for the engine.
pub enum EngineCommand {
    /// Start the producer task for a turn.
    SpawnStream(StreamParams),
    /// Fetch the bot behind a department switch through the config store,
    /// then feed back `DepartmentLoaded` or `DepartmentLoadFailed`.
    LoadDepartment(DepartmentRequest),
    /// Deliver a categorized notice to the notification collaborator.
    Notify(Notice),
}

/// Clonable sender handed to input handlers and the stream pump.
#[derive(Clone)]
pub struct EngineActionDispatcher {
    tx: mpsc::UnboundedSender<EngineAction>,
}

impl EngineActionDispatcher {
    pub fn new(tx: mpsc::UnboundedSender<EngineAction>) -> Self {
        Self { tx }
    }

    pub fn dispatch(&self, action: EngineAction) {
        let _ = self.tx.send(action);
    }

    pub fn dispatch_many<I>(&self, actions: I)
    where
        I: IntoIterator<Item = EngineAction>,
    {
        for action in actions.into_iter() {
            let _ = self.tx.send(action);
        }
    }
}

pub fn apply_actions(
    engine: &mut Engine,
    actions: impl IntoIterator<Item = EngineAction>,
) -> Vec<EngineCommand> {
    let mut commands = Vec::new();
    for action in actions {
        if let Some(cmd) = apply_action(engine, action) {
            commands.push(cmd);
        }
    }
    commands
}

pub fn apply_action(engine: &mut Engine, action: EngineAction) -> Option<EngineCommand> {
    match action {
        EngineAction::SubmitUtterance { .. }
        | EngineAction::StreamDelta { .. }
        | EngineAction::StreamFunctionCall { .. }
        | EngineAction::StreamFailed { .. }
        | EngineAction::StreamCompleted { .. }
        | EngineAction::CancelStreaming => streaming::handle_streaming_action(engine, action),

        EngineAction::SwitchDepartment { .. }
        | EngineAction::DepartmentLoaded { .. }
        | EngineAction::DepartmentLoadFailed { .. } => {
            department::handle_department_action(engine, action)
        }
    }
}
