use tracing::{debug, warn};

use super::{Engine, EngineAction, EngineCommand};
use crate::core::action;
use crate::core::chat_stream::StreamFailure;
use crate::core::constants::STREAM_FAILURE_FALLBACK;
use crate::core::notice::Notice;

pub(super) fn handle_streaming_action(
    engine: &mut Engine,
    action: EngineAction,
) -> Option<EngineCommand> {
    match action {
        EngineAction::SubmitUtterance { text } => submit_utterance(engine, text),
        EngineAction::StreamDelta { text, stream_id } => {
            if !engine.is_current_stream(stream_id) {
                return None;
            }
            apply_delta(engine, &text);
            None
        }
        EngineAction::StreamFunctionCall { call, stream_id } => {
            if !engine.is_current_stream(stream_id) {
                return None;
            }
            apply_function_call(engine, &call.action_id);
            None
        }
        EngineAction::StreamFailed { failure, stream_id } => {
            if !engine.is_current_stream(stream_id) {
                return None;
            }
            handle_stream_failure(engine, failure)
        }
        EngineAction::StreamCompleted { stream_id } => {
            if !engine.is_current_stream(stream_id) {
                return None;
            }
            finalize_stream(engine);
            None
        }
        EngineAction::CancelStreaming => {
            cancel_streaming(engine);
            None
        }
        _ => unreachable!("non-streaming action routed to streaming handler"),
    }
}

/// Start a turn: transcript gets the user message and a placeholder, a
/// fresh stream is opened, and the host is told to spawn the producer.
/// At most one turn is in flight per session; submissions while a stream
/// is open (or a department is loading) are dropped, not queued.
fn submit_utterance(engine: &mut Engine, text: String) -> Option<EngineCommand> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if engine.turn.in_flight {
        debug!("turn already in flight, ignoring submission");
        return None;
    }

    if engine.pending_department.is_some() {
        debug!("department switch in progress, ignoring submission");
        return None;
    }

    engine.history.push_user(trimmed);
    engine.history.push_placeholder();

    let (cancel_token, stream_id) = engine.start_new_stream();
    let request = engine.build_turn_request();

    Some(EngineCommand::SpawnStream(engine.build_stream_params(
        request,
        cancel_token,
        stream_id,
    )))
}

fn apply_delta(engine: &mut Engine, text: &str) {
    if text.is_empty() {
        return;
    }
    if engine.turn.call_observed {
        debug!("text delta after function call, ignoring");
        return;
    }
    engine.history.append_to_placeholder(text);
}

/// First tool call wins: the placeholder's text becomes the resolved
/// display message and every later chunk of the turn is ignored.
fn apply_function_call(engine: &mut Engine, action_id: &str) {
    if engine.turn.call_observed {
        debug!(action_id, "additional function call in the same turn, ignoring");
        return;
    }
    engine.turn.call_observed = true;

    let resolved = action::resolve(action_id, &engine.session.bot.actions);
    if let Some(placeholder) = engine.history.streaming_placeholder_mut() {
        placeholder.text = resolved.display_message;
        placeholder.action_invoked = Some(resolved.action_id);
    }
}

/// A failed turn always resolves its placeholder to the fixed fallback
/// text; a turn that already triggered an action keeps the trigger
/// message. Backend failures are never retried here: re-submitting is the
/// visitor's call, so a handoff or call action cannot fire twice.
fn handle_stream_failure(engine: &mut Engine, failure: StreamFailure) -> Option<EngineCommand> {
    if let Some(placeholder) = engine.history.streaming_placeholder_mut() {
        if !engine.turn.call_observed {
            placeholder.text = STREAM_FAILURE_FALLBACK.to_string();
        }
        placeholder.streaming = false;
    }
    engine.end_turn();

    match failure {
        StreamFailure::Auth(detail) => {
            warn!(detail = %detail, "stream rejected: authentication");
            Some(EngineCommand::Notify(Notice::error(
                "Authentication",
                "The widget session is no longer authorized. Reload the page to continue.",
            )))
        }
        StreamFailure::Backend(detail) => {
            warn!(detail = %detail, "stream failed: backend");
            None
        }
    }
}

fn finalize_stream(engine: &mut Engine) {
    if let Some(placeholder) = engine.history.streaming_placeholder_mut() {
        if placeholder.text.is_empty() {
            placeholder.text = STREAM_FAILURE_FALLBACK.to_string();
        }
        placeholder.streaming = false;
    }
    engine.end_turn();
}

/// Visitor-initiated cancel: keep whatever text already streamed in, drop
/// the entry entirely when nothing arrived yet.
fn cancel_streaming(engine: &mut Engine) {
    if !engine.turn.in_flight {
        return;
    }
    engine.cancel_current_stream();
    engine.history.drop_empty_placeholder();
    engine.history.finalize_placeholder();
}
