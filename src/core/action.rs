//! Maps a function-call identifier from the stream to a configured action.

use tracing::warn;

use crate::core::config::Action;
use crate::core::constants::GENERIC_ACTION_MESSAGE;

/// The structured outcome of dispatching one function call. Rendering an
/// action card (icon, styling per kind) is the host surface's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAction {
    pub display_message: String,
    pub action_id: String,
}

/// Resolve an action id against the active bot's action list.
///
/// A matched action with a non-blank trigger message yields that message;
/// anything else, including an id the bot does not know, yields the fixed
/// generic message. The raw id is always preserved on the outcome so the
/// display layer can attempt its own lookup later. Never fails the turn.
pub fn resolve(action_id: &str, actions: &[Action]) -> ResolvedAction {
    let display_message = match actions.iter().find(|action| action.id == action_id) {
        Some(action) => action
            .trigger_message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| GENERIC_ACTION_MESSAGE.to_string()),
        None => {
            warn!(action_id, "function call named an unconfigured action");
            GENERIC_ACTION_MESSAGE.to_string()
        }
    };

    ResolvedAction {
        display_message,
        action_id: action_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ActionKind;
    use crate::utils::test_utils::test_action;

    #[test]
    fn matched_action_uses_trigger_message() {
        let mut action = test_action("wa-1", ActionKind::Whatsapp);
        action.trigger_message = Some("Opening WhatsApp...".to_string());

        let resolved = resolve("wa-1", &[action]);
        assert_eq!(resolved.display_message, "Opening WhatsApp...");
        assert_eq!(resolved.action_id, "wa-1");
    }

    #[test]
    fn missing_trigger_message_falls_back_to_generic() {
        let action = test_action("call", ActionKind::Phone);
        let resolved = resolve("call", &[action]);
        assert_eq!(resolved.display_message, GENERIC_ACTION_MESSAGE);
    }

    #[test]
    fn blank_trigger_message_falls_back_to_generic() {
        let mut action = test_action("call", ActionKind::Phone);
        action.trigger_message = Some("   ".to_string());
        let resolved = resolve("call", &[action]);
        assert_eq!(resolved.display_message, GENERIC_ACTION_MESSAGE);
    }

    #[test]
    fn unknown_action_id_never_fails() {
        let resolved = resolve("no-such-action", &[]);
        assert_eq!(resolved.display_message, GENERIC_ACTION_MESSAGE);
        assert_eq!(resolved.action_id, "no-such-action");
    }
}
