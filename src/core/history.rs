//! Session transcript and the bounded model-context window.

use std::collections::VecDeque;

use crate::core::constants::CONTEXT_WINDOW_MESSAGES;
use crate::core::message::{ConversationMessage, Role};

/// Transcript of one session. The full transcript is kept for display; the
/// model backend only ever sees [`HistoryWindow::context_window`], bounded
/// to the most recent finalized entries. Persistence of older turns is the
/// storage collaborator's concern.
#[derive(Debug, Default)]
pub struct HistoryWindow {
    messages: VecDeque<ConversationMessage>,
    next_seq: u64,
}

impl HistoryWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &VecDeque<ConversationMessage> {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        let seq = self.bump_seq();
        self.messages.push_back(ConversationMessage::user(seq, text));
    }

    pub fn push_placeholder(&mut self) {
        let seq = self.bump_seq();
        self.messages
            .push_back(ConversationMessage::model_placeholder(seq));
    }

    /// The trailing model placeholder, if one is still being assembled.
    pub fn streaming_placeholder_mut(&mut self) -> Option<&mut ConversationMessage> {
        self.messages
            .back_mut()
            .filter(|message| message.role.is_model() && message.streaming)
    }

    /// Append a text delta to the open placeholder. Returns false when no
    /// placeholder is open (the delta is dropped).
    pub fn append_to_placeholder(&mut self, delta: &str) -> bool {
        match self.streaming_placeholder_mut() {
            Some(message) => {
                message.text.push_str(delta);
                true
            }
            None => false,
        }
    }

    /// Clear the streaming flag on the open placeholder, if any.
    pub fn finalize_placeholder(&mut self) {
        if let Some(message) = self.streaming_placeholder_mut() {
            message.streaming = false;
        }
    }

    /// Remove the open placeholder when nothing was accumulated into it, so
    /// a cancelled turn leaves no blank transcript entry.
    pub fn drop_empty_placeholder(&mut self) {
        let drop = self
            .messages
            .back()
            .is_some_and(|message| message.role.is_model() && message.streaming && message.text.is_empty());
        if drop {
            self.messages.pop_back();
        }
    }

    /// Remove the open placeholder along with whatever it accumulated.
    /// A department switch discards the in-flight turn this way.
    pub fn discard_placeholder(&mut self) {
        let discard = self
            .messages
            .back()
            .is_some_and(|message| message.role.is_model() && message.streaming);
        if discard {
            self.messages.pop_back();
        }
    }

    /// Discard the transcript and seed the new bot's single greeting.
    /// Sequence numbers keep increasing across the reset.
    pub fn reset_with_greeting(&mut self, greeting: &str) {
        self.messages.clear();
        let seq = self.bump_seq();
        self.messages
            .push_back(ConversationMessage::greeting(seq, greeting));
    }

    /// The finalized entries sent to the model backend as context: at most
    /// the K most recent, oldest first. An open placeholder never
    /// participates.
    pub fn context_window(&self) -> Vec<&ConversationMessage> {
        let finalized: Vec<&ConversationMessage> = self
            .messages
            .iter()
            .filter(|message| message.is_final())
            .collect();
        let start = finalized.len().saturating_sub(CONTEXT_WINDOW_MESSAGES);
        finalized[start..].to_vec()
    }

    /// The last finalized model message, used by hosts to read a turn's
    /// outcome.
    pub fn last_model_message(&self) -> Option<&ConversationMessage> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == Role::Model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_window_is_bounded_to_ten() {
        let mut history = HistoryWindow::new();
        for i in 0..30 {
            history.push_user(format!("message {i}"));
        }

        assert_eq!(history.len(), 30);
        let window = history.context_window();
        assert_eq!(window.len(), CONTEXT_WINDOW_MESSAGES);
        // Oldest first, and it is the most recent K entries.
        assert_eq!(window[0].text, "message 20");
        assert_eq!(window[9].text, "message 29");
    }

    #[test]
    fn context_window_excludes_open_placeholder() {
        let mut history = HistoryWindow::new();
        history.push_user("hello");
        history.push_placeholder();

        let window = history.context_window();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].text, "hello");
    }

    #[test]
    fn placeholder_accumulates_deltas_in_order() {
        let mut history = HistoryWindow::new();
        history.push_user("hello");
        history.push_placeholder();

        assert!(history.append_to_placeholder("Hel"));
        assert!(history.append_to_placeholder("lo "));
        assert!(history.append_to_placeholder("there"));
        history.finalize_placeholder();

        let message = history.last_model_message().expect("model message");
        assert_eq!(message.text, "Hello there");
        assert!(!message.streaming);

        // Finalized messages no longer accept deltas.
        assert!(!history.append_to_placeholder("late"));
    }

    #[test]
    fn drop_empty_placeholder_only_removes_blank_entries() {
        let mut history = HistoryWindow::new();
        history.push_user("hello");
        history.push_placeholder();
        history.drop_empty_placeholder();
        assert_eq!(history.len(), 1);

        history.push_placeholder();
        history.append_to_placeholder("partial");
        history.drop_empty_placeholder();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn reset_seeds_exactly_one_greeting() {
        let mut history = HistoryWindow::new();
        for i in 0..5 {
            history.push_user(format!("message {i}"));
        }

        history.reset_with_greeting("Welcome to sales!");
        assert_eq!(history.len(), 1);
        let greeting = history.last_model_message().expect("greeting");
        assert_eq!(greeting.text, "Welcome to sales!");
        assert!(!greeting.streaming);
    }

    #[test]
    fn sequence_numbers_stay_monotonic_across_reset() {
        let mut history = HistoryWindow::new();
        history.push_user("one");
        history.push_user("two");
        let last_seq = history.messages().back().unwrap().seq;

        history.reset_with_greeting("hi");
        let greeting_seq = history.messages().back().unwrap().seq;
        assert!(greeting_seq > last_seq);
    }
}
