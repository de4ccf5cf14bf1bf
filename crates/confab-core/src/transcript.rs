//! Transcript state: the ordered message sequence and its derived flags.

use confab_api::{HistoryEntry, WireRole};

use crate::message::{Message, Role};

/// The session transcript and its derived flags.
///
/// Mutated only through the named operations below; observers read it
/// and re-render. Invariant: never empty once seeded — a welcome
/// message is present at session start and restored by [`reset`].
///
/// [`reset`]: Transcript::reset
pub struct Transcript {
    messages: Vec<Message>,
    is_loading: bool,
    error: Option<String>,
}

impl Transcript {
    /// A transcript of exactly one fresh welcome message.
    pub fn seeded() -> Self {
        Self {
            messages: vec![Message::welcome()],
            is_loading: false,
            error: None,
        }
    }

    /// Messages in insertion order (== display == chronological order).
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// True exactly while one dispatch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Description of the last dispatch failure, if not yet dismissed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Append to the end. Never reorders or drops.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Replace everything with a single fresh welcome message and
    /// clear the error flag.
    pub fn reset(&mut self) {
        self.messages = vec![Message::welcome()];
        self.error = None;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    /// Project the full transcript to the wire history the endpoint
    /// expects, mapping the internal `Assistant` role to `ai`.
    pub fn wire_history(&self) -> Vec<HistoryEntry> {
        self.messages
            .iter()
            .map(|msg| {
                let role = match msg.role {
                    Role::User => WireRole::User,
                    Role::Assistant => WireRole::Ai,
                };
                HistoryEntry::new(role, msg.content.clone())
            })
            .collect()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::WELCOME_TEXT;

    #[test]
    fn test_seeded_transcript_has_single_welcome() {
        let transcript = Transcript::seeded();
        assert_eq!(transcript.messages().len(), 1);
        assert_eq!(transcript.messages()[0].content, WELCOME_TEXT);
        assert!(!transcript.is_loading());
        assert!(transcript.error().is_none());
    }

    #[test]
    fn test_append_preserves_order() {
        let mut transcript = Transcript::seeded();
        transcript.append(Message::user("first"));
        transcript.append(Message::assistant("second"));

        let contents: Vec<&str> = transcript
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec![WELCOME_TEXT, "first", "second"]);
    }

    #[test]
    fn test_reset_restores_seed_and_clears_error() {
        let mut transcript = Transcript::seeded();
        transcript.append(Message::user("hi"));
        transcript.set_error(Some("boom".into()));

        let old_id = transcript.messages()[0].id;
        transcript.reset();

        assert_eq!(transcript.messages().len(), 1);
        assert_eq!(transcript.messages()[0].content, WELCOME_TEXT);
        assert_ne!(transcript.messages()[0].id, old_id);
        assert!(transcript.error().is_none());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut transcript = Transcript::seeded();
        transcript.append(Message::user("hi"));

        transcript.reset();
        let first: Vec<String> = transcript
            .messages()
            .iter()
            .map(|m| m.content.clone())
            .collect();

        transcript.reset();
        let second: Vec<String> = transcript
            .messages()
            .iter()
            .map(|m| m.content.clone())
            .collect();

        assert_eq!(first, second);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_wire_history_maps_assistant_to_ai() {
        let mut transcript = Transcript::seeded();
        transcript.append(Message::user("Hi"));

        let history = transcript.wire_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, WireRole::Ai);
        assert_eq!(history[0].content, WELCOME_TEXT);
        assert_eq!(history[1].role, WireRole::User);
        assert_eq!(history[1].content, "Hi");
    }
}
