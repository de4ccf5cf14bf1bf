//! Dispatch flow: user input -> request -> reconciled transcript.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::{
    events::DispatchEvent,
    message::Message,
    transcript::Transcript,
    transport::Transport,
};

/// Banner text shown when a dispatch fails, whatever the failure kind.
pub const DIAGNOSTIC_TEXT: &str =
    "Failed to send message. Please check if the backend is running.";

/// How a `send` call resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Blank input or a dispatch already in flight; nothing changed.
    Ignored,
    /// The endpoint replied and the transcript gained a genuine
    /// assistant message.
    Replied,
    /// The dispatch failed and the transcript gained a synthetic
    /// apology instead.
    Failed,
}

/// Owns the transcript and runs one dispatch at a time against the
/// transport.
///
/// `send` takes `&mut self`, so the store cannot be mutated while a
/// dispatch is awaiting the endpoint; callers serialize all access.
pub struct Dispatcher {
    transcript: Transcript,
    transport: Arc<dyn Transport>,
    event_tx: broadcast::Sender<DispatchEvent>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            transcript: Transcript::seeded(),
            transport,
            event_tx,
        }
    }

    /// Subscribe to dispatch events.
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchEvent> {
        self.event_tx.subscribe()
    }

    /// Read access to the transcript for rendering.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Run one full dispatch for `text`.
    ///
    /// Blank input (after trimming) is a no-op, not an error. Exactly
    /// one request attempt is made; failures are absorbed into the
    /// transcript as a synthetic apology plus the diagnostic flag and
    /// are terminal for this call. Whatever happens, loading is false
    /// again when this returns.
    pub async fn send(&mut self, text: &str) -> DispatchOutcome {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return DispatchOutcome::Ignored;
        }
        // The input boundary already refuses sends while loading; this
        // guard keeps the invariant if a caller slips through.
        if self.transcript.is_loading() {
            tracing::warn!("send ignored: dispatch already in flight");
            return DispatchOutcome::Ignored;
        }

        self.append(Message::user(text));
        self.transcript.set_loading(true);
        self.transcript.set_error(None);
        let _ = self.event_tx.send(DispatchEvent::Started);

        let history = self.transcript.wire_history();
        let result = self.transport.exchange(history).await;

        let outcome = match result {
            Ok(content) => {
                self.append(Message::assistant(content));
                DispatchOutcome::Replied
            }
            Err(e) => {
                tracing::warn!(error = %e, server_side = e.is_server_side(), "dispatch failed");
                self.append(Message::apology());
                self.transcript.set_error(Some(DIAGNOSTIC_TEXT.to_string()));
                DispatchOutcome::Failed
            }
        };

        self.transcript.set_loading(false);
        let _ = self.event_tx.send(DispatchEvent::Finished {
            failed: outcome == DispatchOutcome::Failed,
        });
        outcome
    }

    /// Clear the error banner. The transcript is untouched; the
    /// synthetic apology stays where it is.
    pub fn dismiss_error(&mut self) {
        self.transcript.set_error(None);
    }

    /// Restore the single-welcome-message state.
    ///
    /// Emits no event: callers able to reset hold the store and re-read
    /// it directly, and a buffered append here would replay into any
    /// event-mirroring observer during the next dispatch.
    pub fn reset(&mut self) {
        self.transcript.reset();
    }

    fn append(&mut self, message: Message) {
        let _ = self.event_tx.send(DispatchEvent::MessageAppended {
            message: message.clone(),
        });
        self.transcript.append(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{APOLOGY_TEXT, Role, WELCOME_TEXT};
    use async_trait::async_trait;
    use confab_api::{Error, HistoryEntry, WireRole};
    use std::sync::Mutex;

    /// Transport that replies with a fixed string and records the
    /// histories it was asked to send.
    struct EchoTransport {
        reply: String,
        seen: Mutex<Vec<Vec<HistoryEntry>>>,
    }

    impl EchoTransport {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                seen: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl Transport for EchoTransport {
        async fn exchange(&self, history: Vec<HistoryEntry>) -> confab_api::Result<String> {
            self.seen.lock().unwrap().push(history);
            Ok(self.reply.clone())
        }
    }

    /// Transport that always fails with an HTTP 500.
    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn exchange(&self, _history: Vec<HistoryEntry>) -> confab_api::Result<String> {
            Err(Error::Status {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            })
        }
    }

    /// Transport that returns a body the caller cannot use.
    struct MalformedTransport;

    #[async_trait]
    impl Transport for MalformedTransport {
        async fn exchange(&self, _history: Vec<HistoryEntry>) -> confab_api::Result<String> {
            Err(Error::UnexpectedResponse("missing content field".into()))
        }
    }

    #[tokio::test]
    async fn test_successful_round() {
        let transport = Arc::new(EchoTransport::new("Hello there"));
        let mut dispatcher = Dispatcher::new(transport.clone());

        let outcome = dispatcher.send("Hi").await;
        assert_eq!(outcome, DispatchOutcome::Replied);

        let messages = dispatcher.transcript().messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, WELCOME_TEXT);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "Hi");
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[2].content, "Hello there");
        assert!(!messages[2].is_error);

        assert!(!dispatcher.transcript().is_loading());
        assert!(dispatcher.transcript().error().is_none());
    }

    #[tokio::test]
    async fn test_outgoing_history_includes_full_transcript() {
        let transport = Arc::new(EchoTransport::new("ok"));
        let mut dispatcher = Dispatcher::new(transport.clone());

        dispatcher.send("Hi").await;

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let history = &seen[0];
        // Welcome message first, mapped to the wire "ai" role, then the
        // just-appended user message.
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, WireRole::Ai);
        assert_eq!(history[0].content, WELCOME_TEXT);
        assert_eq!(history[1].role, WireRole::User);
        assert_eq!(history[1].content, "Hi");
    }

    #[tokio::test]
    async fn test_blank_sends_are_no_ops() {
        let transport = Arc::new(EchoTransport::new("ok"));
        let mut dispatcher = Dispatcher::new(transport.clone());

        assert_eq!(dispatcher.send("").await, DispatchOutcome::Ignored);
        assert_eq!(dispatcher.send("   ").await, DispatchOutcome::Ignored);
        assert_eq!(dispatcher.send("\n\t ").await, DispatchOutcome::Ignored);

        assert_eq!(dispatcher.transcript().messages().len(), 1);
        assert!(!dispatcher.transcript().is_loading());
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_while_loading_is_rejected() {
        let transport = Arc::new(EchoTransport::new("ok"));
        let mut dispatcher = Dispatcher::new(transport.clone());

        // `send` holds &mut self across the await, so a concurrent send
        // cannot exist; simulate the boundary being bypassed by forcing
        // the flag.
        dispatcher.transcript.set_loading(true);
        assert_eq!(dispatcher.send("hello").await, DispatchOutcome::Ignored);
        assert_eq!(dispatcher.transcript().messages().len(), 1);
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_http_failure_appends_apology_and_diagnostic() {
        let mut dispatcher = Dispatcher::new(Arc::new(FailingTransport));

        let outcome = dispatcher.send("test").await;
        assert_eq!(outcome, DispatchOutcome::Failed);

        let messages = dispatcher.transcript().messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].content, "test");
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[2].content, APOLOGY_TEXT);
        assert!(messages[2].is_error);

        assert_eq!(dispatcher.transcript().error(), Some(DIAGNOSTIC_TEXT));
        assert!(!dispatcher.transcript().is_loading());
    }

    #[tokio::test]
    async fn test_malformed_body_collapses_to_same_outcome() {
        let mut dispatcher = Dispatcher::new(Arc::new(MalformedTransport));

        let outcome = dispatcher.send("test").await;
        assert_eq!(outcome, DispatchOutcome::Failed);
        assert_eq!(dispatcher.transcript().error(), Some(DIAGNOSTIC_TEXT));
        assert!(dispatcher.transcript().messages()[2].is_error);
    }

    #[tokio::test]
    async fn test_failure_does_not_block_future_sends() {
        let mut dispatcher = Dispatcher::new(Arc::new(FailingTransport));
        dispatcher.send("one").await;
        assert!(!dispatcher.transcript().is_loading());

        dispatcher.send("two").await;
        // Two full rounds: welcome + 2 * (user + apology).
        assert_eq!(dispatcher.transcript().messages().len(), 5);
    }

    #[tokio::test]
    async fn test_new_send_clears_previous_error() {
        let mut dispatcher = Dispatcher::new(Arc::new(FailingTransport));
        dispatcher.send("one").await;
        assert!(dispatcher.transcript().error().is_some());

        // The next dispatch clears the banner at its start; this one
        // fails again, so it comes back, but via a fresh set.
        let mut events = dispatcher.subscribe();
        dispatcher.send("two").await;
        // Drain: user append, started, apology append, finished.
        let mut saw_started = false;
        while let Ok(event) = events.try_recv() {
            if matches!(event, DispatchEvent::Started) {
                saw_started = true;
            }
        }
        assert!(saw_started);
    }

    #[tokio::test]
    async fn test_dismiss_error_keeps_transcript() {
        let mut dispatcher = Dispatcher::new(Arc::new(FailingTransport));
        dispatcher.send("test").await;

        let len_before = dispatcher.transcript().messages().len();
        dispatcher.dismiss_error();

        assert!(dispatcher.transcript().error().is_none());
        assert_eq!(dispatcher.transcript().messages().len(), len_before);
        // The synthetic apology is never removed.
        assert!(dispatcher.transcript().messages()[2].is_error);
    }

    #[tokio::test]
    async fn test_reset_after_failure() {
        let mut dispatcher = Dispatcher::new(Arc::new(FailingTransport));
        dispatcher.send("test").await;

        dispatcher.reset();
        assert_eq!(dispatcher.transcript().messages().len(), 1);
        assert_eq!(dispatcher.transcript().messages()[0].content, WELCOME_TEXT);
        assert!(dispatcher.transcript().error().is_none());
    }

    #[tokio::test]
    async fn test_reset_leaves_no_buffered_events() {
        let mut dispatcher = Dispatcher::new(Arc::new(EchoTransport::new("ok")));
        dispatcher.send("hi").await;

        // Long-lived subscription, the way a UI loop holds one.
        let mut events = dispatcher.subscribe();
        dispatcher.reset();
        assert!(events.try_recv().is_err());

        // The next dispatch must replay only its own messages; a
        // buffered welcome append from the reset would duplicate the
        // greeting in any observer mirroring the transcript from
        // events.
        dispatcher.send("again").await;
        let mut appended = vec![];
        while let Ok(event) = events.try_recv() {
            if let DispatchEvent::MessageAppended { message } = event {
                appended.push(message.content);
            }
        }
        assert_eq!(appended, vec!["again".to_string(), "ok".to_string()]);
    }

    #[tokio::test]
    async fn test_event_sequence_for_one_round() {
        let mut dispatcher = Dispatcher::new(Arc::new(EchoTransport::new("reply")));
        let mut events = dispatcher.subscribe();

        dispatcher.send("Hi").await;

        let mut kinds = vec![];
        while let Ok(event) = events.try_recv() {
            kinds.push(match event {
                DispatchEvent::MessageAppended { message } => {
                    format!("append:{:?}", message.role)
                }
                DispatchEvent::Started => "started".to_string(),
                DispatchEvent::Finished { failed } => format!("finished:{}", failed),
            });
        }
        assert_eq!(
            kinds,
            vec!["append:User", "started", "append:Assistant", "finished:false"]
        );
    }

    #[tokio::test]
    async fn test_rounds_preserve_arrival_order() {
        let mut dispatcher = Dispatcher::new(Arc::new(EchoTransport::new("r")));
        for text in ["a", "b", "c"] {
            dispatcher.send(text).await;
        }

        let roles: Vec<Role> = dispatcher
            .transcript()
            .messages()
            .iter()
            .map(|m| m.role)
            .collect();
        assert_eq!(
            roles,
            vec![
                Role::Assistant, // welcome
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
            ]
        );
    }
}
