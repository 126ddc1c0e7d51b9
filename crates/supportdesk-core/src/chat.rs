//! Chat transcript and the request lifecycle of a user turn.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::{ChatError, GatewayError, GatewayResult};
use crate::gateway::Gateway;
use crate::model::{Feedback, FeedbackKind, Message, QueryResponse};

pub const WELCOME_MESSAGE: &str =
    "Hello! I'm your AI support assistant. How can I help you today?";
pub const APOLOGY_MESSAGE: &str = "I apologize, but I encountered an issue processing your request. Please try again or contact support.";
pub const HANDOFF_REQUESTED_MESSAGE: &str = "Connecting you to a human agent...";
pub const HANDOFF_CANCELLED_MESSAGE: &str = "Handoff request cancelled.";

/// Whether the user has asked to be handed off to a human
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandoffStatus {
    #[default]
    None,
    Requested { at: DateTime<Utc> },
}

/// One conversation: an append-only transcript plus the single loading flag
/// that gates the input.
pub struct ChatSession {
    messages: Vec<Message>,
    is_loading: bool,
    last_error: Option<GatewayError>,
    feedback: HashMap<String, FeedbackKind>,
    handoff: HandoffStatus,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        let mut welcome = Message::assistant(WELCOME_MESSAGE);
        welcome.id = "welcome".to_string();

        Self {
            messages: vec![welcome],
            is_loading: false,
            last_error: None,
            feedback: HashMap::new(),
            handoff: HandoffStatus::None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Error behind the most recent apology, for views that want to show details
    pub fn last_error(&self) -> Option<&GatewayError> {
        self.last_error.as_ref()
    }

    pub fn handoff(&self) -> HandoffStatus {
        self.handoff
    }

    pub fn feedback_for(&self, message_id: &str) -> Option<FeedbackKind> {
        self.feedback.get(message_id).copied()
    }

    /// Append the user's message and mark the session busy.
    ///
    /// Returns the trimmed text to send to the backend.
    pub fn begin_turn(&mut self, text: &str) -> Result<String, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if self.is_loading {
            return Err(ChatError::Busy);
        }

        self.messages.push(Message::user(text));
        self.is_loading = true;
        Ok(text.to_string())
    }

    /// Append the assistant's reply (or the apology) and clear the busy flag.
    pub fn finish_turn(&mut self, result: GatewayResult<QueryResponse>) {
        match result {
            Ok(response) => {
                let confidence = response.confidence();
                let message = Message::assistant(response.answer)
                    .with_citations(response.context)
                    .with_confidence(confidence)
                    .cached(response.cached);
                self.messages.push(message);
                self.last_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = ?e.kind(), "query failed");
                self.messages.push(Message::error(APOLOGY_MESSAGE));
                self.last_error = Some(e);
            }
        }
        self.is_loading = false;
    }

    /// Run a whole turn against the backend, awaiting inline. Used by the one-shot
    /// `ask` command; the console splits the turn so the request can run in a task.
    pub async fn send(&mut self, gateway: &Gateway, text: &str) -> Result<(), ChatError> {
        let query = self.begin_turn(text)?;
        let result = gateway.query(&query).await;
        self.finish_turn(result);
        Ok(())
    }

    /// Remember a vote on an assistant message. A later vote replaces an earlier one.
    ///
    /// Returns the feedback to forward to the gateway.
    pub fn record_feedback(&mut self, message_id: &str, kind: FeedbackKind) -> Result<Feedback, ChatError> {
        let message = self
            .messages
            .iter()
            .find(|m| m.id == message_id)
            .ok_or_else(|| ChatError::MessageNotFound(message_id.to_string()))?;
        if !message.is_assistant() {
            return Err(ChatError::NotAnAssistantMessage);
        }

        self.feedback.insert(message_id.to_string(), kind);
        Ok(Feedback {
            message_id: message_id.to_string(),
            kind,
            reason: None,
        })
    }

    /// Ask for a human agent. Returns `false` if a request is already pending.
    pub fn request_handoff(&mut self) -> bool {
        if matches!(self.handoff, HandoffStatus::Requested { .. }) {
            return false;
        }

        self.handoff = HandoffStatus::Requested { at: Utc::now() };
        self.messages.push(Message::system(HANDOFF_REQUESTED_MESSAGE));
        tracing::info!("human handoff requested");
        true
    }

    /// Withdraw a pending handoff. Returns `false` if none was pending.
    pub fn cancel_handoff(&mut self) -> bool {
        if self.handoff == HandoffStatus::None {
            return false;
        }

        self.handoff = HandoffStatus::None;
        self.messages.push(Message::system(HANDOFF_CANCELLED_MESSAGE));
        tracing::info!("human handoff cancelled");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidence::{ConfidenceBadge, ConfidenceTier};
    use crate::model::{Citation, Role};
    use reqwest::StatusCode;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn answer(context: Vec<Citation>) -> QueryResponse {
        QueryResponse {
            query: "q".to_string(),
            answer: "a".to_string(),
            context,
            confidence: None,
            cached: false,
        }
    }

    #[test]
    fn test_new_session_has_welcome() {
        let session = ChatSession::new();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].id, "welcome");
        assert_eq!(session.messages()[0].content, WELCOME_MESSAGE);
        assert!(!session.is_loading());
    }

    #[test]
    fn test_begin_turn_appends_user_message_immediately() {
        let mut session = ChatSession::new();
        let query = session.begin_turn("  How do I reset my password?  ").unwrap();

        assert_eq!(query, "How do I reset my password?");
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1].role, Role::User);
        assert_eq!(session.messages()[1].content, "How do I reset my password?");
        assert!(session.is_loading());
    }

    #[test]
    fn test_begin_turn_rejects_empty_text() {
        let mut session = ChatSession::new();
        assert!(matches!(session.begin_turn("   "), Err(ChatError::EmptyMessage)));
        assert_eq!(session.messages().len(), 1);
        assert!(!session.is_loading());
    }

    #[test]
    fn test_begin_turn_rejects_second_in_flight_request() {
        let mut session = ChatSession::new();
        session.begin_turn("first").unwrap();
        assert!(matches!(session.begin_turn("second"), Err(ChatError::Busy)));
        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn test_finish_turn_success_attaches_citations_and_confidence() {
        let mut session = ChatSession::new();
        session.begin_turn("q").unwrap();
        session.finish_turn(Ok(answer(vec![
            Citation::new("a.md", "", 0.9),
            Citation::new("b.md", "", 0.7),
        ])));

        let reply = session.messages().last().unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.citations.len(), 2);
        assert_eq!(reply.confidence, Some(0.8));
        assert!(!session.is_loading());
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_finish_turn_empty_context_uses_default_confidence() {
        let mut session = ChatSession::new();
        session.begin_turn("q").unwrap();
        session.finish_turn(Ok(answer(Vec::new())));

        assert_eq!(session.messages().last().unwrap().confidence, Some(0.5));
    }

    #[test]
    fn test_finish_turn_failure_appends_single_apology() {
        let mut session = ChatSession::new();
        session.begin_turn("q").unwrap();
        session.finish_turn(Err(GatewayError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        }));

        assert_eq!(session.messages().len(), 3);
        let reply = session.messages().last().unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, APOLOGY_MESSAGE);
        assert!(reply.citations.is_empty());
        assert!(reply.confidence.is_none());
        assert!(!session.is_loading());
        assert_eq!(
            session.last_error().and_then(|e| e.status()),
            Some(StatusCode::BAD_GATEWAY)
        );
    }

    #[test]
    fn test_session_usable_after_failure() {
        let mut session = ChatSession::new();
        session.begin_turn("q").unwrap();
        session.finish_turn(Err(GatewayError::EmptyQuery));
        assert!(session.begin_turn("again").is_ok());
    }

    #[test]
    fn test_feedback_only_on_assistant_messages() {
        let mut session = ChatSession::new();
        session.begin_turn("q").unwrap();
        session.finish_turn(Ok(answer(Vec::new())));

        let user_id = session.messages()[1].id.clone();
        let reply_id = session.messages()[2].id.clone();

        assert!(matches!(
            session.record_feedback(&user_id, FeedbackKind::Positive),
            Err(ChatError::NotAnAssistantMessage)
        ));
        assert!(matches!(
            session.record_feedback("nope", FeedbackKind::Positive),
            Err(ChatError::MessageNotFound(_))
        ));

        session.record_feedback(&reply_id, FeedbackKind::Positive).unwrap();
        let feedback = session.record_feedback(&reply_id, FeedbackKind::Negative).unwrap();
        assert_eq!(feedback.message_id, reply_id);
        assert_eq!(feedback.kind, FeedbackKind::Negative);
        assert_eq!(session.feedback_for(&reply_id), Some(FeedbackKind::Negative));
    }

    #[test]
    fn test_handoff_is_cancellable() {
        let mut session = ChatSession::new();
        assert!(!session.cancel_handoff());

        assert!(session.request_handoff());
        assert!(matches!(session.handoff(), HandoffStatus::Requested { .. }));
        assert!(!session.request_handoff());
        assert_eq!(session.messages().last().unwrap().role, Role::System);

        assert!(session.cancel_handoff());
        assert_eq!(session.handoff(), HandoffStatus::None);
        assert_eq!(
            session.messages().last().unwrap().content,
            HANDOFF_CANCELLED_MESSAGE
        );
    }

    #[tokio::test]
    async fn password_reset_conversation() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "answer": "Go to settings > security.",
                "context": [{ "source": "faq.md", "content": "...", "score": 0.95 }]
            })))
            .mount(&server)
            .await;

        let gateway = Gateway::new(&server.uri());
        let mut session = ChatSession::new();

        let query = session.begin_turn("How do I reset my password?").unwrap();
        assert_eq!(session.messages().len(), 2);

        let result = gateway.query(&query).await;
        session.finish_turn(result);
        assert_eq!(session.messages().len(), 3);

        let reply = &session.messages()[2];
        assert_eq!(reply.content, "Go to settings > security.");
        assert_eq!(reply.citations.len(), 1);
        assert_eq!(reply.citations[0].filename(), "faq.md");
        assert_eq!(reply.citations[0].match_label(), "95% match");

        let badge = ConfidenceBadge::new(reply.confidence.unwrap());
        assert_eq!(badge.tier, ConfidenceTier::High);
        assert_eq!(badge.percentage, 95);
    }

    #[tokio::test]
    async fn send_failure_resets_loading() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let gateway = Gateway::new(&server.uri());
        let mut session = ChatSession::new();
        session.send(&gateway, "hello").await.unwrap();

        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.messages()[2].content, APOLOGY_MESSAGE);
        assert!(!session.is_loading());
    }
}
