//! Agent-assist console: a support ticket paired with AI-drafted replies.

use std::time::{Duration, Instant};

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::error::{AssistError, GatewayResult};
use crate::gateway::Gateway;
use crate::model::{Citation, QueryResponse};

pub const SUGGESTION_FAILED_MESSAGE: &str = "Failed to generate suggestion. Please try again.";

/// How long the "Copied!" confirmation stays up
pub const COPY_CONFIRMATION: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    Open,
    Pending,
    Resolved,
}

#[derive(Debug, Clone)]
pub struct Ticket {
    pub id: String,
    pub customer: String,
    pub email: String,
    pub subject: String,
    pub content: String,
    pub priority: Priority,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    /// The demo ticket loaded into the console
    pub fn sample() -> Self {
        Self {
            id: "12345".to_string(),
            customer: "Jane Doe".to_string(),
            email: "jane.doe@example.com".to_string(),
            subject: "Payment Gateway Timeout Error".to_string(),
            content: "Hi,\n\n\
                I've been trying to complete a payment for the past hour but keep getting a \
                \"504 Gateway Timeout\" error. I've tried multiple times with different cards \
                but the issue persists.\n\n\
                This is urgent as I need to complete this purchase today.\n\n\
                Thanks,\nJane"
                .to_string(),
            priority: Priority::High,
            status: TicketStatus::Open,
            created_at: Utc
                .with_ymd_and_hms(2024, 1, 22, 10, 30, 0)
                .single()
                .unwrap_or_else(Utc::now),
        }
    }

    /// Single query synthesized from subject and body
    pub fn suggestion_query(&self) -> String {
        format!("Customer issue: {}. Details: {}", self.subject, self.content)
    }

    /// Two-letter avatar text, e.g. `"JD"`
    pub fn initials(&self) -> String {
        self.customer
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase()
    }
}

#[derive(Serialize)]
struct DebugView<'a> {
    query: &'a str,
    citations: &'a [Citation],
}

/// State of the suggestion pane and the reply composer
pub struct AssistPanel {
    ticket: Ticket,
    answer: String,
    citations: Vec<Citation>,
    confidence: Option<f64>,
    is_loading: bool,
    copied_at: Option<Instant>,
    pub show_debug: bool,
    pub reply_draft: String,
    saved_draft: Option<String>,
}

impl AssistPanel {
    pub fn new(ticket: Ticket) -> Self {
        Self {
            ticket,
            answer: String::new(),
            citations: Vec::new(),
            confidence: None,
            is_loading: false,
            copied_at: None,
            show_debug: false,
            reply_draft: String::new(),
            saved_draft: None,
        }
    }

    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn has_suggestion(&self) -> bool {
        !self.answer.is_empty()
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn saved_draft(&self) -> Option<&str> {
        self.saved_draft.as_deref()
    }

    /// Mark the panel busy and return the query to send
    pub fn begin_generate(&mut self) -> Result<String, AssistError> {
        if self.is_loading {
            return Err(AssistError::Busy);
        }
        self.is_loading = true;
        Ok(self.ticket.suggestion_query())
    }

    /// Apply the backend result. A failure clears any earlier citations so the
    /// pane never shows evidence for an answer it no longer displays.
    pub fn finish_generate(&mut self, result: GatewayResult<QueryResponse>) {
        match result {
            Ok(response) => {
                self.confidence = Some(response.confidence());
                self.answer = response.answer;
                self.citations = response.context;
            }
            Err(e) => {
                tracing::warn!(error = %e, ticket = %self.ticket.id, "suggestion failed");
                self.answer = SUGGESTION_FAILED_MESSAGE.to_string();
                self.citations.clear();
                self.confidence = None;
            }
        }
        self.is_loading = false;
    }

    /// Generate and apply a suggestion in one call, holding `&mut self` across the
    /// request. For embedding callers that await inline; the console spawns the
    /// request itself and uses `begin_generate`/`finish_generate`.
    pub async fn generate(&mut self, gateway: &Gateway) -> Result<(), AssistError> {
        let query = self.begin_generate()?;
        let result = gateway.query(&query).await;
        self.finish_generate(result);
        Ok(())
    }

    /// Copy the current suggestion verbatim into the reply draft
    pub fn insert_into_reply(&mut self, now: Instant) -> Result<(), AssistError> {
        if self.answer.is_empty() {
            return Err(AssistError::NothingToInsert);
        }
        self.reply_draft = self.answer.clone();
        self.copied_at = Some(now);
        Ok(())
    }

    pub fn is_copied(&self, now: Instant) -> bool {
        self.copied_at
            .map(|at| now.duration_since(at) < COPY_CONFIRMATION)
            .unwrap_or(false)
    }

    /// Drop the copy confirmation once it has been shown long enough
    pub fn tick(&mut self, now: Instant) {
        if !self.is_copied(now) {
            self.copied_at = None;
        }
    }

    pub fn toggle_debug(&mut self) {
        self.show_debug = !self.show_debug;
    }

    /// Pretty JSON of what retrieval returned, for the debug inspector
    pub fn debug_json(&self) -> String {
        let view = DebugView {
            query: &self.ticket.subject,
            citations: &self.citations,
        };
        serde_json::to_string_pretty(&view).unwrap_or_default()
    }

    pub fn save_draft(&mut self) {
        tracing::info!(ticket = %self.ticket.id, chars = self.reply_draft.len(), "draft saved");
        self.saved_draft = Some(self.reply_draft.clone());
    }

    /// Hand the reply off. There is no ticketing backend, so this logs and
    /// clears the composer, returning the text that was sent.
    pub fn send_reply(&mut self) -> Option<String> {
        if self.reply_draft.trim().is_empty() {
            return None;
        }
        tracing::info!(ticket = %self.ticket.id, "reply sent");
        self.saved_draft = None;
        Some(std::mem::take(&mut self.reply_draft))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn response(answer: &str, scores: &[f64]) -> QueryResponse {
        QueryResponse {
            query: String::new(),
            answer: answer.to_string(),
            context: scores
                .iter()
                .map(|s| Citation::new("kb/payments.md", "timeouts", *s))
                .collect(),
            confidence: None,
            cached: false,
        }
    }

    #[test]
    fn test_suggestion_query_combines_subject_and_body() {
        let ticket = Ticket::sample();
        let query = ticket.suggestion_query();
        assert!(query.starts_with("Customer issue: Payment Gateway Timeout Error. Details: Hi,"));
        assert!(query.contains("504 Gateway Timeout"));
        assert_eq!(ticket.initials(), "JD");
    }

    #[test]
    fn test_generate_success_populates_panel() {
        let mut panel = AssistPanel::new(Ticket::sample());
        panel.begin_generate().unwrap();
        assert!(panel.is_loading());

        panel.finish_generate(Ok(response("Retry after clearing cache.", &[0.9, 0.7])));
        assert_eq!(panel.answer(), "Retry after clearing cache.");
        assert_eq!(panel.citations().len(), 2);
        assert_eq!(panel.confidence(), Some(0.8));
        assert!(!panel.is_loading());
    }

    #[test]
    fn test_empty_context_matches_chat_default() {
        let mut panel = AssistPanel::new(Ticket::sample());
        panel.begin_generate().unwrap();
        panel.finish_generate(Ok(response("No sources.", &[])));
        assert_eq!(panel.confidence(), Some(0.5));
    }

    #[test]
    fn test_failure_clears_stale_citations() {
        let mut panel = AssistPanel::new(Ticket::sample());
        panel.begin_generate().unwrap();
        panel.finish_generate(Ok(response("first", &[0.9])));

        panel.begin_generate().unwrap();
        panel.finish_generate(Err(GatewayError::Decode("eof".to_string())));
        assert_eq!(panel.answer(), SUGGESTION_FAILED_MESSAGE);
        assert!(panel.citations().is_empty());
        assert!(panel.confidence().is_none());
        assert!(!panel.is_loading());
    }

    #[test]
    fn test_second_generate_while_loading_is_rejected() {
        let mut panel = AssistPanel::new(Ticket::sample());
        panel.begin_generate().unwrap();
        assert!(matches!(panel.begin_generate(), Err(AssistError::Busy)));
    }

    #[test]
    fn test_insert_into_reply_and_copy_flag_expiry() {
        let mut panel = AssistPanel::new(Ticket::sample());
        let now = Instant::now();
        assert!(matches!(
            panel.insert_into_reply(now),
            Err(AssistError::NothingToInsert)
        ));

        panel.begin_generate().unwrap();
        panel.finish_generate(Ok(response("Please retry.", &[0.6])));
        panel.insert_into_reply(now).unwrap();
        assert_eq!(panel.reply_draft, "Please retry.");
        assert!(panel.is_copied(now + Duration::from_millis(1500)));

        let later = now + Duration::from_millis(2100);
        assert!(!panel.is_copied(later));
        panel.tick(later);
        assert!(!panel.is_copied(now));

        // Draft is independent of later suggestions
        panel.reply_draft.push_str(" Thanks!");
        assert_eq!(panel.answer(), "Please retry.");
    }

    #[test]
    fn test_debug_json_lists_subject_and_citations() {
        let mut panel = AssistPanel::new(Ticket::sample());
        panel.begin_generate().unwrap();
        panel.finish_generate(Ok(response("x", &[0.4])));

        let json: serde_json::Value = serde_json::from_str(&panel.debug_json()).unwrap();
        assert_eq!(json["query"], "Payment Gateway Timeout Error");
        assert_eq!(json["citations"][0]["source"], "kb/payments.md");
    }

    #[test]
    fn test_save_and_send_draft() {
        let mut panel = AssistPanel::new(Ticket::sample());
        assert!(panel.send_reply().is_none());

        panel.reply_draft = "We are looking into it.".to_string();
        panel.save_draft();
        assert_eq!(panel.saved_draft(), Some("We are looking into it."));

        assert_eq!(panel.send_reply().as_deref(), Some("We are looking into it."));
        assert!(panel.reply_draft.is_empty());
        assert!(panel.saved_draft().is_none());
    }

    #[tokio::test]
    async fn generate_queries_backend_with_ticket_text() {
        let server = MockServer::start().await;
        let ticket = Ticket::sample();

        Mock::given(method("POST"))
            .and(path("/query"))
            .and(body_json(serde_json::json!({ "query": ticket.suggestion_query() })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "answer": "A 504 usually means the payment provider timed out.",
                "context": [{ "source": "runbooks/payments.md", "content": "504", "score": 0.82 }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = Gateway::new(&server.uri());
        let mut panel = AssistPanel::new(ticket);
        panel.generate(&gateway).await.unwrap();

        assert!(panel.answer().contains("timed out"));
        assert_eq!(panel.confidence(), Some(0.82));
    }
}
