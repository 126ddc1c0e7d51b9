use std::time::Instant;

use ratatui::layout::Rect;
use supportdesk_core::{
    AnalyticsReport, AnalyticsSource, AssistPanel, ChatSession, FeedbackKind, Gateway,
    GatewayError, GatewayResult, QueryResponse, ReportState, Ticket,
};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Chat,
    Agent,
    Admin,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Chat => "Chat",
            Screen::Agent => "Agent Assist",
            Screen::Admin => "Admin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Single-line text input with a character-based cursor
#[derive(Debug, Default)]
pub struct TextInput {
    pub text: String,
    pub cursor: usize,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl TextInput {
    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// Take the text out, leaving the input empty
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub status: Option<String>,
    pub backend_healthy: Option<bool>,

    // Chat state
    pub chat: ChatSession,
    pub chat_input: TextInput,
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of transcript area for scroll calculations
    pub chat_width: u16,  // Width of transcript area for wrap calculations
    pub selected_message: Option<usize>,
    pub show_citation_detail: bool,
    pub chat_task: Option<JoinHandle<GatewayResult<QueryResponse>>>,

    // Agent assist state
    pub assist: AssistPanel,
    pub assist_task: Option<JoinHandle<GatewayResult<QueryResponse>>>,
    pub debug_scroll: u16,

    // Admin state
    pub analytics_source: AnalyticsSource,
    pub report: ReportState,
    pub report_task: Option<JoinHandle<GatewayResult<AnalyticsReport>>>,

    pub health_task: Option<JoinHandle<bool>>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub transcript_area: Option<Rect>,

    pub gateway: Gateway,
}

impl App {
    pub fn new(gateway: Gateway, analytics_source: AnalyticsSource) -> Self {
        Self {
            should_quit: false,
            screen: Screen::Chat,
            input_mode: InputMode::Normal,
            status: None,
            backend_healthy: None,

            chat: ChatSession::new(),
            chat_input: TextInput::default(),
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            selected_message: None,
            show_citation_detail: false,
            chat_task: None,

            assist: AssistPanel::new(Ticket::sample()),
            assist_task: None,
            debug_scroll: 0,

            analytics_source,
            report: ReportState::Idle,
            report_task: None,

            health_task: None,

            animation_frame: 0,

            transcript_area: None,

            gateway,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.chat.is_loading() || self.assist.is_loading() || self.report.is_loading()
    }

    /// Tick animation frame and expire timed flags (called by Tick event)
    pub fn tick(&mut self, now: Instant) {
        if self.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        self.assist.tick(now);
    }

    // Chat actions

    /// Send what is in the chat input. Ignored while a reply is pending.
    pub fn submit_chat(&mut self) {
        if self.chat_task.is_some() {
            return;
        }

        let text = self.chat_input.text.clone();
        match self.chat.begin_turn(&text) {
            Ok(query) => {
                self.chat_input.take();
                let gateway = self.gateway.clone();
                self.chat_task = Some(tokio::spawn(async move { gateway.query(&query).await }));
                self.scroll_chat_to_bottom();
            }
            Err(e) => {
                tracing::debug!(error = %e, "chat submit ignored");
            }
        }
    }

    /// Assistant message indices, in transcript order
    fn assistant_indices(&self) -> Vec<usize> {
        self.chat
            .messages()
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_assistant())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn select_next_message(&mut self) {
        let indices = self.assistant_indices();
        let next = match self.selected_message {
            None => indices.last().copied(),
            Some(current) => indices
                .iter()
                .copied()
                .find(|&i| i > current)
                .or(Some(current)),
        };
        self.selected_message = next;
    }

    pub fn select_prev_message(&mut self) {
        let indices = self.assistant_indices();
        let prev = match self.selected_message {
            None => indices.last().copied(),
            Some(current) => indices
                .iter()
                .rev()
                .copied()
                .find(|&i| i < current)
                .or(Some(current)),
        };
        self.selected_message = prev;
    }

    /// Message the sources pane and feedback keys act on: the selection, else the latest reply
    pub fn focused_message_index(&self) -> Option<usize> {
        self.selected_message
            .or_else(|| self.assistant_indices().last().copied())
    }

    pub fn give_feedback(&mut self, kind: FeedbackKind) {
        let Some(index) = self.focused_message_index() else {
            return;
        };
        let message_id = self.chat.messages()[index].id.clone();

        match self.chat.record_feedback(&message_id, kind) {
            Ok(feedback) => {
                self.status = Some(match kind {
                    FeedbackKind::Positive => "Thanks for the feedback!".to_string(),
                    FeedbackKind::Negative => "Sorry about that. Feedback recorded.".to_string(),
                });
                // Fire-and-forget: there is no backend contract to await yet
                let gateway = self.gateway.clone();
                tokio::spawn(async move {
                    if let Err(e) = gateway
                        .send_feedback(&feedback.message_id, feedback.kind, feedback.reason.as_deref())
                        .await
                    {
                        tracing::warn!(error = %e, "feedback not delivered");
                    }
                });
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    pub fn toggle_handoff(&mut self) {
        if self.chat.request_handoff() {
            self.status = Some("Handoff requested. Press e again to cancel.".to_string());
        } else if self.chat.cancel_handoff() {
            self.status = Some("Handoff cancelled.".to_string());
        }
        self.scroll_chat_to_bottom();
    }

    /// Scroll transcript to bottom so the newest entry is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual transcript width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: usize = 0;

        for msg in self.chat.messages() {
            total_lines += 1; // Role line
            for line in msg.content.lines() {
                total_lines += line.chars().count() / wrap_width + 1;
            }
            if !msg.citations.is_empty() {
                total_lines += 1 + msg.citations.len(); // "Sources (n)" + one per card
            }
            if msg.confidence.is_some() {
                total_lines += 1;
            }
            total_lines += 1; // Blank line after message
        }

        if self.chat.is_loading() {
            total_lines += 2; // Role line + "AI is thinking..."
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        // Paragraph scroll offsets are u16; very long transcripts pin to the last reachable row
        let total_lines = u16::try_from(total_lines).unwrap_or(u16::MAX);
        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    // Agent actions

    pub fn generate_suggestion(&mut self) {
        if self.assist_task.is_some() {
            return;
        }

        match self.assist.begin_generate() {
            Ok(query) => {
                let gateway = self.gateway.clone();
                self.assist_task = Some(tokio::spawn(async move { gateway.query(&query).await }));
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    pub fn insert_suggestion(&mut self) {
        if let Err(e) = self.assist.insert_into_reply(Instant::now()) {
            self.status = Some(e.to_string());
        }
    }

    pub fn send_reply(&mut self) {
        self.status = Some(match self.assist.send_reply() {
            Some(_) => format!("Reply sent to {}.", self.assist.ticket().customer),
            None => "Reply is empty.".to_string(),
        });
    }

    // Admin actions

    pub fn load_report(&mut self) {
        if self.report_task.is_some() {
            return;
        }

        self.report = ReportState::Loading;
        let gateway = self.gateway.clone();
        let source = self.analytics_source;
        self.report_task = Some(tokio::spawn(async move { source.load(&gateway).await }));
    }

    pub fn check_health(&mut self) {
        if self.health_task.is_some() {
            return;
        }
        let gateway = self.gateway.clone();
        self.health_task = Some(tokio::spawn(async move { gateway.health_check().await }));
    }

    /// Collect finished background requests. Every slot is emptied exactly once,
    /// whether the request succeeded, failed, or its task died.
    pub async fn poll_tasks(&mut self) {
        if let Some(result) = take_finished(&mut self.chat_task).await {
            self.chat.finish_turn(result.unwrap_or_else(|e| Err(interrupted(e))));
            self.selected_message = None;
            self.scroll_chat_to_bottom();
        }

        if let Some(result) = take_finished(&mut self.assist_task).await {
            self.assist
                .finish_generate(result.unwrap_or_else(|e| Err(interrupted(e))));
            self.debug_scroll = 0;
        }

        if let Some(result) = take_finished(&mut self.report_task).await {
            self.report
                .finish(result.unwrap_or_else(|e| Err(interrupted(e))));
        }

        if let Some(result) = take_finished(&mut self.health_task).await {
            let healthy = result.unwrap_or(false);
            if !healthy {
                tracing::warn!(url = self.gateway.base_url(), "backend unreachable");
            }
            self.backend_healthy = Some(healthy);
        }
    }
}

/// Await a task only once it has completed, so polling never blocks the UI
async fn take_finished<T>(
    slot: &mut Option<JoinHandle<T>>,
) -> Option<Result<T, tokio::task::JoinError>> {
    if !slot.as_ref().map(|task| task.is_finished()).unwrap_or(false) {
        return None;
    }
    let task = slot.take()?;
    Some(task.await)
}

fn interrupted(e: tokio::task::JoinError) -> GatewayError {
    GatewayError::Interrupted(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use supportdesk_core::Citation;

    /// App pointed at a port nothing listens on
    fn test_app() -> App {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        App::new(Gateway::new(&format!("http://127.0.0.1:{}", port)), AnalyticsSource::Static)
    }

    fn reply(score: f64) -> GatewayResult<QueryResponse> {
        Ok(QueryResponse {
            query: String::new(),
            answer: "answer".to_string(),
            context: vec![Citation::new("faq.md", "", score)],
            confidence: None,
            cached: false,
        })
    }

    #[test]
    fn test_text_input_utf8_editing() {
        let mut input = TextInput::default();
        for c in "héllo".chars() {
            input.insert(c);
        }
        input.left();
        input.backspace();
        assert_eq!(input.text, "hélo");
        input.home();
        input.delete();
        assert_eq!(input.text, "élo");
        input.end();
        assert_eq!(input.cursor, 3);
        assert_eq!(input.take(), "élo");
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn test_message_selection_skips_user_messages() {
        let mut app = test_app();
        app.chat.begin_turn("one").unwrap();
        app.chat.finish_turn(reply(0.9));
        app.chat.begin_turn("two").unwrap();
        app.chat.finish_turn(reply(0.4));
        // welcome(0) user(1) assistant(2) user(3) assistant(4)

        assert_eq!(app.focused_message_index(), Some(4));
        app.select_prev_message();
        assert_eq!(app.selected_message, Some(4));
        app.select_prev_message();
        assert_eq!(app.selected_message, Some(2));
        app.select_prev_message();
        assert_eq!(app.selected_message, Some(0));
        app.select_prev_message();
        assert_eq!(app.selected_message, Some(0));
        app.select_next_message();
        assert_eq!(app.selected_message, Some(2));
    }

    #[test]
    fn test_scroll_to_bottom_survives_huge_answer() {
        let mut app = test_app();
        app.chat_height = 20;
        app.chat_width = 80;
        app.chat.begin_turn("dump the logs").unwrap();
        app.chat.finish_turn(Ok(QueryResponse {
            query: String::new(),
            answer: "x\n".repeat(70_000),
            context: Vec::new(),
            confidence: None,
            cached: false,
        }));

        app.scroll_chat_to_bottom();
        assert_eq!(app.chat_scroll, u16::MAX - 20);
    }

    #[test]
    fn test_scroll_to_bottom_counts_wrapped_lines() {
        let mut app = test_app();
        app.chat_height = 5;
        app.chat_width = 10;
        app.chat.begin_turn(&"y".repeat(25)).unwrap();
        // welcome: role + content(wrapped) + blank; user: role + 3 wrapped rows + blank; thinking: 2
        app.scroll_chat_to_bottom();

        let welcome_rows = supportdesk_core::chat::WELCOME_MESSAGE
            .lines()
            .map(|l| l.chars().count() / 10 + 1)
            .sum::<usize>();
        let expected = (1 + welcome_rows + 1) + (1 + 3 + 1) + 2;
        assert_eq!(app.chat_scroll as usize, expected - 5);
    }

    #[tokio::test]
    async fn feedback_targets_latest_reply() {
        let mut app = test_app();
        app.chat.begin_turn("one").unwrap();
        app.chat.finish_turn(reply(0.9));

        app.give_feedback(FeedbackKind::Positive);
        let id = app.chat.messages()[2].id.clone();
        assert_eq!(app.chat.feedback_for(&id), Some(FeedbackKind::Positive));
    }

    #[test]
    fn test_handoff_toggle() {
        let mut app = test_app();
        app.toggle_handoff();
        assert!(matches!(
            app.chat.handoff(),
            supportdesk_core::HandoffStatus::Requested { .. }
        ));
        app.toggle_handoff();
        assert_eq!(app.chat.handoff(), supportdesk_core::HandoffStatus::None);
    }

    #[tokio::test]
    async fn submit_is_optimistic_and_single_flight() {
        let mut app = test_app();
        app.chat_input.text = "hello".to_string();
        app.submit_chat();

        assert_eq!(app.chat.messages().len(), 2);
        assert!(app.chat.is_loading());
        assert!(app.chat_task.is_some());
        assert!(app.chat_input.text.is_empty());

        app.chat_input.text = "again".to_string();
        app.submit_chat();
        assert_eq!(app.chat.messages().len(), 2);
        assert_eq!(app.chat_input.text, "again");
    }

    #[tokio::test]
    async fn failed_request_settles_through_poll() {
        let mut app = test_app();
        app.chat_input.text = "hello".to_string();
        app.submit_chat();

        // Nothing listens on the port, so the task finishes with a network error
        while app.chat_task.is_some() {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            app.poll_tasks().await;
        }

        assert_eq!(app.chat.messages().len(), 3);
        assert_eq!(
            app.chat.messages()[2].content,
            supportdesk_core::chat::APOLOGY_MESSAGE
        );
        assert!(!app.chat.is_loading());
    }

    #[tokio::test]
    async fn static_report_loads() {
        let mut app = test_app();
        app.load_report();
        assert!(app.report.is_loading());

        while app.report_task.is_some() {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            app.poll_tasks().await;
        }
        assert_eq!(app.report.report(), Some(&AnalyticsReport::sample()));
    }
}
