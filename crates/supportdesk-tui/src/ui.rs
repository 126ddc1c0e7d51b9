use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
};
use supportdesk_core::analytics::Trend;
use supportdesk_core::assist::Priority;
use supportdesk_core::chat::APOLOGY_MESSAGE;
use supportdesk_core::{
    AnalyticsReport, Citation, ConfidenceBadge, ConfidenceTier, FeedbackKind, HandoffStatus,
    Message, ReportState, Role,
};

use crate::app::{App, InputMode, Screen};

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;

            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

fn tier_color(tier: ConfidenceTier) -> Color {
    match tier {
        ConfidenceTier::High => Color::Green,
        ConfidenceTier::Medium => Color::Yellow,
        ConfidenceTier::Low => Color::Red,
    }
}

/// Colored pill: tier label plus percentage
fn confidence_badge(confidence: f64) -> Span<'static> {
    let badge = ConfidenceBadge::new(confidence);
    Span::styled(
        format!(" {} {}% ", badge.tier.label(), badge.percentage),
        Style::default()
            .bg(tier_color(badge.tier))
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    )
}

fn thinking_line(label: &str, frame: u8) -> Line<'static> {
    // Animated ellipsis: cycles through ".", "..", "..."
    let dots = ".".repeat((frame as usize) + 1);
    Line::from(Span::styled(
        format!("{}{}", label, dots),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    ))
}

fn citation_line(index: usize, citation: &Citation) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  [{}] ", index + 1), Style::default().fg(Color::DarkGray)),
        Span::styled(citation.filename().to_string(), Style::default().fg(Color::Magenta)),
        Span::raw(" "),
        Span::styled(citation.match_label(), Style::default().fg(Color::DarkGray)),
    ])
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Chat => render_chat_screen(app, frame, body_area),
        Screen::Agent => render_agent_screen(app, frame, body_area),
        Screen::Admin => render_admin_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::styled(
        " SupportDesk ",
        Style::default().fg(Color::Cyan).bold(),
    )];

    for (key, screen) in [("1", Screen::Chat), ("2", Screen::Agent), ("3", Screen::Admin)] {
        let style = if app.screen == screen {
            Style::default().fg(Color::White).bold().underlined()
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} {} ", key, screen.title()), style));
    }

    let (health_text, health_color) = match app.backend_healthy {
        Some(true) => ("● online", Color::Green),
        Some(false) => ("● offline", Color::Red),
        None => ("○ checking", Color::Gray),
    };
    spans.push(Span::raw("  "));
    spans.push(Span::styled(health_text, Style::default().fg(health_color)));
    spans.push(Span::styled(
        format!(" {} ", app.gateway.base_url()),
        Style::default().fg(Color::Gray),
    ));
    spans.push(Span::styled(
        format!("v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::Gray),
    ));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.screen {
        Screen::Chat => " CHAT ",
        Screen::Agent => " AGENT ",
        Screen::Admin => " ADMIN ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let pairs: &[(&str, &str)] = match (app.screen, app.input_mode) {
        (Screen::Chat, InputMode::Normal) => &[
            ("i", "type"),
            ("j/k", "select"),
            ("+/-", "feedback"),
            ("c", "details"),
            ("e", "human"),
            ("1-3", "screen"),
            ("q", "quit"),
        ],
        (Screen::Chat, InputMode::Editing) => &[("Enter", "send"), ("Esc", "stop typing")],
        (Screen::Agent, InputMode::Normal) => &[
            ("g", "generate"),
            ("r", "insert"),
            ("d", "debug"),
            ("i", "edit"),
            ("s", "save"),
            ("S", "send"),
            ("1-3", "screen"),
            ("q", "quit"),
        ],
        (Screen::Agent, InputMode::Editing) => &[("Enter", "newline"), ("Esc", "stop editing")],
        (Screen::Admin, _) => &[("r", "reload"), ("1-3", "screen"), ("q", "quit")],
    };

    let mut spans = vec![
        Span::styled(mode_text, mode_style),
        Span::styled(" ", label_style),
    ];
    for (key, label) in pairs {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
    }
    if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!("  {}", status),
            Style::default().bg(Color::Black).fg(Color::Yellow),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

// Chat screen

fn message_lines(
    msg: &Message,
    selected: bool,
    feedback: Option<FeedbackKind>,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let role_color = match msg.role {
        Role::User => Color::Cyan,
        Role::Assistant => Color::Yellow,
        Role::System => Color::Magenta,
    };
    let mut header = vec![
        Span::styled(
            if selected { "▶ " } else { "" },
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{}:", msg.role.display_name()),
            Style::default().fg(role_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {}", msg.timestamp.format("%H:%M")),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if msg.is_cached {
        header.push(Span::styled(" [cached]", Style::default().fg(Color::Blue)));
    }
    match feedback {
        Some(FeedbackKind::Positive) => {
            header.push(Span::styled(" 👍 helpful", Style::default().fg(Color::Green)));
        }
        Some(FeedbackKind::Negative) => {
            header.push(Span::styled(" 👎 not helpful", Style::default().fg(Color::Red)));
        }
        None => {}
    }
    lines.push(Line::from(header));

    for line in msg.content.lines() {
        if msg.is_user() {
            lines.push(Line::from(line.to_string()));
        } else {
            lines.push(parse_markdown_line(line));
        }
    }

    if !msg.citations.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("Sources ({})", msg.citations.len()),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
        )));
        for (i, citation) in msg.citations.iter().enumerate() {
            lines.push(citation_line(i, citation));
        }
    }

    if let Some(confidence) = msg.confidence {
        lines.push(Line::from(confidence_badge(confidence)));
    }

    lines.push(Line::default());
    lines
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, sources_area] = Layout::horizontal([
        Constraint::Percentage(65),
        Constraint::Percentage(35),
    ])
    .areas(area);

    let handoff_height = match app.chat.handoff() {
        HandoffStatus::Requested { .. } => 1,
        HandoffStatus::None => 0,
    };
    let [transcript_area, handoff_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(handoff_height),
        Constraint::Length(3),
    ])
    .areas(chat_area);

    // Store transcript dimensions for scroll calculations and hit-testing (inner size minus borders)
    app.transcript_area = Some(transcript_area);
    app.chat_height = transcript_area.height.saturating_sub(2);
    app.chat_width = transcript_area.width.saturating_sub(2);

    let focused = app.focused_message_index();
    let mut lines: Vec<Line> = Vec::new();
    for (i, msg) in app.chat.messages().iter().enumerate() {
        let selected = app.selected_message == Some(i);
        lines.extend(message_lines(msg, selected, app.chat.feedback_for(&msg.id)));
    }
    if app.chat.is_loading() {
        lines.push(Line::from(Span::styled(
            format!("{}:", Role::Assistant.display_name()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        lines.push(thinking_line("AI is thinking", app.animation_frame));
    }

    let transcript = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Support Chat "),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(transcript, transcript_area);

    if let HandoffStatus::Requested { at } = app.chat.handoff() {
        let banner = Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" Waiting for a human agent (requested {}) ", at.format("%H:%M")),
                Style::default().bg(Color::Magenta).fg(Color::White),
            ),
            Span::styled(" e to cancel", Style::default().fg(Color::DarkGray)),
        ]));
        frame.render_widget(banner, handoff_area);
    }

    render_chat_input(app, frame, input_area);
    render_sources_pane(app, frame, sources_area, focused);
}

fn render_chat_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };
    let title = if app.chat.is_loading() {
        " Ask a question (waiting for reply) "
    } else {
        " Ask a question (i to type) "
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.chat_input.cursor;
    let scroll_offset = visible_offset(cursor_pos, inner_width);

    let visible_text: String = app
        .chat_input
        .text
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

/// First visible character so the cursor stays inside a field `width` wide
fn visible_offset(cursor: usize, width: usize) -> usize {
    if width == 0 || cursor < width {
        0
    } else {
        cursor - width + 1
    }
}

fn render_sources_pane(app: &App, frame: &mut Frame, area: Rect, focused: Option<usize>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" Sources ");

    let Some(msg) = focused.and_then(|i| app.chat.messages().get(i)) else {
        frame.render_widget(block, area);
        return;
    };

    let [gauge_area, list_area] = Layout::vertical([
        Constraint::Length(if msg.confidence.is_some() { 3 } else { 0 }),
        Constraint::Min(0),
    ])
    .areas(area);

    if let Some(confidence) = msg.confidence {
        let badge = ConfidenceBadge::new(confidence);
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(format!(" {} ", badge.tier.label())))
            .gauge_style(Style::default().fg(tier_color(badge.tier)))
            .ratio(confidence)
            .label(format!("{}%", badge.percentage));
        frame.render_widget(gauge, gauge_area);
    }

    let mut lines: Vec<Line> = Vec::new();
    if let Some(confidence) = msg.confidence {
        lines.push(Line::from(Span::styled(
            ConfidenceBadge::new(confidence).tooltip(),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
        lines.push(Line::default());
    }

    if msg.citations.is_empty() {
        lines.push(Line::from(Span::styled(
            "No sources for this message.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for (i, citation) in msg.citations.iter().enumerate() {
        lines.push(citation_line(i, citation));
        if app.show_citation_detail {
            if let Some(updated) = &citation.last_updated {
                lines.push(Line::from(Span::styled(
                    format!("      updated {}", updated),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            for line in citation.content.lines() {
                lines.push(Line::from(Span::styled(
                    format!("      {}", line),
                    Style::default().fg(Color::Gray),
                )));
            }
            lines.push(Line::default());
        }
    }

    // Details of the failure behind the latest apology
    let is_latest = focused == Some(app.chat.messages().len().saturating_sub(1));
    let error = app.chat.last_error().filter(|_| is_latest && msg.content == APOLOGY_MESSAGE);
    if let Some(error) = error {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )));
    }

    let sources = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(sources, list_area);
}

// Agent assist screen

fn render_agent_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [left_area, suggestion_area] = Layout::horizontal([
        Constraint::Percentage(45),
        Constraint::Percentage(55),
    ])
    .areas(area);

    let [ticket_area, reply_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(10),
    ])
    .areas(left_area);

    render_ticket(app, frame, ticket_area);
    render_reply_composer(app, frame, reply_area);

    if app.assist.show_debug {
        let [panel_area, debug_area] = Layout::vertical([
            Constraint::Percentage(55),
            Constraint::Percentage(45),
        ])
        .areas(suggestion_area);
        render_suggestion(app, frame, panel_area);

        let debug = Paragraph::new(app.assist.debug_json())
            .style(Style::default().fg(Color::Green))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title(" Debug: Retrieval "),
            )
            .scroll((app.debug_scroll, 0));
        frame.render_widget(debug, debug_area);
    } else {
        render_suggestion(app, frame, suggestion_area);
    }
}

fn render_ticket(app: &App, frame: &mut Frame, area: Rect) {
    let ticket = app.assist.ticket();
    let priority_color = match ticket.priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {} ", ticket.initials()),
                Style::default().bg(Color::Blue).fg(Color::White).bold(),
            ),
            Span::raw(" "),
            Span::styled(ticket.customer.clone(), Style::default().bold()),
            Span::styled(format!(" <{}>", ticket.email), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(vec![
            Span::styled(
                format!(" {} ", ticket.priority.as_str()),
                Style::default().bg(priority_color).fg(Color::Black).bold(),
            ),
            Span::styled(
                format!(" {:?} · {}", ticket.status, ticket.created_at.format("%Y-%m-%d %H:%M")),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::default(),
        Line::from(Span::styled(ticket.subject.clone(), Style::default().fg(Color::Cyan).bold())),
        Line::default(),
    ];
    lines.extend(ticket.content.lines().map(|l| Line::from(l.to_string())));

    let panel = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" Ticket #{} ", ticket.id)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(panel, area);
}

fn render_reply_composer(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing && app.screen == Screen::Agent;
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };

    let saved = match app.assist.saved_draft() {
        Some(draft) if draft == app.assist.reply_draft => " (saved)",
        Some(_) => " (unsaved changes)",
        None => "",
    };

    let text = if app.assist.reply_draft.is_empty() && !editing {
        Text::from(Span::styled(
            "Type your reply... (i to edit, r to insert the suggestion)",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(app.assist.reply_draft.clone())
    };

    let composer = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color))
                .title(format!(" Reply{} ", saved)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(composer, area);
}

fn render_suggestion(app: &App, frame: &mut Frame, area: Rect) {
    let mut title = vec![Span::raw(" AI Suggestion ")];
    if app.assist.is_copied(Instant::now()) {
        title.push(Span::styled(" Copied! ", Style::default().bg(Color::Green).fg(Color::Black)));
    }

    let mut lines: Vec<Line> = Vec::new();
    if app.assist.is_loading() {
        lines.push(thinking_line("Generating suggestion", app.animation_frame));
    } else if !app.assist.has_suggestion() {
        lines.push(Line::from(Span::styled(
            "Press g to generate a suggested reply for this ticket.",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        if let Some(confidence) = app.assist.confidence() {
            lines.push(Line::from(confidence_badge(confidence)));
            lines.push(Line::default());
        }
        lines.extend(app.assist.answer().lines().map(parse_markdown_line));

        let citations = app.assist.citations();
        if !citations.is_empty() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                format!("Sources ({})", citations.len()),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
            )));
            for (i, citation) in citations.iter().enumerate() {
                lines.push(citation_line(i, citation));
            }
        }
    }

    let panel = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(Line::from(title)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(panel, area);
}

// Admin screen

fn render_admin_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let title = format!(" Analytics: {} ", app.analytics_source.display_name());

    let report = match &app.report {
        ReportState::Ready(report) => report,
        state => {
            let message = match state {
                ReportState::Failed(error) => Line::from(vec![
                    Span::styled(format!("Could not load analytics: {}", error), Style::default().fg(Color::Red)),
                    Span::styled("  (r to retry)", Style::default().fg(Color::DarkGray)),
                ]),
                ReportState::Loading => thinking_line("Loading analytics", app.animation_frame),
                _ => Line::from(Span::styled("Press r to load analytics.", Style::default().fg(Color::DarkGray))),
            };
            let panel = Paragraph::new(message)
                .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(panel, area);
            return;
        }
    };

    let [cards_area, chart_area, lists_area] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Percentage(45),
        Constraint::Min(0),
    ])
    .areas(area);

    render_metric_cards(report, frame, cards_area);
    render_usage_chart(report, frame, chart_area, &title);

    let [unanswered_area, feedback_area] = Layout::horizontal([
        Constraint::Percentage(50),
        Constraint::Percentage(50),
    ])
    .areas(lists_area);

    let unanswered: Vec<ListItem> = report
        .top_unanswered
        .iter()
        .map(|q| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>4} ", q.count), Style::default().fg(Color::Yellow).bold()),
                Span::raw(q.question.clone()),
            ]))
        })
        .collect();
    frame.render_widget(
        List::new(unanswered).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Top Unanswered Questions "),
        ),
        unanswered_area,
    );

    let feedback: Vec<ListItem> = report
        .recent_feedback
        .iter()
        .map(|entry| {
            let marker = match entry.kind {
                FeedbackKind::Positive => Span::styled("👍 ", Style::default().fg(Color::Green)),
                FeedbackKind::Negative => Span::styled("👎 ", Style::default().fg(Color::Red)),
            };
            ListItem::new(vec![
                Line::from(vec![marker, Span::raw(entry.query.clone())]),
                Line::from(Span::styled(
                    format!("   {} · {}", entry.reason, entry.timestamp),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();
    frame.render_widget(
        List::new(feedback).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Recent Feedback "),
        ),
        feedback_area,
    );
}

fn render_metric_cards(report: &AnalyticsReport, frame: &mut Frame, area: Rect) {
    if report.metrics.is_empty() {
        return;
    }
    let constraints = vec![Constraint::Ratio(1, report.metrics.len() as u32); report.metrics.len()];
    let card_areas = Layout::horizontal(constraints).split(area);

    for (metric, card_area) in report.metrics.iter().zip(card_areas.iter()) {
        let trend_color = match metric.trend {
            Trend::Up => Color::Green,
            Trend::Down => Color::Red,
            Trend::Neutral => Color::Gray,
        };
        let card = Paragraph::new(Line::from(vec![
            Span::styled(metric.value.clone(), Style::default().bold()),
            Span::raw("  "),
            Span::styled(metric.change_label(), Style::default().fg(trend_color)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" {} ", metric.label)),
        );
        frame.render_widget(card, *card_area);
    }
}

fn render_usage_chart(report: &AnalyticsReport, frame: &mut Frame, area: Rect, title: &str) {
    // Heights are percent of the busiest day; the label keeps the raw count
    let bars: Vec<Bar> = report
        .usage
        .iter()
        .zip(report.relative_usage())
        .map(|(point, (_, relative))| {
            Bar::default()
                .value((relative * 100.0).round() as u64)
                .text_value(point.queries.to_string())
                .label(Line::from(point.day.clone()))
                .style(Style::default().fg(Color::Cyan))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!("{}· {} queries this week ", title, report.total_usage())),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(5)
        .bar_gap(2)
        .max(100)
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    frame.render_widget(chart, area);
}
