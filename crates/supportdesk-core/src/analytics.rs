//! Admin dashboard data: metric cards, weekly usage, unanswered questions,
//! and the negative-feedback feed.

use serde::{Deserialize, Serialize};

use crate::error::GatewayResult;
use crate::gateway::Gateway;
use crate::model::FeedbackKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
    /// Week-over-week change in percent
    pub change: i32,
    pub trend: Trend,
}

impl Metric {
    fn new(label: &str, value: &str, change: i32, trend: Trend) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
            change,
            trend,
        }
    }

    /// Signed change badge, e.g. `"+12%"` or `"-2%"`
    pub fn change_label(&self) -> String {
        if self.change > 0 {
            format!("+{}%", self.change)
        } else {
            format!("{}%", self.change)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsagePoint {
    pub day: String,
    pub queries: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnansweredQuestion {
    pub question: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FeedbackKind,
    pub query: String,
    pub reason: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub metrics: Vec<Metric>,
    pub usage: Vec<UsagePoint>,
    pub top_unanswered: Vec<UnansweredQuestion>,
    pub recent_feedback: Vec<FeedbackEntry>,
}

impl AnalyticsReport {
    /// Fixed report shown when no reporting endpoint is configured
    pub fn sample() -> Self {
        let usage = [
            ("Mon", 180),
            ("Tue", 220),
            ("Wed", 195),
            ("Thu", 240),
            ("Fri", 210),
            ("Sat", 95),
            ("Sun", 85),
        ]
        .into_iter()
        .map(|(day, queries)| UsagePoint {
            day: day.to_string(),
            queries,
        })
        .collect();

        let top_unanswered = [
            ("How do I reset my 2FA?", 45),
            ("What is the refund policy for enterprise plans?", 32),
            ("How to integrate with Slack?", 28),
            ("Can I export my data in CSV format?", 21),
            ("What happens when my trial ends?", 19),
        ]
        .into_iter()
        .map(|(question, count)| UnansweredQuestion {
            question: question.to_string(),
            count,
        })
        .collect();

        let recent_feedback = [
            ("1", "How to cancel subscription?", "Answer was outdated", "2 hours ago"),
            ("2", "API rate limits", "Incomplete information", "3 hours ago"),
            ("3", "Password requirements", "Incorrect answer", "5 hours ago"),
        ]
        .into_iter()
        .map(|(id, query, reason, timestamp)| FeedbackEntry {
            id: id.to_string(),
            kind: FeedbackKind::Negative,
            query: query.to_string(),
            reason: reason.to_string(),
            timestamp: timestamp.to_string(),
        })
        .collect();

        Self {
            metrics: vec![
                Metric::new("Total Queries", "1,234", 12, Trend::Up),
                Metric::new("Success Rate", "92%", 3, Trend::Up),
                Metric::new("Escalation Rate", "8%", -2, Trend::Down),
                Metric::new("Est. Cost Saved", "$2,450", 18, Trend::Up),
            ],
            usage,
            top_unanswered,
            recent_feedback,
        }
    }

    /// Each day's share of the busiest day, in [0, 1]
    pub fn relative_usage(&self) -> Vec<(String, f64)> {
        let max = self.usage.iter().map(|p| p.queries).max().unwrap_or(0);
        self.usage
            .iter()
            .map(|p| {
                let ratio = if max == 0 {
                    0.0
                } else {
                    p.queries as f64 / max as f64
                };
                (p.day.clone(), ratio)
            })
            .collect()
    }

    pub fn total_usage(&self) -> u64 {
        self.usage.iter().map(|p| p.queries).sum()
    }
}

/// Where the admin dashboard gets its numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsSource {
    Static,
    Remote,
}

impl AnalyticsSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsSource::Static => "static",
            AnalyticsSource::Remote => "remote",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "static" => Some(AnalyticsSource::Static),
            "remote" => Some(AnalyticsSource::Remote),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AnalyticsSource::Static => "Sample data",
            AnalyticsSource::Remote => "Reporting endpoint",
        }
    }

    pub async fn load(&self, gateway: &Gateway) -> GatewayResult<AnalyticsReport> {
        match self {
            AnalyticsSource::Static => Ok(AnalyticsReport::sample()),
            AnalyticsSource::Remote => gateway.fetch_analytics().await,
        }
    }
}

/// Loading/error state of the admin dashboard
#[derive(Debug, Default)]
pub enum ReportState {
    #[default]
    Idle,
    Loading,
    Ready(AnalyticsReport),
    Failed(String),
}

impl ReportState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ReportState::Loading)
    }

    pub fn report(&self) -> Option<&AnalyticsReport> {
        match self {
            ReportState::Ready(report) => Some(report),
            _ => None,
        }
    }

    pub fn finish(&mut self, result: GatewayResult<AnalyticsReport>) {
        *self = match result {
            Ok(report) => ReportState::Ready(report),
            Err(e) => {
                tracing::warn!(error = %e, "analytics load failed");
                ReportState::Failed(e.to_string())
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;

    #[test]
    fn test_sample_report_contents() {
        let report = AnalyticsReport::sample();
        assert_eq!(report.metrics.len(), 4);
        assert_eq!(report.metrics[0].label, "Total Queries");
        assert_eq!(report.usage.len(), 7);
        assert_eq!(report.top_unanswered[0].count, 45);
        assert!(report
            .recent_feedback
            .iter()
            .all(|f| f.kind == FeedbackKind::Negative));
        assert_eq!(report.total_usage(), 1225);
    }

    #[test]
    fn test_relative_usage_peaks_at_one() {
        let report = AnalyticsReport::sample();
        let bars = report.relative_usage();
        let thu = bars.iter().find(|(day, _)| day == "Thu").unwrap();
        assert_eq!(thu.1, 1.0);
        let sun = bars.iter().find(|(day, _)| day == "Sun").unwrap();
        assert!((sun.1 - 85.0 / 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_relative_usage_all_zero() {
        let mut report = AnalyticsReport::sample();
        for point in &mut report.usage {
            point.queries = 0;
        }
        assert!(report.relative_usage().iter().all(|(_, r)| *r == 0.0));
    }

    #[test]
    fn test_change_label() {
        let report = AnalyticsReport::sample();
        assert_eq!(report.metrics[0].change_label(), "+12%");
        assert_eq!(report.metrics[2].change_label(), "-2%");
    }

    #[test]
    fn test_source_from_str() {
        assert_eq!(AnalyticsSource::from_str("Remote"), Some(AnalyticsSource::Remote));
        assert_eq!(AnalyticsSource::from_str("static"), Some(AnalyticsSource::Static));
        assert_eq!(AnalyticsSource::from_str("excel"), None);
    }

    #[test]
    fn test_report_state_transitions() {
        let mut state = ReportState::Loading;
        assert!(state.is_loading());

        state.finish(Err(GatewayError::Decode("bad".to_string())));
        assert!(matches!(state, ReportState::Failed(_)));
        assert!(state.report().is_none());

        state.finish(Ok(AnalyticsReport::sample()));
        assert!(state.report().is_some());
    }

    #[tokio::test]
    async fn static_source_never_calls_backend() {
        let gateway = Gateway::new("http://127.0.0.1:9");
        let report = AnalyticsSource::Static.load(&gateway).await.unwrap();
        assert_eq!(report, AnalyticsReport::sample());
    }
}
