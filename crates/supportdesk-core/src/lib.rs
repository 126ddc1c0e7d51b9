pub mod analytics;
pub mod assist;
pub mod chat;
pub mod confidence;
pub mod config;
pub mod error;
pub mod gateway;
pub mod model;

// Re-export main types for convenience
pub use analytics::{AnalyticsReport, AnalyticsSource, ReportState};
pub use assist::{AssistPanel, Ticket};
pub use chat::{ChatSession, HandoffStatus};
pub use confidence::{derive_confidence, ConfidenceBadge, ConfidenceTier};
pub use config::Config;
pub use error::{AssistError, ChatError, ErrorKind, GatewayError, GatewayResult};
pub use gateway::Gateway;
pub use model::{Citation, Feedback, FeedbackKind, IngestResponse, Message, QueryResponse, Role};
