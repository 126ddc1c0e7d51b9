use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use colored::*;
use supportdesk_core::confidence::{ConfidenceTier, EMPTY_CONTEXT_CONFIDENCE};
use supportdesk_core::{ChatSession, Citation, ConfidenceBadge, Config, Gateway, QueryResponse};

const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(2);
const INDEX_SETTLE_DELAY: Duration = Duration::from_secs(1);

fn colored_badge(confidence: f64) -> ColoredString {
    let badge = ConfidenceBadge::new(confidence);
    let text = format!("{} ({}%)", badge.tier.label(), badge.percentage);
    match badge.tier {
        ConfidenceTier::High => text.green().bold(),
        ConfidenceTier::Medium => text.yellow().bold(),
        ConfidenceTier::Low => text.red().bold(),
    }
}

fn print_answer(answer: &str, confidence: f64, cached: bool, citations: &[Citation]) {
    println!("{}", "Answer:".bold().green());
    println!("{}", answer);
    println!();
    print!("{} {}", "Confidence:".bold(), colored_badge(confidence));
    if cached {
        print!(" {}", "[cached]".blue());
    }
    println!();

    if !citations.is_empty() {
        println!("\n{}", format!("Sources ({}):", citations.len()).bold().blue());
        for citation in citations {
            println!("  • {} {}", citation.filename().yellow(), citation.match_label().dimmed());
        }
    }
}

fn print_response(response: &QueryResponse) {
    print_answer(&response.answer, response.confidence(), response.cached, &response.context);
}

/// One chat turn, printed. A backend failure is reported as an error rather
/// than the apology the console would show.
pub async fn ask(gateway: &Gateway, question: &str) -> Result<()> {
    println!("🤖 Asking {}...\n", gateway.base_url().bold().magenta());

    let mut session = ChatSession::new();
    session.send(gateway, question).await?;
    if let Some(e) = session.last_error() {
        bail!("query failed: {}", e);
    }

    let Some(reply) = session.messages().last().filter(|m| m.is_assistant()) else {
        bail!("no reply received");
    };
    print_answer(
        &reply.content,
        reply.confidence.unwrap_or(EMPTY_CONTEXT_CONFIDENCE),
        reply.is_cached,
        &reply.citations,
    );
    Ok(())
}

pub async fn ingest(gateway: &Gateway, file: &Path) -> Result<()> {
    println!("📄 Uploading {}...", file.display().to_string().cyan());

    let response = gateway.ingest(file).await?;
    println!(
        "{} {} ({} chunks)",
        "✔".green(),
        response.message,
        response.chunks_count.to_string().bold()
    );
    Ok(())
}

/// Prints backend status. Returns whether it is healthy.
pub async fn health(gateway: &Gateway) -> bool {
    let healthy = gateway.health_check().await;
    if healthy {
        println!("{} {} is healthy", "●".green(), gateway.base_url());
    } else {
        println!("{} {} is unreachable", "●".red(), gateway.base_url());
    }
    healthy
}

pub struct VerifyOptions<'a> {
    pub file: &'a Path,
    pub question: &'a str,
    pub keyword: &'a str,
    pub attempts: u32,
}

/// Whether the answer or any retrieved chunk mentions `keyword`, ignoring case
pub fn mentions_keyword(response: &QueryResponse, keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    response.answer.to_lowercase().contains(&keyword)
        || response.context.iter().any(|c| {
            c.content.to_lowercase().contains(&keyword) || c.source.to_lowercase().contains(&keyword)
        })
}

async fn wait_for_backend(gateway: &Gateway, attempts: u32) -> bool {
    for attempt in 1..=attempts {
        if gateway.health_check().await {
            return true;
        }
        tracing::debug!(attempt, "backend not ready");
        if attempt < attempts {
            tokio::time::sleep(HEALTH_POLL_INTERVAL).await;
        }
    }
    false
}

/// End-to-end smoke test: health, ingest, then a query that should hit the new document
pub async fn verify(gateway: &Gateway, options: VerifyOptions<'_>) -> Result<()> {
    println!("Waiting for {}...", gateway.base_url().bold());
    if !wait_for_backend(gateway, options.attempts).await {
        bail!("backend did not become healthy after {} attempts", options.attempts);
    }
    println!("{} Server is up", "✔".green());

    println!("Testing ingestion...");
    let ingested = gateway.ingest(options.file).await?;
    println!(
        "{} Ingested {} chunks: {}",
        "✔".green(),
        ingested.chunks_count,
        ingested.message
    );

    // Give the index a moment to settle
    tokio::time::sleep(INDEX_SETTLE_DELAY).await;

    println!("Testing query...");
    let response = gateway.query(options.question).await?;
    print_response(&response);
    println!();

    if mentions_keyword(&response, options.keyword) {
        println!(
            "{} Verification passed: response mentions '{}'",
            "✅".green(),
            options.keyword
        );
    } else {
        println!(
            "{} Verification warning: response does not mention '{}'",
            "⚠️".yellow(),
            options.keyword
        );
    }
    Ok(())
}

pub struct ConfigUpdate {
    pub api_url: Option<String>,
    pub analytics_source: Option<String>,
    pub log_level: Option<String>,
}

/// Apply any given settings, persist them, and print the effective config
pub fn configure(config: &mut Config, update: ConfigUpdate) -> Result<()> {
    let changed = update.api_url.is_some()
        || update.analytics_source.is_some()
        || update.log_level.is_some();

    if let Some(source) = &update.analytics_source {
        if supportdesk_core::AnalyticsSource::from_str(source).is_none() {
            bail!("unknown analytics source '{}' (expected static or remote)", source);
        }
    }
    if let Some(url) = update.api_url {
        config.api_base_url = Some(url);
    }
    if let Some(source) = update.analytics_source {
        config.analytics_source = Some(source);
    }
    if let Some(level) = update.log_level {
        config.log_level = Some(level);
    }

    if changed {
        config.save()?;
        println!("{} Saved {}", "✔".green(), Config::get_config_path()?.display());
    }

    println!("{}", "Configuration".bold().blue());
    println!("  api url:          {}", config.api_base_url().cyan());
    println!("  analytics source: {}", config.analytics_source().as_str());
    println!("  log level:        {}", config.log_level());
    Ok(())
}
