use clap::ValueEnum;
use forge_audit::{ClientPool, RateLimitInfo};

use crate::commands::shared::mask_token;

/// Output format for records and rate limit display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default on a terminal)
    #[default]
    Table,
    /// One JSON object per line
    Json,
}

/// Show the quota of every pooled token.
pub(crate) async fn handle_limits(
    pool: &ClientPool,
    output: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut items = Vec::with_capacity(pool.len());
    for client in pool.clients() {
        let info = client.api().get_rate_limiting().await;
        items.push(RateLimitDisplay::new(
            &client.api().provider().to_string(),
            client.token(),
            &info,
        ));
    }

    RateLimitDisplay::print_many(items, output)
}

/// Rate limit information for display.
#[derive(Debug, Clone, serde::Serialize, tabled::Tabled)]
pub(crate) struct RateLimitDisplay {
    #[tabled(rename = "Provider")]
    pub provider: String,
    #[tabled(rename = "Token")]
    pub token: String,
    #[tabled(rename = "Limit")]
    pub limit: String,
    #[tabled(rename = "Remaining")]
    pub remaining: String,
    #[tabled(rename = "Usage %")]
    pub usage_percent: String,
    #[tabled(rename = "Resets In")]
    pub reset_in: String,
}

impl RateLimitDisplay {
    pub(crate) fn new(provider: &str, token: &str, info: &RateLimitInfo) -> Self {
        if info.is_unlimited() {
            return Self {
                provider: provider.to_string(),
                token: mask_token(token),
                limit: "unlimited".to_string(),
                remaining: "unlimited".to_string(),
                usage_percent: "-".to_string(),
                reset_in: "-".to_string(),
            };
        }

        let usage_percent = if info.limit > 0 {
            (info.limit.saturating_sub(info.remaining) as f64 / info.limit as f64) * 100.0
        } else {
            0.0
        };
        let reset_in = match info.reset_at {
            Some(reset_at) => {
                let remaining = reset_at.signed_duration_since(chrono::Utc::now());
                if remaining.num_seconds() > 0 {
                    format_duration(remaining)
                } else {
                    "now".to_string()
                }
            }
            None => "unknown".to_string(),
        };

        Self {
            provider: provider.to_string(),
            token: mask_token(token),
            limit: info.limit.to_string(),
            remaining: info.remaining.to_string(),
            usage_percent: format!("{:.1}%", usage_percent),
            reset_in,
        }
    }

    pub(crate) fn print_many(
        items: Vec<Self>,
        format: OutputFormat,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match format {
            OutputFormat::Table => {
                let mut table = tabled::Table::new(items);
                table.with(tabled::settings::Style::rounded());
                println!("{}", table);
            }
            OutputFormat::Json => {
                for item in &items {
                    println!("{}", serde_json::to_string(item)?);
                }
            }
        }
        Ok(())
    }
}

/// Format a duration in a human-readable way.
fn format_duration(duration: chrono::Duration) -> String {
    let total_secs = duration.num_seconds();
    if total_secs < 60 {
        format!("{}s", total_secs)
    } else if total_secs < 3600 {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        if secs > 0 {
            format!("{}m {}s", mins, secs)
        } else {
            format!("{}m", mins)
        }
    } else {
        let hours = total_secs / 3600;
        let mins = (total_secs % 3600) / 60;
        if mins > 0 {
            format!("{}h {}m", hours, mins)
        } else {
            format!("{}h", hours)
        }
    }
}
