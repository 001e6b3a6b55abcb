pub mod chart;
pub mod help;
pub mod info;
pub mod list;
pub mod select;

use thiserror::Error;
use tracing::{debug, warn};

use crate::services::dashboard_service::{Dashboard, PngChartTarget};
use crate::services::provider_service::MockProvider;
use crate::utils::canvas::RenderError;

/// The dashboard as wired up by the binary
pub type AppDashboard = Dashboard<MockProvider, PngChartTarget>;

/// Errors caused by what the user typed, or by the command that ran
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("No data loaded yet. Try `select bitcoin`.")]
    NoData,
    #[error("Failed to render chart: {0}")]
    Render(#[from] RenderError),
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// What the input loop should do after a command
#[derive(Debug, PartialEq)]
pub enum Reply {
    Message(String),
    Quit,
    Nothing,
}

/// Parse one input line and run the matching command
pub async fn handle_line(dashboard: &mut AppDashboard, line: &str) -> Reply {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(first) = parts.first() else {
        return Reply::Nothing;
    };

    let command = first.trim_start_matches('$').to_lowercase();
    let args = &parts[1..];
    debug!("Command '{}' with args {:?}", command, args);

    let result = match command.as_str() {
        "select" | "sel" => select::execute_select(dashboard, args).await,
        "search" | "s" => select::execute_search(dashboard, args).await,
        "refresh" | "r" => select::execute_refresh(dashboard).await,
        "info" | "i" => info::execute(dashboard),
        "json" => info::execute_json(dashboard),
        "list" | "ls" => Ok(list::execute()),
        "chart" => chart::execute(dashboard, args),
        "help" | "h" | "?" => Ok(help::execute()),
        "quit" | "exit" | "q" => return Reply::Quit,
        _ => Ok(format!("❓ Unknown command '{}'. Type `help` for a list of commands.", command)),
    };

    match result {
        Ok(text) => Reply::Message(text),
        Err(e) => {
            warn!("Command '{}' failed: {}", command, e);
            Reply::Message(format!("❌ {}", e))
        }
    }
}
