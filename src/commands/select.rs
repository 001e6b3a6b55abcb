use tracing::{debug, info};

use crate::commands::{info, AppDashboard, CommandError};
use crate::models::{DegenerateInput, RenderOutcome};
use crate::services::dashboard_service::FetchOutcome;

fn loading_message(what: &str) -> String {
    format!("⏳ Loading cryptocurrency data for {}...", what)
}

// stdout carries replies only; progress goes through the log
fn announce_loading(what: &str) {
    info!("{}", loading_message(what));
}

/// Initial fetch of the configured default asset
pub async fn execute_load(dashboard: &mut AppDashboard) -> String {
    announce_loading(&dashboard.state().selected.clone());
    let outcome = dashboard.load().await;
    describe(dashboard, outcome)
}

pub async fn execute_select(
    dashboard: &mut AppDashboard,
    args: &[&str],
) -> Result<String, CommandError> {
    let id = args.first().ok_or(CommandError::Usage("select <id>"))?;
    announce_loading(id);
    let outcome = dashboard.select(id).await;
    Ok(describe(dashboard, outcome))
}

pub async fn execute_search(
    dashboard: &mut AppDashboard,
    args: &[&str],
) -> Result<String, CommandError> {
    let symbol = args.first().ok_or(CommandError::Usage("search <symbol>"))?;
    announce_loading(symbol);
    let outcome = dashboard.search(symbol).await;
    Ok(describe(dashboard, outcome))
}

pub async fn execute_refresh(dashboard: &mut AppDashboard) -> Result<String, CommandError> {
    let outcome = dashboard.refresh().await;
    Ok(describe(dashboard, outcome))
}

/// Short chart status line for a render outcome
pub fn describe_render(outcome: RenderOutcome, path: &std::path::Path) -> String {
    match outcome {
        RenderOutcome::Drawn(trend) => {
            format!("🎨 Chart: {} ({})", path.display(), trend.legend())
        }
        RenderOutcome::Skipped(DegenerateInput::SinglePoint) => {
            format!("🎨 Chart: {} (single sample, no trend)", path.display())
        }
        RenderOutcome::Skipped(DegenerateInput::Empty) => {
            "🎨 Chart: no samples to draw".to_string()
        }
    }
}

/// Turn a fetch outcome into what the user sees
fn describe(dashboard: &AppDashboard, outcome: FetchOutcome) -> String {
    let state = dashboard.state();
    match outcome {
        FetchOutcome::Updated(render) => {
            let summary = state.snapshot.as_ref().map(info::summary).unwrap_or_default();
            format!("{}\n{}", summary, describe_render(render, dashboard.target().path()))
        }
        FetchOutcome::Failed(e) => {
            debug!("Fetch failed: {}", e);
            format!("⚠️ {}", state.error.as_deref().unwrap_or("Unknown error"))
        }
        FetchOutcome::RenderFailed(e) => {
            debug!("Render failed: {}", e);
            format!("⚠️ {}", state.error.as_deref().unwrap_or("Unknown error"))
        }
        FetchOutcome::Stale => "Superseded by a newer request.".to_string(),
        FetchOutcome::Ignored => "Nothing to fetch. Select an asset first.".to_string(),
    }
}
