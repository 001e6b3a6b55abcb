use std::path::PathBuf;

use tracing::info;

use crate::commands::select::describe_render;
use crate::commands::{AppDashboard, CommandError};

/// Redraw the current series, optionally to another file
pub fn execute(dashboard: &AppDashboard, args: &[&str]) -> Result<String, CommandError> {
    let series = dashboard.state().series.as_ref().ok_or(CommandError::NoData)?;
    let target = dashboard.target();
    let path = args
        .first()
        .map(PathBuf::from)
        .unwrap_or_else(|| target.path().to_path_buf());

    info!("🎨 Rendering {} samples to {}", series.len(), path.display());
    let outcome = target.render_to(series, &path)?;
    Ok(describe_render(outcome, &path))
}
