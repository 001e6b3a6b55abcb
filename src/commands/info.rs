use crate::commands::{AppDashboard, CommandError};
use crate::models::MarketSnapshot;
use crate::utils::format::{
    format_percentage, format_price, format_supply, format_timestamp, format_volume,
};
use crate::utils::Table;

/// Price cards and market details for a snapshot
pub fn summary(snapshot: &MarketSnapshot) -> String {
    let direction = if snapshot.price_change_percentage_24h >= 0.0 { "📈" } else { "📉" };

    let mut table = Table::new(vec!["Field", "Value"]);
    table.add_row(vec!["💰 Current Price".to_string(), format_price(snapshot.current_price)]);
    table.add_row(vec![
        format!("{} 24h Change", direction),
        format!("{} (24h)", format_percentage(snapshot.price_change_percentage_24h)),
    ]);
    table.add_row(vec!["📊 24h Volume".to_string(), format_volume(snapshot.total_volume)]);
    table.add_row(vec!["📈 24h High".to_string(), format_price(snapshot.high_24h)]);
    table.add_row(vec!["📉 24h Low".to_string(), format_price(snapshot.low_24h)]);
    table.add_row(vec!["Market Cap".to_string(), format_volume(snapshot.market_cap)]);
    table.add_row(vec![
        "Circulating Supply".to_string(),
        format!("{} {}", format_supply(snapshot.circulating_supply), snapshot.symbol),
    ]);
    table.add_row(vec!["24h Change".to_string(), format_price(snapshot.price_change_24h.abs())]);
    table.add_row(vec!["Last Updated".to_string(), format_timestamp(&snapshot.last_updated)]);

    format!("🪙 {} ({})\n{}", snapshot.name, snapshot.symbol, table.render())
}

pub fn execute(dashboard: &AppDashboard) -> Result<String, CommandError> {
    let snapshot = dashboard.state().snapshot.as_ref().ok_or(CommandError::NoData)?;
    Ok(summary(snapshot))
}

pub fn execute_json(dashboard: &AppDashboard) -> Result<String, CommandError> {
    let snapshot = dashboard.state().snapshot.as_ref().ok_or(CommandError::NoData)?;
    Ok(serde_json::to_string_pretty(snapshot)?)
}
