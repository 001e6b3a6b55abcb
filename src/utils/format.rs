//! Display formatting for prices, volumes and chart labels (en-US conventions)

use chrono::{DateTime, Utc};

/// Insert `,` every three digits of an unsigned integer string
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Fixed-point text with ties rounded away from zero (`toFixed` style);
/// plain `{:.N}` rounds ties to even
fn fixed(value: f64, decimals: usize) -> String {
    let scale = 10f64.powi(decimals as i32);
    let rounded = (value * scale).round() / scale;
    format!("{:.*}", decimals, rounded)
}

/// Format with a fixed number of decimals and grouped integer digits, sign stripped
fn grouped_abs(value: f64, decimals: usize) -> String {
    let fixed = fixed(value.abs(), decimals);
    match fixed.split_once('.') {
        Some((int_part, frac)) => format!("{}.{}", group_thousands(int_part), frac),
        None => group_thousands(&fixed),
    }
}

/// US dollar amount with two decimals, e.g. `$45,000.50`
pub fn format_price(price: f64) -> String {
    let sign = if price < 0.0 && fixed(price.abs(), 2) != "0.00" { "-" } else { "" };
    format!("{}${}", sign, grouped_abs(price, 2))
}

/// Abbreviated dollar magnitude: `$1.50B`, `$2.50M`, `$2.50K`, `$500.00`
pub fn format_volume(volume: f64) -> String {
    if volume >= 1e9 {
        format!("${}B", fixed(volume / 1e9, 2))
    } else if volume >= 1e6 {
        format!("${}M", fixed(volume / 1e6, 2))
    } else if volume >= 1e3 {
        format!("${}K", fixed(volume / 1e3, 2))
    } else {
        format!("${}", fixed(volume, 2))
    }
}

/// Y-axis label, rounded to the nearest thousand: `$45k`
pub fn format_axis_price(price: f64) -> String {
    format!("${}k", fixed(price / 1000.0, 0))
}

/// Signed percentage with two decimals, e.g. `-2.35%`
pub fn format_percentage(percentage: f64) -> String {
    format!("{}%", fixed(percentage, 2))
}

/// Grouped number with up to three fraction digits, e.g. `19,000,000`
pub fn format_supply(supply: f64) -> String {
    let text = fixed(supply.abs(), 3);
    let (int_part, frac) = text.split_once('.').unwrap_or((&text, ""));
    let frac = frac.trim_end_matches('0');
    let sign = if supply < 0.0 { "-" } else { "" };
    if frac.is_empty() {
        format!("{}{}", sign, group_thousands(int_part))
    } else {
        format!("{}{}.{}", sign, group_thousands(int_part), frac)
    }
}

/// Short month and day, e.g. `Oct 18`
pub fn format_chart_date(timestamp_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%b %-d").to_string())
        .unwrap_or_default()
}

/// Full local-style timestamp for the market details table
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%-m/%-d/%Y, %-I:%M:%S %p UTC").to_string()
}
