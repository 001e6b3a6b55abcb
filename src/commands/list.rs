use crate::models::POPULAR_ASSETS;
use crate::utils::Table;

/// Table of the assets available to `select`
pub fn execute() -> String {
    let mut table = Table::new(vec!["Id", "Symbol", "Name", "Color"]);
    for asset in POPULAR_ASSETS.iter() {
        table.add_row(vec![
            asset.id.to_string(),
            asset.symbol.to_string(),
            asset.name.to_string(),
            asset.color.to_string(),
        ]);
    }
    format!("📈 Popular Cryptocurrencies\n{}", table.render())
}
