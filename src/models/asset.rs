//! Registry of the assets offered in the selection list

/// A selectable asset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetInfo {
    pub id: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
    /// Accent color as a hex string
    pub color: &'static str,
}

pub const POPULAR_ASSETS: [AssetInfo; 8] = [
    AssetInfo { id: "bitcoin", symbol: "BTC", name: "Bitcoin", color: "#f59e0b" },
    AssetInfo { id: "ethereum", symbol: "ETH", name: "Ethereum", color: "#3b82f6" },
    AssetInfo { id: "binancecoin", symbol: "BNB", name: "BNB", color: "#f59e0b" },
    AssetInfo { id: "solana", symbol: "SOL", name: "Solana", color: "#8b5cf6" },
    AssetInfo { id: "cardano", symbol: "ADA", name: "Cardano", color: "#06b6d4" },
    AssetInfo { id: "avalanche-2", symbol: "AVAX", name: "Avalanche", color: "#ef4444" },
    AssetInfo { id: "polkadot", symbol: "DOT", name: "Polkadot", color: "#ec4899" },
    AssetInfo { id: "chainlink", symbol: "LINK", name: "Chainlink", color: "#3b82f6" },
];

/// Look up an asset by id or ticker symbol (case-insensitive)
pub fn find_asset(identifier: &str) -> Option<&'static AssetInfo> {
    let identifier = identifier.trim();
    POPULAR_ASSETS.iter().find(|a| {
        a.id.eq_ignore_ascii_case(identifier) || a.symbol.eq_ignore_ascii_case(identifier)
    })
}
