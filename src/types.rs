use serde::{Deserialize, Serialize};
use std::fmt;

/// The chains the scoring pipeline queries for activity, fees and approvals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Eth,
    Polygon,
    Base,
    Bsc,
    Avalanche,
    Optimism,
    Arbitrum,
    Gnosis,
    Linea,
}

/// All chains queried for activity, in the order they are sent upstream.
pub const ALL_CHAINS: [Chain; 9] = [
    Chain::Eth,
    Chain::Polygon,
    Chain::Base,
    Chain::Bsc,
    Chain::Avalanche,
    Chain::Optimism,
    Chain::Arbitrum,
    Chain::Gnosis,
    Chain::Linea,
];

/// Profitability is only available on this fixed pair upstream; the rest of
/// the pipeline covers the full active-chain set.
pub const PROFITABILITY_CHAINS: [Chain; 2] = [Chain::Eth, Chain::Polygon];

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Chain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Eth => "eth",
            Chain::Polygon => "polygon",
            Chain::Base => "base",
            Chain::Bsc => "bsc",
            Chain::Avalanche => "avalanche",
            Chain::Optimism => "optimism",
            Chain::Arbitrum => "arbitrum",
            Chain::Gnosis => "gnosis",
            Chain::Linea => "linea",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "eth" | "0x1" => Some(Chain::Eth),
            "polygon" | "0x89" => Some(Chain::Polygon),
            "base" | "0x2105" => Some(Chain::Base),
            "bsc" | "0x38" => Some(Chain::Bsc),
            "avalanche" | "0xa86a" => Some(Chain::Avalanche),
            "optimism" | "0xa" => Some(Chain::Optimism),
            "arbitrum" | "0xa4b1" => Some(Chain::Arbitrum),
            "gnosis" | "0x64" => Some(Chain::Gnosis),
            "linea" | "0xe708" => Some(Chain::Linea),
            _ => None,
        }
    }

    /// The net-worth endpoint covers a narrower chain set; passing an
    /// unsupported chain yields empty results upstream rather than an error,
    /// so unsupported chains are filtered out before the call.
    pub fn supports_net_worth(&self) -> bool {
        !matches!(self, Chain::Gnosis | Chain::Linea)
    }
}

/// A validated EVM wallet address: `0x` followed by exactly 40 hex digits,
/// held in lowercase so comparisons are case-insensitive by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        if s.len() != 42 || !s.starts_with("0x") {
            return None;
        }
        if !s[2..].bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(s.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a raw address string from the
    /// provider (record senders come back in mixed case).
    pub fn matches(&self, other: &str) -> bool {
        other.len() == self.0.len() && other.to_lowercase() == self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn is_ens_domain(input: &str) -> bool {
    input.to_lowercase().ends_with(".eth")
}
