//! Wire types for the Moralis deep-index API. The provider returns loosely
//! shaped JSON; every field that has ever been observed missing or re-typed
//! is optional with a documented default.

use serde::Deserialize;
use serde_json::Value;

/// Parse a JSON value that should be a decimal number but may arrive as a
/// string, a number, or be absent entirely. Defaults to 0.0; never NaN.
pub fn lenient_f64(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::String(s)) => s.parse::<f64>().unwrap_or(0.0),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        _ => 0.0,
    };
    if parsed.is_nan() {
        0.0
    } else {
        parsed
    }
}

// ============================================================================
// GET /wallets/{address}/chains
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ChainActivityResponse {
    #[serde(default)]
    pub active_chains: Vec<ChainActivityEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainActivityEntry {
    #[serde(default)]
    pub chain: String,
    #[serde(default)]
    pub first_transaction: Option<FirstTransaction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirstTransaction {
    #[serde(default)]
    pub block_timestamp: String,
}

// ============================================================================
// GET /wallets/{address}/history (cursor paginated)
// ============================================================================

#[derive(Debug, Clone, Deserialize, Default)]
pub struct HistoryPage {
    #[serde(default)]
    pub result: Vec<HistoryRecord>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryRecord {
    #[serde(default)]
    pub from_address: String,
    #[serde(default)]
    pub block_timestamp: String,
    #[serde(default)]
    pub transaction_fee: Option<Value>,
}

impl HistoryRecord {
    /// Fee in native units; malformed values default to 0 rather than
    /// contaminating the running total.
    pub fn fee_native(&self) -> f64 {
        lenient_f64(self.transaction_fee.as_ref())
    }
}

// ============================================================================
// GET /erc20/{address}/price
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct TokenPriceResponse {
    #[serde(rename = "usdPrice", default)]
    pub usd_price: f64,
}

// ============================================================================
// GET /wallets/{address}/net-worth
// ============================================================================

#[derive(Debug, Clone, Deserialize, Default)]
pub struct NetWorthResponse {
    #[serde(default)]
    pub total_networth_usd: Option<Value>,
    #[serde(default)]
    pub chains: Vec<NetWorthChainEntry>,
}

impl NetWorthResponse {
    pub fn total_usd(&self) -> f64 {
        lenient_f64(self.total_networth_usd.as_ref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetWorthChainEntry {
    #[serde(default)]
    pub chain: String,
    #[serde(default)]
    pub networth_usd: Option<Value>,
}

impl NetWorthChainEntry {
    pub fn usd(&self) -> f64 {
        lenient_f64(self.networth_usd.as_ref())
    }
}

// ============================================================================
// GET /wallets/{address}/approvals
// ============================================================================

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApprovalsResponse {
    #[serde(default)]
    pub result: Vec<ApprovalRecord>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApprovalRecord {
    #[serde(default)]
    pub usd_at_risk: Option<Value>,
    #[serde(default)]
    pub token: Option<ApprovalToken>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApprovalToken {
    #[serde(default)]
    pub usd_at_risk: Option<Value>,
}

impl ApprovalRecord {
    /// USD exposed by this approval. The field has moved between the record
    /// and its token object across provider versions; check both. A record
    /// that parses to nothing contributes nothing.
    pub fn usd_at_risk(&self) -> Option<f64> {
        let raw = self
            .usd_at_risk
            .as_ref()
            .or_else(|| self.token.as_ref().and_then(|t| t.usd_at_risk.as_ref()))?;
        match raw {
            Value::String(s) => s.parse::<f64>().ok().filter(|v| !v.is_nan()),
            Value::Number(n) => n.as_f64().filter(|v| !v.is_nan()),
            _ => None,
        }
    }
}

// ============================================================================
// GET /wallets/{address}/defi/positions
// ============================================================================

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DefiPositionRecord {
    #[serde(default)]
    pub protocol_name: Option<String>,
    #[serde(default)]
    pub position: Option<DefiPositionDetail>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DefiPositionDetail {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub balance_usd: Option<Value>,
    #[serde(default)]
    pub tokens: Vec<DefiPositionToken>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DefiPositionToken {
    #[serde(default)]
    pub name: Option<String>,
}

impl DefiPositionRecord {
    pub fn balance_usd(&self) -> f64 {
        lenient_f64(
            self.position
                .as_ref()
                .and_then(|p| p.balance_usd.as_ref()),
        )
    }
}

// ============================================================================
// GET /wallets/{address}/profitability/summary
// ============================================================================

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProfitabilitySummary {
    #[serde(default)]
    pub total_count_of_trades: Option<u64>,
    #[serde(default)]
    pub total_realized_profit_usd: Option<Value>,
}

impl ProfitabilitySummary {
    pub fn trade_count(&self) -> u64 {
        self.total_count_of_trades.unwrap_or(0)
    }

    pub fn realized_profit_usd(&self) -> f64 {
        lenient_f64(self.total_realized_profit_usd.as_ref())
    }
}

// ============================================================================
// Name resolution
// ============================================================================

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ResolvedName {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ResolvedAddress {
    #[serde(default)]
    pub address: Option<String>,
}
