pub mod models;
pub mod moralis;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppResult;
use crate::types::{Chain, WalletAddress};

pub use self::models::{
    ApprovalRecord, ChainActivityEntry, DefiPositionRecord, HistoryPage, NetWorthResponse,
    ProfitabilitySummary,
};
pub use self::moralis::MoralisClient;

/// A chain on which the wallet has transacted at least once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveChain {
    pub chain: Chain,
    pub first_transaction: DateTime<Utc>,
}

/// The per-endpoint surface of the blockchain-data provider. The scoring
/// engine is generic over this trait so aggregation logic can be exercised
/// against in-memory fakes.
#[async_trait]
pub trait WalletDataProvider: Send + Sync {
    /// Chains the wallet has been seen on, with first-transaction timestamps.
    async fn chain_activity(&self, wallet: &WalletAddress) -> AppResult<Vec<ChainActivityEntry>>;

    /// One page of transaction history for a wallet on one chain.
    async fn history_page(
        &self,
        wallet: &WalletAddress,
        chain: Chain,
        cursor: Option<&str>,
    ) -> AppResult<HistoryPage>;

    /// Current USD price of an ERC-20 token.
    async fn token_price(&self, token_address: &str, chain: Chain) -> AppResult<f64>;

    /// Provider-computed net worth across the given chains.
    async fn net_worth(
        &self,
        wallet: &WalletAddress,
        chains: &[Chain],
    ) -> AppResult<NetWorthResponse>;

    /// Open token approvals on one chain.
    async fn approvals(
        &self,
        wallet: &WalletAddress,
        chain: Chain,
    ) -> AppResult<Vec<ApprovalRecord>>;

    /// DeFi protocol positions on one chain.
    async fn defi_positions(
        &self,
        wallet: &WalletAddress,
        chain: Chain,
    ) -> AppResult<Vec<DefiPositionRecord>>;

    /// Trade count and realized profit on one chain.
    async fn profitability(
        &self,
        wallet: &WalletAddress,
        chain: Chain,
    ) -> AppResult<ProfitabilitySummary>;

    /// Reverse-resolve the wallet to an ENS name. `Ok(None)` when the wallet
    /// has no name; that is not an error.
    async fn reverse_resolve_ens(&self, wallet: &WalletAddress) -> AppResult<Option<String>>;

    /// Reverse-resolve the wallet to an Unstoppable domain.
    async fn reverse_resolve_unstoppable(
        &self,
        wallet: &WalletAddress,
    ) -> AppResult<Option<String>>;

    /// Forward-resolve an ENS name to an address.
    async fn resolve_ens(&self, domain: &str) -> AppResult<Option<WalletAddress>>;

    /// Forward-resolve an Unstoppable domain to an address.
    async fn resolve_unstoppable(&self, domain: &str) -> AppResult<Option<WalletAddress>>;
}
