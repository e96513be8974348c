//! In-memory provider fake for engine tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::provider::models::{
    ApprovalRecord, ChainActivityEntry, DefiPositionDetail, DefiPositionRecord, DefiPositionToken,
    FirstTransaction, HistoryPage, HistoryRecord, NetWorthResponse, ProfitabilitySummary,
};
use crate::provider::WalletDataProvider;
use crate::types::{Chain, WalletAddress};

pub fn fake_failure() -> AppError {
    AppError::Provider {
        status: 500,
        message: "injected failure".to_string(),
    }
}

pub fn history_record(from: &str, timestamp: &str, fee: &str) -> HistoryRecord {
    HistoryRecord {
        from_address: from.to_string(),
        block_timestamp: timestamp.to_string(),
        transaction_fee: Some(Value::String(fee.to_string())),
    }
}

pub fn activity_entry(chain: &str, first_transaction: Option<&str>) -> ChainActivityEntry {
    ChainActivityEntry {
        chain: chain.to_string(),
        first_transaction: first_transaction.map(|ts| FirstTransaction {
            block_timestamp: ts.to_string(),
        }),
    }
}

pub fn approval(usd_at_risk: &str) -> ApprovalRecord {
    ApprovalRecord {
        usd_at_risk: Some(Value::String(usd_at_risk.to_string())),
        token: None,
    }
}

pub fn defi_position(protocol: &str, label: &str, token: &str, balance_usd: f64) -> DefiPositionRecord {
    DefiPositionRecord {
        protocol_name: Some(protocol.to_string()),
        position: Some(DefiPositionDetail {
            label: Some(label.to_string()),
            balance_usd: Some(Value::from(balance_usd)),
            tokens: vec![DefiPositionToken {
                name: Some(token.to_string()),
            }],
        }),
    }
}

#[derive(Default)]
pub struct FakeProvider {
    pub activity: Vec<ChainActivityEntry>,
    pub fail_activity: bool,
    history: Mutex<HashMap<Chain, VecDeque<HistoryPage>>>,
    pub fail_history: HashSet<Chain>,
    /// token address -> USD price
    pub prices: HashMap<String, f64>,
    pub fail_prices: bool,
    pub net_worth: NetWorthResponse,
    pub fail_net_worth: bool,
    pub approvals: HashMap<Chain, Vec<ApprovalRecord>>,
    pub fail_approvals: HashSet<Chain>,
    pub defi: HashMap<Chain, Vec<DefiPositionRecord>>,
    pub fail_defi: HashSet<Chain>,
    pub profitability: HashMap<Chain, ProfitabilitySummary>,
    pub fail_profitability: HashSet<Chain>,
    pub ens_name: Option<String>,
    pub fail_ens: bool,
    pub unstoppable_name: Option<String>,
    pub fail_unstoppable: bool,
    pub resolved_addresses: HashMap<String, WalletAddress>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_activity(mut self, activity: Vec<ChainActivityEntry>) -> Self {
        self.activity = activity;
        self
    }

    pub fn with_history(self, chain: Chain, pages: Vec<HistoryPage>) -> Self {
        self.history
            .lock()
            .unwrap()
            .insert(chain, pages.into_iter().collect());
        self
    }

    pub fn with_price(mut self, token: &str, price: f64) -> Self {
        self.prices.insert(token.to_string(), price);
        self
    }

    pub fn with_approvals(mut self, chain: Chain, approvals: Vec<ApprovalRecord>) -> Self {
        self.approvals.insert(chain, approvals);
        self
    }

    pub fn with_defi(mut self, chain: Chain, positions: Vec<DefiPositionRecord>) -> Self {
        self.defi.insert(chain, positions);
        self
    }

    pub fn with_profitability(mut self, chain: Chain, summary: ProfitabilitySummary) -> Self {
        self.profitability.insert(chain, summary);
        self
    }

    pub fn with_net_worth(mut self, net_worth: NetWorthResponse) -> Self {
        self.net_worth = net_worth;
        self
    }

    pub fn failing_history(mut self, chain: Chain) -> Self {
        self.fail_history.insert(chain);
        self
    }

    pub fn failing_approvals(mut self, chain: Chain) -> Self {
        self.fail_approvals.insert(chain);
        self
    }
}

#[async_trait]
impl WalletDataProvider for FakeProvider {
    async fn chain_activity(&self, _wallet: &WalletAddress) -> AppResult<Vec<ChainActivityEntry>> {
        if self.fail_activity {
            return Err(fake_failure());
        }
        Ok(self.activity.clone())
    }

    async fn history_page(
        &self,
        _wallet: &WalletAddress,
        chain: Chain,
        _cursor: Option<&str>,
    ) -> AppResult<HistoryPage> {
        if self.fail_history.contains(&chain) {
            return Err(fake_failure());
        }
        let mut history = self.history.lock().unwrap();
        Ok(history
            .get_mut(&chain)
            .and_then(|pages| pages.pop_front())
            .unwrap_or_default())
    }

    async fn token_price(&self, token_address: &str, _chain: Chain) -> AppResult<f64> {
        if self.fail_prices {
            return Err(fake_failure());
        }
        Ok(self.prices.get(token_address).copied().unwrap_or(0.0))
    }

    async fn net_worth(
        &self,
        _wallet: &WalletAddress,
        _chains: &[Chain],
    ) -> AppResult<NetWorthResponse> {
        if self.fail_net_worth {
            return Err(fake_failure());
        }
        Ok(self.net_worth.clone())
    }

    async fn approvals(
        &self,
        _wallet: &WalletAddress,
        chain: Chain,
    ) -> AppResult<Vec<ApprovalRecord>> {
        if self.fail_approvals.contains(&chain) {
            return Err(fake_failure());
        }
        Ok(self.approvals.get(&chain).cloned().unwrap_or_default())
    }

    async fn defi_positions(
        &self,
        _wallet: &WalletAddress,
        chain: Chain,
    ) -> AppResult<Vec<DefiPositionRecord>> {
        if self.fail_defi.contains(&chain) {
            return Err(fake_failure());
        }
        Ok(self.defi.get(&chain).cloned().unwrap_or_default())
    }

    async fn profitability(
        &self,
        _wallet: &WalletAddress,
        chain: Chain,
    ) -> AppResult<ProfitabilitySummary> {
        if self.fail_profitability.contains(&chain) {
            return Err(fake_failure());
        }
        Ok(self.profitability.get(&chain).cloned().unwrap_or_default())
    }

    async fn reverse_resolve_ens(&self, _wallet: &WalletAddress) -> AppResult<Option<String>> {
        if self.fail_ens {
            return Err(fake_failure());
        }
        Ok(self.ens_name.clone())
    }

    async fn reverse_resolve_unstoppable(
        &self,
        _wallet: &WalletAddress,
    ) -> AppResult<Option<String>> {
        if self.fail_unstoppable {
            return Err(fake_failure());
        }
        Ok(self.unstoppable_name.clone())
    }

    async fn resolve_ens(&self, domain: &str) -> AppResult<Option<WalletAddress>> {
        if self.fail_ens {
            return Err(fake_failure());
        }
        Ok(self.resolved_addresses.get(domain).cloned())
    }

    async fn resolve_unstoppable(&self, domain: &str) -> AppResult<Option<WalletAddress>> {
        if self.fail_unstoppable {
            return Err(fake_failure());
        }
        Ok(self.resolved_addresses.get(domain).cloned())
    }
}
