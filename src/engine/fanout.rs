use chrono::{DateTime, Utc};
use futures::future::join_all;

use super::history::{fetch_chain_history, ChainHistory};
use crate::provider::{ActiveChain, WalletDataProvider};
use crate::types::{Chain, WalletAddress};

// Wrapped-native token contracts used as price references. Every chain maps
// onto one of these four: polygon/bsc/avalanche to their own native token,
// everything else approximated by ETH.
const WETH_ON_ETH: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";
const WBNB_ON_BSC: &str = "0xbb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c";
const WAVAX_ON_AVALANCHE: &str = "0xb31f66aa3c1e785363f0875a1b74e27b85fd66c7";
const WMATIC_ON_POLYGON: &str = "0x0d500b1d8e8ef31e21c99d1db9a6444d3adf1270";

/// USD prices of the four reference native tokens, fetched once per scoring
/// request and shared across all chains.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativePrices {
    pub eth: f64,
    pub bnb: f64,
    pub avax: f64,
    pub matic: f64,
}

/// Fetch all four reference prices concurrently. A failed lookup degrades
/// that price to 0 (and with it the affected chains' fee-USD contribution)
/// instead of aborting the wallet.
pub async fn fetch_reference_prices<P: WalletDataProvider + ?Sized>(provider: &P) -> NativePrices {
    let (eth, bnb, avax, matic) = tokio::join!(
        provider.token_price(WETH_ON_ETH, Chain::Eth),
        provider.token_price(WBNB_ON_BSC, Chain::Bsc),
        provider.token_price(WAVAX_ON_AVALANCHE, Chain::Avalanche),
        provider.token_price(WMATIC_ON_POLYGON, Chain::Polygon),
    );

    NativePrices {
        eth: price_or_zero(eth, "ETH"),
        bnb: price_or_zero(bnb, "BNB"),
        avax: price_or_zero(avax, "AVAX"),
        matic: price_or_zero(matic, "MATIC"),
    }
}

fn price_or_zero(result: crate::error::AppResult<f64>, token: &str) -> f64 {
    match result {
        Ok(price) if !price.is_nan() => price,
        Ok(_) => 0.0,
        Err(e) => {
            tracing::warn!(token = %token, error = %e, "Reference price unavailable, degrading to 0");
            0.0
        }
    }
}

impl NativePrices {
    pub fn for_chain(&self, chain: Chain) -> f64 {
        match chain {
            Chain::Polygon => self.matic,
            Chain::Bsc => self.bnb,
            Chain::Avalanche => self.avax,
            _ => self.eth,
        }
    }
}

/// Wallet-level totals merged from the per-chain fan-out.
#[derive(Debug, Clone, Default)]
pub struct ChainAggregates {
    /// Sender-matched transaction count across all chains.
    pub total_transactions: u64,
    /// Chain with the most sender-matched transactions.
    pub highest_tx_chain: Option<(Chain, u64)>,
    /// Sum of per-chain fee totals in USD.
    pub total_fees_usd: f64,
    /// Chain where the most fees were paid, in USD.
    pub highest_fee_chain: Option<(Chain, f64)>,
    /// All sender-matched transaction timestamps, every chain merged.
    pub timestamps: Vec<DateTime<Utc>>,
    /// Total USD exposed by open token approvals.
    pub usd_at_risk: f64,
}

/// Fan the fee/timestamp and approval queries out over every active chain
/// concurrently, then merge. Each chain is isolated: a failed chain
/// contributes zero (with a recorded warning) rather than failing the whole
/// aggregation.
pub async fn aggregate_chains<P: WalletDataProvider + ?Sized>(
    provider: &P,
    wallet: &WalletAddress,
    active: &[ActiveChain],
    prices: &NativePrices,
) -> ChainAggregates {
    let history_futures = active.iter().map(|ac| {
        let chain = ac.chain;
        async move { (chain, fetch_chain_history(provider, wallet, chain).await) }
    });
    let approval_futures = active.iter().map(|ac| {
        let chain = ac.chain;
        async move { (chain, provider.approvals(wallet, chain).await) }
    });

    let (histories, approvals) = tokio::join!(join_all(history_futures), join_all(approval_futures));

    let mut aggregates = ChainAggregates::default();

    for (chain, result) in histories {
        let history = match result {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!(
                    wallet = %wallet,
                    chain = %chain,
                    error = %e,
                    "Chain history unavailable, treating as zero contribution"
                );
                ChainHistory::default()
            }
        };

        let tx_count = history.timestamps.len() as u64;
        let fees_usd = history.fee_native * prices.for_chain(chain);

        aggregates.total_transactions += tx_count;
        aggregates.total_fees_usd += fees_usd;
        aggregates.timestamps.extend(history.timestamps);

        if tx_count > 0
            && aggregates
                .highest_tx_chain
                .map_or(true, |(_, best)| tx_count > best)
        {
            aggregates.highest_tx_chain = Some((chain, tx_count));
        }
        if fees_usd > 0.0
            && aggregates
                .highest_fee_chain
                .map_or(true, |(_, best)| fees_usd > best)
        {
            aggregates.highest_fee_chain = Some((chain, fees_usd));
        }
    }

    for (chain, result) in approvals {
        let records = match result {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    wallet = %wallet,
                    chain = %chain,
                    error = %e,
                    "Approvals unavailable, treating as zero exposure"
                );
                Vec::new()
            }
        };
        for record in &records {
            // Unparseable records are excluded from the sum, not zero-added
            if let Some(usd) = record.usd_at_risk() {
                aggregates.usd_at_risk += usd;
            }
        }
    }

    aggregates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testutil::{approval, history_record, FakeProvider};
    use crate::provider::models::{ApprovalRecord, HistoryPage};
    use chrono::TimeZone;

    fn wallet() -> WalletAddress {
        WalletAddress::parse("0xd8da6bf26964af9d7eed9e03e53415d37aa96045").unwrap()
    }

    fn active(chain: Chain) -> ActiveChain {
        ActiveChain {
            chain,
            first_transaction: Utc.with_ymd_and_hms(2022, 4, 4, 0, 0, 0).unwrap(),
        }
    }

    fn page(records: Vec<crate::provider::models::HistoryRecord>) -> Vec<HistoryPage> {
        vec![HistoryPage {
            result: records,
            cursor: None,
        }]
    }

    #[tokio::test]
    async fn test_fee_totals_are_linear_over_chains() {
        let provider = FakeProvider::new()
            .with_price(WETH_ON_ETH, 2000.0)
            .with_price(WMATIC_ON_POLYGON, 0.5)
            .with_history(
                Chain::Eth,
                page(vec![
                    history_record(wallet().as_str(), "2024-01-01T00:00:00.000Z", "0.01"),
                    history_record(wallet().as_str(), "2024-01-02T00:00:00.000Z", "0.02"),
                ]),
            )
            .with_history(
                Chain::Polygon,
                page(vec![history_record(
                    wallet().as_str(),
                    "2024-02-01T00:00:00.000Z",
                    "2.0",
                )]),
            );

        let prices = fetch_reference_prices(&provider).await;
        let chains = [active(Chain::Eth), active(Chain::Polygon)];
        let aggregates = aggregate_chains(&provider, &wallet(), &chains, &prices).await;

        // eth: 0.03 * 2000 = 60, polygon: 2.0 * 0.5 = 1
        assert!((aggregates.total_fees_usd - 61.0).abs() < 1e-9);
        assert_eq!(aggregates.total_transactions, 3);
        assert_eq!(aggregates.highest_fee_chain.unwrap().0, Chain::Eth);
        assert_eq!(aggregates.highest_tx_chain.unwrap(), (Chain::Eth, 2));
        assert_eq!(aggregates.timestamps.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_chain_degrades_to_zero_without_corrupting_others() {
        let provider = FakeProvider::new()
            .with_price(WETH_ON_ETH, 2000.0)
            .with_history(
                Chain::Eth,
                page(vec![history_record(
                    wallet().as_str(),
                    "2024-01-01T00:00:00.000Z",
                    "0.01",
                )]),
            )
            .failing_history(Chain::Polygon)
            .failing_approvals(Chain::Polygon);

        let prices = fetch_reference_prices(&provider).await;
        let chains = [active(Chain::Eth), active(Chain::Polygon)];
        let aggregates = aggregate_chains(&provider, &wallet(), &chains, &prices).await;

        assert!((aggregates.total_fees_usd - 20.0).abs() < 1e-9);
        assert_eq!(aggregates.total_transactions, 1);
    }

    #[tokio::test]
    async fn test_usd_at_risk_skips_unparseable_records() {
        let provider = FakeProvider::new().with_approvals(
            Chain::Eth,
            vec![
                approval("100.5"),
                approval("not-a-number"),
                ApprovalRecord::default(),
                approval("9.5"),
            ],
        );

        let prices = NativePrices::default();
        let chains = [active(Chain::Eth)];
        let aggregates = aggregate_chains(&provider, &wallet(), &chains, &prices).await;

        assert!((aggregates.usd_at_risk - 110.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_failed_price_degrades_to_zero() {
        let mut provider = FakeProvider::new();
        provider.fail_prices = true;
        let prices = fetch_reference_prices(&provider).await;
        assert_eq!(prices.eth, 0.0);
        assert_eq!(prices.matic, 0.0);
    }

    #[test]
    fn test_native_price_mapping() {
        let prices = NativePrices {
            eth: 2000.0,
            bnb: 300.0,
            avax: 25.0,
            matic: 0.5,
        };
        assert_eq!(prices.for_chain(Chain::Polygon), 0.5);
        assert_eq!(prices.for_chain(Chain::Bsc), 300.0);
        assert_eq!(prices.for_chain(Chain::Avalanche), 25.0);
        // every other chain approximates with ETH
        for chain in [
            Chain::Eth,
            Chain::Base,
            Chain::Optimism,
            Chain::Arbitrum,
            Chain::Gnosis,
            Chain::Linea,
        ] {
            assert_eq!(prices.for_chain(chain), 2000.0);
        }
    }
}
