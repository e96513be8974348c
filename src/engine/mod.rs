pub mod domains;
pub mod fanout;
pub mod heatmap;
pub mod history;
pub mod score;

#[cfg(test)]
pub(crate) mod testutil;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;

use self::fanout::ChainAggregates;
use self::heatmap::HeatmapDay;
use self::score::ScoreInputs;
use crate::error::AppResult;
use crate::provider::models::NetWorthResponse;
use crate::provider::{ActiveChain, WalletDataProvider};
use crate::types::{Chain, WalletAddress, PROFITABILITY_CHAINS};

// ============================================================================
// Report shape consumed by rendering/export collaborators
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct WalletReport {
    pub wallet: String,
    pub score: f64,
    pub summary: WalletSummary,
    pub heatmap: Vec<HeatmapDay>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    pub ens_domain: Option<String>,
    pub unstoppable_domain: Option<String>,
    pub chains_transacted: usize,
    pub specific_chains: Vec<String>,
    pub total_transactions: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_chain_transactions: Option<ChainCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_transaction: Option<FirstTransactionSummary>,
    pub wallet_age: String,
    pub usd_at_risk: f64,
    pub defi_protocols: DefiProtocols,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_defi_position: Option<HighestDefiPosition>,
    pub total_net_worth: TotalWithHighest,
    pub total_gas_fees: TotalWithHighest,
    pub total_trades: u64,
    pub total_profit: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainCount {
    pub chain: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FirstTransactionSummary {
    /// Formatted like "Mon Apr 04 2022".
    pub date: String,
    pub chain: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct DefiProtocols {
    pub count: usize,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighestDefiPosition {
    #[serde(rename = "type")]
    pub position_type: String,
    pub protocol: String,
    pub token: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TotalWithHighest {
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_chain: Option<ChainAmount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainAmount {
    pub chain: String,
    pub amount: f64,
}

// ============================================================================
// Pipeline
// ============================================================================

/// Run the full scoring pipeline for one wallet.
///
/// Chain activity is the root of the dependency graph and its failure is
/// terminal; every other branch of the fan-out degrades to a zero
/// contribution with a recorded warning instead of failing the wallet.
pub async fn score_wallet<P: WalletDataProvider + ?Sized>(
    provider: &P,
    wallet: &WalletAddress,
) -> AppResult<WalletReport> {
    let started = std::time::Instant::now();
    tracing::info!(wallet = %wallet, "Starting scoring pipeline");

    let activity = provider.chain_activity(wallet).await?;
    let active = to_active_chains(&activity);
    println!(
        "[ENGINE] {} active chain(s) for {}",
        active.len(),
        wallet
    );
    tracing::debug!(wallet = %wallet, active_chains = %active.len(), "Chain activity resolved");

    // Reference prices are shared across the per-chain fee conversion, so
    // they are fetched before the fan-out.
    let prices = fanout::fetch_reference_prices(provider).await;

    let net_worth_chains: Vec<Chain> = active
        .iter()
        .map(|ac| ac.chain)
        .filter(Chain::supports_net_worth)
        .collect();

    let (aggregates, net_worth, defi, (total_trades, total_profit), resolved) = tokio::join!(
        fanout::aggregate_chains(provider, wallet, &active, &prices),
        fetch_net_worth(provider, wallet, &net_worth_chains),
        aggregate_defi(provider, wallet, &active),
        fetch_profitability(provider, wallet),
        domains::resolve_domains(provider, wallet),
    );

    let today = Utc::now().date_naive();
    let heatmap = heatmap::build_heatmap(&aggregates.timestamps, today);

    let earliest = active
        .iter()
        .min_by_key(|ac| ac.first_transaction)
        .copied();
    let wallet_age_years = earliest
        .map(|ac| wallet_age_in_years(ac.first_transaction, Utc::now()))
        .unwrap_or(0.0);

    let inputs = ScoreInputs {
        total_transactions: aggregates.total_transactions,
        active_chain_count: active.len(),
        total_trades,
        wallet_age_years,
        unique_protocol_count: defi.protocols.count,
        total_net_worth_usd: net_worth.total_usd(),
        usd_at_risk: aggregates.usd_at_risk,
        total_fees_usd: aggregates.total_fees_usd,
        total_profit_usd: total_profit,
        has_ens_domain: resolved.ens.is_some(),
        has_unstoppable_domain: resolved.unstoppable.is_some(),
    };
    let score = score::compose(&inputs);

    let summary = build_summary(
        &active,
        &aggregates,
        &net_worth,
        defi,
        total_trades,
        total_profit,
        resolved,
        earliest,
        wallet_age_years,
    );

    println!(
        "[ENGINE] Scored {} -> {} ({}ms)",
        wallet,
        score,
        started.elapsed().as_millis()
    );
    tracing::info!(
        wallet = %wallet,
        score = %score,
        duration_ms = %started.elapsed().as_millis(),
        "Scoring pipeline completed"
    );

    Ok(WalletReport {
        wallet: wallet.to_string(),
        score,
        summary,
        heatmap,
    })
}

fn to_active_chains(activity: &[crate::provider::models::ChainActivityEntry]) -> Vec<ActiveChain> {
    activity
        .iter()
        .filter_map(|entry| {
            let chain = Chain::from_str(&entry.chain)?;
            // A chain is active iff it has a non-null first transaction
            let first = entry.first_transaction.as_ref()?;
            let ts = DateTime::parse_from_rfc3339(&first.block_timestamp)
                .ok()?
                .with_timezone(&Utc);
            Some(ActiveChain {
                chain,
                first_transaction: ts,
            })
        })
        .collect()
}

fn wallet_age_in_years(first_transaction: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let seconds = (now - first_transaction).num_seconds().max(0) as f64;
    seconds / (365.25 * 24.0 * 3600.0)
}

async fn fetch_net_worth<P: WalletDataProvider + ?Sized>(
    provider: &P,
    wallet: &WalletAddress,
    chains: &[Chain],
) -> NetWorthResponse {
    if chains.is_empty() {
        return NetWorthResponse::default();
    }
    match provider.net_worth(wallet, chains).await {
        Ok(net_worth) => net_worth,
        Err(e) => {
            tracing::warn!(wallet = %wallet, error = %e, "Net worth unavailable, treating as zero");
            NetWorthResponse::default()
        }
    }
}

struct DefiAggregate {
    protocols: DefiProtocols,
    highest: Option<HighestDefiPosition>,
}

async fn aggregate_defi<P: WalletDataProvider + ?Sized>(
    provider: &P,
    wallet: &WalletAddress,
    active: &[ActiveChain],
) -> DefiAggregate {
    let futures = active.iter().map(|ac| {
        let chain = ac.chain;
        async move { (chain, provider.defi_positions(wallet, chain).await) }
    });

    let mut names: Vec<String> = Vec::new();
    let mut highest: Option<HighestDefiPosition> = None;

    for (chain, result) in join_all(futures).await {
        let positions = match result {
            Ok(positions) => positions,
            Err(e) => {
                tracing::warn!(
                    wallet = %wallet,
                    chain = %chain,
                    error = %e,
                    "DeFi positions unavailable, skipping chain"
                );
                continue;
            }
        };

        for record in &positions {
            if let Some(protocol) = &record.protocol_name {
                if !names.iter().any(|n| n == protocol) {
                    names.push(protocol.clone());
                }
            }

            let balance = record.balance_usd();
            if balance > highest.as_ref().map_or(0.0, |h| h.amount) {
                let detail = record.position.as_ref();
                highest = Some(HighestDefiPosition {
                    position_type: detail
                        .and_then(|p| p.label.clone())
                        .unwrap_or_else(|| "position".to_string()),
                    protocol: record
                        .protocol_name
                        .clone()
                        .unwrap_or_else(|| "unknown".to_string()),
                    token: detail
                        .and_then(|p| p.tokens.first())
                        .and_then(|t| t.name.clone())
                        .unwrap_or_default(),
                    amount: balance,
                });
            }
        }
    }

    DefiAggregate {
        protocols: DefiProtocols {
            count: names.len(),
            names,
        },
        highest,
    }
}

/// Trades and realized profit over the fixed eth/polygon pair. The narrower
/// scope relative to the activity fan-out is intentional and preserved.
async fn fetch_profitability<P: WalletDataProvider + ?Sized>(
    provider: &P,
    wallet: &WalletAddress,
) -> (u64, f64) {
    let futures = PROFITABILITY_CHAINS.iter().map(|&chain| async move {
        (chain, provider.profitability(wallet, chain).await)
    });

    let mut total_trades = 0u64;
    let mut total_profit = 0.0f64;

    for (chain, result) in join_all(futures).await {
        match result {
            Ok(summary) => {
                total_trades += summary.trade_count();
                total_profit += summary.realized_profit_usd();
            }
            Err(e) => {
                tracing::warn!(
                    wallet = %wallet,
                    chain = %chain,
                    error = %e,
                    "Profitability unavailable, skipping chain"
                );
            }
        }
    }

    (total_trades, total_profit)
}

#[allow(clippy::too_many_arguments)]
fn build_summary(
    active: &[ActiveChain],
    aggregates: &ChainAggregates,
    net_worth: &NetWorthResponse,
    defi: DefiAggregate,
    total_trades: u64,
    total_profit: f64,
    resolved: domains::ResolvedDomains,
    earliest: Option<ActiveChain>,
    wallet_age_years: f64,
) -> WalletSummary {
    let highest_net_worth_chain = net_worth
        .chains
        .iter()
        .filter(|entry| entry.usd() > 0.0)
        .max_by(|a, b| a.usd().total_cmp(&b.usd()))
        .map(|entry| ChainAmount {
            chain: entry.chain.clone(),
            amount: entry.usd(),
        });

    WalletSummary {
        ens_domain: resolved.ens,
        unstoppable_domain: resolved.unstoppable,
        chains_transacted: active.len(),
        specific_chains: active.iter().map(|ac| ac.chain.to_string()).collect(),
        total_transactions: aggregates.total_transactions,
        highest_chain_transactions: aggregates.highest_tx_chain.map(|(chain, count)| ChainCount {
            chain: chain.to_string(),
            count,
        }),
        first_transaction: earliest.map(|ac| FirstTransactionSummary {
            date: ac.first_transaction.format("%a %b %d %Y").to_string(),
            chain: ac.chain.to_string(),
        }),
        wallet_age: format!("{:.2} years", wallet_age_years),
        usd_at_risk: aggregates.usd_at_risk,
        defi_protocols: defi.protocols,
        highest_defi_position: defi.highest,
        total_net_worth: TotalWithHighest {
            total: net_worth.total_usd(),
            highest_chain: highest_net_worth_chain,
        },
        total_gas_fees: TotalWithHighest {
            total: aggregates.total_fees_usd,
            highest_chain: aggregates.highest_fee_chain.map(|(chain, amount)| ChainAmount {
                chain: chain.to_string(),
                amount,
            }),
        },
        total_trades,
        total_profit,
    }
}
