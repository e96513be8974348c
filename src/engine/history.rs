use chrono::{DateTime, Utc};

use crate::error::AppResult;
use crate::provider::WalletDataProvider;
use crate::types::{Chain, WalletAddress};

/// Defensive upper bound on pagination. The provider terminates pagination by
/// returning no cursor; this guards against a misbehaving upstream looping.
pub const MAX_HISTORY_PAGES: usize = 10_000;

/// Fees paid and transaction timestamps for one wallet on one chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainHistory {
    /// Sum of transaction fees in the chain's native token.
    pub fee_native: f64,
    /// Timestamps of transactions the wallet sent.
    pub timestamps: Vec<DateTime<Utc>>,
}

/// Walk the full transaction history of a wallet on one chain, following the
/// provider's continuation cursor until it is exhausted.
///
/// Only records the wallet itself sent contribute, both to the fee total and
/// to the timestamp set; incoming transactions are someone else's fees.
pub async fn fetch_chain_history<P: WalletDataProvider + ?Sized>(
    provider: &P,
    wallet: &WalletAddress,
    chain: Chain,
) -> AppResult<ChainHistory> {
    let mut history = ChainHistory::default();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = provider
            .history_page(wallet, chain, cursor.as_deref())
            .await?;
        pages += 1;

        for record in &page.result {
            if !wallet.matches(&record.from_address) {
                continue;
            }
            history.fee_native += record.fee_native();
            match DateTime::parse_from_rfc3339(&record.block_timestamp) {
                Ok(ts) => history.timestamps.push(ts.with_timezone(&Utc)),
                Err(_) => {
                    tracing::warn!(
                        chain = %chain,
                        timestamp = %record.block_timestamp,
                        "Skipping record with unparseable timestamp"
                    );
                }
            }
        }

        cursor = page.cursor.filter(|c| !c.is_empty());
        if cursor.is_none() {
            break;
        }
        if pages >= MAX_HISTORY_PAGES {
            tracing::warn!(
                wallet = %wallet,
                chain = %chain,
                pages = %pages,
                "History pagination hit the defensive page bound, truncating"
            );
            break;
        }
    }

    tracing::debug!(
        wallet = %wallet,
        chain = %chain,
        pages = %pages,
        transactions = %history.timestamps.len(),
        fee_native = %history.fee_native,
        "Chain history aggregated"
    );

    Ok(history)
}
