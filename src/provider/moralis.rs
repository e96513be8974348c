use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use super::models::{
    ApprovalsResponse, ChainActivityEntry, ChainActivityResponse, DefiPositionRecord, HistoryPage,
    NetWorthResponse, ProfitabilitySummary, ResolvedAddress, ResolvedName, TokenPriceResponse,
};
use super::WalletDataProvider;
use crate::config::MoralisConfig;
use crate::error::{AppError, AppResult};
use crate::types::{Chain, WalletAddress, ALL_CHAINS};

// ============================================================================
// Moralis Client - Typed Gateway over the deep-index API
// ============================================================================

#[derive(Clone)]
pub struct MoralisClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl MoralisClient {
    pub fn new(config: &MoralisConfig) -> AppResult<Self> {
        if config.api_key.is_empty() {
            return Err(AppError::Config(
                "Moralis API key is not configured (set AURA__MORALIS__API_KEY)".to_string(),
            ));
        }

        let api_key_preview = if config.api_key.len() > 8 {
            format!(
                "{}...{}",
                &config.api_key[..4],
                &config.api_key[config.api_key.len() - 4..]
            )
        } else {
            "***".to_string()
        };
        println!("[MORALIS] Initializing client with API key: {}", api_key_preview);
        tracing::debug!("Creating Moralis client");

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// One GET against the provider. No retries: any failure is terminal for
    /// the enclosing sub-query and the caller decides whether to degrade.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> AppResult<T> {
        let start = Instant::now();
        let url = format!("{}/{}", self.base_url, path);

        tracing::debug!(path = %path, "Querying Moralis");

        let response = self
            .client
            .get(&url)
            .header("X-API-Key", &self.api_key)
            .header("accept", "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(path = %path, error = %e, "Moralis request failed");
                AppError::ProviderUnreachable(format!("Moralis request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            println!(
                "[MORALIS] API error {} on {}: {}",
                status,
                path,
                truncate_body(&body, 200)
            );
            tracing::error!(path = %path, status = %status, body = %body, "Moralis API error");
            return Err(AppError::Provider {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed = response.json::<T>().await.map_err(|e| {
            tracing::error!(path = %path, error = %e, "Failed to parse Moralis response");
            AppError::ProviderUnreachable(format!("Failed to parse Moralis response: {}", e))
        })?;

        tracing::debug!(
            path = %path,
            duration_ms = %start.elapsed().as_millis(),
            "Moralis query completed"
        );

        Ok(parsed)
    }

    /// Like `get_json`, but a 404 resolves to `Ok(None)` instead of an error.
    /// Used by the name-resolution endpoints where "no name" is an answer.
    async fn get_json_soft<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> AppResult<Option<T>> {
        match self.get_json::<T>(path, query).await {
            Ok(value) => Ok(Some(value)),
            Err(AppError::Provider { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

fn non_empty(name: Option<String>) -> Option<String> {
    name.filter(|n| !n.trim().is_empty())
}

/// Cap an upstream error body for the log line without splitting a multibyte
/// character; the full body still goes into the error itself.
fn truncate_body(body: &str, max_bytes: usize) -> &str {
    if body.len() <= max_bytes {
        return body;
    }
    let mut end = max_bytes;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[async_trait]
impl WalletDataProvider for MoralisClient {
    async fn chain_activity(&self, wallet: &WalletAddress) -> AppResult<Vec<ChainActivityEntry>> {
        let query: Vec<(String, String)> = ALL_CHAINS
            .iter()
            .enumerate()
            .map(|(i, chain)| (format!("chains[{}]", i), chain.as_str().to_string()))
            .collect();

        let response: ChainActivityResponse = self
            .get_json(&format!("wallets/{}/chains", wallet), &query)
            .await?;
        Ok(response.active_chains)
    }

    async fn history_page(
        &self,
        wallet: &WalletAddress,
        chain: Chain,
        cursor: Option<&str>,
    ) -> AppResult<HistoryPage> {
        let mut query = vec![
            ("chain".to_string(), chain.as_str().to_string()),
            ("order".to_string(), "DESC".to_string()),
        ];
        if let Some(c) = cursor {
            query.push(("cursor".to_string(), c.to_string()));
        }

        self.get_json(&format!("wallets/{}/history", wallet), &query)
            .await
    }

    async fn token_price(&self, token_address: &str, chain: Chain) -> AppResult<f64> {
        let query = vec![
            ("chain".to_string(), chain.as_str().to_string()),
            ("include".to_string(), "percent_change".to_string()),
        ];
        let response: TokenPriceResponse = self
            .get_json(&format!("erc20/{}/price", token_address), &query)
            .await?;
        Ok(response.usd_price)
    }

    async fn net_worth(
        &self,
        wallet: &WalletAddress,
        chains: &[Chain],
    ) -> AppResult<NetWorthResponse> {
        let mut query: Vec<(String, String)> = chains
            .iter()
            .map(|chain| ("chains[]".to_string(), chain.as_str().to_string()))
            .collect();
        query.push(("exclude_spam".to_string(), "true".to_string()));
        query.push(("exclude_unverified_contracts".to_string(), "true".to_string()));

        self.get_json(&format!("wallets/{}/net-worth", wallet), &query)
            .await
    }

    async fn approvals(
        &self,
        wallet: &WalletAddress,
        chain: Chain,
    ) -> AppResult<Vec<super::models::ApprovalRecord>> {
        let query = vec![("chain".to_string(), chain.as_str().to_string())];
        let response: ApprovalsResponse = self
            .get_json(&format!("wallets/{}/approvals", wallet), &query)
            .await?;
        Ok(response.result)
    }

    async fn defi_positions(
        &self,
        wallet: &WalletAddress,
        chain: Chain,
    ) -> AppResult<Vec<DefiPositionRecord>> {
        let query = vec![("chain".to_string(), chain.as_str().to_string())];
        self.get_json(&format!("wallets/{}/defi/positions", wallet), &query)
            .await
    }

    async fn profitability(
        &self,
        wallet: &WalletAddress,
        chain: Chain,
    ) -> AppResult<ProfitabilitySummary> {
        let query = vec![("chain".to_string(), chain.as_str().to_string())];
        self.get_json(&format!("wallets/{}/profitability/summary", wallet), &query)
            .await
    }

    async fn reverse_resolve_ens(&self, wallet: &WalletAddress) -> AppResult<Option<String>> {
        let response: Option<ResolvedName> = self
            .get_json_soft(&format!("resolve/{}/reverse", wallet), &[])
            .await?;
        Ok(non_empty(response.and_then(|r| r.name)))
    }

    async fn reverse_resolve_unstoppable(
        &self,
        wallet: &WalletAddress,
    ) -> AppResult<Option<String>> {
        let response: Option<ResolvedName> = self
            .get_json_soft(&format!("resolve/{}/domain", wallet), &[])
            .await?;
        Ok(non_empty(response.and_then(|r| r.name)))
    }

    async fn resolve_ens(&self, domain: &str) -> AppResult<Option<WalletAddress>> {
        let response: Option<ResolvedAddress> = self
            .get_json_soft(&format!("resolve/ens/{}", domain), &[])
            .await?;
        Ok(response
            .and_then(|r| r.address)
            .and_then(|addr| WalletAddress::parse(&addr)))
    }

    async fn resolve_unstoppable(&self, domain: &str) -> AppResult<Option<WalletAddress>> {
        let query = vec![("currency".to_string(), "eth".to_string())];
        let response: Option<ResolvedAddress> = self
            .get_json_soft(&format!("resolve/{}", domain), &query)
            .await?;
        Ok(response
            .and_then(|r| r.address)
            .and_then(|addr| WalletAddress::parse(&addr)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        // 'é' straddles the 200-byte cut; truncation must back off to the
        // previous boundary instead of panicking.
        let body = format!("{}é and more", "x".repeat(199));
        let truncated = truncate_body(&body, 200);
        assert_eq!(truncated.len(), 199);
        assert!(truncated.chars().all(|c| c == 'x'));

        let multibyte = "é".repeat(150);
        let truncated = truncate_body(&multibyte, 200);
        assert_eq!(truncated, "é".repeat(100));
    }

    #[test]
    fn test_truncate_body_passes_short_bodies_through() {
        assert_eq!(truncate_body("not found", 200), "not found");
        assert_eq!(truncate_body("", 200), "");
    }

    #[test]
    fn test_empty_api_key_is_a_config_error() {
        let config = MoralisConfig {
            api_key: String::new(),
            base_url: "https://deep-index.moralis.io/api/v2.2".to_string(),
            request_timeout_secs: 15,
        };
        assert!(matches!(
            MoralisClient::new(&config),
            Err(AppError::Config(_))
        ));
    }
}
