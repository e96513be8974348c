use std::time::{Duration, Instant};

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};

use super::dto::*;
use crate::engine::{self, WalletReport};
use crate::error::{AppError, AppResult};
use crate::provider::WalletDataProvider;
use crate::types::{is_ens_domain, WalletAddress};
use crate::AppState;

pub async fn health_check() -> Json<HealthResponse> {
    tracing::debug!("Processing health check request");
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Run the full scoring pipeline for a wallet, bounded by the configured
/// pipeline deadline so a stalled upstream cannot hang the request.
pub async fn get_wallet_score(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> AppResult<Json<WalletReport>> {
    let start = Instant::now();
    println!("[REQUEST] GET /api/v1/wallet/{}/score", wallet);
    tracing::info!(wallet = %wallet, "Processing wallet score request");

    // Validate before any network call
    let address = WalletAddress::parse(&wallet).ok_or_else(|| {
        println!("[RESPONSE] GET /api/v1/wallet/{}/score -> 400 Bad Request (invalid wallet)", wallet);
        tracing::warn!(wallet = %wallet, "Invalid wallet address provided");
        AppError::InvalidWallet(wallet.clone())
    })?;

    let deadline = Duration::from_secs(state.config.scoring.pipeline_deadline_secs);
    let report = tokio::time::timeout(deadline, engine::score_wallet(&state.provider, &address))
        .await
        .map_err(|_| {
            println!("[RESPONSE] GET /api/v1/wallet/{}/score -> 504 (deadline exceeded)", wallet);
            AppError::Timeout(format!(
                "scoring {} exceeded the {}s pipeline deadline",
                address,
                deadline.as_secs()
            ))
        })??;

    let duration = start.elapsed().as_millis();
    println!(
        "[RESPONSE] GET /api/v1/wallet/{}/score -> 200 OK ({}ms) score={}",
        wallet, duration, report.score
    );
    tracing::info!(
        wallet = %wallet,
        duration_ms = %duration,
        score = %report.score,
        "Wallet score computed"
    );

    Ok(Json(report))
}

/// Resolve an address / ENS name / Unstoppable domain to a wallet address.
/// Rate limited per caller identity; resolution misses return a null address.
pub async fn resolve_input(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ResolveRequest>,
) -> AppResult<Json<ResolveResponse>> {
    let start = Instant::now();
    let input = request.input.trim().to_string();
    println!("[REQUEST] POST /api/v1/resolve input={}", input);
    tracing::info!(input = %input, "Processing resolve request");

    let identity = caller_identity(&headers);
    let decision = state.rate_limiter.check(&identity).await;
    if !decision.allowed {
        println!(
            "[RESPONSE] POST /api/v1/resolve -> 429 (rate limited, retry in {}s)",
            decision.retry_after_secs
        );
        tracing::warn!(identity = %identity, "Resolve request rate limited");
        return Err(AppError::RateLimited {
            retry_after_secs: decision.retry_after_secs,
        });
    }

    if input.is_empty() {
        return Err(AppError::InvalidDomain("input is required".to_string()));
    }

    // A raw address needs no lookup, only canonicalization
    if let Some(address) = WalletAddress::parse(&input) {
        println!("[RESPONSE] POST /api/v1/resolve -> 200 OK (already an address)");
        return Ok(Json(ResolveResponse {
            address: Some(address.to_string()),
        }));
    }
    if input.starts_with("0x") {
        return Err(AppError::InvalidWallet(input));
    }

    let address = resolve_name(&state.provider, &input)
        .await
        .map(|a| a.to_string());

    let duration = start.elapsed().as_millis();
    println!(
        "[RESPONSE] POST /api/v1/resolve -> 200 OK ({}ms) resolved={}",
        duration,
        address.is_some()
    );
    tracing::info!(
        input = %input,
        duration_ms = %duration,
        resolved = %address.is_some(),
        "Resolve request completed"
    );

    Ok(Json(ResolveResponse { address }))
}

/// Dispatch a name to the matching resolution service: `.eth` goes to ENS,
/// anything else to Unstoppable. Fail-soft: a resolution failure surfaces as
/// a null address, never a 5xx.
async fn resolve_name<P: WalletDataProvider + ?Sized>(
    provider: &P,
    input: &str,
) -> Option<WalletAddress> {
    let resolved = if is_ens_domain(input) {
        provider.resolve_ens(input).await
    } else {
        provider.resolve_unstoppable(input).await
    };

    match resolved {
        Ok(address) => address,
        Err(e) => {
            tracing::warn!(input = %input, error = %e, "Name resolution failed, returning null");
            None
        }
    }
}

/// Caller identity for rate limiting: first hop of X-Forwarded-For when
/// present (the service runs behind a proxy), otherwise a shared local key.
fn caller_identity(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| "local".to_string())
}
