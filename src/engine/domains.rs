use crate::provider::WalletDataProvider;
use crate::types::WalletAddress;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedDomains {
    pub ens: Option<String>,
    pub unstoppable: Option<String>,
}

/// Reverse-resolve the wallet against both naming services. Each lookup is
/// independently fail-soft: domain names are cosmetic and must never block
/// the scoring pipeline.
pub async fn resolve_domains<P: WalletDataProvider + ?Sized>(
    provider: &P,
    wallet: &WalletAddress,
) -> ResolvedDomains {
    let (ens, unstoppable) = tokio::join!(
        provider.reverse_resolve_ens(wallet),
        provider.reverse_resolve_unstoppable(wallet),
    );

    ResolvedDomains {
        ens: soft(ens, wallet, "ens"),
        unstoppable: soft(unstoppable, wallet, "unstoppable"),
    }
}

fn soft(
    result: crate::error::AppResult<Option<String>>,
    wallet: &WalletAddress,
    service: &str,
) -> Option<String> {
    match result {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!(wallet = %wallet, service = %service, error = %e, "Domain lookup failed, resolving to none");
            None
        }
    }
}
