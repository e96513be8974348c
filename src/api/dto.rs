use serde::{Deserialize, Serialize};

// ============================================================================
// Health check
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ============================================================================
// POST /api/v1/resolve
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    /// A raw address, an ENS name, or an Unstoppable domain.
    pub input: String,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    /// Null when the name does not resolve; a miss is not an error.
    pub address: Option<String>,
}
