use std::sync::Arc;

use axum::{Json, extract::State};

use super::AppState;
use super::dto::{IssueNonceRequest, IssueNonceResponse};
use super::response::{ApiError, ApiResponse};

/// Issues a signing challenge for the address. Replaces any outstanding
/// nonce, so only the most recently issued challenge verifies.
pub async fn issue_nonce(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IssueNonceRequest>,
) -> Result<Json<ApiResponse<IssueNonceResponse>>, ApiError> {
    let issued = state.nonces.issue(&req.address).await?;

    Ok(Json(ApiResponse::success(IssueNonceResponse {
        nonce: issued.nonce,
        expires_at: issued.expires_at,
    })))
}
