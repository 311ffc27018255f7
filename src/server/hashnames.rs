use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use super::AppState;
use super::dto::{ClaimRequest, ClaimResponse, HashNameView};
use super::response::{ApiError, ApiResponse};
use crate::auth::AuthAction;
use crate::error::Error;
use crate::registry::normalize_handle;
use crate::store;

pub async fn claim_hashname(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClaimRequest>,
) -> Result<Json<ApiResponse<ClaimResponse>>, ApiError> {
    let auth = &req.auth;
    let verified = state
        .gate
        .authorize(
            &auth.address,
            &auth.signature,
            &auth.nonce,
            auth.timestamp,
            AuthAction::ClaimHashname,
            None,
        )
        .await?;

    let outcome = state.claims.claim(&req.handle, &verified).await?;
    let hashname = outcome.hashname();

    Ok(Json(ApiResponse::success(ClaimResponse {
        handle: hashname.handle.clone(),
        owner_address: verified.into_string(),
        message: outcome.message(),
    })))
}

/// Public read-only view: the hashname and its queue of pending requests.
pub async fn get_hashname(
    State(state): State<Arc<AppState>>,
    Path(handle): Path<String>,
) -> Result<Json<ApiResponse<HashNameView>>, ApiError> {
    let handle = normalize_handle(&handle)?;

    let view = store::run(&state.store, state.store_timeout, move |db| {
        let hashname = db.get_hashname_by_handle(&handle)?.ok_or(Error::NotFound)?;
        let pending_requests = db.list_pending_requests(hashname.hashname_id)?;
        Ok(HashNameView {
            hashname,
            pending_requests,
        })
    })
    .await?;

    Ok(Json(ApiResponse::success(view)))
}
