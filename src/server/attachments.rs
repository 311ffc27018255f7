use std::sync::Arc;

use axum::{Json, extract::State};

use super::AppState;
use super::dto::{
    RequestAttachmentRequest, RequestAttachmentResponse, ResolveAttachmentRequest,
    ResolveAttachmentResponse,
};
use super::response::{ApiError, ApiResponse};
use crate::auth::AuthAction;
use crate::registry::RequestOutcome;
use crate::types::RequestStatus;

pub async fn request_attachment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RequestAttachmentRequest>,
) -> Result<Json<ApiResponse<RequestAttachmentResponse>>, ApiError> {
    let auth = &req.auth;
    let verified = state
        .gate
        .authorize(
            &auth.address,
            &auth.signature,
            &auth.nonce,
            auth.timestamp,
            AuthAction::RequestAttachment,
            Some(req.seed_id),
        )
        .await?;

    let outcome = state
        .attachments
        .request(req.seed_id, &req.hashname_handle, &verified)
        .await?;

    let response = match outcome {
        RequestOutcome::Pending(request) => RequestAttachmentResponse {
            request_id: Some(request.request_id),
            status: request.status,
            seed_id: request.seed_id,
            hashname_handle: req.hashname_handle,
        },
        RequestOutcome::AlreadyApproved(attachment) => RequestAttachmentResponse {
            request_id: None,
            status: RequestStatus::Accepted,
            seed_id: attachment.seed_id,
            hashname_handle: req.hashname_handle,
        },
    };

    Ok(Json(ApiResponse::success(response)))
}

pub async fn resolve_attachment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResolveAttachmentRequest>,
) -> Result<Json<ApiResponse<ResolveAttachmentResponse>>, ApiError> {
    let auth = &req.auth;
    let verified = state
        .gate
        .authorize(
            &auth.address,
            &auth.signature,
            &auth.nonce,
            auth.timestamp,
            AuthAction::ResolveAttachment,
            Some(req.request_id),
        )
        .await?;

    let resolved = state
        .attachments
        .resolve(req.request_id, req.action, &verified, req.note)
        .await?;

    Ok(Json(ApiResponse::success(ResolveAttachmentResponse {
        request_id: resolved.request_id,
        status: resolved.status,
        seed_id: resolved.seed_id,
        hashname_id: resolved.hashname_id,
    })))
}
