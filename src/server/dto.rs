use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::registry::ResolveAction;
use crate::types::{AttachmentRequest, HashName, RequestStatus};

/// The signed-challenge fields every protected request carries.
#[derive(Debug, Deserialize)]
pub struct AuthFields {
    pub address: String,
    pub signature: String,
    pub nonce: String,
    /// Unix milliseconds at signing time.
    pub timestamp: i64,
}

#[derive(Debug, Deserialize)]
pub struct IssueNonceRequest {
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct IssueNonceResponse {
    pub nonce: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub handle: String,
    #[serde(flatten)]
    pub auth: AuthFields,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub handle: String,
    pub owner_address: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HashNameView {
    #[serde(flatten)]
    pub hashname: HashName,
    pub pending_requests: Vec<AttachmentRequest>,
}

#[derive(Debug, Deserialize)]
pub struct RequestAttachmentRequest {
    pub seed_id: i64,
    pub hashname_handle: String,
    #[serde(flatten)]
    pub auth: AuthFields,
}

#[derive(Debug, Serialize)]
pub struct RequestAttachmentResponse {
    /// Absent when the pair is already attached and no request was filed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<i64>,
    pub status: RequestStatus,
    pub seed_id: i64,
    pub hashname_handle: String,
}

#[derive(Debug, Deserialize)]
pub struct ResolveAttachmentRequest {
    pub request_id: i64,
    pub action: ResolveAction,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(flatten)]
    pub auth: AuthFields,
}

#[derive(Debug, Serialize)]
pub struct ResolveAttachmentResponse {
    pub request_id: i64,
    pub status: RequestStatus,
    pub seed_id: i64,
    pub hashname_id: i64,
}
