use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single-use signing challenge, keyed by wallet address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nonce {
    pub address: String,
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

/// A claimable, uniquely-handled namespace. `owner_address` is null until
/// a wallet claims the handle; after that it never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashName {
    pub hashname_id: i64,
    pub handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A content item. Created and versioned by the content system; carried here
/// only as the subject of attachment requests. The author address is the
/// authorization anchor for requesting attachments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seed {
    pub seed_id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        }
    }
}

/// A proposal to attach a seed to a hashname, awaiting the hashname owner's
/// decision. Terminal once accepted or rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentRequest {
    pub request_id: i64,
    pub seed_id: i64,
    pub hashname_id: i64,
    pub requester_address: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_note: Option<String>,
}

/// The durable approved association between a seed and a hashname.
/// `(seed_id, hashname_id)` is the natural key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub seed_id: i64,
    pub hashname_id: i64,
    pub attached_by_address: String,
    pub attached_at: DateTime<Utc>,
}
