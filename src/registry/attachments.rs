use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;

use super::normalize_handle;
use crate::auth::VerifiedAddress;
use crate::error::{Error, Result};
use crate::store::{self, Store};
use crate::types::{Attachment, AttachmentRequest, RequestStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveAction {
    Accept,
    Reject,
}

/// How a request call concluded. Returning an existing pending request or an
/// already-approved attachment is success: naive client retries must be safe.
#[derive(Debug, Clone)]
pub enum RequestOutcome {
    Pending(AttachmentRequest),
    AlreadyApproved(Attachment),
}

/// The attachment workflow: per (seed, hashname) pair the request moves
/// `none -> pending -> accepted | rejected`, and the terminal transition
/// happens exactly once.
#[derive(Clone)]
pub struct AttachmentService {
    store: Arc<dyn Store>,
    timeout: Duration,
}

impl AttachmentService {
    pub fn new(store: Arc<dyn Store>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Files an attachment request on behalf of the seed's author of record.
    /// A prior rejection does not block a new request.
    pub async fn request(
        &self,
        seed_id: i64,
        handle: &str,
        requester: &VerifiedAddress,
    ) -> Result<RequestOutcome> {
        if seed_id < 1 {
            return Err(Error::BadRequest("Valid seed id is required".to_string()));
        }
        let handle = normalize_handle(handle)?;
        let requester = requester.as_str().to_string();
        store::run(&self.store, self.timeout, move |db| {
            request_sync(db, seed_id, &handle, &requester)
        })
        .await
    }

    /// Applies the hashname owner's decision to a pending request. Exactly
    /// one resolution wins; later attempts observe `AlreadyResolved`.
    pub async fn resolve(
        &self,
        request_id: i64,
        action: ResolveAction,
        resolver: &VerifiedAddress,
        note: Option<String>,
    ) -> Result<AttachmentRequest> {
        if request_id < 1 {
            return Err(Error::BadRequest("Valid request id is required".to_string()));
        }
        let resolver = resolver.as_str().to_string();
        store::run(&self.store, self.timeout, move |db| {
            resolve_sync(db, request_id, action, &resolver, note.as_deref())
        })
        .await
    }
}

fn request_sync(
    db: &dyn Store,
    seed_id: i64,
    handle: &str,
    requester: &str,
) -> Result<RequestOutcome> {
    let hashname = db.get_hashname_by_handle(handle)?.ok_or(Error::NotFound)?;
    if !hashname.is_active {
        return Err(Error::Inactive);
    }

    let seed = db.get_seed(seed_id)?.ok_or(Error::NotFound)?;
    // Only the seed's author of record may propose attachments for it. A
    // seed with no author has no one entitled to ask.
    if seed.author_address.as_deref() != Some(requester) {
        return Err(Error::Forbidden);
    }

    if let Some(existing) = db.get_attachment(seed_id, hashname.hashname_id)? {
        return Ok(RequestOutcome::AlreadyApproved(existing));
    }

    if let Some(pending) = db.get_pending_request(seed_id, hashname.hashname_id)? {
        return Ok(RequestOutcome::Pending(pending));
    }

    let request = db.insert_request(seed_id, hashname.hashname_id, requester)?;
    tracing::info!(
        "attachment requested: seed {} -> {} by {}",
        seed_id,
        handle,
        requester
    );
    Ok(RequestOutcome::Pending(request))
}

fn resolve_sync(
    db: &dyn Store,
    request_id: i64,
    action: ResolveAction,
    resolver: &str,
    note: Option<&str>,
) -> Result<AttachmentRequest> {
    let mut request = db.get_request(request_id)?.ok_or(Error::NotFound)?;
    let hashname = db.get_hashname(request.hashname_id)?.ok_or_else(|| {
        Error::Internal(format!("request {request_id} references missing hashname"))
    })?;

    if request.status != RequestStatus::Pending {
        return Err(Error::AlreadyResolved);
    }

    match hashname.owner_address.as_deref() {
        None => return Err(Error::Unclaimed),
        Some(owner) if owner != resolver => return Err(Error::Forbidden),
        Some(_) => {}
    }

    let resolved_at = Utc::now();
    let status = match action {
        ResolveAction::Accept => {
            // Attachment row first: a crash between this insert and the
            // status flip is healed by an idempotent re-accept. A
            // natural-key conflict here means the row already exists and is
            // success, not an error.
            db.insert_attachment_if_absent(request.seed_id, request.hashname_id, resolver)?;
            RequestStatus::Accepted
        }
        ResolveAction::Reject => RequestStatus::Rejected,
    };

    // Conditional write on the pending status: of two racing resolutions
    // only one transitions the row, the other sees it already resolved.
    if !db.resolve_request_if_pending(request_id, status, resolved_at, note)? {
        return Err(Error::AlreadyResolved);
    }

    tracing::info!(
        "request {} {} by {}",
        request_id,
        status.as_str(),
        resolver
    );

    request.status = status;
    request.resolved_at = Some(resolved_at);
    request.decision_note = note.map(str::to_string);
    Ok(request)
}
