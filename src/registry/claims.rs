use std::sync::Arc;
use std::time::Duration;

use super::normalize_handle;
use crate::auth::VerifiedAddress;
use crate::error::{Error, Result};
use crate::store::{self, Store};
use crate::types::HashName;

/// How a claim concluded. Both variants are success: a repeat claim by the
/// current owner is an idempotent no-op, not an error.
#[derive(Debug, Clone)]
pub enum ClaimOutcome {
    Claimed(HashName),
    AlreadyOwnedBySelf(HashName),
}

impl ClaimOutcome {
    #[must_use]
    pub fn hashname(&self) -> &HashName {
        match self {
            ClaimOutcome::Claimed(hn) | ClaimOutcome::AlreadyOwnedBySelf(hn) => hn,
        }
    }

    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            ClaimOutcome::Claimed(_) => "HashName claimed successfully.",
            ClaimOutcome::AlreadyOwnedBySelf(_) => "You already own this HashName.",
        }
    }
}

/// First-come claiming of unowned hashnames. The unowned-to-owned
/// transition happens exactly once per handle and never reverses.
#[derive(Clone)]
pub struct ClaimService {
    store: Arc<dyn Store>,
    timeout: Duration,
}

impl ClaimService {
    pub fn new(store: Arc<dyn Store>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub async fn claim(&self, handle: &str, owner: &VerifiedAddress) -> Result<ClaimOutcome> {
        let handle = normalize_handle(handle)?;
        let owner = owner.as_str().to_string();
        store::run(&self.store, self.timeout, move |db| {
            claim_sync(db, &handle, &owner)
        })
        .await
    }
}

fn claim_sync(db: &dyn Store, handle: &str, owner: &str) -> Result<ClaimOutcome> {
    let mut hashname = db.get_hashname_by_handle(handle)?.ok_or(Error::NotFound)?;
    if !hashname.is_active {
        return Err(Error::Inactive);
    }

    match hashname.owner_address.as_deref() {
        None => {
            // Conditional write: succeeds only if the row is still unowned
            // at write time. Of two concurrent claimants exactly one wins.
            if db.claim_hashname_if_unowned(hashname.hashname_id, owner)? {
                tracing::info!("hashname {} claimed by {}", handle, owner);
                hashname.owner_address = Some(owner.to_string());
                return Ok(ClaimOutcome::Claimed(hashname));
            }

            // Lost the race; the now-current owner decides the outcome. A
            // duplicate request racing itself lands here as a self-claim.
            let current = db
                .get_hashname(hashname.hashname_id)?
                .ok_or(Error::NotFound)?;
            match current.owner_address.as_deref() {
                Some(addr) if addr == owner => Ok(ClaimOutcome::AlreadyOwnedBySelf(current)),
                _ => Err(Error::AlreadyOwned),
            }
        }
        Some(addr) if addr == owner => Ok(ClaimOutcome::AlreadyOwnedBySelf(hashname)),
        Some(_) => Err(Error::AlreadyOwned),
    }
}
