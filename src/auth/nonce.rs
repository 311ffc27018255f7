use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use super::AUTH_WINDOW_MINUTES;
use super::gate::normalize_address;
use crate::error::{Error, Result};
use crate::store::{self, Store};
use crate::types::Nonce;

const NONCE_BYTES: usize = 32;

#[derive(Debug, Clone, Serialize)]
pub struct IssuedNonce {
    pub nonce: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and consumes per-address single-use signing challenges.
#[derive(Clone)]
pub struct NonceStore {
    store: Arc<dyn Store>,
    timeout: Duration,
}

impl NonceStore {
    pub fn new(store: Arc<dyn Store>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Issues a fresh nonce for the address, replacing any outstanding one:
    /// a previously issued, unconsumed nonce stops being accepted.
    pub async fn issue(&self, address: &str) -> Result<IssuedNonce> {
        let address = normalize_address(address)?;
        store::run(&self.store, self.timeout, move |db| issue_sync(db, &address)).await
    }

    /// Consumes the live nonce for the address. Single-use: after a call
    /// that reaches the stored value, the nonce is gone whatever the result.
    pub async fn consume(&self, address: &str, presented: &str) -> Result<()> {
        let address = normalize_address(address)?;
        let presented = presented.to_string();
        store::run(&self.store, self.timeout, move |db| {
            consume_sync(db, &address, &presented)
        })
        .await
    }
}

pub(crate) fn issue_sync(db: &dyn Store, address: &str) -> Result<IssuedNonce> {
    let mut bytes = [0u8; NONCE_BYTES];
    rand::thread_rng().fill(&mut bytes);

    let value = hex::encode(bytes);
    let expires_at = Utc::now() + chrono::Duration::minutes(AUTH_WINDOW_MINUTES);

    db.put_nonce(&Nonce {
        address: address.to_string(),
        value: value.clone(),
        expires_at,
    })?;

    Ok(IssuedNonce {
        nonce: value,
        expires_at,
    })
}

pub(crate) fn consume_sync(db: &dyn Store, address: &str, presented: &str) -> Result<()> {
    let stored = db.get_nonce(address)?.ok_or(Error::NonceMissing)?;

    if stored.value != presented {
        return Err(Error::NonceMismatch);
    }

    // Purge before the expiry check: an expired nonce must not be left in
    // place for retry. The delete is value-guarded, so of two racing
    // consumers exactly one removes the row; the loser reads it as missing.
    if !db.delete_nonce(address, presented)? {
        return Err(Error::NonceMissing);
    }

    if Utc::now() > stored.expires_at {
        return Err(Error::NonceExpired);
    }

    Ok(())
}
