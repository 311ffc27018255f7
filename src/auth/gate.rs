use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use super::AUTH_WINDOW_MINUTES;
use super::message::{AuthAction, AuthChallenge, signing_message};
use super::nonce::consume_sync;
use super::signature::verify_signature;
use crate::error::{Error, Result};
use crate::store::{self, Store};

/// A wallet address whose control was proven for one request via a valid,
/// fresh, single-use signature. Services accept only this type as the
/// acting principal; produce it through [`AuthGate::authorize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedAddress(String);

impl VerifiedAddress {
    /// Builds a verified address from an already-trusted source, e.g. test
    /// fixtures or a session the caller has authenticated by other means.
    /// Validates shape only.
    pub fn new(address: &str) -> Result<Self> {
        normalize_address(address).map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for VerifiedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercases and shape-checks a wallet address: `0x` + 40 hex characters.
pub(crate) fn normalize_address(raw: &str) -> Result<String> {
    let address = raw.trim().to_lowercase();
    if is_wallet_address(&address) {
        Ok(address)
    } else {
        Err(Error::BadAddress)
    }
}

fn is_wallet_address(s: &str) -> bool {
    s.len() == 42 && s.starts_with("0x") && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Verifies a signed challenge end to end: address shape, timestamp
/// freshness, nonce consumption, signature recovery. One call per inbound
/// protected operation.
#[derive(Clone)]
pub struct AuthGate {
    store: Arc<dyn Store>,
    timeout: Duration,
}

impl AuthGate {
    pub fn new(store: Arc<dyn Store>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Each step is a hard gate; the first failure short-circuits. The one
    /// side effect is nonce consumption: once the presented nonce matches
    /// the stored value it is deleted, whatever the signature check then
    /// says, so a captured (message, signature) pair cannot be replayed
    /// against the same nonce.
    pub async fn authorize(
        &self,
        address: &str,
        signature: &str,
        nonce: &str,
        timestamp: i64,
        action: AuthAction,
        subject_id: Option<i64>,
    ) -> Result<VerifiedAddress> {
        let address = normalize_address(address)?;

        let now = Utc::now().timestamp_millis();
        let max_age_ms = AUTH_WINDOW_MINUTES * 60 * 1000;
        if timestamp > now || now - timestamp >= max_age_ms {
            return Err(Error::StaleSignature);
        }

        let addr = address.clone();
        let signature = signature.trim().to_string();
        let nonce = nonce.to_string();

        store::run(&self.store, self.timeout, move |db| {
            consume_sync(db, &addr, &nonce)?;

            let message = signing_message(&AuthChallenge {
                address: &addr,
                action,
                nonce: &nonce,
                timestamp,
                subject_id,
            });

            if !verify_signature(&message, &signature, &addr) {
                tracing::warn!("invalid signature for {} ({})", addr, action);
                return Err(Error::InvalidSignature);
            }

            Ok(())
        })
        .await?;

        Ok(VerifiedAddress(address))
    }
}
