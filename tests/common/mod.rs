#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use alloy::signers::{SignerSync, local::PrivateKeySigner};
use chrono::Utc;
use tempfile::TempDir;

use hashnexus::auth::{AuthAction, AuthChallenge, VerifiedAddress, signing_message};
use hashnexus::server::AppState;
use hashnexus::store::{SqliteStore, Store};

pub const STORE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TestApp {
    pub state: Arc<AppState>,
    _data_dir: TempDir,
}

pub fn test_app() -> TestApp {
    let data_dir = TempDir::new().expect("create temp dir");
    let store = SqliteStore::new(data_dir.path().join("test.db")).expect("open store");
    store.initialize().expect("initialize schema");

    TestApp {
        state: Arc::new(AppState::new(Arc::new(store), STORE_TIMEOUT)),
        _data_dir: data_dir,
    }
}

impl TestApp {
    pub fn store(&self) -> &dyn Store {
        self.state.store.as_ref()
    }
}

/// A throwaway wallet that signs challenges the way a browser wallet would.
pub struct Wallet {
    signer: PrivateKeySigner,
    pub address: String,
}

impl Wallet {
    pub fn random() -> Self {
        let signer = PrivateKeySigner::random();
        let address = signer.address().to_string().to_lowercase();
        Self { signer, address }
    }

    pub fn sign(&self, message: &str) -> String {
        let signature = self
            .signer
            .sign_message_sync(message.as_bytes())
            .expect("sign message");
        format!("0x{}", hex::encode(signature.as_bytes()))
    }

    pub fn verified(&self) -> VerifiedAddress {
        VerifiedAddress::new(&self.address).expect("wallet address shape")
    }
}

/// Issues a nonce and produces a matching signature, returning
/// (nonce, timestamp, signature) ready for `authorize`.
pub async fn signed_auth(
    app: &TestApp,
    wallet: &Wallet,
    action: AuthAction,
    subject_id: Option<i64>,
) -> (String, i64, String) {
    let issued = app
        .state
        .nonces
        .issue(&wallet.address)
        .await
        .expect("issue nonce");
    let timestamp = Utc::now().timestamp_millis();

    let message = signing_message(&AuthChallenge {
        address: &wallet.address,
        action,
        nonce: &issued.nonce,
        timestamp,
        subject_id,
    });

    (issued.nonce, timestamp, wallet.sign(&message))
}

/// Runs the whole exchange and returns the proven principal.
pub async fn authorize(
    app: &TestApp,
    wallet: &Wallet,
    action: AuthAction,
    subject_id: Option<i64>,
) -> VerifiedAddress {
    let (nonce, timestamp, signature) = signed_auth(app, wallet, action, subject_id).await;
    app.state
        .gate
        .authorize(
            &wallet.address,
            &signature,
            &nonce,
            timestamp,
            action,
            subject_id,
        )
        .await
        .expect("authorize")
}
