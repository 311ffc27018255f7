mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::types::*;

/// Store defines the database interface.
///
/// Every state transition with a race hazard (nonce consumption, hashname
/// claim, request resolution, attachment insertion) is a conditional write:
/// the method succeeds only if the guarded precondition still holds at write
/// time, and reports the outcome through its return value.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Nonce operations
    fn get_nonce(&self, address: &str) -> Result<Option<Nonce>>;
    /// Upsert: replaces any existing nonce for the address.
    fn put_nonce(&self, nonce: &Nonce) -> Result<()>;
    /// Deletes only if the stored value still matches. Returns whether a row
    /// was removed, so racing consumers can detect a lost race.
    fn delete_nonce(&self, address: &str, value: &str) -> Result<bool>;

    // Seed operations
    fn create_seed(&self, title: &str, author_address: Option<&str>) -> Result<Seed>;
    fn get_seed(&self, seed_id: i64) -> Result<Option<Seed>>;

    // HashName operations
    fn create_hashname(&self, handle: &str) -> Result<HashName>;
    fn get_hashname(&self, hashname_id: i64) -> Result<Option<HashName>>;
    fn get_hashname_by_handle(&self, handle: &str) -> Result<Option<HashName>>;
    /// Compare-and-set: assigns the owner only if the row is still unowned.
    fn claim_hashname_if_unowned(&self, hashname_id: i64, owner: &str) -> Result<bool>;
    fn set_hashname_active(&self, hashname_id: i64, active: bool) -> Result<bool>;

    // Attachment request operations
    fn insert_request(
        &self,
        seed_id: i64,
        hashname_id: i64,
        requester_address: &str,
    ) -> Result<AttachmentRequest>;
    fn get_request(&self, request_id: i64) -> Result<Option<AttachmentRequest>>;
    fn get_pending_request(
        &self,
        seed_id: i64,
        hashname_id: i64,
    ) -> Result<Option<AttachmentRequest>>;
    fn list_pending_requests(&self, hashname_id: i64) -> Result<Vec<AttachmentRequest>>;
    /// Compare-and-set: moves the request out of `pending` only if it is
    /// still pending. Returns whether a row transitioned.
    fn resolve_request_if_pending(
        &self,
        request_id: i64,
        status: RequestStatus,
        resolved_at: DateTime<Utc>,
        note: Option<&str>,
    ) -> Result<bool>;

    // Attachment operations
    fn get_attachment(&self, seed_id: i64, hashname_id: i64) -> Result<Option<Attachment>>;
    /// Idempotent insert on the natural key. Returns false when the row
    /// already existed, which callers treat as success.
    fn insert_attachment_if_absent(
        &self,
        seed_id: i64,
        hashname_id: i64,
        by_address: &str,
    ) -> Result<bool>;
}

/// Runs one logical store operation on the blocking pool with a bounded
/// timeout. Expiry surfaces as `StoreTimeout`; callers may retry, since every
/// mutating path behind this is idempotent or conflict-safe.
pub async fn run<T, F>(store: &Arc<dyn Store>, timeout: Duration, op: F) -> Result<T>
where
    F: FnOnce(&dyn Store) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(store);
    let task = tokio::task::spawn_blocking(move || op(store.as_ref()));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join)) => Err(Error::Internal(format!("store task failed: {join}"))),
        Err(_) => Err(Error::StoreTimeout),
    }
}
