//! Request Store - durable, deduplicated queue of pending sign requests
//!
//! # Architecture
//!
//! ```text
//! origin ──add_sign_request──▶ RequestStore (Mutex<Vec<SignRequest>>)
//!                                   │
//!                                   ├── chain-transport subset ──▶ KeyValueStorage
//!                                   │                               (MemoryStorage / FileStorage)
//!                                   │
//! SigningDispatcher ──remove_sign_request──┘
//! ```
//!
//! # Lifecycle
//!
//! | Method | Session event | Effect |
//! |--------|---------------|--------|
//! | `init` | unlock | load persisted chain-transport requests |
//! | `clear` | lock | drop the in-memory queue, keep durable state |
//! | `purge` | reset | drop both |
//!
//! Every mutation is one read-modify-write under the queue mutex, followed by
//! a best-effort flush of the durable subset. Flush failures are logged and
//! never fail the mutation.

mod persisted;
mod storage;

pub use persisted::{PersistedBody, PersistedQueue, PersistedRequest};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};

use crate::core::paths::queue;
use crate::error::StorageError;
use crate::request::{RequestId, SignRequest};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

pub struct RequestStore {
    queue: Mutex<Vec<SignRequest>>,
    storage: Arc<dyn KeyValueStorage>,
    key: String,
}

impl RequestStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { queue: Mutex::new(Vec::new()), storage, key: queue::PENDING.to_string() }
    }

    /// Store backed by process memory only.
    pub fn in_memory() -> Self { Self::new(Arc::new(MemoryStorage::new())) }

    pub fn with_key(mut self, key: impl Into<String>) -> Self { self.key = key.into(); self }

    fn lock_queue(&self) -> MutexGuard<'_, Vec<SignRequest>> {
        // A Vec push/retain cannot leave the queue half-applied, so a poisoned
        // guard still holds a consistent queue.
        self.queue.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Load the persisted subset into the queue. Entries already queued win.
    /// Returns how many requests were restored.
    pub fn init(&self) -> Result<usize, StorageError> {
        let restored = self.load_persisted()?;
        let mut queue = self.lock_queue();
        let mut count = 0;
        for request in restored {
            if queue.iter().any(|r| r.id == request.id) {
                continue;
            }
            queue.push(request);
            count += 1;
        }
        info!(restored = count, pending = queue.len(), "sign request store initialized");
        Ok(count)
    }

    /// Forget in-memory requests; durable entries are restored by the next `init`.
    pub fn clear(&self) {
        let mut queue = self.lock_queue();
        let dropped = queue.len();
        queue.clear();
        info!(dropped, "sign request store cleared");
    }

    /// Forget everything, including the durable subset.
    pub fn purge(&self) -> Result<(), StorageError> {
        self.lock_queue().clear();
        self.storage.remove(&self.key)?;
        info!("sign request store purged");
        Ok(())
    }

    /// Enqueue a copy of `request`. An unassigned id is generated and written
    /// back into `request`, so the caller can later resolve it by that id.
    ///
    /// Returns `false`, and leaves the queue untouched, if the id is already queued.
    pub fn add_sign_request(&self, request: &mut SignRequest) -> bool {
        if request.id.is_unassigned() {
            request.id = RequestId::generate();
        }
        let mut queue = self.lock_queue();
        if queue.iter().any(|r| r.id == request.id) {
            debug!(id = %request.id, "duplicate sign request ignored");
            return false;
        }
        info!(id = %request.id, kind = %request.kind(), transport = %request.transport(), "sign request queued");
        let durable = request.is_durable();
        queue.push(request.clone());
        if durable {
            self.flush(&queue);
        }
        true
    }

    /// Dequeue by id. Returns whether the queue shrank.
    pub fn remove_sign_request(&self, request: &SignRequest) -> bool {
        self.remove_by_id(&request.id)
    }

    pub fn remove_by_id(&self, id: &RequestId) -> bool {
        let mut queue = self.lock_queue();
        let Some(index) = queue.iter().position(|r| &r.id == id) else {
            return false;
        };
        let removed = queue.remove(index);
        info!(id = %id, kind = %removed.kind(), "sign request removed");
        if removed.is_durable() {
            self.flush(&queue);
        }
        true
    }

    /// Snapshot of the queue in arrival order.
    pub fn pending(&self) -> Vec<SignRequest> { self.lock_queue().clone() }

    /// Oldest pending request, the one an approval screen shows first.
    pub fn next_request(&self) -> Option<SignRequest> { self.lock_queue().first().cloned() }

    pub fn get(&self, id: &RequestId) -> Option<SignRequest> {
        self.lock_queue().iter().find(|r| &r.id == id).cloned()
    }

    pub fn contains(&self, id: &RequestId) -> bool { self.lock_queue().iter().any(|r| &r.id == id) }

    pub fn len(&self) -> usize { self.lock_queue().len() }

    pub fn is_empty(&self) -> bool { self.lock_queue().is_empty() }

    /// The durable subset as it would be written now.
    pub fn snapshot(&self) -> PersistedQueue { PersistedQueue::from_requests(self.lock_queue().iter()) }

    /// Read the durable subset without touching the in-memory queue.
    pub fn load_persisted(&self) -> Result<Vec<SignRequest>, StorageError> {
        let Some(raw) = self.storage.get(&self.key)? else {
            return Ok(Vec::new());
        };
        let persisted: PersistedQueue = serde_json::from_str(&raw)
            .map_err(|source| StorageError::Json { key: self.key.clone(), source })?;
        if persisted.schema != queue::SCHEMA {
            warn!(schema = %persisted.schema, "unknown sign request schema, ignoring persisted queue");
            return Ok(Vec::new());
        }
        Ok(persisted.requests.into_iter().map(PersistedRequest::into_request).collect())
    }

    // Runs under the queue guard so concurrent flushes land in mutation order.
    fn flush(&self, queue: &[SignRequest]) {
        let snapshot = PersistedQueue::from_requests(queue);
        let count = snapshot.requests.len();
        let result = serde_json::to_string(&snapshot)
            .map_err(|source| StorageError::Json { key: self.key.clone(), source })
            .and_then(|raw| self.storage.set(&self.key, &raw));
        match result {
            Ok(()) => debug!(persisted = count, "sign request queue flushed"),
            Err(e) => warn!(error = %e, "failed to persist sign request queue"),
        }
    }
}
