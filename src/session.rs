//! Session - binds the request queue to wallet unlock/lock
//!
//! The queue is only reachable while the wallet is unlocked. Unlocking
//! restores the durable subset; locking drops everything in memory, which
//! also abandons callback requests whose caller can no longer be answered.

use crate::error::StorageError;
use crate::store::RequestStore;
use std::sync::{Arc, Mutex};
use tracing::info;

pub struct Session {
    store: Arc<RequestStore>,
    locked: Mutex<bool>,
}

impl Session {
    /// Sessions start locked.
    pub fn new(store: Arc<RequestStore>) -> Self {
        Self { store, locked: Mutex::new(true) }
    }

    /// Returns how many persisted requests were restored (0 if already unlocked).
    pub fn unlock(&self) -> Result<usize, StorageError> {
        let mut locked = self.locked.lock().map_err(|_| StorageError::Poisoned("session lock"))?;
        if !*locked {
            return Ok(0);
        }
        let restored = self.store.init()?;
        *locked = false;
        info!(restored, "session unlocked");
        Ok(restored)
    }

    pub fn lock(&self) {
        let mut locked = self.locked.lock().unwrap_or_else(|p| p.into_inner());
        if *locked {
            return;
        }
        self.store.clear();
        *locked = true;
        info!("session locked");
    }

    pub fn is_locked(&self) -> bool {
        *self.locked.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// The queue, or `None` while locked.
    pub fn store(&self) -> Option<Arc<RequestStore>> {
        if self.is_locked() { None } else { Some(self.store.clone()) }
    }
}
