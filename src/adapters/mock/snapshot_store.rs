use crate::domain::Snapshot;
use crate::ports::snapshot_store::{Result, SnapshotStore as SnapshotStoreTrait};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory implementation of SnapshotStore
///
/// Keeps every saved snapshot so tests can inspect what was persisted and in
/// which order. Can be switched into a failing mode to exercise error paths.
#[derive(Default)]
pub struct SnapshotStore {
    initial: Mutex<Option<Snapshot>>,
    saved: Mutex<Vec<Snapshot>>,
    failing: AtomicBool,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already persisted snapshot
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            initial: Mutex::new(Some(snapshot)),
            ..Self::default()
        }
    }

    /// Make subsequent load/save calls fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All snapshots saved so far, oldest first
    pub fn saved(&self) -> Vec<Snapshot> {
        self.saved.lock().unwrap().clone()
    }

    pub fn last_saved(&self) -> Option<Snapshot> {
        self.saved.lock().unwrap().last().cloned()
    }

    pub fn save_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }
}

#[async_trait]
impl SnapshotStoreTrait for SnapshotStore {
    /// Return the latest saved snapshot, falling back to the initial one
    async fn load(&self) -> Result<Option<Snapshot>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err("mock snapshot store is failing".into());
        }
        match self.last_saved() {
            Some(snapshot) => Ok(Some(snapshot)),
            None => Ok(self.initial.lock().unwrap().clone()),
        }
    }

    /// Record the snapshot
    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err("mock snapshot store is failing".into());
        }
        self.saved.lock().unwrap().push(snapshot.clone());
        Ok(())
    }
}
