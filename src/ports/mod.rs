pub mod clock;
pub mod snapshot_store;

pub use clock::Clock;
pub use snapshot_store::SnapshotStore;
