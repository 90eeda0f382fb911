pub mod clock;
pub mod snapshot_store;

pub use clock::Clock as FixedClock;
pub use snapshot_store::SnapshotStore as InMemorySnapshotStore;
