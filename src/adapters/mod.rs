pub mod snapshot;
pub mod wager_store;

pub use snapshot::{SnapshotEvent, SnapshotResultsProvider};
pub use wager_store::{InMemoryWagerStore, WagerStore};
