//! Checkpoint persistence and run locking
//!
//! - [`state`] - The in-memory identifier → cleaned text mapping
//! - [`store`] - Loading, atomically saving and clearing the checkpoint file
//! - [`lock`] - A lock file that keeps two runs off the same checkpoint

pub mod lock;
pub mod state;
pub mod store;

pub use lock::{lock_path_for, LockRecord, RunLock};
pub use state::Checkpoint;
pub use store::CheckpointStore;
