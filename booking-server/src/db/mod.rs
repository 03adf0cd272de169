//! 持久化层 (redb)

pub mod storage;

pub use storage::{BookingStorage, StorageError, StorageResult, StorageStats};
