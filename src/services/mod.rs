pub mod completion_sync;
pub mod stats;
