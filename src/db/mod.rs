mod completion_store;
mod pool;

#[cfg(test)]
pub mod fixtures;

pub use completion_store::PgCompletionStore;
pub use pool::create_pool;
#[cfg(test)]
pub use pool::lazy_pool;
