pub mod cache;
pub mod store;

pub use cache::{KeyCache, KeyPair, DEFAULT_MAX_AGE};
pub use store::{FileStore, KeyValueStore, MemoryStore};
