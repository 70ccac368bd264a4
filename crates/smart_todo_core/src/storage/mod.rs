pub mod credentials;
pub mod json_store;
pub mod kv;

pub use credentials::CredentialStore;
pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore};
