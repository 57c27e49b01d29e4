// src/key/mod.rs
// =============================================================================
// The site-verification key (the IndexNow "API key").
//
// Submodules:
// - api_key: the validated key type and the format rules
// - store: generation, persistence and retrieval
// - verification: how the key is exposed so a search engine can check it
// =============================================================================

mod api_key;
mod store;
pub mod verification;

pub use api_key::{validate, ApiKey, MAX_KEY_LENGTH, MIN_KEY_LENGTH};
pub use store::KeyStore;
