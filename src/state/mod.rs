//! Durable project state.
//!
//! The only thing dotrun persists is `.dotrun.json`, a flat JSON object
//! holding the last installed fingerprint of each ecosystem.

pub mod hash;
pub mod store;

pub use hash::hash_file;
pub use store::StateStore;
