//! Catalog persistence and id generation.
//!
//! This module provides:
//! - Atomic JSON read/write for the registry document
//! - Path resolution with the `registry.json` fallback
//! - Serialized load-modify-save through [`RegistryStore::mutate`]
//! - Collision-free entry ids

mod atomic;
mod identifier;
mod store;

pub use atomic::{atomic_read_json, atomic_write_json};
pub use identifier::{generate_unique_id, slugify, validate_requested_id};
pub use store::{load_registry, resolve_registry_path, save_registry, RegistryStore};
