//! API implementation submodules.
//!
//! Each submodule contains `impl FileHub` blocks that extend the public API
//! with one group of operations. The struct definition remains in `lib.rs`.

mod builder;
mod catalog;
mod delivery;
mod import;

pub use builder::FileHubBuilder;
