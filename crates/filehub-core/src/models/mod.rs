//! Data models for the file catalog.
//!
//! `Entry` and `Registry` mirror the on-disk JSON document; the request and
//! response types are what the `FileHub` façade accepts and hands back.

mod entry;
pub(crate) mod lenient;
mod requests;
mod responses;

pub use entry::*;
pub use requests::*;
pub use responses::*;
