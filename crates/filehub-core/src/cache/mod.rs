//! In-memory caches injected into the catalog façade.

mod recent_media;

pub use recent_media::{MediaKind, RecentMedia, RecentMediaCache};
