//! Content API domain: chapter keys, verse content, and the chapter cache.

pub mod api_types;
pub mod cached_client;
pub mod client;
pub mod types;

pub use cached_client::{ChapterVerseCache, VersesResult};
pub use client::ContentClient;
pub use types::{Adjacent, BookStructure, ChapterKey, ChapterVerses, Verse, SEGMENT_SEPARATOR};
