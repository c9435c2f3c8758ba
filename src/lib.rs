//! Multi-translation Bible reader client.
//!
//! The heart of the crate is [`bible::ChapterVerseCache`]: a per-locale,
//! bounded cache of chapter content with background prefetching of the
//! chapters around the one being read.

pub mod bible;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;

pub use bible::ChapterVerseCache;
pub use error::FetchError;
