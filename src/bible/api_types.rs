//! Serde-deserializable types matching content API responses.
//!
//! Every endpoint wraps its payload in `{ "data": ... }`. A missing `data`
//! field is a failed request, not an empty result.

use serde::Deserialize;
use std::collections::HashMap;

use super::types::{BookStructure, ChapterVerses};

/// `GET /api/{locale}/translation/{t}/book/{b}/chapter/{c}`
#[derive(Debug, Deserialize)]
pub struct ApiChapterResponse {
  pub data: Option<HashMap<String, String>>,
}

impl ApiChapterResponse {
  pub fn into_verses(self) -> Option<ChapterVerses> {
    self.data.map(ChapterVerses::new)
  }
}

/// `GET /api/{locale}/translation/{t}`
#[derive(Debug, Deserialize)]
pub struct ApiStructureResponse {
  pub data: Option<HashMap<String, Vec<u32>>>,
}

impl ApiStructureResponse {
  pub fn into_structure(self) -> Option<BookStructure> {
    self.data.map(BookStructure::new)
  }
}
