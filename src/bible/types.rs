use std::collections::HashMap;
use std::fmt;

/// Separator the content API embeds in verse text where a display line breaks.
pub const SEGMENT_SEPARATOR: &str = "//";

/// Identity of one cached chapter: (translation, book, chapter)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChapterKey {
  pub translation: String,
  pub book: String,
  pub chapter: u32,
}

impl ChapterKey {
  pub fn new(translation: impl Into<String>, book: impl Into<String>, chapter: u32) -> Self {
    Self {
      translation: translation.into(),
      book: book.into(),
      chapter,
    }
  }
}

impl fmt::Display for ChapterKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}_{}_{}", self.translation, self.book, self.chapter)
  }
}

/// A single verse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verse {
  /// Verse number as sent by the API (usually digits, e.g. "12")
  pub number: String,
  pub text: String,
}

impl Verse {
  /// Display lines of the verse, split on [`SEGMENT_SEPARATOR`].
  pub fn lines(&self) -> impl Iterator<Item = &str> {
    self.text.split(SEGMENT_SEPARATOR)
  }
}

/// Verse content of one chapter, ordered by numeric verse number
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterVerses {
  verses: Vec<Verse>,
}

impl ChapterVerses {
  pub fn new(verses: impl IntoIterator<Item = (String, String)>) -> Self {
    let mut verses: Vec<Verse> = verses
      .into_iter()
      .map(|(number, text)| Verse { number, text })
      .collect();
    verses.sort_by(|a, b| verse_order(&a.number).cmp(&verse_order(&b.number)));
    Self { verses }
  }

  pub fn get(&self, number: &str) -> Option<&Verse> {
    self.verses.iter().find(|v| v.number == number)
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Verse> {
    self.verses.iter()
  }

  pub fn len(&self) -> usize {
    self.verses.len()
  }

  pub fn is_empty(&self) -> bool {
    self.verses.is_empty()
  }
}

impl<'a> IntoIterator for &'a ChapterVerses {
  type Item = &'a Verse;
  type IntoIter = std::slice::Iter<'a, Verse>;

  fn into_iter(self) -> Self::IntoIter {
    self.verses.iter()
  }
}

/// Sort key: leading digits numerically, non-numeric numbers last.
fn verse_order(number: &str) -> (u32, &str) {
  let digits = number
    .find(|c: char| !c.is_ascii_digit())
    .unwrap_or(number.len());
  let value = number[..digits].parse().unwrap_or(u32::MAX);
  (value, number)
}

/// Chapters of the previous and next position within a book
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Adjacent {
  pub previous: Option<u32>,
  pub next: Option<u32>,
}

/// Chapter lists of a translation, keyed by book id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookStructure {
  books: HashMap<String, Vec<u32>>,
}

impl BookStructure {
  pub fn new(books: HashMap<String, Vec<u32>>) -> Self {
    Self { books }
  }

  /// Ordered chapter numbers of a book
  pub fn chapters(&self, book: &str) -> Option<&[u32]> {
    self.books.get(book).map(Vec::as_slice)
  }

  pub fn contains(&self, book: &str, chapter: u32) -> bool {
    self
      .chapters(book)
      .is_some_and(|chapters| chapters.contains(&chapter))
  }

  /// Neighbors of `chapter` inside its own book. Never crosses book boundaries.
  ///
  /// An unknown book, or a chapter missing from the book's list, has no neighbors.
  pub fn adjacent(&self, book: &str, chapter: u32) -> Adjacent {
    let Some(chapters) = self.chapters(book) else {
      return Adjacent::default();
    };
    let Some(index) = chapters.iter().position(|&c| c == chapter) else {
      return Adjacent::default();
    };

    Adjacent {
      previous: index.checked_sub(1).map(|i| chapters[i]),
      next: chapters.get(index + 1).copied(),
    }
  }

  pub fn books(&self) -> impl Iterator<Item = &str> {
    self.books.keys().map(String::as_str)
  }

  pub fn is_empty(&self) -> bool {
    self.books.is_empty()
  }
}

impl FromIterator<(String, Vec<u32>)> for BookStructure {
  fn from_iter<I: IntoIterator<Item = (String, Vec<u32>)>>(iter: I) -> Self {
    Self::new(iter.into_iter().collect())
  }
}
