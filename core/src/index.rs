use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type DocId = u32;
/// Vocabulary position of a term; auxiliary, never used for scoring.
pub type TermPos = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub content: String,
}

impl Document {
    pub fn new(id: DocId, content: impl Into<String>) -> Self {
        Self { id, content: content.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub weight: f64, // smoothed tf-idf, not normalized
    pub pos: TermPos,
}

/// Insert `posting` unless an equal one is already in the list.
/// Returns whether the list changed.
pub fn merge_posting(list: &mut Vec<Posting>, posting: Posting) -> bool {
    if list.contains(&posting) {
        return false;
    }
    list.push(posting);
    true
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub doc_id: DocId,
    pub content: String,
    pub score: f64,
}

/// Term → position, assigned on first encounter.
#[derive(Debug, Default, Clone)]
pub struct Vocabulary {
    positions: HashMap<String, TermPos>,
}

impl Vocabulary {
    pub fn new() -> Self { Self::default() }

    pub fn position_of(&mut self, term: &str) -> TermPos {
        if let Some(&pos) = self.positions.get(term) {
            return pos;
        }
        let pos = self.positions.len() as TermPos;
        self.positions.insert(term.to_string(), pos);
        pos
    }

    pub fn get(&self, term: &str) -> Option<TermPos> {
        self.positions.get(term).copied()
    }

    pub fn len(&self) -> usize { self.positions.len() }

    pub fn is_empty(&self) -> bool { self.positions.is_empty() }
}
