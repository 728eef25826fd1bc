use crate::index::{merge_posting, DocId, Document, Posting};
use anyhow::Result;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

/// What the engine needs from persistent storage: upsert with additive posting
/// merge, point reads by key, and a full document scan.
pub trait IndexStore {
    /// Insert or replace the record for `doc.id`.
    fn put_document(&self, doc: &Document) -> Result<()>;
    fn document(&self, id: DocId) -> Result<Option<Document>>;
    /// Every stored document in ascending id order.
    fn documents(&self) -> Result<Vec<Document>>;
    /// Add `posting` to the term's list unless an equal posting is already there.
    fn merge_posting(&self, term: &str, posting: Posting) -> Result<()>;
    /// Empty for unknown terms.
    fn postings(&self, term: &str) -> Result<Vec<Posting>>;
    fn term_count(&self) -> Result<usize>;
    /// Drop every posting list, keeping documents.
    fn clear_postings(&self) -> Result<()>;
    /// Drop documents and postings.
    fn clear(&self) -> Result<()>;
    fn flush(&self) -> Result<()> { Ok(()) }
}

/// In-process store for tests and one-shot runs.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<BTreeMap<DocId, String>>,
    terms: RwLock<HashMap<String, Vec<Posting>>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

impl IndexStore for MemoryStore {
    fn put_document(&self, doc: &Document) -> Result<()> {
        self.docs.write().insert(doc.id, doc.content.clone());
        Ok(())
    }

    fn document(&self, id: DocId) -> Result<Option<Document>> {
        Ok(self.docs.read().get(&id).map(|content| Document::new(id, content.clone())))
    }

    fn documents(&self) -> Result<Vec<Document>> {
        Ok(self
            .docs
            .read()
            .iter()
            .map(|(id, content)| Document::new(*id, content.clone()))
            .collect())
    }

    fn merge_posting(&self, term: &str, posting: Posting) -> Result<()> {
        let mut terms = self.terms.write();
        merge_posting(terms.entry(term.to_string()).or_default(), posting);
        Ok(())
    }

    fn postings(&self, term: &str) -> Result<Vec<Posting>> {
        Ok(self.terms.read().get(term).cloned().unwrap_or_default())
    }

    fn term_count(&self) -> Result<usize> {
        Ok(self.terms.read().len())
    }

    fn clear_postings(&self) -> Result<()> {
        self.terms.write().clear();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.docs.write().clear();
        self.terms.write().clear();
        Ok(())
    }
}
