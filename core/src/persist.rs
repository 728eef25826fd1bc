use crate::analyzer::AnalyzerConfig;
use crate::error::IndexError;
use crate::index::{merge_posting, DocId, Document, Posting};
use crate::store::IndexStore;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const META_VERSION: u32 = 1;
const META_KEY: &[u8] = b"meta.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: usize,
    pub created_at: String,
    pub version: u32,
    /// Analyzer the index was built with; queries must use the same one.
    pub analyzer: AnalyzerConfig,
}

/// `IndexStore` on top of sled.
///
/// Three trees: `documents` (big-endian id -> bincode content), `terms`
/// (term -> bincode posting list, written through a merge operator) and
/// `meta` (JSON `MetaFile`).
pub struct SledStore {
    db: sled::Db,
    documents: sled::Tree,
    terms: sled::Tree,
    meta: sled::Tree,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let db = sled::open(root).with_context(|| format!("opening index store at {}", root.display()))?;
        Self::from_db(db)
    }

    /// A store that is deleted when dropped.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open().context("opening temporary index store")?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self> {
        let documents = db.open_tree("documents")?;
        let terms = db.open_tree("terms")?;
        // merge operators are not persisted, so install on every open
        terms.set_merge_operator(merge_postings);
        let meta = db.open_tree("meta")?;
        Ok(Self { db, documents, terms, meta })
    }

    pub fn save_meta(&self, meta: &MetaFile) -> Result<()> {
        let json = serde_json::to_vec_pretty(meta)?;
        self.meta.insert(META_KEY, json)?;
        Ok(())
    }

    pub fn load_meta(&self) -> Result<Option<MetaFile>> {
        match self.meta.get(META_KEY)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes).context("decoding index meta")?)),
            None => Ok(None),
        }
    }
}

fn decode_doc_id(key: &[u8]) -> Result<DocId> {
    let bytes: [u8; 4] = key
        .try_into()
        .map_err(|_| IndexError::Codec(format!("document key of {} bytes", key.len())))?;
    Ok(DocId::from_be_bytes(bytes))
}

fn merge_postings(_term: &[u8], existing: Option<&[u8]>, incoming: &[u8]) -> Option<Vec<u8>> {
    let mut list: Vec<Posting> = match existing {
        Some(bytes) => match bincode::deserialize(bytes) {
            Ok(list) => list,
            Err(err) => {
                tracing::error!(%err, "stored posting list is undecodable; leaving it untouched");
                return Some(bytes.to_vec());
            }
        },
        None => Vec::new(),
    };
    let posting: Posting = match bincode::deserialize(incoming) {
        Ok(p) => p,
        Err(err) => {
            tracing::error!(%err, "dropping undecodable posting");
            return existing.map(<[u8]>::to_vec);
        }
    };
    if !merge_posting(&mut list, posting) {
        return existing.map(<[u8]>::to_vec);
    }
    match bincode::serialize(&list) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            tracing::error!(%err, "failed to encode posting list");
            existing.map(<[u8]>::to_vec)
        }
    }
}

impl IndexStore for SledStore {
    fn put_document(&self, doc: &Document) -> Result<()> {
        let bytes = bincode::serialize(&doc.content)?;
        self.documents.insert(doc.id.to_be_bytes(), bytes)?;
        Ok(())
    }

    fn document(&self, id: DocId) -> Result<Option<Document>> {
        match self.documents.get(id.to_be_bytes())? {
            Some(bytes) => {
                let content: String = bincode::deserialize(&bytes)?;
                Ok(Some(Document::new(id, content)))
            }
            None => Ok(None),
        }
    }

    fn documents(&self) -> Result<Vec<Document>> {
        let mut docs = Vec::with_capacity(self.documents.len());
        for entry in self.documents.iter() {
            let (key, bytes) = entry?;
            let id = decode_doc_id(&key)?;
            let content: String = bincode::deserialize(&bytes)?;
            docs.push(Document::new(id, content));
        }
        Ok(docs)
    }

    fn merge_posting(&self, term: &str, posting: Posting) -> Result<()> {
        let bytes = bincode::serialize(&posting)?;
        self.terms
            .merge(term.as_bytes(), bytes)
            .with_context(|| format!("merging posting for {term:?}"))?;
        Ok(())
    }

    fn postings(&self, term: &str) -> Result<Vec<Posting>> {
        match self.terms.get(term.as_bytes())? {
            Some(bytes) => Ok(bincode::deserialize(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    fn term_count(&self) -> Result<usize> {
        Ok(self.terms.len())
    }

    fn clear_postings(&self) -> Result<()> {
        self.terms.clear()?;
        Ok(())
    }

    /// Also drops the meta record, which described the old collection.
    fn clear(&self) -> Result<()> {
        self.documents.clear()?;
        self.terms.clear()?;
        self.meta.clear()?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_round_trip_in_id_order() {
        let store = SledStore::temporary().unwrap();
        for (id, text) in [(10, "ten"), (2, "two"), (300, "three hundred")] {
            store.put_document(&Document::new(id, text)).unwrap();
        }
        let ids: Vec<DocId> = store.documents().unwrap().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![2, 10, 300]);
        assert_eq!(store.document(300).unwrap().unwrap().content, "three hundred");
        assert!(store.document(4).unwrap().is_none());
    }

    #[test]
    fn merge_operator_is_a_set_union() {
        let store = SledStore::temporary().unwrap();
        let p = Posting { doc_id: 1, weight: 0.7768564486857903, pos: 3 };
        store.merge_posting("and", p.clone()).unwrap();
        store.merge_posting("and", p.clone()).unwrap();
        store.merge_posting("and", Posting { doc_id: 4, ..p.clone() }).unwrap();
        let list = store.postings("and").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0], p);
        assert_eq!(store.term_count().unwrap(), 1);
        assert!(store.postings("or").unwrap().is_empty());
    }

    #[test]
    fn meta_is_optional_until_saved() {
        let store = SledStore::temporary().unwrap();
        assert!(store.load_meta().unwrap().is_none());
        let meta = MetaFile {
            num_docs: 4,
            num_terms: 120,
            created_at: "2024-01-01T00:00:00Z".into(),
            version: META_VERSION,
            analyzer: AnalyzerConfig::default(),
        };
        store.save_meta(&meta).unwrap();
        assert_eq!(store.load_meta().unwrap(), Some(meta));
        store.clear().unwrap();
        assert!(store.load_meta().unwrap().is_none());
    }

    #[test]
    fn clear_empties_every_tree() {
        let store = SledStore::temporary().unwrap();
        store.put_document(&Document::new(1, "one")).unwrap();
        store.merge_posting("one", Posting { doc_id: 1, weight: 1.0, pos: 0 }).unwrap();
        store.clear_postings().unwrap();
        assert_eq!(store.term_count().unwrap(), 0);
        assert!(store.document(1).unwrap().is_some());
        store.clear().unwrap();
        assert!(store.documents().unwrap().is_empty());
    }
}
