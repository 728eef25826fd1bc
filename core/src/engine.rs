use crate::analyzer::Analyzer;
use crate::error::IndexError;
use crate::index::{DocId, Document, Posting, SearchResult, Vocabulary};
use crate::stats::{term_frequencies, DocumentFrequencies};
use crate::store::IndexStore;
use crate::weight::tf_idf;
use anyhow::Result;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::Write;

/// Counts reported by a completed `build`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub num_docs: u32,
    pub num_terms: usize,
    pub postings_written: usize,
}

/// Vector-space search over an `IndexStore`.
///
/// Indexing runs in two stages: document frequencies are collected over the
/// whole stored collection, then every (document, term) weight is computed
/// and merged into the store. Querying is read-only and must not start
/// before indexing has finished.
pub struct SearchEngine<S> {
    analyzer: Analyzer,
    store: S,
    vocabulary: Vocabulary,
}

impl<S: IndexStore> SearchEngine<S> {
    pub fn new(analyzer: Analyzer, store: S) -> Self {
        Self { analyzer, store, vocabulary: Vocabulary::new() }
    }

    pub fn analyzer(&self) -> &Analyzer { &self.analyzer }

    pub fn store(&self) -> &S { &self.store }

    pub fn vocabulary(&self) -> &Vocabulary { &self.vocabulary }

    /// Replace the stored collection with `documents` and build its postings.
    pub fn index(&mut self, documents: &[Document]) -> Result<BuildSummary> {
        self.store.clear()?;
        self.vocabulary = Vocabulary::new();
        for doc in documents {
            self.store.put_document(doc)?;
        }
        self.build()
    }

    /// Index plain texts under sequential ids starting at 1.
    pub fn index_texts<T: AsRef<str>>(&mut self, texts: &[T]) -> Result<BuildSummary> {
        let documents: Vec<Document> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Document::new(i as DocId + 1, text.as_ref()))
            .collect();
        self.index(&documents)
    }

    /// Recompute every posting from the documents currently in the store.
    pub fn build(&mut self) -> Result<BuildSummary> {
        let documents = self.store.documents()?;
        self.store.clear_postings()?;
        let stats = self.collect_stats(&documents);
        let postings_written = self.write_weights(&documents, &stats)?;
        self.store.flush()?;
        let summary = BuildSummary { num_docs: stats.num_docs(), num_terms: stats.num_terms(), postings_written };
        tracing::info!(
            num_docs = summary.num_docs,
            num_terms = summary.num_terms,
            postings = summary.postings_written,
            "index build complete"
        );
        Ok(summary)
    }

    fn collect_stats(&self, documents: &[Document]) -> DocumentFrequencies {
        let stats = DocumentFrequencies::collect(&self.analyzer, documents);
        tracing::info!(num_docs = stats.num_docs(), num_terms = stats.num_terms(), "document frequencies collected");
        stats
    }

    fn write_weights(&mut self, documents: &[Document], stats: &DocumentFrequencies) -> Result<usize> {
        let n = stats.num_docs();
        let mut written = 0;
        for doc in documents {
            let terms = self.analyzer.terms(&doc.content);
            let tf = term_frequencies(&terms);
            // walk terms in first-occurrence order so positions are reproducible
            let mut seen = HashSet::new();
            for term in terms.iter().filter(|t| seen.insert(t.as_str())) {
                let freq = tf[term.as_str()];
                let weight = tf_idf(freq, n, stats.get(term));
                let pos = self.vocabulary.position_of(term);
                self.store.merge_posting(term, Posting { doc_id: doc.id, weight, pos })?;
                written += 1;
            }
        }
        Ok(written)
    }

    /// Rank stored documents against `query` by cosine similarity.
    ///
    /// The query vector gives weight 1.0 to every distinct query term present
    /// in the index, while documents carry full tf-idf weights. Scores are
    /// rounded to two decimals; ties go to the lower document id.
    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let query_terms = self.analyzer.terms(query);
        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
        let mut query_vector: HashMap<String, f64> = HashMap::new();
        let mut candidates: BTreeSet<DocId> = BTreeSet::new();
        for term in &query_terms {
            if query_vector.contains_key(term) {
                continue;
            }
            let list = self.store.postings(term)?;
            if list.is_empty() {
                continue;
            }
            candidates.extend(list.iter().map(|p| p.doc_id));
            query_vector.insert(term.clone(), 1.0);
            postings.insert(term.clone(), list);
        }
        tracing::debug!(query, terms = query_vector.len(), candidates = candidates.len(), "query analyzed");

        let query_norm = (query_vector.len() as f64).sqrt();
        let mut results = Vec::new();
        for doc_id in candidates {
            let doc = self
                .store
                .document(doc_id)?
                .ok_or(IndexError::MissingDocument(doc_id))?;
            let doc_vector = self.document_vector(&doc, &mut postings)?;
            let dot: f64 = query_vector
                .iter()
                .filter_map(|(term, q)| doc_vector.get(term).map(|d| q * d))
                .sum();
            let doc_norm = doc_vector.values().map(|w| w * w).sum::<f64>().sqrt();
            let denom = query_norm * doc_norm;
            if denom > 0.0 {
                results.push(SearchResult { doc_id, content: doc.content, score: round2(dot / denom) });
            }
        }
        sort_results(&mut results);
        Ok(results)
    }

    pub fn search_top(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        let mut results = self.search(query)?;
        results.truncate(k);
        Ok(results)
    }

    /// Rebuild a document's sparse tf-idf vector from its stored content.
    /// Terms without a posting for this document are left out.
    fn document_vector(
        &self,
        doc: &Document,
        cache: &mut HashMap<String, Vec<Posting>>,
    ) -> Result<HashMap<String, f64>> {
        let mut vector = HashMap::new();
        for term in self.analyzer.terms(&doc.content) {
            if vector.contains_key(&term) {
                continue;
            }
            if !cache.contains_key(&term) {
                let list = self.store.postings(&term)?;
                cache.insert(term.clone(), list);
            }
            if let Some(p) = cache[&term].iter().find(|p| p.doc_id == doc.id) {
                vector.insert(term, p.weight);
            }
        }
        Ok(vector)
    }

    /// Write each query followed by its ranked `"content", score` lines.
    pub fn run_queries<Q, W>(&self, queries: &[Q], out: &mut W) -> Result<()>
    where
        Q: AsRef<str>,
        W: Write,
    {
        for query in queries {
            let query = query.as_ref();
            writeln!(out, "Query: {query}")?;
            for result in self.search(query)? {
                writeln!(out, "\"{}\", {:.2}", result.content, result.score)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Descending score, then ascending document id.
pub fn sort_results(results: &mut [SearchResult]) {
    results.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.doc_id.cmp(&b.doc_id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn engine(texts: &[&str]) -> SearchEngine<MemoryStore> {
        let mut engine = SearchEngine::new(Analyzer::default(), MemoryStore::new());
        engine.index_texts(texts).unwrap();
        engine
    }

    #[test]
    fn sorts_descending_with_id_tiebreak() {
        let mut results: Vec<SearchResult> = [(1, 0.81), (2, 0.0), (3, 0.5), (0, 0.5)]
            .into_iter()
            .map(|(doc_id, score)| SearchResult { doc_id, content: String::new(), score })
            .collect();
        sort_results(&mut results);
        let order: Vec<(DocId, f64)> = results.iter().map(|r| (r.doc_id, r.score)).collect();
        assert_eq!(order, vec![(1, 0.81), (0, 0.5), (3, 0.5), (2, 0.0)]);
    }

    #[test]
    fn rounding() {
        assert_eq!(round2(0.4090769557372511), 0.41);
        assert_eq!(round2(0.13233655652119664), 0.13);
        assert_eq!(round2(1.0000000000000002), 1.0);
    }

    #[test]
    fn empty_collection_and_query() {
        let e = engine(&[]);
        assert!(e.search("anything").unwrap().is_empty());
        let e = engine(&["red apples", "green pears"]);
        assert!(e.search("").unwrap().is_empty());
        assert!(e.search("?!").unwrap().is_empty());
    }

    #[test]
    fn identical_single_document_scores_one() {
        let e = engine(&["alpha beta"]);
        let results = e.search("alpha beta").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 1.0);
    }

    #[test]
    fn non_overlapping_documents_are_excluded() {
        let e = engine(&["red apples", "green pears", "red pears"]);
        let ids: Vec<DocId> = e.search("apples").unwrap().iter().map(|r| r.doc_id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn search_top_truncates() {
        let e = engine(&["red apples", "red pears", "red plums"]);
        assert_eq!(e.search("red").unwrap().len(), 3);
        let top = e.search_top("red", 2).unwrap();
        let ids: Vec<DocId> = top.iter().map(|r| r.doc_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn positions_follow_first_encounter() {
        let e = engine(&["b a", "a c"]);
        assert_eq!(e.vocabulary().get("b"), Some(0));
        assert_eq!(e.vocabulary().get("a"), Some(1));
        assert_eq!(e.vocabulary().get("b a"), Some(2));
        assert_eq!(e.vocabulary().get("c"), Some(3));
    }

    #[test]
    fn missing_document_is_fatal() {
        let store = MemoryStore::new();
        store.merge_posting("ghost", Posting { doc_id: 9, weight: 1.0, pos: 0 }).unwrap();
        let e = SearchEngine::new(Analyzer::default(), store);
        let err = e.search("ghost").unwrap_err();
        assert_eq!(err.downcast_ref::<IndexError>(), Some(&IndexError::MissingDocument(9)));
    }
}
