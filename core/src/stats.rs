use crate::analyzer::Analyzer;
use crate::index::Document;
use std::collections::{HashMap, HashSet};

/// Pass 1 output: how many documents contain each term, and how many documents there are.
#[derive(Debug, Default, Clone)]
pub struct DocumentFrequencies {
    counts: HashMap<String, u32>,
    num_docs: u32,
}

impl DocumentFrequencies {
    /// Scan the whole collection, counting each distinct term once per document.
    pub fn collect<'a, I>(analyzer: &Analyzer, documents: I) -> Self
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut stats = Self::default();
        for doc in documents {
            stats.num_docs += 1;
            let distinct: HashSet<String> = analyzer.terms(&doc.content).into_iter().collect();
            for term in distinct {
                *stats.counts.entry(term).or_insert(0) += 1;
            }
        }
        stats
    }

    pub fn num_docs(&self) -> u32 { self.num_docs }

    pub fn num_terms(&self) -> usize { self.counts.len() }

    /// 0 for a term no document contains.
    pub fn get(&self, term: &str) -> u32 {
        self.counts.get(term).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(t, c)| (t.as_str(), *c))
    }
}

/// Pass 2: raw term frequency over one document's n-gram multiset.
pub fn term_frequencies(terms: &[String]) -> HashMap<&str, u32> {
    let mut tf: HashMap<&str, u32> = HashMap::new();
    for term in terms {
        *tf.entry(term.as_str()).or_insert(0) += 1;
    }
    tf
}
