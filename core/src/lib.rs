//! N-gram TF-IDF inverted index with cosine-similarity ranking.

pub mod analyzer;
pub mod engine;
pub mod error;
pub mod index;
pub mod ngram;
pub mod persist;
pub mod stats;
pub mod store;
pub mod tokenizer;
pub mod weight;

pub use analyzer::{Analyzer, AnalyzerConfig};
pub use engine::{BuildSummary, SearchEngine};
pub use error::IndexError;
pub use index::{DocId, Document, Posting, SearchResult, TermPos};
pub use persist::{MetaFile, SledStore};
pub use store::{IndexStore, MemoryStore};

/// The four-document collection used by `ngramdex demo` and the tests.
pub const SAMPLE_DOCUMENTS: [&str; 4] = [
    "After the medication, headache and nausea were reported by the patient.",
    "The patient reported nausea and dizziness caused by the medication.",
    "Headache and dizziness are common effects of this medication.",
    "The medication caused a headache and nausea, but no dizziness was reported.",
];

pub const SAMPLE_QUERIES: [&str; 5] = [
    "nausea and dizziness",
    "effects",
    "nausea was reported",
    "dizziness",
    "the medication",
];
