//! Smoothed TF-IDF.
//!
//! `tf = 1 + ln(freq)` and `idf = ln(N / (df + 1)) + 1`. Both `+1` terms are
//! part of the scheme; the unsmoothed `ln(N / df)` is not used.

/// Logarithmically damped term frequency. `freq` must be at least 1.
pub fn tf(freq: u32) -> f64 {
    debug_assert!(freq >= 1);
    1.0 + (freq as f64).ln()
}

pub fn idf(num_docs: u32, doc_freq: u32) -> f64 {
    ((num_docs as f64) / (doc_freq as f64 + 1.0)).ln() + 1.0
}

pub fn tf_idf(freq: u32, num_docs: u32, doc_freq: u32) -> f64 {
    tf(freq) * idf(num_docs, doc_freq)
}
