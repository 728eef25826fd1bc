/// Largest n-gram length the engine indexes.
pub const MAX_NGRAM: usize = 3;

/// Expand tokens into all unigrams, then bigrams, then trigrams (up to `max_n`).
///
/// Terms are space-joined and repeated n-grams are kept, so the output can be
/// counted for raw term frequency.
pub fn generate_ngrams(tokens: &[String], max_n: usize) -> Vec<String> {
    let max_n = max_n.clamp(1, MAX_NGRAM);
    let mut ngrams = Vec::new();
    for n in 1..=max_n {
        if tokens.len() < n {
            break;
        }
        ngrams.extend(tokens.windows(n).map(|w| w.join(" ")));
    }
    ngrams
}
