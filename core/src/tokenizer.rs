use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").expect("valid regex");
}

/// Tokenize text into lowercase words: every character that is neither a word
/// character nor whitespace is dropped, then the remainder is split on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    stripped.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("After the medication, headache and nausea!");
        assert_eq!(t, vec!["after", "the", "medication", "headache", "and", "nausea"]);
    }

    #[test]
    fn punctuation_inside_words_is_removed() {
        assert_eq!(tokenize("don't re-index"), vec!["dont", "reindex"]);
    }

    #[test]
    fn degenerate_input_is_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ... !? ,, ").is_empty());
    }
}
