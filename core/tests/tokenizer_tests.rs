use ngramdex::ngram::generate_ngrams;
use ngramdex::tokenizer::tokenize;

#[test]
fn it_lowercases_and_strips_punctuation() {
    let toks = tokenize("The medication caused a headache and nausea, but no dizziness was reported.");
    assert_eq!(toks.first().map(String::as_str), Some("the"));
    assert_eq!(toks.last().map(String::as_str), Some("reported"));
    assert!(toks.contains(&"nausea".to_string()));
    assert!(toks.iter().all(|t| t.chars().all(|c| c.is_alphanumeric() || c == '_')));
}

#[test]
fn it_keeps_stopwords_and_does_not_stem() {
    let words = tokenize("The patients reported");
    assert_eq!(words, vec!["the", "patients", "reported"]);
}

#[test]
fn it_keeps_unicode_letters_and_digits() {
    assert_eq!(tokenize("Café 2024 snake_case"), vec!["café", "2024", "snake_case"]);
}

#[test]
fn ngram_namespaces_do_not_collide() {
    let grams = generate_ngrams(&tokenize("nausea and dizziness"), 3);
    assert!(grams.contains(&"nausea".to_string()));
    assert!(grams.contains(&"nausea and dizziness".to_string()));
    assert!(!grams.contains(&"dizziness and nausea".to_string()));
}
