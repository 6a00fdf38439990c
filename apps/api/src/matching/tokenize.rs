//! Whitespace tokenizer shared by every lexical component.
//!
//! Lowercase, then split on Unicode whitespace. No punctuation stripping and no
//! stemming: "Python," and "python" are different tokens.

use std::collections::HashSet;

/// Lowercased whitespace tokens, in text order, duplicates kept.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Unique lowercased whitespace tokens.
pub fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}
