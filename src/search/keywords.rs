use std::collections::HashSet;

use crate::morph::{Token, WILDCARD_BASE_FORM};

/// Content-bearing base forms of `tokens`, first occurrence wins.
///
/// Keeps nouns, verbs and adjectives; drops the wildcard base form and any
/// base form equal to the raw `query`.
pub fn extract_keywords(tokens: &[Token], query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokens
        .iter()
        .filter(|t| t.pos.is_content())
        .map(|t| t.base_form.as_str())
        .filter(|base| *base != WILDCARD_BASE_FORM && *base != query)
        .filter(|base| seen.insert(*base))
        .map(str::to_string)
        .collect()
}
