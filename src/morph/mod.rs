//! Morphological analysis: token model and the tokenizer service seam.

pub mod client;

pub use client::{HttpMorphAnalyzer, MorphError};

/// Wildcard base form emitted when the analyzer has no canonical form.
pub const WILDCARD_BASE_FORM: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosCategory {
    Noun,
    Verb,
    Adjective,
    Other,
}

impl PosCategory {
    /// Categorizes a part-of-speech tag by its first comma-separated field.
    ///
    /// Accepts IPADIC tags (`名詞,一般,*,*`) and Universal Dependencies tags (`NOUN`).
    pub fn from_tag(tag: &str) -> Self {
        let head = tag.split(',').next().unwrap_or_default().trim();
        match head {
            "名詞" | "NOUN" | "PROPN" => PosCategory::Noun,
            "動詞" | "VERB" => PosCategory::Verb,
            "形容詞" | "ADJ" => PosCategory::Adjective,
            _ => PosCategory::Other,
        }
    }

    pub fn is_content(self) -> bool {
        !matches!(self, PosCategory::Other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub surface: String,
    pub base_form: String,
    pub pos: PosCategory,
}

/// Segments text into morphemes.
/// Implemented by `HttpMorphAnalyzer` for production; mock implementations used in tests.
pub trait MorphAnalyzer {
    async fn tokenize(&self, text: &str) -> Result<Vec<Token>, MorphError>;
}
