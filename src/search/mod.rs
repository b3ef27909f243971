//! Query expansion and relevance ranking: keyword extraction, related-term
//! discovery and ranking, query expansion, and document scoring.

mod document;
pub(crate) mod engine;
mod expand;
mod keywords;
mod lang;
mod ranking;
mod related;
#[cfg(test)]
pub(crate) mod testing;

pub use document::{Document, ScoredDocument};
pub use engine::{Pipeline, RelatedTerms, SearchReport, SearchRequest};
pub use lang::Lang;
pub use ranking::{RankedDocuments, SortDirection, SortKey, SortSpec};
pub use related::ScoredTerm;
