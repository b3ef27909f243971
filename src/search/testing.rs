//! In-memory service doubles shared by the pipeline tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::arxiv::{DateRange, DocumentFeed, FeedError};
use crate::embedding::{Embedder, Embedding, EmbeddingError};
use crate::morph::{MorphAnalyzer, MorphError, PosCategory, Token};
use crate::search::{Document, Lang};
use crate::wiki::{KnowledgeLookup, Section, WikiError, WikiPage};

/// Vector for texts the fixture does not list.
const UNKNOWN: [f32; 2] = [0.0, 1.0];

pub struct FakeEmbedder {
    vectors: HashMap<String, Embedding>,
    fail: bool,
    /// Drop the last vector of every batch.
    short: bool,
    calls: Mutex<usize>,
    texts: Mutex<Vec<String>>,
}

impl FakeEmbedder {
    pub fn new(vectors: &[(&str, [f32; 2])]) -> Self {
        Self {
            vectors: vectors
                .iter()
                .map(|(text, v)| (text.to_string(), v.to_vec()))
                .collect(),
            fail: false,
            short: false,
            calls: Mutex::new(0),
            texts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }

    /// Returns one vector fewer than it is given.
    pub fn short() -> Self {
        Self {
            short: true,
            ..Self::new(&[])
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    pub fn encoded_texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

impl Embedder for FakeEmbedder {
    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        *self.calls.lock().unwrap() += 1;
        self.texts.lock().unwrap().extend(texts.iter().cloned());
        if self.fail {
            return Err(EmbeddingError::RateLimited);
        }
        let mut vectors: Vec<Embedding> = texts
            .iter()
            .map(|t| {
                self.vectors
                    .get(t)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN.to_vec())
            })
            .collect();
        if self.short {
            vectors.pop();
        }
        Ok(vectors)
    }
}

/// A resolved page; `related` is stored under both the ja and en related-items labels.
pub fn page(title: &str, links: &[&str], related: Option<&str>) -> WikiPage {
    let sections = related
        .map(|text| {
            [Lang::Ja, Lang::En]
                .iter()
                .map(|lang| Section {
                    title: lang.related_section_label().to_string(),
                    text: text.to_string(),
                    children: vec![],
                })
                .collect()
        })
        .unwrap_or_default();
    WikiPage {
        title: title.to_string(),
        exists: true,
        links: links.iter().map(|l| l.to_string()).collect(),
        sections,
    }
}

pub struct FakeWiki {
    pages: Vec<WikiPage>,
    fail: bool,
    titles: Mutex<Vec<String>>,
}

impl FakeWiki {
    pub fn new(pages: Vec<WikiPage>) -> Self {
        Self {
            pages,
            fail: false,
            titles: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(vec![])
        }
    }

    pub fn looked_up(&self) -> Vec<String> {
        self.titles.lock().unwrap().clone()
    }
}

impl KnowledgeLookup for FakeWiki {
    async fn lookup(&self, title: &str, _lang: Lang) -> Result<WikiPage, WikiError> {
        self.titles.lock().unwrap().push(title.to_string());
        if self.fail {
            return Err(WikiError::RateLimited);
        }
        Ok(self
            .pages
            .iter()
            .find(|p| p.title == title)
            .cloned()
            .unwrap_or_else(|| WikiPage::missing(title)))
    }
}

/// Splits on whitespace unless a split is registered for the word; every
/// piece is a noun whose base form is itself.
pub struct FakeMorph {
    splits: HashMap<String, Vec<String>>,
    fail: bool,
}

impl FakeMorph {
    pub fn new() -> Self {
        Self {
            splits: HashMap::new(),
            fail: false,
        }
    }

    pub fn splitting(word: &str, parts: &[&str]) -> Self {
        let mut morph = Self::new();
        morph
            .splits
            .insert(word.to_string(), parts.iter().map(|p| p.to_string()).collect());
        morph
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }
}

impl MorphAnalyzer for FakeMorph {
    async fn tokenize(&self, text: &str) -> Result<Vec<Token>, MorphError> {
        if self.fail {
            return Err(MorphError::Api {
                code: 503,
                message: "unavailable".into(),
            });
        }
        Ok(text
            .split_whitespace()
            .flat_map(|w| {
                self.splits
                    .get(w)
                    .cloned()
                    .unwrap_or_else(|| vec![w.to_string()])
            })
            .map(|w| Token {
                surface: w.clone(),
                base_form: w,
                pos: PosCategory::Noun,
            })
            .collect())
    }
}

pub struct FakeFeed {
    documents: Vec<Document>,
    fail: bool,
    requests: Mutex<Vec<(String, DateRange, usize)>>,
}

impl FakeFeed {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(vec![])
        }
    }

    pub fn requests(&self) -> Vec<(String, DateRange, usize)> {
        self.requests.lock().unwrap().clone()
    }
}

impl DocumentFeed for FakeFeed {
    async fn fetch(
        &self,
        topic: &str,
        range: DateRange,
        max_results: usize,
    ) -> Result<Vec<Document>, FeedError> {
        self.requests
            .lock()
            .unwrap()
            .push((topic.to_string(), range, max_results));
        if self.fail {
            return Err(FeedError::Status(503));
        }
        Ok(self
            .documents
            .iter()
            .filter(|d| range.contains(d.published))
            .take(max_results)
            .cloned()
            .collect())
    }
}
