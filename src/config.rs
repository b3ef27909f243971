use std::time::Duration;

use reqwest::Client;

use crate::search::SortSpec;

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Global HTTP client timeout covering DNS + connect + response body.
const HTTP_TIMEOUT: Duration = Duration::from_secs(90);
/// Maximum redirect hops before aborting.
const MAX_REDIRECTS: usize = 5;

pub const DEFAULT_MAX_RESULTS: usize = 1000;
pub const DEFAULT_RELATED_CUTOFF: usize = 5;

/// Knobs shared by every search request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Upper bound on documents requested from the feed.
    pub max_results: usize,
    /// Documents scoring below this are dropped. `None` keeps everything.
    pub similarity_threshold: Option<f32>,
    /// Number of related terms offered for selection.
    pub related_term_cutoff: usize,
    pub sort: SortSpec,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            similarity_threshold: None,
            related_term_cutoff: DEFAULT_RELATED_CUTOFF,
            sort: SortSpec::default(),
        }
    }
}

/// HTTP client shared by every service adapter.
pub fn http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()
}
