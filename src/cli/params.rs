use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_MAX_RESULTS, DEFAULT_RELATED_CUTOFF};
use crate::search::{Lang, SortDirection, SortKey};

/// Search arXiv with a topic keyword and a query in another language,
/// expanded with related terms from Wikipedia.
#[derive(Parser, Debug)]
#[command(name = "arxiv-lens", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Expand the query, fetch papers for the topic, and rank them.
    Search(SearchArgs),
    /// Show extracted keywords and related-term candidates only.
    Related(RelatedArgs),
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Natural-language query (e.g. "機械学習")
    #[arg(short, long)]
    pub query: String,
    /// Use the query as-is instead of splitting it into keywords
    #[arg(long)]
    pub no_morph: bool,
    /// Wikipedia edition used for related terms
    #[arg(long, value_enum, default_value_t = Lang::Ja)]
    pub lang: Lang,
    /// Number of related terms to offer
    #[arg(long, default_value_t = DEFAULT_RELATED_CUTOFF)]
    pub related_top: usize,
}

#[derive(Args, Debug)]
pub struct RelatedArgs {
    #[command(flatten)]
    pub query: QueryArgs,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// arXiv topic keyword in English (e.g. "transformer")
    #[arg(short, long)]
    pub topic: String,
    #[command(flatten)]
    pub query: QueryArgs,
    /// First publication date, YYYY-MM-DD (default: 30 days before --to)
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last publication date, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// Ranking key
    #[arg(long, value_enum, default_value_t = SortKey::Score)]
    pub sort: SortKey,
    /// Ranking direction
    #[arg(long, value_enum, default_value_t = SortDirection::Desc)]
    pub order: SortDirection,
    /// Drop papers with similarity below this value
    #[arg(long)]
    pub threshold: Option<f32>,
    /// Maximum papers requested from arXiv
    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    pub max_results: usize,
    /// Related term to add to the query (repeatable)
    #[arg(long = "select", value_name = "TERM")]
    pub selected: Vec<String>,
    /// Keep only papers by this author (repeatable)
    #[arg(long = "author", value_name = "NAME")]
    pub authors: Vec<String>,
    /// Result page, 10 papers per page
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}
