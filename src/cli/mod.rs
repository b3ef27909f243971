mod format;
pub mod params;

use chrono::{Days, Local, NaiveDate};
use tracing::{info, warn};

use crate::arxiv::{ArxivClient, DateRange};
use crate::config::{self, PipelineConfig};
use crate::embedding::HttpEmbedder;
use crate::morph::HttpMorphAnalyzer;
use crate::search::{Pipeline, SearchRequest, SortSpec};
use crate::wiki::WikipediaClient;

use params::{Cli, Command, QueryArgs, SearchArgs};

/// Days covered when only the end date (or nothing) is given.
const DEFAULT_WINDOW_DAYS: u64 = 30;

type HttpPipeline = Pipeline<HttpMorphAnalyzer, HttpEmbedder, WikipediaClient, ArxivClient>;

fn build_pipeline(config: PipelineConfig) -> Result<HttpPipeline, reqwest::Error> {
    let http = config::http_client()?;
    let embedder = HttpEmbedder::from_env(http.clone());
    info!(model = embedder.model(), "embedding model selected");
    Ok(Pipeline::new(
        HttpMorphAnalyzer::from_env(http.clone()),
        embedder,
        WikipediaClient::from_env(http.clone()),
        ArxivClient::from_env(http),
        config,
    ))
}

/// `to` defaults to `today`, `from` to `DEFAULT_WINDOW_DAYS` before `to`.
fn resolve_range(from: Option<NaiveDate>, to: Option<NaiveDate>, today: NaiveDate) -> DateRange {
    let to = to.unwrap_or(today);
    let from = from.or_else(|| to.checked_sub_days(Days::new(DEFAULT_WINDOW_DAYS)));
    if from.is_some_and(|from| from > to) {
        warn!(?from, %to, "start date is after end date, nothing will match");
    }
    DateRange { from, to: Some(to) }
}

fn search_config(args: &SearchArgs) -> PipelineConfig {
    PipelineConfig {
        max_results: args.max_results,
        similarity_threshold: args.threshold,
        related_term_cutoff: args.query.related_top,
        sort: SortSpec {
            key: args.sort,
            direction: args.order,
        },
    }
}

fn search_request(args: SearchArgs, today: NaiveDate) -> SearchRequest {
    SearchRequest {
        range: resolve_range(args.from, args.to, today),
        topic: args.topic,
        query: args.query.query,
        use_morph: !args.query.no_morph,
        lang: args.query.lang,
        selected_terms: args.selected,
        authors: args.authors,
        page: args.page,
    }
}

async fn run_search(args: SearchArgs) -> Result<String, Box<dyn std::error::Error>> {
    let pipeline = build_pipeline(search_config(&args))?;
    let request = search_request(args, Local::now().date_naive());
    info!(
        topic = %request.topic,
        from = ?request.range.from,
        to = ?request.range.to,
        "searching"
    );

    Ok(match pipeline.search(&request).await? {
        Some(report) => format::format_report(&request.topic, &request.query, &report),
        None => "Both a topic and a query are required.\n".to_string(),
    })
}

async fn run_related(args: QueryArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = PipelineConfig {
        related_term_cutoff: args.related_top,
        ..PipelineConfig::default()
    };
    let pipeline = build_pipeline(config)?;
    Ok(
        match pipeline
            .related(&args.query, !args.no_morph, args.lang)
            .await?
        {
            Some(related) => format::format_related(args.query.trim(), &related),
            None => "A query is required.\n".to_string(),
        },
    )
}

pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let output = match cli.command {
        Command::Search(args) => run_search(args).await?,
        Command::Related(args) => run_related(args.query).await?,
    };
    print!("{output}");
    Ok(())
}
