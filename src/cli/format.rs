use crate::search::{RankedDocuments, RelatedTerms, ScoredDocument, ScoredTerm, SearchReport};

/// Escape characters that break Markdown link syntax: `[`, `]`, `(`, `)`.
fn escape_link(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '[' | ']' | '(' | ')') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Folds line breaks so user input cannot break a heading.
fn one_line(s: &str) -> String {
    s.replace(['\n', '\r'], " ")
}

fn format_keywords(keywords: &[String], out: &mut String) {
    out.push_str(&format!("**Keywords:** {}\n\n", keywords.join(", ")));
}

fn format_candidates(candidates: &[ScoredTerm], out: &mut String) {
    if candidates.is_empty() {
        out.push_str("_No related terms found._\n\n");
        return;
    }
    out.push_str("## Related terms\n\n");
    for c in candidates {
        out.push_str(&format!("- {} ({:.4})\n", c.term, c.score));
    }
    out.push_str("\nAdd any of them with `--select <term>`.\n\n");
}

fn format_document(rank: usize, scored: &ScoredDocument, out: &mut String) {
    let doc = &scored.document;
    out.push_str(&format!(
        "{rank}. [{}]({})\n",
        escape_link(&doc.title),
        escape_link(&doc.link)
    ));
    out.push_str(&format!("   - **Authors**: {}\n", doc.authors.join(", ")));
    out.push_str(&format!("   - **Published**: {}\n", doc.published.format("%Y-%m-%d")));
    out.push_str(&format!("   - **Similarity**: `{:.4}`\n", scored.score));
    if !doc.summary.is_empty() {
        out.push_str(&format!("\n   > {}\n", doc.summary));
    }
    out.push('\n');
}

pub fn format_related(query: &str, related: &RelatedTerms) -> String {
    let mut out = format!("# Related terms: {}\n\n", one_line(query));
    let mut keywords = related.keywords.clone();
    keywords.push(query.to_string());
    format_keywords(&keywords, &mut out);
    format_candidates(&related.candidates, &mut out);
    out
}

pub fn format_report(topic: &str, query: &str, report: &SearchReport) -> String {
    let mut out = format!("# arXiv search: {} / {}\n\n", one_line(topic), one_line(query));

    format_keywords(&report.display_keywords, &mut out);
    format_candidates(&report.related, &mut out);
    out.push_str(&format!("**Expanded query:** `{}`\n\n", report.expanded_query));

    if report.fetched == 0 {
        out.push_str("No papers found in the requested period.\n");
        return out;
    }
    out.push_str(&format!("Fetched {} papers", report.fetched));
    if !report.authors.is_empty() {
        out.push_str(&format!(
            " by {} authors (narrow with `--author <name>`)",
            report.authors.len()
        ));
    }
    out.push_str(".\n\n");

    if report.results.is_empty() {
        out.push_str("No papers matched the filters.\n");
        return out;
    }

    format_results(&report.results, report.page, &mut out);
    out
}

fn format_results(results: &RankedDocuments, page: usize, out: &mut String) {
    let page = results.page(page);
    out.push_str(&format!(
        "## Results (page {} / {}, {} papers)\n\n",
        page.number, page.total_pages, page.total_count
    ));
    for (offset, scored) in page.items.iter().enumerate() {
        format_document(page.first_rank + offset, scored, out);
    }
}
