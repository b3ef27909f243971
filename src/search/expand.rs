/// Keywords, then the raw query, then the selected terms, space-joined.
pub fn expand_query(keywords: &[String], query: &str, selected: &[String]) -> String {
    keywords
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(query))
        .chain(selected.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
