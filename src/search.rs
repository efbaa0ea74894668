use crate::models::Snippet;

/// Returns the snippets whose title, description or any tag contains `term`,
/// ignoring case. An empty term matches everything. Input order is kept.
pub fn filter<'a>(snippets: &'a [Snippet], term: &str) -> Vec<&'a Snippet> {
    if term.is_empty() {
        return snippets.iter().collect();
    }

    let query = term.to_lowercase();
    snippets
        .iter()
        .filter(|snippet| matches(snippet, &query))
        .collect()
}

/// `query` must already be lowercase.
fn matches(snippet: &Snippet, query: &str) -> bool {
    snippet.title.to_lowercase().contains(query)
        || snippet.description.to_lowercase().contains(query)
        || snippet
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(query))
}
