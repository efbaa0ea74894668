/// Splits comma-separated tag input into trimmed, non-empty tags.
///
/// Order is kept and duplicates are left alone, so `"python, algo"` becomes
/// `["python", "algo"]` and `" , ,x"` becomes `["x"]`.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Drops blank entries from an already split tag list and trims the rest.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|tag| tag.as_ref().trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Renders tags the way the list view shows them.
pub fn display_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("#{}", tag))
        .collect::<Vec<_>>()
        .join(" ")
}
