#![forbid(unsafe_code)]

/// Splits a comma-separated tag list (as returned by the tag-generation
/// model) into trimmed, non-empty candidates.
pub fn split_tag_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
