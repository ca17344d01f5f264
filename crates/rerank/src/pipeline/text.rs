//! Text normalization shared by the filter, scorer and deduplicator

/// Split text into lowercase terms on any non-alphanumeric character.
///
/// "Solar-powered, grid-tied!" -> ["solar", "powered", "grid", "tied"]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Whitespace-delimited word count, the same unit upstream chunkers report
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
