/// Normalize a raw query for intent parsing
///
/// Trims, lowercases, folds typographic apostrophes and collapses runs of
/// whitespace into a single space.
pub fn normalize_query(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| word.to_lowercase().replace(['\u{2019}', '\u{2018}', '`'], "'"))
        .collect::<Vec<_>>()
        .join(" ")
}
