use unicode_normalization::UnicodeNormalization;

/// NFKC-normalize and trim a query so full-width/half-width variants of the
/// same word hit the same dedup key.
pub fn normalize_query(text: &str) -> String {
    text.nfkc().collect::<String>().trim().to_string()
}
