/// Normalize text for fuzzy quote matching
///
/// Lower-cases, straightens curly quotes, replaces every non-alphanumeric
/// character with a space and collapses whitespace.
pub fn normalize_for_match(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201c}' | '\u{201d}' => '"',
            other => other,
        })
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Character-level similarity ratio in [0, 1]
///
/// Normalized Levenshtein: symmetric, 1.0 only for identical strings.
/// Two empty strings are identical.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Similarity between two insight contents, compared case-folded and trimmed
pub fn content_similarity(a: &str, b: &str) -> f64 {
    similarity_ratio(&a.trim().to_lowercase(), &b.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_for_match() {
        assert_eq!(
            normalize_for_match("  \u{201c}We LOVE the product!\u{201d}  It's great. "),
            "we love the product it s great"
        );
        assert_eq!(normalize_for_match("...!?"), "");
        assert_eq!(normalize_for_match(""), "");
    }

    #[test]
    fn test_similarity_identical() {
        assert_eq!(similarity_ratio("add hubspot", "add hubspot"), 1.0);
        assert_eq!(
            content_similarity("Add HubSpot integration", "  add hubspot INTEGRATION "),
            1.0
        );
    }

    #[test]
    fn test_similarity_similar() {
        let similarity = content_similarity(
            "Add HubSpot integration",
            "Add HubSpot Integration feature",
        );
        assert!(similarity > 0.7);
        assert!(similarity < 1.0);
    }

    #[test]
    fn test_similarity_different() {
        let similarity = content_similarity(
            "Add HubSpot integration",
            "The pricing page is confusing",
        );
        assert!(similarity < 0.3);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let a = "we want a mobile app";
        let b = "we want mobile apps";
        assert_eq!(similarity_ratio(a, b), similarity_ratio(b, a));
    }
}
