//! Text folding for diacritic-insensitive search.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold text for search matching: decompose (NFD), drop combining marks,
/// lowercase. "Revisión" and "revision" fold to the same string.
pub fn fold_for_search(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_accents() {
        assert_eq!(fold_for_search("Revisión"), "revision");
        assert_eq!(fold_for_search("áéíóú ÀÈÌÒÙ"), "aeiou aeiou");
        assert_eq!(fold_for_search("Niño"), "nino");
    }

    #[test]
    fn test_lowercases() {
        assert_eq!(fold_for_search("REVISIÓN"), "revision");
    }

    #[test]
    fn test_plain_ascii_unchanged() {
        assert_eq!(fold_for_search("checkup 2024"), "checkup 2024");
    }

    #[test]
    fn test_empty() {
        assert_eq!(fold_for_search(""), "");
    }
}
