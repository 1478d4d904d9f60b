//! Product category display names
//! Maps raw category keys (e.g. `health_beauty`) to report labels (`Health Beauty`)

use std::collections::HashMap;
use std::sync::LazyLock;

/// Known misspellings in the source category vocabulary
pub static TYPO_CORRECTIONS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert("fashio_female_clothing", "fashion_female_clothing");
    m
});

/// Apply the typo table, returning the input when no correction is known
pub fn correct_typo(raw: &str) -> &str {
    TYPO_CORRECTIONS.get(raw).copied().unwrap_or(raw)
}

/// Format a raw category key for display
pub fn display_name(raw: &str) -> String {
    correct_typo(raw)
        .split('_')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Null-preserving variant of [`display_name`]
pub fn format_category(raw: Option<&str>) -> Option<String> {
    raw.map(display_name)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("health_beauty"), "Health Beauty");
        assert_eq!(display_name("computers_accessories"), "Computers Accessories");
        assert_eq!(display_name("TOYS"), "Toys");
    }

    #[test]
    fn test_typo_corrected_before_formatting() {
        assert_eq!(display_name("fashio_female_clothing"), "Fashion Female Clothing");
        assert_eq!(correct_typo("bed_bath_table"), "bed_bath_table");
    }

    #[test]
    fn test_null_passes_through() {
        assert_eq!(format_category(None), None);
        assert_eq!(format_category(Some("pet_shop")), Some("Pet Shop".to_string()));
    }
}
