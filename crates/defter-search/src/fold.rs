//! Case folding shared by extraction and filtering.

/// Combining dot above, left behind when `İ` (U+0130) is lowercased.
const COMBINING_DOT_ABOVE: char = '\u{307}';

/// Lowercase `text` for matching.
///
/// `str::to_lowercase` maps `İ` to `i` followed by U+0307, which would keep
/// `İzmir` from matching `izmir`; the combining dot is dropped.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| *c != COMBINING_DOT_ABOVE)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_capital_i_folds_to_plain_i() {
        assert_eq!(fold_case("İzmir"), "izmir");
        assert_eq!(fold_case("İSTANBUL"), "istanbul");
    }

    #[test]
    fn test_other_turkish_letters_lowercase_normally() {
        assert_eq!(fold_case("IŞIK Çiçek Ğ Ö Ü"), "işik çiçek ğ ö ü");
        assert_eq!(fold_case("ılık"), "ılık");
    }
}
