//! Text normalization shared by the press classifier and the duplicate detector
//!
//! French press and court vocabulary is compared in a folded form:
//! lowercase, no diacritics, straight apostrophes, single spaces.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold text for keyword and similarity comparison
///
/// 1. Lowercase
/// 2. NFD decomposition, then drop combining marks ("é" → "e")
/// 3. Typographic apostrophes folded to `'`
/// 4. Whitespace runs collapsed to a single space, ends trimmed
///
/// # Examples
///
/// ```
/// use vigie_common::text::normalize;
///
/// assert_eq!(normalize("  Mis  en\tEXAMEN "), "mis en examen");
/// assert_eq!(normalize("Cour d’appel de Paris"), "cour d'appel de paris");
/// assert_eq!(normalize("Décédé"), "decede");
/// ```
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            '\u{2019}' | '\u{2018}' | '\u{02BC}' | '\u{00B4}' => '\'',
            other => other,
        })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Characters that glue a keyword to its neighbours
///
/// Anything else (whitespace, punctuation, string ends) is a word boundary.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// Split normalized text into alphanumeric tokens
pub fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .split(|c: char| !is_word_char(c))
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_strips_accents() {
        assert_eq!(normalize("Préjugé"), "prejuge");
        assert_eq!(normalize("ÉLYSÉE"), "elysee");
        assert_eq!(normalize("garde à vue"), "garde a vue");
        assert_eq!(normalize("Détournement"), "detournement");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("a\n\n b \t c"), "a b c");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_folds_apostrophes() {
        assert_eq!(normalize("prise illégale d’intérêts"), "prise illegale d'interets");
        assert_eq!(normalize("trafic d‘influence"), "trafic d'influence");
    }

    #[test]
    fn test_keeps_ligatures_and_cedilla_base() {
        // cedilla is a combining mark under NFD, the base letter survives
        assert_eq!(normalize("Français"), "francais");
        // œ has no decomposition and stays as-is
        assert_eq!(normalize("Œuvre"), "œuvre");
    }

    #[test]
    fn test_tokens_split_on_punctuation() {
        let text = normalize("Mise en examen: l'élu, relaxé!");
        let toks: Vec<&str> = tokens(&text).collect();
        assert_eq!(toks, vec!["mise", "en", "examen", "l", "elu", "relaxe"]);
    }

    #[test]
    fn test_word_char() {
        assert!(is_word_char('a'));
        assert!(is_word_char('7'));
        assert!(is_word_char('é'));
        assert!(!is_word_char(' '));
        assert!(!is_word_char('\''));
        assert!(!is_word_char('-'));
    }
}
