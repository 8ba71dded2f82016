//! Text normalization applied before any pattern is tested.
//!
//! Policy, in order:
//! - Case fold: uppercase then lowercase, so `ß` becomes `ss` and dotless
//!   `ı` becomes `i` exactly as their uppercase forms do.
//! - NFKD decomposition, then drop combining diacritics (U+0300..=U+036F).
//! - Drop zero-width characters (U+200B..=U+200D, U+FEFF).
//! - Fold Cyrillic lookalikes and full-width Latin letters to ASCII.
//! - Keep only ASCII letters, digits and `_`, lowercased again since NFKD can
//!   yield uppercase ASCII (`𝐅`, `ℍ`).
//!
//! Substitution evasion (`sh1t`, `b!tch`) is not handled here; that belongs to
//! the compiled patterns. Keep this logic single-sourced so the matcher and the
//! admin tooling agree on what the filter "sees".

use unicode_normalization::UnicodeNormalization;

/// Normalize text for banned-term matching. Output is always lowercase ASCII.
pub fn normalize(text: &str) -> String {
    fold_case(text)
        .nfkd()
        .filter(|&c| !strip_combining_mark(c))
        .filter(|&c| !is_zero_width(c))
        .map(fold_homoglyph)
        .map(fold_full_width)
        .filter(|&c| is_word_char(c))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Lowercase through uppercase. A plain lowercase keeps `ß` and `ı`, which the
/// ASCII strip would then drop while `SS` and `I` survive.
pub fn fold_case(text: &str) -> String {
    text.to_uppercase().to_lowercase()
}

/// Combining diacritical marks left behind by NFKD.
pub fn strip_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

pub fn is_zero_width(c: char) -> bool {
    matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}')
}

/// Map Cyrillic letters that render like Latin ones. Both cases are folded.
pub fn fold_homoglyph(c: char) -> char {
    match c {
        'а' | 'А' => 'a',
        'е' | 'Е' => 'e',
        'о' | 'О' => 'o',
        'р' | 'Р' => 'p',
        'с' | 'С' => 'c',
        'у' | 'У' => 'y',
        'х' | 'Х' => 'x',
        'к' | 'К' => 'k',
        'м' | 'М' => 'm',
        'т' | 'Т' => 't',
        'н' | 'Н' => 'h',
        'в' | 'В' => 'b',
        _ => c,
    }
}

const FULL_WIDTH_OFFSET: u32 = 0xFEE0;

/// Full-width Latin letters (U+FF21..=U+FF3A, U+FF41..=U+FF5A) to ASCII.
pub fn fold_full_width(c: char) -> char {
    match c {
        '\u{FF21}'..='\u{FF3A}' | '\u{FF41}'..='\u{FF5A}' => {
            char::from_u32(c as u32 - FULL_WIDTH_OFFSET).unwrap_or(c)
        }
        _ => c,
    }
}

pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(normalize("Hello, World!"), "helloworld");
        assert_eq!(normalize("snake_case 42"), "snake_case42");
    }

    #[test]
    fn strips_accents() {
        assert_eq!(normalize("épstein"), "epstein");
        assert_eq!(normalize("Crème Brûlée"), "cremebrulee");
    }

    #[test]
    fn strips_zero_width() {
        assert_eq!(normalize("f\u{200B}u\u{200C}c\u{200D}k\u{FEFF}"), "fuck");
    }

    #[test]
    fn folds_cyrillic_lookalikes() {
        // Cyrillic а, о, с
        assert_eq!(normalize("\u{0441}\u{043E}\u{043E}l"), "cool");
        assert_eq!(normalize("\u{0410}\u{0412}\u{0421}"), "abc");
    }

    #[test]
    fn folds_full_width() {
        assert_eq!(fold_full_width('\u{FF21}'), 'A');
        assert_eq!(fold_full_width('\u{FF5A}'), 'z');
        assert_eq!(fold_full_width('x'), 'x');
        assert_eq!(normalize("\u{FF26}\u{FF35}\u{FF43}\u{FF4B}"), "fuck");
    }

    #[test]
    fn drops_emoji_and_non_latin() {
        assert_eq!(normalize("gg 🎮 ez"), "ggez");
        assert_eq!(normalize("日本"), "");
    }

    #[test]
    fn folds_case_through_uppercase() {
        assert_eq!(normalize("pußy"), "pussy");
        assert_eq!(normalize("Straße"), "strasse");
        assert_eq!(normalize("b\u{0131}tch"), "bitch");
        assert_eq!(normalize("\u{0130}stanbul"), "istanbul");
    }

    #[test]
    fn lowercases_compatibility_forms() {
        // math bold F U C K, double-struck H
        assert_eq!(
            normalize("\u{1D405}\u{1D414}\u{1D402}\u{1D40A} \u{210D}itler"),
            "fuckhitler"
        );
        assert_eq!(normalize("\u{FB01}ne"), "fine");
    }

    #[test]
    fn is_idempotent() {
        for s in ["Ünïcödé Téxt", "a\u{200B}b", "ＡＢＣ", "plain"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }
}
