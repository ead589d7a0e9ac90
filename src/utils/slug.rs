//! URL slugification.
//!
//! Converts article titles to URL-safe identifiers.

use deunicode::deunicode;

/// Separator placed between alphanumeric runs.
const SEPARATOR: char = '-';

/// Lower-case ASCII slug of `text`.
///
/// Non-ASCII characters are transliterated first; every run of
/// non-alphanumeric characters collapses into a single `-`, and the result
/// never starts or ends with one.
pub fn slugify(text: &str) -> String {
    let ascii = deunicode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push(SEPARATOR);
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn test_slugify_collapses_runs() {
        assert_eq!(slugify("Rust -- & Go!!  2024"), "rust-go-2024");
    }

    #[test]
    fn test_slugify_trims_separators() {
        assert_eq!(slugify("  (Draft) notes... "), "draft-notes");
    }

    #[test]
    fn test_slugify_transliterates() {
        assert_eq!(slugify("Café Übersicht"), "cafe-ubersicht");
    }

    #[test]
    fn test_slugify_deterministic() {
        assert_eq!(slugify("Same Title"), slugify("Same Title"));
    }

    #[test]
    fn test_slugify_only_punctuation() {
        assert_eq!(slugify("?!--"), "");
        assert_eq!(slugify(""), "");
    }
}
