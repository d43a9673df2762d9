//! Slug generation for page basenames and output file names.

use unicode_segmentation::UnicodeSegmentation;

/// Convert a page name to a file- and URL-safe slug
///
/// Rules:
/// - Lowercase
/// - Whitespace, underscores and hyphens become a single hyphen
/// - Punctuation and symbols are dropped
/// - Letters outside ASCII are kept
/// - No leading or trailing hyphens
///
/// # Examples
///
/// ```
/// use che_core::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("Rust & Safety"), "rust-safety");
/// assert_eq!(slugify("about_me"), "about-me");
/// ```
pub fn slugify(input: &str) -> String {
    let lowercased = input.to_lowercase();
    let mut slug = String::with_capacity(lowercased.len());
    let mut pending_hyphen = false;

    for grapheme in lowercased.graphemes(true) {
        let Some(c) = grapheme.chars().next() else {
            continue;
        };

        if c.is_whitespace() || c == '_' || c == '-' {
            pending_hyphen = true;
        } else if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push_str(grapheme);
        }
    }

    slug
}
