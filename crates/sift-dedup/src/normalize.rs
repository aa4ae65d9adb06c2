//! Text normalization applied before shingling.
//!
//! The pipeline is: NFD decomposition, lowercase, punctuation to space,
//! whitespace collapse and trim, then combining-mark removal. Only the
//! shingle set is derived from the result; raw text is kept untouched.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize text for fuzzy matching.
///
/// A combining mark is not a word character, so the mark of a decomposed
/// accent splits its word: "résumé" becomes "re sume".
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.nfd().flat_map(char::to_lowercase) {
        if is_word_char(c) {
            if pending_space && !collapsed.is_empty() {
                collapsed.push(' ');
            }
            pending_space = false;
            collapsed.push(c);
        } else {
            // Whitespace, punctuation and marks all collapse into one separator.
            pending_space = true;
        }
    }

    collapsed.chars().filter(|&c| !is_combining_mark(c)).collect()
}

/// Word characters: letters, digits, and underscore. Combining marks are
/// excluded even when Unicode classes them as alphabetic.
fn is_word_char(c: char) -> bool {
    (c.is_alphanumeric() || c == '_') && !is_combining_mark(c)
}
