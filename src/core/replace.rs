// src/core/replace.rs
use regex::{NoExpand, Regex};

/// Compile the whole-word, case-insensitive pattern for `word`.
///
/// Boundary-anchored on purpose: substring replacement over-matches
/// (replacing "cat" must not touch "category"). The needle is escaped, so
/// flagged words containing regex metacharacters match literally.
pub fn word_pattern(word: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word)))
}

/// Apply a whole-word substitution to one text, returning the new content
/// only if it actually differs. A match that produces identical output
/// (replacing a word with itself in another case, say) is not a change.
pub fn apply(pattern: &Regex, text: &str, replacement: &str) -> Option<String> {
    let replaced = pattern.replace_all(text, NoExpand(replacement));
    if replaced == text {
        None
    } else {
        Some(replaced.into_owned())
    }
}

/// "1 layer" / "n layers", for user-facing counts.
pub fn count_layers(n: usize) -> String {
    if n == 1 {
        "1 layer".to_string()
    } else {
        format!("{n} layers")
    }
}
