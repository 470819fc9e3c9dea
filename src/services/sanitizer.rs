//! Reply sanitization
//!
//! Enforces the output content policy independent of which provider
//! answered: bracketed meta-commentary is stripped, then every character
//! outside the Arabic allow-list is dropped.

use once_cell::sync::Lazy;
use regex::Regex;

static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)").expect("bracket pattern is valid"));

/// Sanitize a provider reply
///
/// Idempotent: brackets and parentheses are not in the allow-list, so a
/// second pass finds nothing new to strip.
pub fn sanitize(text: &str) -> String {
    let stripped = BRACKETED.replace_all(text, "");

    let filtered: String = stripped.chars().filter(|&c| is_allowed(c)).collect();

    filtered.trim().to_string()
}

/// Allow-list: Arabic blocks, digits, basic punctuation, whitespace
fn is_allowed(c: char) -> bool {
    matches!(c,
        '\u{0600}'..='\u{06FF}'   // Arabic
        | '\u{0750}'..='\u{077F}' // Arabic Supplement
        | '\u{08A0}'..='\u{08FF}' // Arabic Extended-A
        | '\u{FB50}'..='\u{FDFF}' // Arabic Presentation Forms-A
        | '\u{FE70}'..='\u{FEFF}' // Arabic Presentation Forms-B
    ) || c.is_ascii_digit()
        || c.is_whitespace()
        || matches!(
            c,
            '.' | ',' | ':' | ';' | '!' | '?' | '-' | '"' | '\'' | '«' | '»' | '%'
        )
}
