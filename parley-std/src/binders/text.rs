//! Plain string parameters.

use parley_core::{Binder, Overrides, lexical};

/// Binds any text, removing one pair of matching surrounding quotes.
///
/// Quotes are only stripped when the first and last characters form a
/// matching pair per [`lexical::closes`]; otherwise the text is passed through
/// unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringBinder;

impl Binder for StringBinder {
    type Value = String;

    fn bind(&self, text: &str, _overrides: &Overrides) -> Option<String> {
        Some(strip_quotes(text).to_owned())
    }
}

/// `text` without one matching pair of surrounding quote characters.
pub fn strip_quotes(text: &str) -> &str {
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) if lexical::is_quote(open) && lexical::closes(open, close) => {
            &text[open.len_utf8()..text.len() - close.len_utf8()]
        }
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_one_matching_pair() {
        let bind = |text| StringBinder.bind(text, &Overrides::new()).unwrap();
        assert_eq!(bind("\"hi\""), "hi");
        assert_eq!(bind("'hi'"), "hi");
        assert_eq!(bind("“smart”"), "smart");
        assert_eq!(bind("\"\"nested\"\""), "\"nested\"");
        assert_eq!(bind("\"\""), "");
    }

    #[test]
    fn test_passes_other_text_through() {
        let bind = |text| StringBinder.bind(text, &Overrides::new()).unwrap();
        assert_eq!(bind("plain"), "plain");
        assert_eq!(bind("\"open"), "\"open");
        assert_eq!(bind("\"mixed'"), "\"mixed'");
        assert_eq!(bind("\""), "\"");
        assert_eq!(bind(""), "");
    }
}
