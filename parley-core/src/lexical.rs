//! Character classes shared by the tokenizer and the string binder.

/// The escape character.
pub const ESCAPE: char = '\\';

/// Punctuation that may follow [`ESCAPE`] besides quotes and the escape
/// itself: markup characters and mention/tag introducers.
pub const ESCAPABLE_PUNCTUATION: &[char] = &['*', '_', '~', '`', '|', '>', '<', '@', '#', ':'];

/// Unicode "initial quote punctuation" (Pi).
const INITIAL_QUOTES: &[char] = &[
    '\u{00AB}', '\u{2018}', '\u{201B}', '\u{201C}', '\u{201F}', '\u{2039}', '\u{2E02}', '\u{2E04}',
    '\u{2E09}', '\u{2E0C}', '\u{2E1C}', '\u{2E20}',
];

/// Unicode "final quote punctuation" (Pf).
const FINAL_QUOTES: &[char] = &[
    '\u{00BB}', '\u{2019}', '\u{201D}', '\u{203A}', '\u{2E03}', '\u{2E05}', '\u{2E0A}', '\u{2E0D}',
    '\u{2E1D}', '\u{2E21}',
];

/// Whether `c` is an initial quote character.
pub fn is_initial_quote(c: char) -> bool {
    INITIAL_QUOTES.contains(&c)
}

/// Whether `c` is a final quote character.
pub fn is_final_quote(c: char) -> bool {
    FINAL_QUOTES.contains(&c)
}

/// Whether `c` is any quote character, ASCII or Unicode.
pub fn is_quote(c: char) -> bool {
    c == '"' || c == '\'' || is_initial_quote(c) || is_final_quote(c)
}

/// Whether `close` terminates a quotation opened by `open`.
///
/// ASCII quotes close with the same character. An initial quote closes with
/// any final quote. A final quote used as an opener closes with itself.
pub fn closes(open: char, close: char) -> bool {
    if is_initial_quote(open) {
        is_final_quote(close)
    } else {
        open == close
    }
}

/// Whether `c` may follow [`ESCAPE`].
pub fn is_escapable(c: char) -> bool {
    c == ESCAPE || is_quote(c) || ESCAPABLE_PUNCTUATION.contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_classes() {
        assert!(is_quote('"'));
        assert!(is_quote('\''));
        assert!(is_quote('“'));
        assert!(is_quote('»'));
        assert!(!is_quote('„'));
        assert!(!is_quote('a'));
    }

    #[test]
    fn test_closing_rules() {
        assert!(closes('"', '"'));
        assert!(!closes('"', '\''));
        assert!(closes('“', '”'));
        assert!(closes('«', '’'));
        assert!(!closes('“', '"'));
        assert!(closes('»', '»'));
    }

    #[test]
    fn test_escapable() {
        assert!(is_escapable('\\'));
        assert!(is_escapable('"'));
        assert!(is_escapable('@'));
        assert!(is_escapable('*'));
        assert!(!is_escapable('n'));
        assert!(!is_escapable(' '));
    }
}
