//! Lexical tokens produced by the tokenizer.

use crate::{
    lexical::{ESCAPE, is_escapable},
    path::Path,
};
use std::borrow::Cow;

/// One lexical unit of the input.
///
/// The wrapped [`Path`] covers the raw span in the original text, including
/// surrounding quotes and escape characters. [`Token::value`] yields the text
/// with escapes resolved.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    path: Path,
    quoted: bool,
    escaped: bool,
}

impl Token {
    /// Create a token over a raw span.
    pub fn new(path: Path, quoted: bool, escaped: bool) -> Self {
        Self {
            path,
            quoted,
            escaped,
        }
    }

    /// The raw span.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw text, including quotes and escape characters.
    pub fn raw(&self) -> &str {
        self.path.as_str()
    }

    /// Byte offset of the first character in the original text.
    pub fn start(&self) -> usize {
        self.path.range().start
    }

    /// Byte offset one past the last character in the original text.
    pub fn end(&self) -> usize {
        self.path.range().end
    }

    /// Whether the token began with a quote.
    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// Whether the raw span contains escape sequences.
    pub fn has_escapes(&self) -> bool {
        self.escaped
    }

    /// The token text with escape sequences resolved.
    pub fn value(&self) -> Cow<'_, str> {
        if self.escaped {
            unescape(self.raw())
        } else {
            Cow::Borrowed(self.raw())
        }
    }

    /// The resolved value as a [`Path`], for name lookups.
    ///
    /// Shares the original buffer unless escapes had to be resolved.
    pub fn to_path(&self) -> Path {
        match self.value() {
            Cow::Borrowed(_) => self.path.clone(),
            Cow::Owned(text) => Path::new(text),
        }
    }
}

/// Drop every [`ESCAPE`] that precedes an escapable character.
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains(ESCAPE) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            if let Some(&next) = chars.peek() {
                if is_escapable(next) {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    Cow::Owned(out)
}
