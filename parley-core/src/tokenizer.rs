//! # Tokenizer
//!
//! Splits one line of input into [`Token`]s on whitespace, honoring quotes
//! and escapes. Tokens are produced lazily and point straight into the
//! input buffer.
//!
//! # Grammar
//!
//! - A token starts at the first non-whitespace character after a separator.
//! - A token that starts with a quote runs until the matching closing quote
//!   ([`closes`](crate::lexical::closes)); whitespace inside is part of the token. After the
//!   closing quote the token continues up to the next whitespace.
//! - [`ESCAPE`](crate::lexical::ESCAPE) followed by an escapable character makes that
//!   character literal, inside or outside quotes.
//!
//! # Modes
//!
//! [`TokenizerMode::Strict`] (the default) rejects malformed input with a
//! [`TokenizeError`] carrying the offending position:
//!
//! - a quote inside an unquoted token,
//! - an escape as the last character,
//! - an escape before a character that cannot be escaped,
//! - a quote that is never closed.
//!
//! [`TokenizerMode::Lenient`] never fails. Stray quotes and invalid escapes
//! are kept literally and an unterminated quote runs to the end of input.
//!
//! ```rust
//! use parley_core::tokenizer::tokenize;
//!
//! let tokens: Vec<_> = tokenize(r#"say "hello world" now"#)
//!     .map(|t| t.map(|t| t.raw().to_owned()))
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(tokens, ["say", "\"hello world\"", "now"]);
//! ```

use crate::{
    error::{TokenizeError, TokenizeErrorKind},
    lexical::{ESCAPE, closes, is_escapable, is_quote},
    path::Path,
    token::Token,
};
use std::{iter::Peekable, sync::Arc};

/// How malformed quoting and escaping is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenizerMode {
    /// Reject malformed input.
    #[default]
    Strict,
    /// Accept everything, treating malformed sequences literally.
    Lenient,
}

/// Tokenize `input` from the start in strict mode.
pub fn tokenize(input: impl Into<Arc<str>>) -> Tokenizer {
    Tokenizer::new(input, TokenizerMode::Strict)
}

/// A lazy token iterator over one line of input.
///
/// The iterator is fused after the first error.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    input: Arc<str>,
    position: usize,
    mode: TokenizerMode,
    failed: bool,
}

impl Tokenizer {
    /// Tokenize the whole of `input`.
    pub fn new(input: impl Into<Arc<str>>, mode: TokenizerMode) -> Self {
        Self::with_offset(input, 0, mode)
    }

    /// Tokenize `input` starting at byte `offset`, skipping a consumed prefix.
    ///
    /// Token positions stay absolute. An offset inside a character moves
    /// forward to the next character boundary.
    pub fn with_offset(input: impl Into<Arc<str>>, offset: usize, mode: TokenizerMode) -> Self {
        let input = input.into();
        let mut position = offset.min(input.len());
        while !input.is_char_boundary(position) {
            position += 1;
        }
        Self {
            input,
            position,
            mode,
            failed: false,
        }
    }

    /// The full input.
    pub fn input(&self) -> &Arc<str> {
        &self.input
    }

    /// Byte offset where the next token search starts.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The active mode.
    pub fn mode(&self) -> TokenizerMode {
        self.mode
    }

    fn error(&self, kind: TokenizeErrorKind, position: usize) -> TokenizeError {
        TokenizeError::new(kind, Arc::clone(&self.input), position)
    }

    /// Handle an escape at byte `at`. Returns whether the following character
    /// was consumed as an escaped literal.
    fn escape<I>(&self, at: usize, chars: &mut Peekable<I>) -> Result<bool, TokenizeError>
    where
        I: Iterator<Item = (usize, char)>,
    {
        match chars.peek().copied() {
            Some((_, c)) if is_escapable(c) => {
                chars.next();
                Ok(true)
            }
            _ if self.mode == TokenizerMode::Lenient => Ok(false),
            Some((i, c)) => Err(self.error(TokenizeErrorKind::InvalidEscape(c), i)),
            None => Err(self.error(TokenizeErrorKind::UnfinishedEscape, at)),
        }
    }

    fn scan(&mut self) -> Result<Option<Token>, TokenizeError> {
        let input = Arc::clone(&self.input);
        let rest = &input[self.position..];

        // BetweenTokens: skip separators
        let Some(skipped) = rest.find(|c: char| !c.is_whitespace()) else {
            self.position = input.len();
            return Ok(None);
        };
        let start = self.position + skipped;

        let mut chars = input[start..]
            .char_indices()
            .map(|(i, c)| (start + i, c))
            .peekable();

        let mut open_quote = None;
        if let Some(&(i, c)) = chars.peek() {
            if is_quote(c) {
                open_quote = Some((i, c));
                chars.next();
            }
        }
        let quoted = open_quote.is_some();
        let mut escaped = false;
        let mut end = input.len();

        while let Some((i, c)) = chars.next() {
            if c == ESCAPE {
                escaped |= self.escape(i, &mut chars)?;
                continue;
            }
            match open_quote {
                // InQuotes
                Some((_, open)) => {
                    if closes(open, c) {
                        open_quote = None;
                    }
                }
                // Normal
                None => {
                    if c.is_whitespace() {
                        end = i;
                        break;
                    }
                    if is_quote(c) && self.mode == TokenizerMode::Strict {
                        return Err(self.error(TokenizeErrorKind::QuoteWithoutSeparator, i));
                    }
                }
            }
        }

        if let Some((at, _)) = open_quote {
            if self.mode == TokenizerMode::Strict {
                return Err(self.error(TokenizeErrorKind::UnterminatedQuote, at));
            }
        }

        self.position = end;
        Ok(Some(Token::new(
            Path::from_parts(input, start, end),
            quoted,
            escaped,
        )))
    }
}

impl Iterator for Tokenizer {
    type Item = Result<Token, TokenizeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.scan() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => None,
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for Tokenizer {}
