//! # Path Value Model
//!
//! A [`Path`] is an immutable view over a shared text buffer: the buffer plus
//! a significant sub-range. Command names, group names and lexical tokens are
//! all paths, so the tokenizer can hand out sub-ranges of the raw input
//! without copying it.
//!
//! # Equality
//!
//! Equality and hashing are case-insensitive and only consider the
//! significant sub-range. Two paths without significant content are equal
//! whatever buffer they were cut from, so the empty sentinel compares equal
//! to every other empty value.
//!
//! ```rust
//! use parley_core::Path;
//!
//! assert_eq!(Path::new("Foo"), Path::new("foo"));
//! assert_eq!(Path::empty(), Path::with_range("abc", 1..1).unwrap());
//! ```

use crate::error::PathError;
use std::{
    fmt,
    hash::{Hash, Hasher},
    ops::Range,
    sync::Arc,
};

/// A case-insensitive, slice-based name or token.
#[derive(Clone)]
pub struct Path {
    buf: Arc<str>,
    start: usize,
    end: usize,
}

impl Path {
    /// Create a path spanning the whole of `text`.
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        let buf = text.into();
        let end = buf.len();
        Self { buf, start: 0, end }
    }

    /// Create a path over `range` of `text`.
    ///
    /// Fails when the range is inverted, exceeds the text, or splits a
    /// UTF-8 character.
    pub fn with_range(text: impl Into<Arc<str>>, range: Range<usize>) -> Result<Self, PathError> {
        let buf = text.into();
        let Range { start, end } = range;
        if start > end
            || end > buf.len()
            || !buf.is_char_boundary(start)
            || !buf.is_char_boundary(end)
        {
            return Err(PathError::OutOfRange {
                start,
                end,
                len: buf.len(),
            });
        }
        Ok(Self { buf, start, end })
    }

    /// A path over a range already known to be valid for `buf`.
    pub(crate) fn from_parts(buf: Arc<str>, start: usize, end: usize) -> Self {
        debug_assert!(start <= end && buf.is_char_boundary(start) && buf.is_char_boundary(end));
        Self { buf, start, end }
    }

    /// The distinguished empty value.
    pub fn empty() -> Self {
        Self {
            buf: Arc::from(""),
            start: 0,
            end: 0,
        }
    }

    /// The significant text, borrowed from the shared buffer.
    pub fn as_str(&self) -> &str {
        &self.buf[self.start..self.end]
    }

    /// The significant sub-range within [`Path::source`].
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The full backing buffer.
    pub fn source(&self) -> &Arc<str> {
        &self.buf
    }

    /// Whether any significant content is present.
    pub fn has_value(&self) -> bool {
        self.start < self.end
    }

    /// Join two values with a single space.
    ///
    /// An empty side contributes nothing, so combining with the sentinel
    /// yields the other value unchanged.
    pub fn combine(a: &Path, b: &Path) -> Path {
        match (a.has_value(), b.has_value()) {
            (false, _) => b.clone(),
            (_, false) => a.clone(),
            _ => {
                let mut joined = String::with_capacity(a.as_str().len() + b.as_str().len() + 1);
                joined.push_str(a.as_str());
                joined.push(' ');
                joined.push_str(b.as_str());
                Path::new(joined)
            }
        }
    }

    /// This value with its last whitespace-delimited segment removed.
    ///
    /// `"a b c"` becomes `"a b"`; a single segment becomes the empty
    /// sentinel. The result shares this path's buffer.
    pub fn previous_token(&self) -> Path {
        let text = self.as_str().trim_end();
        match text.rfind(char::is_whitespace) {
            Some(idx) => {
                let kept = text[..idx].trim_end();
                if kept.is_empty() {
                    return Path::empty();
                }
                // `kept` is a prefix of the significant text
                Path {
                    buf: self.buf.clone(),
                    start: self.start,
                    end: self.start + kept.len(),
                }
            }
            None => Path::empty(),
        }
    }

    /// The span from the start of `self` to the end of `last`.
    ///
    /// When both share a buffer and `last` ends after `self` starts, the
    /// result is a view into that buffer covering everything in between,
    /// separators included. Otherwise the two are [combined](Path::combine).
    pub fn extend_to(&self, last: &Path) -> Path {
        if Arc::ptr_eq(&self.buf, &last.buf) && self.start <= last.end {
            Path {
                buf: self.buf.clone(),
                start: self.start,
                end: last.end,
            }
        } else {
            Path::combine(self, last)
        }
    }

    /// Case-insensitive prefix test.
    pub fn starts_with(&self, other: &Path) -> bool {
        let mut ours = fold(self.as_str());
        fold(other.as_str()).all(|c| ours.next() == Some(c))
    }

    /// Whitespace-delimited segments, each sharing this path's buffer.
    pub fn segments(&self) -> impl Iterator<Item = Path> + '_ {
        let base = self.buf.as_ptr() as usize;
        self.as_str().split_whitespace().map(move |segment| {
            let start = segment.as_ptr() as usize - base;
            Path {
                buf: self.buf.clone(),
                start,
                end: start + segment.len(),
            }
        })
    }

    /// Case-insensitive comparison of two plain strings.
    pub fn eq_ignore_case(a: &str, b: &str) -> bool {
        fold(a).eq(fold(b))
    }
}

fn fold(text: &str) -> impl Iterator<Item = char> + '_ {
    text.chars().flat_map(char::to_lowercase)
}

impl Default for Path {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        Path::eq_ignore_case(self.as_str(), other.as_str())
    }
}

impl Eq for Path {}

impl PartialEq<str> for Path {
    fn eq(&self, other: &str) -> bool {
        Path::eq_ignore_case(self.as_str(), other)
    }
}

impl PartialEq<&str> for Path {
    fn eq(&self, other: &&str) -> bool {
        Path::eq_ignore_case(self.as_str(), other)
    }
}

impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut count = 0usize;
        for c in fold(self.as_str()) {
            c.hash(state);
            count += 1;
        }
        state.write_usize(count);
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for Path {
    fn from(text: &str) -> Self {
        Path::new(text)
    }
}

impl From<String> for Path {
    fn from(text: String) -> Self {
        Path::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_case_insensitive_equality() {
        assert_eq!(Path::new("Foo"), Path::new("foo"));
        assert_eq!(Path::new("HELP"), "help");
        assert_ne!(Path::new("foo"), Path::new("food"));
    }

    #[test]
    fn test_empty_values_are_equal_across_buffers() {
        let a = Path::with_range("first buffer", 3..3).unwrap();
        let b = Path::with_range("second", 0..0).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Path::empty());
        assert_eq!(Path::default(), Path::empty());
        assert!(!a.has_value());
    }

    #[test]
    fn test_hash_matches_equality() {
        let mut set = HashSet::new();
        set.insert(Path::new("Ping"));
        assert!(set.contains(&Path::new("PING")));
        assert!(set.contains(&Path::with_range("say ping", 4..8).unwrap()));
    }

    #[test]
    fn test_range_validation() {
        assert!(Path::with_range("abc", 0..3).is_ok());
        assert!(matches!(
            Path::with_range("abc", 2..5),
            Err(PathError::OutOfRange { start: 2, end: 5, len: 3 })
        ));
        assert!(Path::with_range("abc", 2..1).is_err());
        // 'é' is two bytes; 1 is not a boundary
        assert!(Path::with_range("é", 1..2).is_err());
    }

    #[test]
    fn test_sub_range_view() {
        let path = Path::with_range("admin ban user", 6..9).unwrap();
        assert_eq!(path.as_str(), "ban");
        assert_eq!(path.range(), 6..9);
        assert_eq!(&**path.source(), "admin ban user");
    }

    #[test]
    fn test_combine() {
        let joined = Path::combine(&Path::new("admin"), &Path::new("ban"));
        assert_eq!(joined.as_str(), "admin ban");
        assert_eq!(Path::combine(&Path::empty(), &Path::new("x")).as_str(), "x");
        assert_eq!(Path::combine(&Path::new("x"), &Path::empty()).as_str(), "x");
    }

    #[test]
    fn test_extend_to_spans_shared_buffer() {
        let source: Arc<str> = Arc::from("admin  ban user");
        let first = Path::with_range(source.clone(), 0..5).unwrap();
        let last = Path::with_range(source, 7..10).unwrap();
        let span = first.extend_to(&last);
        assert_eq!(span.as_str(), "admin  ban");
        assert_eq!(span.range(), 0..10);

        let foreign = Path::new("ban");
        assert_eq!(first.extend_to(&foreign).as_str(), "admin ban");
    }

    #[test]
    fn test_previous_token() {
        let path = Path::new("a b  c");
        let prev = path.previous_token();
        assert_eq!(prev.as_str(), "a b");
        assert_eq!(prev.previous_token().as_str(), "a");
        assert!(!prev.previous_token().previous_token().has_value());
        assert!(!Path::new("single").previous_token().has_value());
    }

    #[test]
    fn test_starts_with() {
        let path = Path::new("Admin Ban");
        assert!(path.starts_with(&Path::new("admin")));
        assert!(path.starts_with(&Path::empty()));
        assert!(!path.starts_with(&Path::new("admin ban user")));
    }

    #[test]
    fn test_segments_share_buffer() {
        let path = Path::new("  one two ");
        let segments: Vec<_> = path.segments().collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].as_str(), "two");
        assert_eq!(segments[1].range(), 6..9);
    }
}
