//! Strict `true`/`false` literals.

use parley_core::{Binder, Overrides};

/// Binds `true` or `false`, ignoring case and surrounding whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolBinder;

impl Binder for BoolBinder {
    type Value = bool;

    fn bind(&self, text: &str, _overrides: &Overrides) -> Option<bool> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("true") {
            Some(true)
        } else if text.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }
}
