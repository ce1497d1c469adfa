//! Unique identifiers.

use parley_core::{Binder, Overrides, UuidFormat};
use uuid::Uuid;

/// Binds a [`Uuid`].
///
/// Without an override, any of the four layouts in [`UuidFormat::ALL`] is
/// accepted. A [`UuidFormat`] override requires exactly that layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidBinder;

impl Binder for UuidBinder {
    type Value = Uuid;

    fn bind(&self, text: &str, overrides: &Overrides) -> Option<Uuid> {
        let text = text.trim();
        match overrides.uuid_format() {
            Some(format) => parse_exact(text, format),
            None => UuidFormat::ALL
                .iter()
                .find_map(|&format| parse_exact(text, format)),
        }
    }
}

fn is_hyphenated(text: &str) -> bool {
    text.len() == 36
        && text.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        })
}

/// Parse `text` in exactly `format`.
pub fn parse_exact(text: &str, format: UuidFormat) -> Option<Uuid> {
    let hyphenated = match format {
        UuidFormat::Simple => {
            return (text.len() == 32 && text.chars().all(|c| c.is_ascii_hexdigit()))
                .then(|| Uuid::try_parse(text).ok())
                .flatten();
        }
        UuidFormat::Hyphenated => text,
        UuidFormat::Braced => text.strip_prefix('{')?.strip_suffix('}')?,
        UuidFormat::Parenthesized => text.strip_prefix('(')?.strip_suffix(')')?,
    };
    is_hyphenated(hyphenated)
        .then(|| Uuid::try_parse(hyphenated).ok())
        .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::ParameterOverride;

    const ID: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

    fn expected() -> Uuid {
        Uuid::try_parse(ID).unwrap()
    }

    #[test]
    fn test_default_accepts_all_layouts() {
        let bind = |text: &str| UuidBinder.bind(text, &Overrides::new());
        assert_eq!(bind(ID), Some(expected()));
        assert_eq!(bind(&ID.replace('-', "")), Some(expected()));
        assert_eq!(bind(&format!("{{{ID}}}")), Some(expected()));
        assert_eq!(bind(&format!("({ID})")), Some(expected()));
        assert_eq!(bind("not-a-uuid"), None);
        assert_eq!(bind(&format!("urn:uuid:{ID}")), None);
    }

    #[test]
    fn test_exact_format_override() {
        let braced = Overrides::new().with(ParameterOverride::UuidFormat(UuidFormat::Braced));
        assert_eq!(UuidBinder.bind(&format!("{{{ID}}}"), &braced), Some(expected()));
        assert_eq!(UuidBinder.bind(ID, &braced), None);

        let simple = Overrides::new().with(ParameterOverride::UuidFormat(UuidFormat::Simple));
        assert_eq!(UuidBinder.bind(ID, &simple), None);
    }
}
