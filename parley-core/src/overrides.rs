//! Per-parameter override data for the built-in binders.
//!
//! Overrides are a closed set of typed variants: a binder asks for the
//! capability it understands ([`Overrides::number_style`],
//! [`Overrides::uuid_format`], ...) and receives a value of the right type.

use bitflags::bitflags;

bitflags! {
    /// Which lexical forms a numeric binder accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NumberStyle: u16 {
        /// Leading whitespace is ignored.
        const LEADING_WHITE = 1;
        /// Trailing whitespace is ignored.
        const TRAILING_WHITE = 1 << 1;
        /// A leading `+` or negative sign is accepted.
        const LEADING_SIGN = 1 << 2;
        /// A decimal separator is accepted.
        const DECIMAL_POINT = 1 << 3;
        /// Group separators between digits are accepted and ignored.
        const THOUSANDS = 1 << 4;
        /// An `e`/`E` exponent is accepted.
        const EXPONENT = 1 << 5;
        /// Digits are hexadecimal; no sign, separators or exponent.
        const HEX = 1 << 6;

        /// Default style for integers.
        const INTEGER = Self::LEADING_WHITE.bits() | Self::TRAILING_WHITE.bits() | Self::LEADING_SIGN.bits();
        /// Default style for floating-point numbers.
        const FLOAT = Self::INTEGER.bits() | Self::DECIMAL_POINT.bits() | Self::EXPONENT.bits();
        /// Integer style plus decimal and group separators.
        const NUMBER = Self::INTEGER.bits() | Self::DECIMAL_POINT.bits() | Self::THOUSANDS.bits();
        /// Hexadecimal digits with optional surrounding whitespace.
        const HEX_NUMBER = Self::LEADING_WHITE.bits() | Self::TRAILING_WHITE.bits() | Self::HEX.bits();
        /// Every decimal form.
        const ANY = Self::FLOAT.bits() | Self::THOUSANDS.bits();
    }
}

/// Characters a numeric binder treats as separators and signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NumberFormat {
    /// Separates the integral and fractional parts.
    pub decimal_separator: char,
    /// Separates digit groups.
    pub group_separator: char,
    /// Marks a negative number.
    pub negative_sign: char,
    /// Marks an explicitly positive number.
    pub positive_sign: char,
}

impl NumberFormat {
    /// Culture-neutral formatting: `1,234.5`.
    pub const INVARIANT: NumberFormat = NumberFormat {
        decimal_separator: '.',
        group_separator: ',',
        negative_sign: '-',
        positive_sign: '+',
    };
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::INVARIANT
    }
}

/// An exact textual layout for unique identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UuidFormat {
    /// 32 hex digits: `00000000000000000000000000000000` (`N`).
    Simple,
    /// Hyphen-separated groups: `00000000-0000-0000-0000-000000000000` (`D`).
    Hyphenated,
    /// Hyphenated inside braces: `{...}` (`B`).
    Braced,
    /// Hyphenated inside parentheses: `(...)` (`P`).
    Parenthesized,
}

impl UuidFormat {
    /// Every format, in the order a lenient parser tries them.
    pub const ALL: [UuidFormat; 4] = [
        UuidFormat::Hyphenated,
        UuidFormat::Simple,
        UuidFormat::Braced,
        UuidFormat::Parenthesized,
    ];

    /// Resolve a conventional single-character format specifier.
    pub fn from_specifier(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' => Some(UuidFormat::Simple),
            'D' => Some(UuidFormat::Hyphenated),
            'B' => Some(UuidFormat::Braced),
            'P' => Some(UuidFormat::Parenthesized),
            _ => None,
        }
    }
}

/// One override entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterOverride {
    /// Replace the numeric style for this parameter.
    NumberStyle(NumberStyle),
    /// Replace the numeric separators for this parameter.
    NumberFormat(NumberFormat),
    /// Require an exact unique-identifier layout.
    UuidFormat(UuidFormat),
}

impl ParameterOverride {
    fn same_kind(&self, other: &ParameterOverride) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// The override set attached to a parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    entries: Vec<ParameterOverride>,
}

impl Overrides {
    /// An empty override set.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert an override, replacing one of the same kind.
    pub fn insert(&mut self, entry: ParameterOverride) {
        match self.entries.iter_mut().find(|e| e.same_kind(&entry)) {
            Some(slot) => *slot = entry,
            None => self.entries.push(entry),
        }
    }

    /// Builder-style [`Overrides::insert`].
    pub fn with(mut self, entry: ParameterOverride) -> Self {
        self.insert(entry);
        self
    }

    /// The numeric style override.
    pub fn number_style(&self) -> Option<NumberStyle> {
        self.entries.iter().find_map(|e| match e {
            ParameterOverride::NumberStyle(style) => Some(*style),
            _ => None,
        })
    }

    /// The numeric format override.
    pub fn number_format(&self) -> Option<NumberFormat> {
        self.entries.iter().find_map(|e| match e {
            ParameterOverride::NumberFormat(format) => Some(*format),
            _ => None,
        })
    }

    /// The unique-identifier format override.
    pub fn uuid_format(&self) -> Option<UuidFormat> {
        self.entries.iter().find_map(|e| match e {
            ParameterOverride::UuidFormat(format) => Some(*format),
            _ => None,
        })
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterOverride> {
        self.entries.iter()
    }

    /// Whether no override is set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_same_kind() {
        let mut overrides = Overrides::new();
        overrides.insert(ParameterOverride::NumberStyle(NumberStyle::INTEGER));
        overrides.insert(ParameterOverride::UuidFormat(UuidFormat::Braced));
        overrides.insert(ParameterOverride::NumberStyle(NumberStyle::HEX_NUMBER));

        assert_eq!(overrides.iter().count(), 2);
        assert_eq!(overrides.number_style(), Some(NumberStyle::HEX_NUMBER));
        assert_eq!(overrides.uuid_format(), Some(UuidFormat::Braced));
        assert_eq!(overrides.number_format(), None);
    }

    #[test]
    fn test_composite_styles() {
        assert!(NumberStyle::FLOAT.contains(NumberStyle::INTEGER));
        assert!(NumberStyle::ANY.contains(NumberStyle::THOUSANDS));
        assert!(!NumberStyle::ANY.contains(NumberStyle::HEX));
    }

    #[test]
    fn test_uuid_specifiers() {
        assert_eq!(UuidFormat::from_specifier('n'), Some(UuidFormat::Simple));
        assert_eq!(UuidFormat::from_specifier('B'), Some(UuidFormat::Braced));
        assert_eq!(UuidFormat::from_specifier('X'), None);
    }
}
