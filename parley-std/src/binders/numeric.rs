//! One binder for every primitive numeric type.
//!
//! Text is first checked against a [`NumberStyle`] and rewritten into the
//! canonical form Rust's parsers accept, using the separators of a
//! [`NumberFormat`]. Only digits, the configured separators, signs and an
//! exponent marker survive, so words like `inf` or `NaN` never bind.

use parley_core::{Binder, NumberFormat, NumberStyle, Overrides};
use std::{fmt, marker::PhantomData};

/// A primitive number type with a default parsing style.
pub trait Numeric: Sized + Send + Sync + 'static {
    /// The style used when a parameter carries no override.
    const DEFAULT_STYLE: NumberStyle;

    /// Parse canonical decimal text (`-12.5e3`).
    fn parse_decimal(text: &str) -> Option<Self>;

    /// Parse bare hexadecimal digits.
    fn parse_hex(digits: &str) -> Option<Self>;
}

macro_rules! integer {
    ($($ty:ty),*) => {$(
        impl Numeric for $ty {
            const DEFAULT_STYLE: NumberStyle = NumberStyle::INTEGER;

            fn parse_decimal(text: &str) -> Option<Self> {
                text.parse().ok()
            }

            fn parse_hex(digits: &str) -> Option<Self> {
                <$ty>::from_str_radix(digits, 16).ok()
            }
        }
    )*};
}

macro_rules! float {
    ($($ty:ty),*) => {$(
        impl Numeric for $ty {
            const DEFAULT_STYLE: NumberStyle = NumberStyle::ANY;

            fn parse_decimal(text: &str) -> Option<Self> {
                text.parse().ok()
            }

            fn parse_hex(_digits: &str) -> Option<Self> {
                None
            }
        }
    )*};
}

integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
float!(f32, f64);

/// Binds any [`Numeric`] type.
pub struct NumericBinder<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> NumericBinder<T> {
    /// A binder for `T`.
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for NumericBinder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for NumericBinder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NumericBinder<{}>", std::any::type_name::<T>())
    }
}

impl<T: Numeric> Binder for NumericBinder<T> {
    type Value = T;

    fn bind(&self, text: &str, overrides: &Overrides) -> Option<T> {
        let style = overrides.number_style().unwrap_or(T::DEFAULT_STYLE);
        let format = overrides.number_format().unwrap_or_default();
        let text = strip_white(text, style)?;

        if style.contains(NumberStyle::HEX) {
            return (!text.is_empty() && text.chars().all(|c| c.is_ascii_hexdigit()))
                .then(|| T::parse_hex(text))
                .flatten();
        }

        T::parse_decimal(&canonicalize(text, style, &format)?)
    }
}

fn strip_white(text: &str, style: NumberStyle) -> Option<&str> {
    let leading = text.trim_start();
    if leading.len() != text.len() && !style.contains(NumberStyle::LEADING_WHITE) {
        return None;
    }
    let trimmed = leading.trim_end();
    if trimmed.len() != leading.len() && !style.contains(NumberStyle::TRAILING_WHITE) {
        return None;
    }
    Some(trimmed)
}

/// Rewrite `text` into `[-]digits[.digits][e[-]digits]`.
fn canonicalize(text: &str, style: NumberStyle, format: &NumberFormat) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    if style.contains(NumberStyle::LEADING_SIGN) {
        match chars.peek() {
            Some(&c) if c == format.negative_sign => {
                out.push('-');
                chars.next();
            }
            Some(&c) if c == format.positive_sign => {
                chars.next();
            }
            _ => {}
        }
    }

    let mut mantissa_digits = 0usize;
    let mut seen_decimal = false;
    let mut exponent_digits = None::<usize>;

    while let Some(c) = chars.next() {
        if let Some(count) = exponent_digits.as_mut() {
            if !c.is_ascii_digit() {
                return None;
            }
            *count += 1;
            out.push(c);
            continue;
        }

        if c.is_ascii_digit() {
            mantissa_digits += 1;
            out.push(c);
        } else if c == format.decimal_separator
            && style.contains(NumberStyle::DECIMAL_POINT)
            && !seen_decimal
        {
            seen_decimal = true;
            out.push('.');
        } else if c == format.group_separator
            && style.contains(NumberStyle::THOUSANDS)
            && !seen_decimal
            && mantissa_digits > 0
        {
            // group separators carry no value
        } else if (c == 'e' || c == 'E')
            && style.contains(NumberStyle::EXPONENT)
            && mantissa_digits > 0
        {
            out.push('e');
            match chars.peek() {
                Some(&sign) if sign == format.negative_sign || sign == '-' => {
                    out.push('-');
                    chars.next();
                }
                Some(&sign) if sign == format.positive_sign || sign == '+' => {
                    chars.next();
                }
                _ => {}
            }
            exponent_digits = Some(0);
        } else {
            return None;
        }
    }

    if mantissa_digits == 0 || exponent_digits == Some(0) {
        return None;
    }
    Some(out)
}
