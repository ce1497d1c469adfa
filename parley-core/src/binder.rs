//! # Binder Layer
//!
//! A binder converts the text of one token into a typed value. Binders are
//! pure: the same text and overrides always produce the same result, and a
//! malformed input is reported by returning `None`, never by raising an
//! error. That lets overload resolution try the next candidate cheaply.
//!
//! [`Binder`] is the typed, statically dispatched form. [`DynBinder`] erases
//! the value type so one registry can hold binders for every parameter type.

use crate::overrides::Overrides;
use std::any::{Any, TypeId};

/// A type-erased bound value.
pub type BoundValue = Box<dyn Any + Send + Sync>;

/// Converts text into a typed value.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Binder`",
    label = "missing `Binder` implementation",
    note = "Binders must implement `bind` and declare the `Value` they produce."
)]
pub trait Binder: Send + Sync + 'static {
    /// The produced type.
    type Value: Send + Sync + 'static;

    /// Convert `text`, or return `None` when it does not represent a value.
    fn bind(&self, text: &str, overrides: &Overrides) -> Option<Self::Value>;
}

/// Object-safe version of [`Binder`].
pub trait DynBinder: Send + Sync + 'static {
    /// Convert `text` into a boxed value.
    fn bind_dyn(&self, text: &str, overrides: &Overrides) -> Option<BoundValue>;

    /// The [`TypeId`] of the produced values.
    fn value_type(&self) -> TypeId;

    /// The name of the produced type, for diagnostics.
    fn value_type_name(&self) -> &'static str;
}

// Blanket implementation: every Binder is a DynBinder.
impl<B: Binder> DynBinder for B {
    fn bind_dyn(&self, text: &str, overrides: &Overrides) -> Option<BoundValue> {
        self.bind(text, overrides)
            .map(|value| Box::new(value) as BoundValue)
    }

    fn value_type(&self) -> TypeId {
        TypeId::of::<B::Value>()
    }

    fn value_type_name(&self) -> &'static str {
        std::any::type_name::<B::Value>()
    }
}

/// A binder built from a plain function.
pub struct FnBinder<F>(F);

impl<F> FnBinder<F> {
    /// Wrap a conversion function.
    pub const fn new(func: F) -> Self {
        Self(func)
    }
}

impl<F, T> Binder for FnBinder<F>
where
    F: Fn(&str, &Overrides) -> Option<T> + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    type Value = T;

    fn bind(&self, text: &str, overrides: &Overrides) -> Option<T> {
        (self.0)(text, overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl Binder for Upper {
        type Value = String;

        fn bind(&self, text: &str, _overrides: &Overrides) -> Option<String> {
            (!text.is_empty()).then(|| text.to_uppercase())
        }
    }

    #[test]
    fn test_dyn_binder_boxes_value() {
        let binder: Box<dyn DynBinder> = Box::new(Upper);
        let value = binder.bind_dyn("abc", &Overrides::new()).unwrap();
        assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("ABC"));
        assert_eq!(binder.value_type(), TypeId::of::<String>());
        assert!(binder.bind_dyn("", &Overrides::new()).is_none());
    }

    #[test]
    fn test_fn_binder() {
        let binder = FnBinder::new(|text: &str, _: &Overrides| text.parse::<u8>().ok());
        assert_eq!(binder.bind("7", &Overrides::new()), Some(7));
        assert_eq!(binder.bind("700", &Overrides::new()), None);
        assert!(binder.value_type_name().contains("u8"));
    }
}
