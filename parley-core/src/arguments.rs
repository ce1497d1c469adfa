//! The bound-parameter map.

use crate::{binder::BoundValue, error::ArgumentError};
use std::{collections::HashMap, fmt};

/// Values bound to a command's parameters, keyed by parameter name.
///
/// Optional parameters that received no token are simply absent.
#[derive(Default)]
pub struct Arguments {
    values: HashMap<String, BoundValue>,
}

impl Arguments {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a bound value.
    pub fn insert(&mut self, name: impl Into<String>, value: BoundValue) {
        self.values.insert(name.into(), value);
    }

    /// Borrow the value bound to `name`, if it has type `T`.
    pub fn get<T: 'static>(&self, name: &str) -> Option<&T> {
        self.values.get(name).and_then(|v| v.downcast_ref::<T>())
    }

    /// Remove and return the value bound to `name`, if it has type `T`.
    ///
    /// A value of another type is left in place.
    pub fn take<T: 'static>(&mut self, name: &str) -> Option<T> {
        self.require(name).ok()
    }

    /// Like [`Arguments::take`], reporting why the value is unavailable.
    pub fn require<T: 'static>(&mut self, name: &str) -> Result<T, ArgumentError> {
        let value = self
            .values
            .remove(name)
            .ok_or_else(|| ArgumentError::Missing(name.to_owned()))?;
        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => {
                self.values.insert(name.to_owned(), value);
                Err(ArgumentError::TypeMismatch {
                    name: name.to_owned(),
                    expected: std::any::type_name::<T>(),
                })
            }
        }
    }

    /// Whether a value is bound to `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Names of the bound parameters, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of bound values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Remove every value.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_reports_mismatch_and_keeps_value() {
        let mut args = Arguments::new();
        args.insert("count", Box::new(3i64));

        assert_eq!(args.get::<i64>("count"), Some(&3));
        assert_eq!(
            args.require::<u8>("count"),
            Err(ArgumentError::TypeMismatch {
                name: "count".into(),
                expected: "u8",
            })
        );
        assert!(args.contains("count"));
        assert_eq!(args.take::<i64>("count"), Some(3));
        assert_eq!(
            args.require::<i64>("count"),
            Err(ArgumentError::Missing("count".into()))
        );
        assert!(args.is_empty());
    }
}
