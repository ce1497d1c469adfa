//! Binder registry and built-in binders.
//!
//! [`BinderRegistry`] maps a parameter's declared type to the binder that
//! produces it. Every binder is stored behind the same [`DynBinder`]
//! interface, so lookups and calls follow one path regardless of the value
//! type. A type without a binder is not an error: the parameter simply fails
//! to bind and overload resolution moves on.
//!
//! Built-ins:
//!
//! - [`NumericBinder`] for every integer and floating-point primitive
//! - [`BoolBinder`]
//! - [`UuidBinder`]
//! - [`StringBinder`]

mod boolean;
mod identifier;
mod numeric;
mod text;

pub use boolean::BoolBinder;
pub use identifier::{UuidBinder, parse_exact};
pub use numeric::{Numeric, NumericBinder};
pub use text::{StringBinder, strip_quotes};

use parley_core::{Binder, BoundValue, DynBinder, Parameter};
use std::{any::TypeId, collections::HashMap, fmt, sync::Arc};

/// Type-indexed binder lookup.
#[derive(Clone)]
pub struct BinderRegistry {
    binders: HashMap<TypeId, Arc<dyn DynBinder>>,
}

impl BinderRegistry {
    /// A registry with every built-in binder.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// A registry without any binder.
    pub fn empty() -> Self {
        Self {
            binders: HashMap::new(),
        }
    }

    /// Start from the built-ins and add custom binders.
    pub fn builder() -> BinderRegistryBuilder {
        let mut registry = Self::empty();
        registry.register_builtins();
        BinderRegistryBuilder { registry }
    }

    fn register_builtins(&mut self) {
        macro_rules! numeric {
            ($registry:expr; $($ty:ty),*) => {
                $($registry.register(NumericBinder::<$ty>::new());)*
            };
        }
        numeric!(self; i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);
        self.register(BoolBinder);
        self.register(UuidBinder);
        self.register(StringBinder);
    }

    /// Register `binder` for its value type, replacing any previous one.
    pub fn register<B: Binder>(&mut self, binder: B) {
        self.binders
            .insert(TypeId::of::<B::Value>(), Arc::new(binder));
    }

    /// The binder for `type_id`.
    pub fn get(&self, type_id: TypeId) -> Option<&Arc<dyn DynBinder>> {
        self.binders.get(&type_id)
    }

    /// Whether a binder exists for `T`.
    pub fn contains<T: 'static>(&self) -> bool {
        self.binders.contains_key(&TypeId::of::<T>())
    }

    /// Bind `text` for `parameter`.
    ///
    /// Returns `None` when the type has no binder or the text does not
    /// convert.
    pub fn bind(&self, parameter: &Parameter, text: &str) -> Option<BoundValue> {
        self.get(parameter.type_id())?
            .bind_dyn(text, parameter.overrides())
    }

    /// Number of registered binders.
    pub fn len(&self) -> usize {
        self.binders.len()
    }

    /// Whether no binder is registered.
    pub fn is_empty(&self) -> bool {
        self.binders.is_empty()
    }
}

impl Default for BinderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BinderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.binders.values().map(|b| b.value_type_name()))
            .finish()
    }
}

/// Builder for [`BinderRegistry`].
pub struct BinderRegistryBuilder {
    registry: BinderRegistry,
}

impl BinderRegistryBuilder {
    /// Add or replace a binder.
    pub fn binder<B: Binder>(mut self, binder: B) -> Self {
        self.registry.register(binder);
        self
    }

    /// Finish building.
    pub fn build(self) -> BinderRegistry {
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{FnBinder, Overrides};

    #[derive(Debug, PartialEq)]
    struct Color(u8, u8, u8);

    #[test]
    fn test_builtins() {
        let registry = BinderRegistry::new();
        let count = Parameter::of::<i32>("count");
        let value = registry.bind(&count, "123").unwrap();
        assert_eq!(value.downcast_ref::<i32>(), Some(&123));
        assert!(registry.bind(&count, "abc").is_none());

        let text = Parameter::of::<String>("text");
        let value = registry.bind(&text, "\"hi\"").unwrap();
        assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("hi"));

        assert!(registry.contains::<bool>());
        assert!(registry.contains::<uuid::Uuid>());
        assert!(registry.contains::<f64>());
    }

    #[test]
    fn test_unknown_type_fails_to_bind() {
        let registry = BinderRegistry::empty();
        assert!(registry.is_empty());
        assert!(registry.bind(&Parameter::of::<i32>("n"), "1").is_none());
    }

    #[test]
    fn test_custom_binder() {
        let registry = BinderRegistry::builder()
            .binder(FnBinder::new(|text: &str, _: &Overrides| {
                let hex = text.strip_prefix('#').filter(|hex| hex.len() == 6)?;
                let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
                Some(Color(channel(0)?, channel(2)?, channel(4)?))
            }))
            .build();
        let value = registry
            .bind(&Parameter::of::<Color>("color"), "#ff8000")
            .unwrap();
        assert_eq!(value.downcast_ref::<Color>(), Some(&Color(255, 128, 0)));
        assert!(registry.bind(&Parameter::of::<Color>("color"), "red").is_none());
    }
}
