//! Scalar, optional and list providers.

use std::marker::PhantomData;

use toml::Value;

use super::{Provider, ProviderRegistry};
use crate::section::{coerce, KeyPath, Section};

/// A type stored as a single document value.
pub trait Scalar: Sized + Send + Sync + 'static {
    /// Interprets a document value, or `None` if it has the wrong shape.
    fn from_value(value: &Value) -> Option<Self>;

    fn to_value(&self) -> Value;
}

impl Scalar for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Boolean(b) => Some(b.to_string()),
            Value::Datetime(dt) => Some(dt.to_string()),
            Value::Array(_) | Value::Table(_) => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Scalar for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Boolean(b) => Some(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }
}

impl Scalar for char {
    fn from_value(value: &Value) -> Option<Self> {
        let s = value.as_str()?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

fn numeric_shape(value: &Value) -> bool {
    matches!(value, Value::Integer(_) | Value::Float(_) | Value::String(_))
}

macro_rules! integer_scalars {
    ($($ty:ty => $to:ident;)*) => {
        $(
            impl Scalar for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    numeric_shape(value).then(|| coerce::$to(value))
                }

                fn to_value(&self) -> Value {
                    match i64::try_from(*self) {
                        Ok(i) => Value::Integer(i),
                        // Only u64 values above i64::MAX land here
                        Err(_) => Value::String(self.to_string()),
                    }
                }
            }
        )*
    };
}

integer_scalars! {
    i8 => to_i8;
    i16 => to_i16;
    i32 => to_i32;
    i64 => to_i64;
    u8 => to_u8;
    u16 => to_u16;
    u32 => to_u32;
    u64 => to_u64;
}

impl Scalar for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        numeric_shape(value).then(|| coerce::to_f64(value))
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl Scalar for f32 {
    fn from_value(value: &Value) -> Option<Self> {
        numeric_shape(value).then(|| coerce::to_f32(value))
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

/// Provider for any [`Scalar`] stored at a single key.
pub struct ScalarProvider<T>(PhantomData<fn() -> T>);

impl<T> ScalarProvider<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for ScalarProvider<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> Provider<T> for ScalarProvider<T> {
    fn read(&self, section: &Section, path: &KeyPath) -> Option<T> {
        section.get(path).and_then(T::from_value)
    }

    fn write(&self, value: &T, section: &mut Section, path: &KeyPath) {
        section.set(path, value.to_value());
    }
}

/// Provider for `Option<T>`; writing `None` removes the key.
///
/// An absent key reads as absent rather than `Some(None)`, so the field keeps
/// whatever value it already holds.
pub struct OptionalProvider<T>(PhantomData<fn() -> T>);

impl<T> OptionalProvider<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for OptionalProvider<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> Provider<Option<T>> for OptionalProvider<T> {
    fn read(&self, section: &Section, path: &KeyPath) -> Option<Option<T>> {
        section.get(path).and_then(T::from_value).map(Some)
    }

    fn write(&self, value: &Option<T>, section: &mut Section, path: &KeyPath) {
        match value {
            Some(value) => section.set(path, value.to_value()),
            None => {
                section.remove(path);
            }
        }
    }
}

/// Provider for `Vec<T>` stored as an array.
///
/// A lone scalar reads as a one-element list. If any element can't be
/// interpreted as `T` the whole list reads as absent.
pub struct ListProvider<T>(PhantomData<fn() -> T>);

impl<T> ListProvider<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for ListProvider<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> Provider<Vec<T>> for ListProvider<T> {
    fn read(&self, section: &Section, path: &KeyPath) -> Option<Vec<T>> {
        match section.get(path)? {
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            Value::Table(_) => None,
            other => T::from_value(other).map(|value| vec![value]),
        }
    }

    fn write(&self, value: &Vec<T>, section: &mut Section, path: &KeyPath) {
        let items = value.iter().map(Scalar::to_value).collect();
        section.set(path, Value::Array(items));
    }
}

macro_rules! register_scalars {
    ($registry:expr, $($ty:ty),* $(,)?) => {
        $(
            $registry.register(ScalarProvider::<$ty>::new());
            $registry.register(OptionalProvider::<$ty>::new());
            $registry.register(ListProvider::<$ty>::new());
        )*
    };
}

pub(super) fn register_builtins(registry: &mut ProviderRegistry) {
    register_scalars!(registry, String, bool, char, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);
}
