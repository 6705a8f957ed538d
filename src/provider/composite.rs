//! Values assembled from several sibling keys.

use std::marker::PhantomData;
use std::net::{IpAddr, SocketAddr};

use toml::Value;

use super::Provider;
use crate::section::{coerce, KeyPath, Section};

/// A type stored as a fixed set of keys under one path.
///
/// Reading is all-or-nothing: every key in [`KEYS`](Self::KEYS) must be
/// present or the whole value is absent.
///
/// ```
/// use dragon_bind::provider::{Composite, CompositeProvider, ProviderRegistry};
/// use dragon_bind::{Section, Value};
///
/// #[derive(Debug, PartialEq)]
/// struct Sound {
///     name: String,
///     volume: f64,
///     pitch: f64,
/// }
///
/// impl Composite for Sound {
///     const KEYS: &'static [&'static str] = &["name", "volume", "pitch"];
///
///     fn assemble(parts: &[&Value]) -> Option<Self> {
///         Some(Sound {
///             name: parts[0].as_str()?.to_string(),
///             volume: parts[1].as_float()?,
///             pitch: parts[2].as_float()?,
///         })
///     }
///
///     fn disassemble(&self) -> Vec<Value> {
///         vec![self.name.as_str().into(), self.volume.into(), self.pitch.into()]
///     }
/// }
///
/// let registry = ProviderRegistry::new().with(CompositeProvider::<Sound>::new());
/// let mut section = Section::new();
/// section.set("click.name", "ui.click");
/// section.set("click.volume", 1.0);
/// assert_eq!(registry.read::<Sound>(&section, "click"), None);
/// ```
pub trait Composite: Sized + Send + Sync + 'static {
    /// Child keys, in the order `assemble` receives them.
    const KEYS: &'static [&'static str];

    /// Builds the value from one document value per key.
    fn assemble(parts: &[&Value]) -> Option<Self>;

    /// Splits the value into one document value per key, in `KEYS` order.
    ///
    /// The result must have exactly `KEYS.len()` entries. Otherwise the
    /// provider writes nothing.
    fn disassemble(&self) -> Vec<Value>;
}

pub struct CompositeProvider<T>(PhantomData<fn() -> T>);

impl<T> CompositeProvider<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for CompositeProvider<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Composite> Provider<T> for CompositeProvider<T> {
    fn read(&self, section: &Section, path: &KeyPath) -> Option<T> {
        let parts = T::KEYS
            .iter()
            .map(|key| section.get(path.child(key)))
            .collect::<Option<Vec<_>>>()?;
        T::assemble(&parts)
    }

    fn write(&self, value: &T, section: &mut Section, path: &KeyPath) {
        let parts = value.disassemble();
        if parts.len() != T::KEYS.len() {
            tracing::warn!(
                %path,
                type_name = std::any::type_name::<T>(),
                expected = T::KEYS.len(),
                got = parts.len(),
                "composite disassembled into the wrong number of parts"
            );
            return;
        }
        for (key, part) in T::KEYS.iter().zip(parts) {
            section.set(path.child(key), part);
        }
    }
}

impl Composite for SocketAddr {
    const KEYS: &'static [&'static str] = &["host", "port"];

    fn assemble(parts: &[&Value]) -> Option<Self> {
        let host: IpAddr = parts[0].as_str()?.trim().parse().ok()?;
        if !coerce::is_numeric(parts[1]) {
            return None;
        }
        Some(SocketAddr::new(host, coerce::to_u16(parts[1])))
    }

    fn disassemble(&self) -> Vec<Value> {
        vec![
            Value::String(self.ip().to_string()),
            Value::Integer(i64::from(self.port())),
        ]
    }
}
