//! Type providers: converters between native types and document values.
//!
//! A [`ProviderRegistry`] maps a [`TypeId`] to exactly one provider. It is
//! built once (usually [`ProviderRegistry::with_builtins`] plus any host
//! providers) and then shared read-only, typically as an `Arc`.

mod composite;
mod scalar;
mod structured;

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use crate::section::{KeyPath, Section, ToKeyPath};

pub use composite::{Composite, CompositeProvider};
pub use scalar::{ListProvider, OptionalProvider, Scalar, ScalarProvider};
pub use structured::StructuredProvider;

/// Converts values of `T` to and from the document tree at a path.
///
/// `read` returns `None` when the value is absent or can't be interpreted as
/// `T`; that is never an error. `write` is expected to succeed for every
/// valid `T`.
pub trait Provider<T>: Send + Sync + 'static {
    fn read(&self, section: &Section, path: &KeyPath) -> Option<T>;

    fn write(&self, value: &T, section: &mut Section, path: &KeyPath);
}

/// A type-erased provider, as stored in the registry.
pub trait DynProvider: Send + Sync {
    /// Name of the type this provider handles.
    fn type_name(&self) -> &'static str;

    fn read_dyn(&self, section: &Section, path: &KeyPath) -> Option<Box<dyn Any>>;

    /// Reads into `slot`, which must hold the provider's type.
    ///
    /// Returns `false` if the value is absent or `slot` has the wrong type;
    /// `slot` is left untouched in both cases.
    fn read_into(&self, section: &Section, path: &KeyPath, slot: &mut dyn Any) -> bool;

    /// Writes `value`, which must hold the provider's type.
    ///
    /// Returns `false` if `value` has the wrong type.
    fn write_dyn(&self, value: &dyn Any, section: &mut Section, path: &KeyPath) -> bool;
}

struct Typed<T, P> {
    inner: P,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static, P: Provider<T>> DynProvider for Typed<T, P> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn read_dyn(&self, section: &Section, path: &KeyPath) -> Option<Box<dyn Any>> {
        self.inner
            .read(section, path)
            .map(|value| Box::new(value) as Box<dyn Any>)
    }

    fn read_into(&self, section: &Section, path: &KeyPath, slot: &mut dyn Any) -> bool {
        let Some(slot) = slot.downcast_mut::<T>() else {
            return false;
        };
        match self.inner.read(section, path) {
            Some(value) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn write_dyn(&self, value: &dyn Any, section: &mut Section, path: &KeyPath) -> bool {
        match value.downcast_ref::<T>() {
            Some(value) => {
                self.inner.write(value, section, path);
                true
            }
            None => false,
        }
    }
}

/// A provider built from a pair of closures.
///
/// ```
/// use dragon_bind::provider::{FnProvider, ProviderRegistry};
/// use dragon_bind::Section;
///
/// struct Volume(u8);
///
/// let mut registry = ProviderRegistry::new();
/// registry.register(FnProvider::new(
///     |section: &Section, path| section.get_i64(path).map(|v| Volume(v.clamp(0, 100) as u8)),
///     |value: &Volume, section: &mut Section, path| section.set(path, i64::from(value.0)),
/// ));
/// assert!(registry.contains::<Volume>());
/// ```
pub struct FnProvider<R, W> {
    read: R,
    write: W,
}

impl<R, W> FnProvider<R, W> {
    pub fn new<T>(read: R, write: W) -> Self
    where
        R: Fn(&Section, &KeyPath) -> Option<T>,
        W: Fn(&T, &mut Section, &KeyPath),
    {
        Self { read, write }
    }
}

impl<T, R, W> Provider<T> for FnProvider<R, W>
where
    R: Fn(&Section, &KeyPath) -> Option<T> + Send + Sync + 'static,
    W: Fn(&T, &mut Section, &KeyPath) + Send + Sync + 'static,
{
    fn read(&self, section: &Section, path: &KeyPath) -> Option<T> {
        (self.read)(section, path)
    }

    fn write(&self, value: &T, section: &mut Section, path: &KeyPath) {
        (self.write)(value, section, path)
    }
}

/// Registry of providers keyed by the type they handle.
///
/// Registering a provider for a type that already has one replaces it: the
/// last registration wins.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<TypeId, Box<dyn DynProvider>>,
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.type_names();
        names.sort_unstable();
        f.debug_struct("ProviderRegistry")
            .field("types", &names)
            .finish()
    }
}

impl ProviderRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with providers for strings, booleans, chars, all
    /// integer and float widths, `Option` and `Vec` of those, and
    /// `SocketAddr` from `host` + `port`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        scalar::register_builtins(&mut registry);
        registry.register(CompositeProvider::<std::net::SocketAddr>::new());
        registry
    }

    /// Registers `provider` for `T`.
    ///
    /// Returns `true` if this replaced an earlier provider for `T`.
    pub fn register<T: 'static, P: Provider<T>>(&mut self, provider: P) -> bool {
        let erased = Box::new(Typed {
            inner: provider,
            _marker: PhantomData,
        });
        let replaced = self.providers.insert(TypeId::of::<T>(), erased).is_some();
        if replaced {
            tracing::debug!(
                type_name = std::any::type_name::<T>(),
                "replaced existing provider"
            );
        }
        replaced
    }

    /// Chaining form of [`register`](Self::register).
    #[must_use]
    pub fn with<T: 'static, P: Provider<T>>(mut self, provider: P) -> Self {
        self.register(provider);
        self
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.providers.contains_key(&TypeId::of::<T>())
    }

    pub fn lookup(&self, type_id: TypeId) -> Option<&dyn DynProvider> {
        self.providers.get(&type_id).map(|provider| &**provider)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Names of every registered type, in no particular order.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.providers.values().map(|p| p.type_name()).collect()
    }

    /// Reads a `T` at `path`. `None` if absent or if no provider handles `T`.
    pub fn read<T: 'static>(&self, section: &Section, path: impl ToKeyPath) -> Option<T> {
        let path = section.path(path);
        self.read_dyn(TypeId::of::<T>(), section, &path)?
            .downcast::<T>()
            .ok()
            .map(|value| *value)
    }

    pub fn read_dyn(
        &self,
        type_id: TypeId,
        section: &Section,
        path: &KeyPath,
    ) -> Option<Box<dyn Any>> {
        self.lookup(type_id)?.read_dyn(section, path)
    }

    /// Writes `value` at `path`. Returns `false` if no provider handles `T`.
    pub fn write<T: 'static>(&self, value: &T, section: &mut Section, path: impl ToKeyPath) -> bool {
        let path = section.path(path);
        match self.lookup(TypeId::of::<T>()) {
            Some(provider) => provider.write_dyn(value, section, &path),
            None => false,
        }
    }
}
