//! Provider backed by serde for types that already derive it.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Provider;
use crate::section::{KeyPath, Section};

/// Provider for any `T: Serialize + DeserializeOwned`.
///
/// The value at the path is handed to serde as a whole; a value that fails
/// to deserialize reads as absent.
pub struct StructuredProvider<T>(PhantomData<fn() -> T>);

impl<T> StructuredProvider<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for StructuredProvider<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Provider<T> for StructuredProvider<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    fn read(&self, section: &Section, path: &KeyPath) -> Option<T> {
        let value = section.get(path)?.clone();
        match value.try_into() {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!(%path, error = %err, "structured value did not deserialize");
                None
            }
        }
    }

    fn write(&self, value: &T, section: &mut Section, path: &KeyPath) {
        match toml::Value::try_from(value) {
            Ok(value) => section.set(path, value),
            Err(err) => {
                tracing::warn!(%path, error = %err, "structured value did not serialize");
            }
        }
    }
}
