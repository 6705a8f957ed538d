//! Binding objects to document sections.

mod error;
mod field;
mod resolve;

use std::sync::Arc;

pub use error::BindError;
pub use field::{Bindable, Field};
pub use resolve::{FieldNaming, PathResolver};

use field::Slot;

use crate::provider::ProviderRegistry;
use crate::section::{KeyPath, Section, DEFAULT_SEPARATOR};

/// Options controlling how a [`Binder`] resolves and populates fields.
#[derive(Debug, Clone)]
#[must_use]
pub struct BindOptions {
    write_defaults: bool,
    separator: String,
    naming: FieldNaming,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            write_defaults: true,
            separator: DEFAULT_SEPARATOR.to_string(),
            naming: FieldNaming::default(),
        }
    }
}

impl BindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether absent values are written back with the field's current value
    /// during load. Enabled by default.
    pub fn with_write_defaults(mut self, write_defaults: bool) -> Self {
        self.write_defaults = write_defaults;
        self
    }

    /// Separator used to parse declared field paths.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_naming(mut self, naming: FieldNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn write_defaults(&self) -> bool {
        self.write_defaults
    }
}

/// What a load pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindReport {
    /// Fields assigned from the document.
    pub read: usize,
    /// Absent fields whose current value was written into the document.
    pub defaults_written: usize,
}

impl BindReport {
    /// Returns `true` if the load modified the section.
    pub fn changed(&self) -> bool {
        self.defaults_written > 0
    }
}

/// Moves values between [`Bindable`] objects and [`Section`]s.
///
/// Fields are processed in declaration order. Nested sections recurse with
/// the field's path as the new prefix.
#[derive(Debug, Clone)]
pub struct Binder {
    registry: Arc<ProviderRegistry>,
    options: BindOptions,
    resolver: PathResolver,
}

impl Binder {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self::with_options(registry, BindOptions::default())
    }

    pub fn with_options(registry: Arc<ProviderRegistry>, options: BindOptions) -> Self {
        let resolver = PathResolver::new(options.separator.clone(), options.naming);
        Self {
            registry,
            options,
            resolver,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn options(&self) -> &BindOptions {
        &self.options
    }

    /// Resolves the full path of a field declared under `prefix`.
    pub fn resolve(&self, prefix: &KeyPath, field: &Field<'_>) -> KeyPath {
        self.resolver.resolve(
            prefix,
            field.name,
            field.path.as_deref(),
            field.separator.as_deref(),
        )
    }

    /// Assigns every field present in `root`.
    ///
    /// Absent fields keep their value and, with write-back enabled, have it
    /// written into `root`. On error `root` may hold writes from fields
    /// processed earlier; callers that need atomicity bind against a copy.
    pub fn load(
        &self,
        target: &mut dyn Bindable,
        root: &mut Section,
    ) -> Result<BindReport, BindError> {
        let mut report = BindReport::default();
        self.load_at(target, root, &KeyPath::root(), &mut report)?;
        Ok(report)
    }

    fn load_at(
        &self,
        target: &mut dyn Bindable,
        root: &mut Section,
        prefix: &KeyPath,
        report: &mut BindReport,
    ) -> Result<(), BindError> {
        let owner = target.type_name();
        for field in target.fields() {
            let path = self.resolve(prefix, &field);
            match field.slot {
                Slot::Value {
                    value,
                    type_id,
                    type_name,
                } => {
                    let provider =
                        self.registry
                            .lookup(type_id)
                            .ok_or_else(|| BindError::MissingProvider {
                                field: field.name,
                                path: path.to_string(),
                                type_name,
                                owner,
                            })?;
                    if provider.read_into(root, &path, value) {
                        report.read += 1;
                    } else if self.options.write_defaults {
                        let before = root.get(&path).cloned();
                        provider.write_dyn(&*value, root, &path);
                        // A `None` option writes nothing
                        if root.get(&path) != before.as_ref() {
                            tracing::debug!(%path, "wrote default value");
                            report.defaults_written += 1;
                        }
                    }
                }
                Slot::Section(nested) => self.load_at(nested, root, &path, report)?,
            }
        }
        Ok(())
    }

    /// Writes every field of `target` into `root`.
    pub fn save(&self, target: &mut dyn Bindable, root: &mut Section) -> Result<(), BindError> {
        self.save_at(target, root, &KeyPath::root())
    }

    fn save_at(
        &self,
        target: &mut dyn Bindable,
        root: &mut Section,
        prefix: &KeyPath,
    ) -> Result<(), BindError> {
        let owner = target.type_name();
        for field in target.fields() {
            let path = self.resolve(prefix, &field);
            match field.slot {
                Slot::Value {
                    value,
                    type_id,
                    type_name,
                } => {
                    let provider =
                        self.registry
                            .lookup(type_id)
                            .ok_or_else(|| BindError::MissingProvider {
                                field: field.name,
                                path: path.to_string(),
                                type_name,
                                owner,
                            })?;
                    provider.write_dyn(&*value, root, &path);
                }
                Slot::Section(nested) => self.save_at(nested, root, &path)?,
            }
        }
        Ok(())
    }
}
