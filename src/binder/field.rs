use std::any::{Any, TypeId};
use std::fmt;

/// A type whose fields bind to a document section.
///
/// Implementations list their fields in declaration order. The list is built
/// fresh for every load or save, borrowing the fields for that pass only.
///
/// ```
/// use dragon_bind::{Bindable, Field};
///
/// struct Database {
///     host: String,
///     port: u16,
/// }
///
/// impl Bindable for Database {
///     fn fields(&mut self) -> Vec<Field<'_>> {
///         vec![
///             Field::value("host", &mut self.host),
///             Field::value("port", &mut self.port).at("connection.port"),
///         ]
///     }
/// }
/// ```
pub trait Bindable {
    fn fields(&mut self) -> Vec<Field<'_>>;

    /// Name of the implementing type, used in error messages.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

pub(crate) enum Slot<'a> {
    Value {
        value: &'a mut dyn Any,
        type_id: TypeId,
        type_name: &'static str,
    },
    Section(&'a mut dyn Bindable),
}

/// One binding between a field and a document path.
pub struct Field<'a> {
    pub(crate) name: &'static str,
    pub(crate) path: Option<String>,
    pub(crate) separator: Option<String>,
    pub(crate) slot: Slot<'a>,
}

impl<'a> Field<'a> {
    /// Binds a value field converted by the provider registered for `T`.
    pub fn value<T: Any>(name: &'static str, value: &'a mut T) -> Self {
        Self {
            name,
            path: None,
            separator: None,
            slot: Slot::Value {
                value,
                type_id: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
            },
        }
    }

    /// Binds a nested type whose own fields live under this field's path.
    pub fn section<B: Bindable>(name: &'static str, value: &'a mut B) -> Self {
        Self {
            name,
            path: None,
            separator: None,
            slot: Slot::Section(value),
        }
    }

    /// Uses `path` instead of the field name. An empty path keeps the name.
    #[must_use]
    pub fn at(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.path = (!path.is_empty()).then_some(path);
        self
    }

    /// Parses this field's path with `separator` instead of the binder's.
    #[must_use]
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn declared_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn is_section(&self) -> bool {
        matches!(self.slot, Slot::Section(_))
    }
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.slot {
            Slot::Value { type_name, .. } => *type_name,
            Slot::Section(nested) => nested.type_name(),
        };
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("separator", &self.separator)
            .field("type", &kind)
            .finish()
    }
}
