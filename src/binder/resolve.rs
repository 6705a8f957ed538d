//! Field path resolution.

use crate::section::{KeyPath, DEFAULT_SEPARATOR};

/// How a field's name becomes a key when it declares no path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldNaming {
    /// The name as written: `max_players` stays `max_players`.
    #[default]
    AsIs,
    /// Underscores become hyphens: `max_players` becomes `max-players`.
    KebabCase,
}

impl FieldNaming {
    pub fn apply(self, name: &str) -> String {
        match self {
            FieldNaming::AsIs => name.to_string(),
            FieldNaming::KebabCase => name.replace('_', "-"),
        }
    }
}

/// Computes document paths for fields.
#[derive(Debug, Clone)]
pub struct PathResolver {
    separator: String,
    naming: FieldNaming,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR, FieldNaming::default())
    }
}

impl PathResolver {
    pub fn new(separator: impl Into<String>, naming: FieldNaming) -> Self {
        Self {
            separator: separator.into(),
            naming,
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Resolves a field under `prefix`.
    ///
    /// A declared path is parsed with the field's separator override, falling
    /// back to the resolver's separator. Without a declared path the field
    /// name, after naming, is a single key even if it contains the separator.
    pub fn resolve(
        &self,
        prefix: &KeyPath,
        name: &str,
        declared: Option<&str>,
        separator: Option<&str>,
    ) -> KeyPath {
        match declared {
            Some(path) => {
                let separator = separator.unwrap_or(&self.separator);
                prefix.join(&KeyPath::parse(path, separator))
            }
            None => prefix.child(&self.naming.apply(name)),
        }
    }
}
