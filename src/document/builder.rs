use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::format::{self, DocumentFormat};
use super::DocumentError;
use crate::section::DEFAULT_SEPARATOR;

/// Everything needed to set up a [`ManagedDocument`](super::ManagedDocument).
#[derive(Debug, Clone)]
pub struct DocumentOptions {
    path: PathBuf,
    format: Arc<dyn DocumentFormat>,
    default_resource: Option<String>,
    required: bool,
    separator: String,
    save_defaults: bool,
}

impl DocumentOptions {
    /// Starts building options for the document at `path`.
    ///
    /// ## Example
    ///
    /// ```
    /// use dragon_bind::document::{DocumentOptions, JsonFormat};
    ///
    /// let options = DocumentOptions::builder("lang/en.json")
    ///     .with_default_resource("lang/en.json")
    ///     .save_defaults(false)
    ///     .build()?;
    /// assert_eq!(options.format().suffix(), "json");
    ///
    /// // Formats can also be given explicitly
    /// let options = DocumentOptions::builder("messages.conf")
    ///     .with_format(JsonFormat)
    ///     .build()?;
    /// assert!(!options.required());
    /// # Ok::<(), dragon_bind::document::DocumentError>(())
    /// ```
    pub fn builder(path: impl AsRef<Path>) -> DocumentOptionsBuilder {
        DocumentOptionsBuilder {
            path: path.as_ref().to_path_buf(),
            format: None,
            default_resource: None,
            required: false,
            separator: DEFAULT_SEPARATOR.to_string(),
            save_defaults: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> &dyn DocumentFormat {
        self.format.as_ref()
    }

    pub fn default_resource(&self) -> Option<&str> {
        self.default_resource.as_deref()
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn saves_defaults(&self) -> bool {
        self.save_defaults
    }
}

/// Builder for [`DocumentOptions`].
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct DocumentOptionsBuilder {
    path: PathBuf,
    format: Option<Arc<dyn DocumentFormat>>,
    default_resource: Option<String>,
    required: bool,
    separator: String,
    save_defaults: bool,
}

impl DocumentOptionsBuilder {
    /// Sets the format. Without one, it is picked from the file extension.
    pub fn with_format(mut self, format: impl DocumentFormat + 'static) -> Self {
        self.format = Some(Arc::new(format));
        self
    }

    /// Resource copied to the document path when the file doesn't exist.
    pub fn with_default_resource(mut self, resource: impl Into<String>) -> Self {
        self.default_resource = Some(resource.into());
        self
    }

    /// If `true`, setup fails when the file is missing and no default
    /// resource could be copied. Missing optional files load as empty.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Separator for string paths on the loaded root section.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Whether binding that materializes defaults also saves the file.
    /// Enabled by default.
    pub fn save_defaults(mut self, save_defaults: bool) -> Self {
        self.save_defaults = save_defaults;
        self
    }

    pub fn build(self) -> Result<DocumentOptions, DocumentError> {
        let format = match self.format {
            Some(format) => format,
            None => format::for_path(&self.path)
                .ok_or_else(|| DocumentError::UnknownFormat(self.path.clone()))?,
        };
        Ok(DocumentOptions {
            path: self.path,
            format,
            default_resource: self.default_resource,
            required: self.required,
            separator: self.separator,
            save_defaults: self.save_defaults,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TomlFormat;

    #[test]
    fn test_defaults() {
        let options = DocumentOptions::builder("config.toml").build().unwrap();
        assert_eq!(options.path(), Path::new("config.toml"));
        assert_eq!(options.format().suffix(), "toml");
        assert_eq!(options.separator(), ".");
        assert!(options.saves_defaults());
        assert!(!options.required());
        assert!(options.default_resource().is_none());
    }

    #[test]
    fn test_unknown_extension() {
        let result = DocumentOptions::builder("config.ini").build();
        assert!(matches!(result, Err(DocumentError::UnknownFormat(_))));

        let options = DocumentOptions::builder("config.ini")
            .with_format(TomlFormat)
            .required(true)
            .with_separator("/")
            .build()
            .unwrap();
        assert!(options.required());
        assert_eq!(options.separator(), "/");
    }
}
