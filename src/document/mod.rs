//! Managed documents: a section root bound to one physical file.

mod builder;
mod error;
mod format;
mod fs;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

pub use builder::{DocumentOptions, DocumentOptionsBuilder};
pub use error::DocumentError;
pub use format::{for_path, DocumentFormat, FormatError, JsonFormat, TomlFormat};
pub use fs::{FileSystem, LocalFileSystem};

use crate::binder::{BindReport, Bindable, Binder};
use crate::section::Section;

/// One physical document and its parsed root.
///
/// The root is replaced atomically: [`load`](Self::load) parses into a new
/// section and swaps it in, so a reader holding [`root`](Self::root) keeps a
/// consistent tree. Writers are serialized; readers never block.
pub struct ManagedDocument {
    options: DocumentOptions,
    fs: Arc<dyn FileSystem>,
    root: ArcSwap<Section>,
    write_lock: Mutex<()>,
}

impl fmt::Debug for ManagedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedDocument")
            .field("path", &self.options.path())
            .field("format", &self.options.format().suffix())
            .finish_non_exhaustive()
    }
}

impl ManagedDocument {
    /// Sets up a document on the local file system.
    ///
    /// If the file is missing, the default resource (if any) is copied there
    /// first. The file is then loaded.
    pub fn setup(options: DocumentOptions) -> Result<Self, DocumentError> {
        Self::setup_with(options, Arc::new(LocalFileSystem::default()))
    }

    pub fn setup_with(
        options: DocumentOptions,
        fs: Arc<dyn FileSystem>,
    ) -> Result<Self, DocumentError> {
        let document = Self::detached(options, fs, Section::new());
        document.ensure_exists()?;
        document.load()?;
        Ok(document)
    }

    /// Wraps an in-memory section without touching the file system.
    pub fn detached(options: DocumentOptions, fs: Arc<dyn FileSystem>, root: Section) -> Self {
        let root = root.with_separator(options.separator());
        Self {
            options,
            fs,
            root: ArcSwap::from_pointee(root),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        self.options.path()
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    /// Snapshot of the current root.
    pub fn root(&self) -> Arc<Section> {
        self.root.load_full()
    }

    /// Copies the default resource if the file is missing.
    ///
    /// Returns `true` if the file exists afterwards.
    fn ensure_exists(&self) -> Result<bool, DocumentError> {
        let path = self.path();
        if self.fs.exists(path) {
            return Ok(true);
        }
        if let Some(resource) = self.options.default_resource() {
            let copied = self
                .fs
                .copy_resource(resource, path)
                .map_err(|e| DocumentError::ResourceError {
                    resource: resource.to_string(),
                    path: path.to_path_buf(),
                    source: e,
                })?;
            if copied {
                tracing::info!(resource, path = %path.display(), "copied default resource");
                return Ok(true);
            }
            tracing::warn!(resource, "default resource not found");
        }
        if self.options.required() {
            return Err(DocumentError::FileNotFound(path.to_path_buf()));
        }
        Ok(false)
    }

    /// Re-parses the file and swaps in the new root.
    ///
    /// On failure the current root is left as it was. Parsing happens under
    /// the writer lock, so concurrent loads store in the order they read.
    pub fn load(&self) -> Result<(), DocumentError> {
        let _guard = self.write_lock.lock();
        let section = self.read_section()?;
        self.root.store(Arc::new(section));
        tracing::debug!(path = %self.path().display(), "loaded document");
        Ok(())
    }

    fn read_section(&self) -> Result<Section, DocumentError> {
        let path = self.path();
        let table = match self.fs.read(path) {
            Ok(bytes) => {
                self.options
                    .format()
                    .parse(&bytes)
                    .map_err(|e| DocumentError::ParseError {
                        path: path.to_path_buf(),
                        source: e,
                    })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if self.options.required() {
                    return Err(DocumentError::FileNotFound(path.to_path_buf()));
                }
                Default::default()
            }
            Err(e) => {
                return Err(DocumentError::ReadError {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        Ok(Section::from_table(table).with_separator(self.options.separator()))
    }

    /// Serializes the current root to the file.
    pub fn save(&self) -> Result<(), DocumentError> {
        let _guard = self.write_lock.lock();
        self.persist(&self.root())
    }

    /// Writes `root` to the file. Callers hold the writer lock.
    fn persist(&self, root: &Section) -> Result<(), DocumentError> {
        let path = self.path();
        let bytes = self
            .options
            .format()
            .serialize(root.as_table())
            .map_err(|e| DocumentError::SerializeError {
                path: path.to_path_buf(),
                source: e,
            })?;
        let write_error = |e| DocumentError::WriteError {
            path: path.to_path_buf(),
            source: e,
        };
        self.fs.create_parent_dirs(path).map_err(write_error)?;
        self.fs.write(path, &bytes).map_err(write_error)?;
        tracing::debug!(path = %path.display(), "saved document");
        Ok(())
    }

    /// Replaces the root in memory.
    pub fn replace_root(&self, root: Section) {
        let root = root.with_separator(self.options.separator());
        let _guard = self.write_lock.lock();
        self.root.store(Arc::new(root));
    }

    /// Applies `f` to a copy of the root and swaps the copy in.
    pub fn update<R>(&self, f: impl FnOnce(&mut Section) -> R) -> R {
        let _guard = self.write_lock.lock();
        let mut next = Section::clone(&self.root.load());
        let out = f(&mut next);
        self.root.store(Arc::new(next));
        out
    }

    /// Loads `target` from the root.
    ///
    /// Defaults materialized by the binder are swapped into the root and, if
    /// the options say so, saved. If binding fails the root is unchanged.
    pub fn bind(
        &self,
        binder: &Binder,
        target: &mut dyn Bindable,
    ) -> Result<BindReport, DocumentError> {
        let _guard = self.write_lock.lock();
        let mut next = Section::clone(&self.root.load());
        let report = binder.load(target, &mut next)?;
        if report.changed() {
            let next = Arc::new(next);
            self.root.store(Arc::clone(&next));
            if self.options.saves_defaults() {
                self.persist(&next)?;
            }
        }
        Ok(report)
    }

    /// Writes `target` into the root and saves the file.
    pub fn store(&self, binder: &Binder, target: &mut dyn Bindable) -> Result<(), DocumentError> {
        let _guard = self.write_lock.lock();
        let mut next = Section::clone(&self.root.load());
        binder.save(target, &mut next)?;
        let next = Arc::new(next);
        self.root.store(Arc::clone(&next));
        self.persist(&next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::{BindOptions, Field};
    use crate::provider::ProviderRegistry;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq)]
    struct Messages {
        greeting: String,
        farewell: String,
        max_line: u32,
    }

    impl Default for Messages {
        fn default() -> Self {
            Self {
                greeting: "Hello".into(),
                farewell: "Bye".into(),
                max_line: 80,
            }
        }
    }

    impl Bindable for Messages {
        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![
                Field::value("greeting", &mut self.greeting).at("chat.greeting"),
                Field::value("farewell", &mut self.farewell).at("chat.farewell"),
                Field::value("max_line", &mut self.max_line),
            ]
        }
    }

    fn binder() -> Binder {
        Binder::new(Arc::new(ProviderRegistry::with_builtins()))
    }

    fn options(path: &Path) -> DocumentOptionsBuilder {
        DocumentOptions::builder(path)
    }

    #[test]
    fn test_setup_missing_optional_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let document = ManagedDocument::setup(options(&dir.path().join("a.toml")).build().unwrap())
            .unwrap();
        assert!(document.root().is_empty());
    }

    #[test]
    fn test_setup_missing_required_file() {
        let dir = TempDir::new().unwrap();
        let result = ManagedDocument::setup(
            options(&dir.path().join("a.toml"))
                .required(true)
                .build()
                .unwrap(),
        );
        assert!(matches!(result, Err(DocumentError::FileNotFound(_))));
    }

    #[test]
    fn test_setup_copies_default_resource() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lang/en.toml");
        let fs = LocalFileSystem::new().with_embedded("en.toml", &b"[chat]\ngreeting = \"Hi\"\n"[..]);
        let document = ManagedDocument::setup_with(
            options(&path)
                .with_default_resource("en.toml")
                .required(true)
                .build()
                .unwrap(),
            Arc::new(fs),
        )
        .unwrap();

        assert!(path.exists());
        assert_eq!(document.root().get_str("chat.greeting"), Some("Hi"));
    }

    #[test]
    fn test_bind_materializes_and_saves_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("messages.toml");
        std::fs::write(&path, "[chat]\ngreeting = \"Howdy\"\n").unwrap();
        let document = ManagedDocument::setup(options(&path).build().unwrap()).unwrap();

        let mut messages = Messages::default();
        let report = document.bind(&binder(), &mut messages).unwrap();
        assert_eq!(messages.greeting, "Howdy");
        assert_eq!(report.defaults_written, 2);

        let on_disk = std::fs::read_to_string(&path).unwrap();
        let table: toml::Table = toml::from_str(&on_disk).unwrap();
        assert_eq!(table["chat"]["farewell"].as_str(), Some("Bye"));
        assert_eq!(table["max_line"].as_integer(), Some(80));
        assert_eq!(table["chat"]["greeting"].as_str(), Some("Howdy"));
    }

    #[test]
    fn test_bind_without_write_back_leaves_document_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("messages.json");
        std::fs::write(&path, r#"{"max_line": 120}"#).unwrap();
        let document = ManagedDocument::setup(options(&path).build().unwrap()).unwrap();
        let binder = Binder::with_options(
            Arc::new(ProviderRegistry::with_builtins()),
            BindOptions::new().with_write_defaults(false),
        );

        let mut messages = Messages::default();
        let report = document.bind(&binder, &mut messages).unwrap();
        assert_eq!(messages.max_line, 120);
        assert!(!report.changed());
        assert!(!document.root().contains("chat"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"max_line": 120}"#);
    }

    #[test]
    fn test_failed_bind_leaves_root_untouched() {
        struct Opaque;
        struct Broken {
            name: String,
            opaque: Opaque,
        }
        impl Bindable for Broken {
            fn fields(&mut self) -> Vec<Field<'_>> {
                vec![
                    Field::value("name", &mut self.name),
                    Field::value("opaque", &mut self.opaque),
                ]
            }
        }

        let dir = TempDir::new().unwrap();
        let document = ManagedDocument::setup(
            options(&dir.path().join("broken.toml")).build().unwrap(),
        )
        .unwrap();
        let mut broken = Broken {
            name: "n".into(),
            opaque: Opaque,
        };
        let result = document.bind(&binder(), &mut broken);
        assert!(matches!(result, Err(DocumentError::Bind(_))));
        assert!(document.root().is_empty());
        assert!(!dir.path().join("broken.toml").exists());
    }

    #[test]
    fn test_malformed_reload_keeps_previous_root() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.toml");
        std::fs::write(&path, "value = 1\n").unwrap();
        let document = ManagedDocument::setup(options(&path).build().unwrap()).unwrap();

        std::fs::write(&path, "value = \n").unwrap();
        let result = document.load();
        assert!(matches!(result, Err(DocumentError::ParseError { .. })));
        assert_eq!(document.root().get_i64("value"), Some(1));
    }

    #[test]
    fn test_reader_keeps_old_root_across_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.toml");
        std::fs::write(&path, "a = 1\nb = 1\n").unwrap();
        let document = ManagedDocument::setup(options(&path).build().unwrap()).unwrap();

        let old = document.root();
        std::fs::write(&path, "a = 2\nc = 2\n").unwrap();
        document.load().unwrap();

        assert_eq!(old.get_i64("a"), Some(1));
        assert_eq!(old.get_i64("b"), Some(1));
        assert!(old.get("c").is_none());
        let new = document.root();
        assert_eq!(new.get_i64("a"), Some(2));
        assert!(new.get("b").is_none());
    }

    #[test]
    fn test_concurrent_readers_see_whole_generations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gen.toml");
        std::fs::write(&path, "a = 0\nb = 0\n").unwrap();
        let document = Arc::new(ManagedDocument::setup(options(&path).build().unwrap()).unwrap());

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let document = Arc::clone(&document);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let root = document.root();
                        assert_eq!(root.get_i64("a"), root.get_i64("b"));
                    }
                })
            })
            .collect();

        for generation in 1..=50 {
            std::fs::write(&path, format!("a = {generation}\nb = {generation}\n")).unwrap();
            document.load().unwrap();
        }
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(document.root().get_i64("a"), Some(50));
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let dir = TempDir::new().unwrap();
        let document = Arc::new(
            ManagedDocument::setup(options(&dir.path().join("count.toml")).build().unwrap())
                .unwrap(),
        );

        let writers: Vec<_> = (0..8)
            .map(|_| {
                let document = Arc::clone(&document);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        document.update(|root| {
                            let count = root.get_i64("count").unwrap_or(0);
                            root.set("count", count + 1);
                        });
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }
        assert_eq!(document.root().get_i64("count"), Some(800));
    }

    #[test]
    fn test_bind_saves_its_own_defaults_during_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("messages.toml");
        std::fs::write(&path, "[chat]\ngreeting = \"Howdy\"\n").unwrap();
        let document = Arc::new(ManagedDocument::setup(options(&path).build().unwrap()).unwrap());

        let loader = {
            let document = Arc::clone(&document);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    document.load().unwrap();
                }
            })
        };
        let mut messages = Messages::default();
        document.bind(&binder(), &mut messages).unwrap();
        loader.join().unwrap();

        let table: toml::Table = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(table["chat"]["farewell"].as_str(), Some("Bye"));
        assert_eq!(table["max_line"].as_integer(), Some(80));
        document.load().unwrap();
        assert_eq!(document.root().get_str("chat.farewell"), Some("Bye"));
    }

    #[test]
    fn test_bind_with_nothing_to_write_skips_save() {
        struct Motd {
            motd: Option<String>,
        }
        impl Bindable for Motd {
            fn fields(&mut self) -> Vec<Field<'_>> {
                vec![Field::value("motd", &mut self.motd)]
            }
        }

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("motd.toml");
        let document = ManagedDocument::setup(options(&path).build().unwrap()).unwrap();
        let before = document.root();

        for _ in 0..3 {
            let report = document.bind(&binder(), &mut Motd { motd: None }).unwrap();
            assert!(!report.changed());
        }
        assert!(Arc::ptr_eq(&before, &document.root()));
        assert!(!path.exists());
    }

    #[test]
    fn test_store_and_update() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out.json");
        let document = ManagedDocument::setup(options(&path).build().unwrap()).unwrap();

        let mut messages = Messages {
            greeting: "Yo".into(),
            ..Messages::default()
        };
        document.store(&binder(), &mut messages).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["chat"]["greeting"], "Yo");

        let previous = document.update(|root| root.remove("max_line"));
        assert_eq!(previous.and_then(|v| v.as_integer()), Some(80));
        assert!(!document.root().contains("max_line"));
    }
}
