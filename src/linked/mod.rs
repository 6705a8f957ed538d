//! Linked documents: one logical document backed by several files, one per
//! key, with the active key picked at each access.

mod error;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

pub use error::LinkError;

use crate::binder::{BindReport, Bindable, Binder};
use crate::document::{DocumentOptions, FileSystem, LocalFileSystem, ManagedDocument};
use crate::provider::ProviderRegistry;
use crate::section::{Section, ToKeyPath, Value};

type Selector = Box<dyn Fn() -> String + Send + Sync>;

/// A set of [`ManagedDocument`]s keyed by identifier, e.g. language code.
///
/// The selector is asked for the active key on every access, so switching
/// it (say, when the active language changes) takes effect immediately.
///
/// ```
/// use std::sync::Arc;
/// use parking_lot::RwLock;
/// use dragon_bind::document::{DocumentOptions, LocalFileSystem, ManagedDocument};
/// use dragon_bind::linked::LinkedDocuments;
/// use dragon_bind::Section;
///
/// let language = Arc::new(RwLock::new("en".to_string()));
/// let selected = Arc::clone(&language);
/// let documents = LinkedDocuments::new(move || selected.read().clone());
///
/// for (key, greeting) in [("en", "Hello"), ("tr", "Merhaba")] {
///     let mut root = Section::new();
///     root.set("greeting", greeting);
///     let options = DocumentOptions::builder(format!("lang/{key}.toml")).build()?;
///     let fs = Arc::new(LocalFileSystem::new());
///     documents.insert(key, ManagedDocument::detached(options, fs, root));
/// }
///
/// assert_eq!(documents.root()?.get_str("greeting"), Some("Hello"));
/// *language.write() = "tr".to_string();
/// assert_eq!(documents.root()?.get_str("greeting"), Some("Merhaba"));
/// # Ok::<(), dragon_bind::Error>(())
/// ```
pub struct LinkedDocuments {
    entries: RwLock<HashMap<String, Arc<ManagedDocument>>>,
    selector: Selector,
    fs: Arc<dyn FileSystem>,
}

impl fmt::Debug for LinkedDocuments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedDocuments")
            .field("keys", &self.keys())
            .finish_non_exhaustive()
    }
}

impl LinkedDocuments {
    /// Creates an empty set using the local file system for `setup`.
    pub fn new(selector: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            selector: Box::new(selector),
            fs: Arc::new(LocalFileSystem::default()),
        }
    }

    /// Uses `fs` for documents created by `setup`.
    #[must_use]
    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// The key the selector currently returns.
    pub fn active_key(&self) -> String {
        (self.selector)()
    }

    /// Loads a document for the active key, replacing any existing entry.
    pub fn setup(&self, options: DocumentOptions) -> Result<Arc<ManagedDocument>, LinkError> {
        let key = self.active_key();
        self.setup_key(key, options)
    }

    /// Loads a document for `key`, replacing any existing entry.
    ///
    /// Other entries are untouched. If loading fails the old entry stays.
    pub fn setup_key(
        &self,
        key: impl Into<String>,
        options: DocumentOptions,
    ) -> Result<Arc<ManagedDocument>, LinkError> {
        let document = Arc::new(ManagedDocument::setup_with(options, Arc::clone(&self.fs))?);
        self.entries.write().insert(key.into(), Arc::clone(&document));
        Ok(document)
    }

    /// Registers an already built document under `key`.
    ///
    /// Returns the document it replaced, if any.
    pub fn insert(
        &self,
        key: impl Into<String>,
        document: ManagedDocument,
    ) -> Option<Arc<ManagedDocument>> {
        self.entries.write().insert(key.into(), Arc::new(document))
    }

    pub fn remove(&self, key: &str) -> Option<Arc<ManagedDocument>> {
        self.entries.write().remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// The document for the active key.
    pub fn resolve(&self) -> Result<Arc<ManagedDocument>, LinkError> {
        let key = self.active_key();
        tracing::debug!(%key, "resolving linked document");
        self.resolve_key(&key)
    }

    pub fn resolve_key(&self, key: &str) -> Result<Arc<ManagedDocument>, LinkError> {
        self.entries
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| LinkError::UnknownKey(key.to_string()))
    }

    /// Snapshot of the active document's root.
    pub fn root(&self) -> Result<Arc<Section>, LinkError> {
        Ok(self.resolve()?.root())
    }

    /// The value at `path` in the active document's root.
    pub fn get(&self, path: impl ToKeyPath) -> Result<Option<Value>, LinkError> {
        Ok(self.root()?.get(path).cloned())
    }

    /// Reads a `T` at `path` from the active document.
    pub fn read<T: 'static>(
        &self,
        registry: &ProviderRegistry,
        path: impl ToKeyPath,
    ) -> Result<Option<T>, LinkError> {
        let root = self.root()?;
        Ok(registry.read::<T>(&root, path))
    }

    /// Binds `target` against the active document.
    pub fn bind(
        &self,
        binder: &Binder,
        target: &mut dyn Bindable,
    ) -> Result<BindReport, LinkError> {
        Ok(self.resolve()?.bind(binder, target)?)
    }

    /// Reloads the active document only.
    pub fn reload(&self) -> Result<(), LinkError> {
        Ok(self.resolve()?.load()?)
    }

    /// Reloads every document, stopping at the first failure.
    pub fn reload_all(&self) -> Result<(), LinkError> {
        // Collect first so no lock is held during file I/O
        let documents: Vec<_> = self.entries.read().values().cloned().collect();
        for document in documents {
            document.load()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::Field;
    use std::path::Path;
    use tempfile::TempDir;

    fn switchable(initial: &str) -> (Arc<RwLock<String>>, LinkedDocuments) {
        let key = Arc::new(RwLock::new(initial.to_string()));
        let selected = Arc::clone(&key);
        (key, LinkedDocuments::new(move || selected.read().clone()))
    }

    fn write_lang(dir: &Path, key: &str, greeting: &str) -> DocumentOptions {
        let path = dir.join(format!("{key}.toml"));
        std::fs::write(&path, format!("greeting = \"{greeting}\"\n")).unwrap();
        DocumentOptions::builder(path).build().unwrap()
    }

    #[test]
    fn test_selector_switches_documents() {
        let dir = TempDir::new().unwrap();
        let (key, documents) = switchable("en");
        documents
            .setup_key("en", write_lang(dir.path(), "en", "Hello"))
            .unwrap();
        documents
            .setup_key("tr", write_lang(dir.path(), "tr", "Merhaba"))
            .unwrap();

        let en = documents.resolve().unwrap();
        assert_eq!(en.root().get_str("greeting"), Some("Hello"));

        *key.write() = "tr".to_string();
        assert_eq!(documents.root().unwrap().get_str("greeting"), Some("Merhaba"));
        assert_eq!(en.root().get_str("greeting"), Some("Hello"));
        assert_eq!(documents.keys(), ["en", "tr"]);
    }

    #[test]
    fn test_unknown_key() {
        let (_, documents) = switchable("de");
        let err = documents.resolve().unwrap_err();
        assert!(matches!(&err, LinkError::UnknownKey(key) if key == "de"));
        assert!(err.to_string().contains("de"));
    }

    #[test]
    fn test_setup_uses_active_key_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let (key, documents) = switchable("en");
        documents.setup(write_lang(dir.path(), "en", "Hello")).unwrap();
        *key.write() = "tr".to_string();
        documents.setup(write_lang(dir.path(), "tr", "Merhaba")).unwrap();
        let tr_before = documents.resolve_key("tr").unwrap();

        *key.write() = "en".to_string();
        documents
            .setup(write_lang(dir.path(), "en-alt", "Hi"))
            .unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents.root().unwrap().get_str("greeting"), Some("Hi"));
        assert!(Arc::ptr_eq(&tr_before, &documents.resolve_key("tr").unwrap()));
    }

    #[test]
    fn test_reload_touches_active_entry_only() {
        let dir = TempDir::new().unwrap();
        let (key, documents) = switchable("en");
        documents
            .setup_key("en", write_lang(dir.path(), "en", "Hello"))
            .unwrap();
        documents
            .setup_key("tr", write_lang(dir.path(), "tr", "Merhaba"))
            .unwrap();

        let held = documents.root().unwrap();
        write_lang(dir.path(), "en", "Hello again");
        write_lang(dir.path(), "tr", "Tekrar merhaba");
        documents.reload().unwrap();

        assert_eq!(held.get_str("greeting"), Some("Hello"));
        assert_eq!(documents.root().unwrap().get_str("greeting"), Some("Hello again"));
        *key.write() = "tr".to_string();
        assert_eq!(documents.root().unwrap().get_str("greeting"), Some("Merhaba"));

        documents.reload_all().unwrap();
        assert_eq!(
            documents.root().unwrap().get_str("greeting"),
            Some("Tekrar merhaba")
        );
    }

    #[test]
    fn test_get_follows_selection() {
        let dir = TempDir::new().unwrap();
        let (key, documents) = switchable("en");
        documents
            .setup_key("en", write_lang(dir.path(), "en", "Hello"))
            .unwrap();
        documents
            .setup_key("tr", write_lang(dir.path(), "tr", "Merhaba"))
            .unwrap();

        assert_eq!(
            documents.get("greeting").unwrap(),
            Some(Value::String("Hello".into()))
        );
        *key.write() = "tr".to_string();
        assert_eq!(
            documents.get("greeting").unwrap(),
            Some(Value::String("Merhaba".into()))
        );
        assert_eq!(documents.get("missing").unwrap(), None);

        *key.write() = "de".to_string();
        assert!(matches!(
            documents.get("greeting"),
            Err(LinkError::UnknownKey(_))
        ));
    }

    struct Lang {
        greeting: String,
        prefix: String,
    }

    impl Bindable for Lang {
        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![
                Field::value("greeting", &mut self.greeting),
                Field::value("prefix", &mut self.prefix),
            ]
        }
    }

    #[test]
    fn test_bind_and_read_follow_selection() {
        let dir = TempDir::new().unwrap();
        let (key, documents) = switchable("en");
        documents
            .setup_key("en", write_lang(dir.path(), "en", "Hello"))
            .unwrap();
        documents
            .setup_key("tr", write_lang(dir.path(), "tr", "Merhaba"))
            .unwrap();
        let registry = Arc::new(ProviderRegistry::with_builtins());
        let binder = Binder::new(Arc::clone(&registry));

        *key.write() = "tr".to_string();
        let mut lang = Lang {
            greeting: String::new(),
            prefix: "[!]".into(),
        };
        let report = documents.bind(&binder, &mut lang).unwrap();
        assert_eq!(lang.greeting, "Merhaba");
        assert_eq!(report.defaults_written, 1);

        let prefix = documents.read::<String>(&registry, "prefix").unwrap();
        assert_eq!(prefix.as_deref(), Some("[!]"));
        *key.write() = "en".to_string();
        assert_eq!(documents.read::<String>(&registry, "prefix").unwrap(), None);
    }
}
