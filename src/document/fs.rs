//! File system access for managed documents.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// File operations a [`ManagedDocument`](super::ManagedDocument) needs.
pub trait FileSystem: Send + Sync + fmt::Debug {
    fn exists(&self, path: &Path) -> bool;

    fn create_parent_dirs(&self, path: &Path) -> io::Result<()>;

    /// Copies the default resource `resource` to `dest`.
    ///
    /// Returns `Ok(false)` if no such resource exists.
    fn copy_resource(&self, resource: &str, dest: &Path) -> io::Result<bool>;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// [`FileSystem`] over `std::fs`.
///
/// Default resources come from an in-memory map (checked first) or from a
/// resource directory, where a resource id is a path relative to it.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem {
    resource_dir: Option<PathBuf>,
    embedded: HashMap<String, Cow<'static, [u8]>>,
}

impl LocalFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_resource_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.resource_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Adds an in-memory resource, e.g. from `include_bytes!`.
    #[must_use]
    pub fn with_embedded(
        mut self,
        resource: impl Into<String>,
        contents: impl Into<Cow<'static, [u8]>>,
    ) -> Self {
        self.embedded.insert(resource.into(), contents.into());
        self
    }

    fn resource_bytes(&self, resource: &str) -> io::Result<Option<Cow<'_, [u8]>>> {
        if let Some(bytes) = self.embedded.get(resource) {
            return Ok(Some(Cow::Borrowed(&**bytes)));
        }
        let Some(dir) = &self.resource_dir else {
            return Ok(None);
        };
        match std::fs::read(dir.join(resource)) {
            Ok(bytes) => Ok(Some(Cow::Owned(bytes))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_parent_dirs(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }

    fn copy_resource(&self, resource: &str, dest: &Path) -> io::Result<bool> {
        let Some(bytes) = self.resource_bytes(resource)? else {
            return Ok(false);
        };
        self.create_parent_dirs(dest)?;
        std::fs::write(dest, bytes)?;
        Ok(true)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        std::fs::write(path, contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_embedded_resource() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("lang/en.toml");
        let fs = LocalFileSystem::new().with_embedded("en.toml", &b"greeting = \"hi\"\n"[..]);

        assert!(fs.copy_resource("en.toml", &dest).unwrap());
        assert_eq!(fs.read(&dest).unwrap(), b"greeting = \"hi\"\n");
    }

    #[test]
    fn test_copy_from_resource_dir() {
        let resources = TempDir::new().unwrap();
        std::fs::write(resources.path().join("config.toml"), "a = 1\n").unwrap();
        let target = TempDir::new().unwrap();
        let dest = target.path().join("nested/dir/config.toml");

        let fs = LocalFileSystem::new().with_resource_dir(resources.path());
        assert!(fs.copy_resource("config.toml", &dest).unwrap());
        assert!(fs.exists(&dest));
    }

    #[test]
    fn test_missing_resource() {
        let target = TempDir::new().unwrap();
        let dest = target.path().join("config.toml");
        let fs = LocalFileSystem::new().with_resource_dir(target.path().join("none"));

        assert!(!fs.copy_resource("config.toml", &dest).unwrap());
        assert!(!LocalFileSystem::new().copy_resource("config.toml", &dest).unwrap());
        assert!(!fs.exists(&dest));
    }
}
