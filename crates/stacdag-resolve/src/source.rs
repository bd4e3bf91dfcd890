//! Where catalog documents come from.
//!
//! The resolver only needs two capabilities: listing a directory and reading
//! a file. [`FsCatalogSource`] serves them from the local filesystem,
//! [`MemoryCatalog`] from an in-memory tree.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

/// Kind of a directory entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Directory,
    File,
    /// Symlinks, sockets, devices: never followed, never read.
    Other,
}

/// One entry of a directory listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl SourceEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Directory lister and file reader.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// List the entries of `directory`. Order is not significant.
    async fn list(&self, directory: &Path) -> io::Result<Vec<SourceEntry>>;

    /// Read the bytes of the file at `path`.
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Catalog source backed by the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsCatalogSource;

#[async_trait]
impl CatalogSource for FsCatalogSource {
    async fn list(&self, directory: &Path) -> io::Result<Vec<SourceEntry>> {
        let mut reader = tokio::fs::read_dir(directory).await?;
        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            // Does not follow symlinks.
            let file_type = entry.file_type().await?;
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                EntryKind::Other
            };
            let name = entry.file_name().into_string().map_err(|raw| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("non UTF-8 file name: {}", raw.to_string_lossy()),
                )
            })?;
            entries.push(SourceEntry { name, kind });
        }
        Ok(entries)
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }
}

/// In-memory catalog tree.
///
/// Files are registered under relative paths; every ancestor of a file is
/// an implicit directory. Empty directories can be added explicitly.
#[derive(Clone, Debug, Default)]
pub struct MemoryCatalog {
    files: BTreeMap<PathBuf, Vec<u8>>,
    directories: BTreeSet<PathBuf>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a file, creating its ancestor directories.
    pub fn add_file(&mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> &mut Self {
        let path = clean(path.as_ref());
        let mut ancestor = path.parent();
        while let Some(dir) = ancestor {
            self.directories.insert(dir.to_path_buf());
            ancestor = dir.parent();
        }
        self.files.insert(path, contents.into());
        self
    }

    /// Add a JSON document.
    pub fn add_json(&mut self, path: impl AsRef<Path>, value: &serde_json::Value) -> &mut Self {
        self.add_file(path, value.to_string())
    }

    /// Add a directory (and its ancestors).
    pub fn add_dir(&mut self, path: impl AsRef<Path>) -> &mut Self {
        let mut current = Some(clean(path.as_ref()));
        while let Some(dir) = current {
            current = dir.parent().map(Path::to_path_buf);
            self.directories.insert(dir);
        }
        self
    }
}

#[async_trait]
impl CatalogSource for MemoryCatalog {
    async fn list(&self, directory: &Path) -> io::Result<Vec<SourceEntry>> {
        let directory = clean(directory);
        if !self.directories.contains(&directory) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", directory.display()),
            ));
        }

        let children = |path: &PathBuf| {
            (path.parent() == Some(directory.as_path()) && *path != directory)
                .then(|| path.file_name())
                .flatten()
                .map(|name| name.to_string_lossy().into_owned())
        };

        let mut entries: Vec<SourceEntry> = self
            .directories
            .iter()
            .filter_map(|dir| children(dir).map(|name| SourceEntry::new(name, EntryKind::Directory)))
            .collect();
        entries.extend(
            self.files
                .keys()
                .filter_map(|file| children(file).map(|name| SourceEntry::new(name, EntryKind::File))),
        );
        Ok(entries)
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files.get(&clean(path)).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }
}

/// Drop `.` components so `./a/b` and `a/b` name the same entry.
fn clean(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
