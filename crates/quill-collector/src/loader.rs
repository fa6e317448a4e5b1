//! Page sources.
//!
//! The collector reads every page, parent and include through a [`Loader`],
//! so the same resolution logic runs over a site directory or an in-memory
//! map of files.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::CollectError;

/// Reads page sources by root-relative path.
pub trait Loader {
    fn load(&self, path: &str) -> Result<String, CollectError>;
}

impl<L: Loader + ?Sized> Loader for &L {
    fn load(&self, path: &str) -> Result<String, CollectError> {
        (**self).load(path)
    }
}

/// Canonical form of a page path as written in a marker.
///
/// Surrounding quotes and whitespace go, as do leading `/` and `./`, so
/// `"/index.html"` and `index.html` name the same page.
pub fn normalize(path: &str) -> String {
    let mut path = path.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    loop {
        if let Some(rest) = path.strip_prefix("./") {
            path = rest;
        } else if let Some(rest) = path.strip_prefix('/') {
            path = rest;
        } else {
            return path.to_string();
        }
    }
}

/// Loads pages from a directory on disk.
#[derive(Debug, Clone)]
pub struct FileSystemLoader {
    root: PathBuf,
}

impl FileSystemLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Loader for FileSystemLoader {
    fn load(&self, path: &str) -> Result<String, CollectError> {
        let path = normalize(path);
        let file = self.root.join(&path);
        log::debug!("loading {}", file.display());
        fs::read_to_string(&file).map_err(|e| CollectError::Missing {
            path,
            message: e.to_string(),
        })
    }
}

/// Loads pages from memory. Mostly useful in tests and embedders.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, builder style.
    pub fn with(mut self, path: &str, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }

    pub fn insert(&mut self, path: &str, source: impl Into<String>) {
        self.files.insert(normalize(path), source.into());
    }
}

impl Loader for MemoryLoader {
    fn load(&self, path: &str) -> Result<String, CollectError> {
        let path = normalize(path);
        self.files
            .get(&path)
            .cloned()
            .ok_or_else(|| CollectError::Missing {
                path,
                message: "no such file".to_string(),
            })
    }
}
