//! `quill build --watch`: poll the source tree and rebuild on change.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime};

use walkdir::WalkDir;

/// Polls file modification times under a root directory.
pub struct Watcher {
    root: PathBuf,
    /// Subtrees never watched, typically the build output.
    ignore: Vec<PathBuf>,
    stamps: BTreeMap<PathBuf, SystemTime>,
}

impl Watcher {
    /// Start watching. The current state of the tree is the baseline.
    pub fn new(root: impl Into<PathBuf>, ignore: Vec<PathBuf>) -> Self {
        let mut watcher = Self {
            root: root.into(),
            ignore,
            stamps: BTreeMap::new(),
        };
        watcher.stamps = watcher.snapshot();
        watcher
    }

    /// Number of files being tracked.
    pub fn tracked(&self) -> usize {
        self.stamps.len()
    }

    /// Re-read the tree. True when any file was added, removed or modified
    /// since the previous scan.
    pub fn scan(&mut self) -> bool {
        let current = self.snapshot();
        if current == self.stamps {
            return false;
        }
        for (path, stamp) in &current {
            if self.stamps.get(path) != Some(stamp) {
                log::info!("File changed: {}", path.display());
            }
        }
        for path in self.stamps.keys().filter(|p| !current.contains_key(*p)) {
            log::info!("File removed: {}", path.display());
        }
        self.stamps = current;
        true
    }

    /// Poll forever, calling `on_change` after every scan that saw a change.
    /// Rebuilds run on this thread, one at a time.
    pub fn run(&mut self, interval: Duration, mut on_change: impl FnMut()) {
        loop {
            thread::sleep(interval);
            if self.scan() {
                on_change();
            }
        }
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.ignore.iter().any(|ignored| path.starts_with(ignored))
    }

    fn snapshot(&self) -> BTreeMap<PathBuf, SystemTime> {
        WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|entry| !self.is_ignored(entry.path()))
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                // Files can vanish between listing and stat; skip them this round.
                let modified = entry.metadata().ok()?.modified().ok()?;
                Some((entry.into_path(), modified))
            })
            .collect()
    }
}
