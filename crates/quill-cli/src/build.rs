//! `quill build`: render every top-level page of a site.

use std::fs;
use std::path::{Path, PathBuf};

use quill_collector::{CollectError, Collector, FileSystemLoader};
use quill_parser::Value;
use walkdir::WalkDir;

use crate::error::SiteError;

/// Context key holding the output directory as given on the command line.
pub const DESTINATION_URL: &str = "destination_url";

/// Spelling used by older sites, bound to the same value.
pub const LEGACY_DESTINATION_URL: &str = "destionation_url";

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub root: PathBuf,
    /// Output directory, relative to `root` unless absolute.
    pub output: PathBuf,
    pub force: bool,
    /// Optional JSON object merged into every page's context.
    pub context: Option<PathBuf>,
}

impl BuildOptions {
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.output)
    }
}

/// Outcome of a build that got as far as rendering pages.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Files written, in build order.
    pub pages: Vec<PathBuf>,
    /// Pages that failed, with the reason. The rest of the site still builds.
    pub failures: Vec<(String, CollectError)>,
}

/// Build the site described by `options`.
pub fn build_site(options: &BuildOptions) -> Result<BuildReport, SiteError> {
    let root = &options.root;
    if !root.join("index.html").is_file() {
        return Err(SiteError::MissingIndex { root: root.clone() });
    }

    let output = options.output_dir();
    if output.exists() && !options.force {
        return Err(SiteError::OutputExists { path: output });
    }
    fs::create_dir_all(&output).map_err(|e| SiteError::io(&output, e))?;

    let context = page_context(options)?;
    let loader = FileSystemLoader::new(root);
    let mut report = BuildReport::default();

    for page in site_pages(root)? {
        match Collector::new(&loader, &page).assemble_page(&context) {
            Ok(html) => {
                let target = output.join(&page);
                fs::write(&target, html).map_err(|e| SiteError::io(&target, e))?;
                log::info!("Built {}", target.display());
                report.pages.push(target);
            }
            Err(e) => report.failures.push((page, e)),
        }
    }

    copy_tree(&root.join("css"), &output.join("css"))?;
    Ok(report)
}

/// Top-level `*.html` files under `root`, sorted by name.
pub fn site_pages(root: &Path) -> Result<Vec<String>, SiteError> {
    let mut pages = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| SiteError::io(root, e.into()))?;
        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_file() && name.ends_with(".html") {
            pages.push(name.into_owned());
        }
    }
    Ok(pages)
}

/// The context every page renders with: the optional JSON file plus
/// `destination_url` under both spellings.
pub fn page_context(options: &BuildOptions) -> Result<Value, SiteError> {
    let mut context = match &options.context {
        Some(path) => load_context(path)?,
        None => Value::empty_map(),
    };
    if let Value::Map(map) = &mut context {
        let destination = Value::from(options.output.to_string_lossy().into_owned());
        map.insert(LEGACY_DESTINATION_URL.to_string(), destination.clone());
        map.insert(DESTINATION_URL.to_string(), destination);
    }
    Ok(context)
}

/// Read a JSON object to use as page context.
pub fn load_context(path: &Path) -> Result<Value, SiteError> {
    let text = fs::read_to_string(path).map_err(|e| SiteError::io(path, e))?;
    let value: Value = serde_json::from_str(&text).map_err(|e| SiteError::Context {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    match value {
        Value::Map(_) => Ok(value),
        other => Err(SiteError::Context {
            path: path.to_path_buf(),
            message: format!("expected a JSON object, found {}", other.type_name()),
        }),
    }
}

/// Copy a directory tree. A missing source is not an error.
pub fn copy_tree(from: &Path, to: &Path) -> Result<(), SiteError> {
    if !from.is_dir() {
        log::debug!("no {} to copy", from.display());
        return Ok(());
    }
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| SiteError::io(from, e.into()))?;
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| SiteError::io(&target, e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| SiteError::io(&target, e))?;
        }
    }
    Ok(())
}
