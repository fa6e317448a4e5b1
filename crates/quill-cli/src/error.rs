use std::io;
use std::path::PathBuf;

/// Site-level failures: everything around the template engine itself.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("There is already an index.html in {}, use --force to overwrite it", .root.display())]
    SiteExists { root: PathBuf },

    #[error("index.html not found in {}, create a site with `quill new`", .root.display())]
    MissingIndex { root: PathBuf },

    #[error("Output directory {} already exists, use --force to rebuild into it", .path.display())]
    OutputExists { path: PathBuf },

    #[error("Invalid context file {}: {message}", .path.display())]
    Context { path: PathBuf, message: String },
}

impl SiteError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SiteError::Io {
            path: path.into(),
            source,
        }
    }
}
