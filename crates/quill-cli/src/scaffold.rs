//! `quill new`: a starter site.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SiteError;

const INDEX: &str = r#"<!DOCTYPE html>
<html>
{# templates/header.html #}
<body>
  <h1>Welcome!</h1>
  {# templates/nav.html #}
</body>
{# templates/footer.html #}
</html>"#;

const ABOUT: &str = r#"<!DOCTYPE html>
<html>
{# templates/header.html #}
<body>
  <h1>About!</h1>
  {# templates/nav.html #}
</body>
{# templates/footer.html #}
</html>"#;

const HEADER: &str = r#"
<head>
  <title>My new site</title>
  <link rel="stylesheet" href="/css/style.css" />
</head>"#;

const FOOTER: &str = r#"
<footer>
   <p><strong>Just example of footer</strong></p>
   <p>&copy; Your name </p>
</footer>"#;

const NAV: &str = r#"
  <ul>
    <li>
      <a href="/" class="active">Main</a>
    </li>
    <li>
      <a href="/about.html" class="active">About</a>
    </li>
  </ul>"#;

const STYLE: &str = ".active {font-weight:bold;}";

/// Starter files, relative to the site root.
pub const NEW_SITE: &[(&str, &str)] = &[
    ("index.html", INDEX),
    ("about.html", ABOUT),
    ("templates/header.html", HEADER),
    ("templates/footer.html", FOOTER),
    ("templates/nav.html", NAV),
    ("css/style.css", STYLE),
];

/// Write the starter site under `root`, creating directories as needed.
///
/// Refuses to touch a root that already has an `index.html` unless `force`.
pub fn new_site(root: &Path, force: bool) -> Result<Vec<PathBuf>, SiteError> {
    if root.join("index.html").exists() && !force {
        return Err(SiteError::SiteExists {
            root: root.to_path_buf(),
        });
    }

    log::info!("Creating new site in {}", root.display());
    let mut written = Vec::with_capacity(NEW_SITE.len());
    for (name, contents) in NEW_SITE {
        let path = root.join(name);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| SiteError::io(dir, e))?;
        }
        fs::write(&path, contents).map_err(|e| SiteError::io(&path, e))?;
        written.push(path);
    }
    Ok(written)
}
