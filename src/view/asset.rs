use std::path::{Component, Path, PathBuf};

/// A file to be streamed to the client as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    pub path: PathBuf,
    pub content_type: String,
}

impl AssetDescriptor {
    /// Describe `path`, guessing the content type from its extension
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let content_type = content_type(&path).to_string();
        Self { path, content_type }
    }
}

/// Content type for a file extension (case-insensitive).
#[must_use]
pub fn content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
        .as_str()
    {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "txt" => "text/plain",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}

/// Map a URL-relative path below `base`, refusing `..`, roots and prefixes.
pub(crate) fn map_below(base: &Path, url_path: &str) -> Option<PathBuf> {
    if url_path.contains('\\') {
        return None;
    }
    let mut pb = base.to_path_buf();
    for comp in Path::new(url_path.trim_start_matches('/')).components() {
        match comp {
            Component::Normal(s) => pb.push(s),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(pb)
}

/// Directory of static files that asset-serving controllers resolve against.
#[derive(Debug, Clone)]
pub struct AssetDirectory {
    base_dir: PathBuf,
}

impl AssetDirectory {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            base_dir: base.into(),
        }
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Existing regular file for `url_path`, or `None`
    #[must_use]
    pub fn resolve(&self, url_path: &str) -> Option<AssetDescriptor> {
        let path = map_below(&self.base_dir, url_path)?;
        if path.is_file() {
            Some(AssetDescriptor::new(path))
        } else {
            None
        }
    }
}
