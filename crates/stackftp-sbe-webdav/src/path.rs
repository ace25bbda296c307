use normalize_path::NormalizePath;
use path_slash::PathBufExt;
use std::{fmt, path::Path};

/// An absolute, normalized path in a user's WebDAV tree that knows whether it names a directory.
///
/// The rendered form ends in `/` exactly when the path is a directory; the root renders as `/`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DavPath {
    // Starts with '/', never ends with '/' unless it is the root
    path: String,
    directory: bool,
}

impl DavPath {
    /// The root of the tree.
    pub fn root() -> Self {
        DavPath {
            path: "/".to_string(),
            directory: true,
        }
    }

    /// Resolves `input` the way an FTP client means it: relative to `self` unless it starts with
    /// `/`. `.`, `..` and repeated separators are normalized away and `..` never climbs above the
    /// root. The result is a directory when `input` ends in `/`.
    pub fn resolve(&self, input: &str) -> DavPath {
        let joined = if input.starts_with('/') {
            input.to_string()
        } else {
            format!("{}/{}", self.path, input)
        };
        DavPath::new(&joined, input.ends_with('/'))
    }

    /// Normalizes an absolute path whose kind is known from elsewhere, e.g. a listing.
    pub fn new(absolute: &str, directory: bool) -> DavPath {
        let normalized = Path::new(absolute).normalize();
        let slashed = normalized.to_slash_lossy();
        let trimmed = slashed.trim_end_matches('/');
        if trimmed.is_empty() {
            return DavPath::root();
        }
        let path = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        };
        DavPath { path, directory }
    }

    /// The same path, marked as a directory.
    pub fn into_directory(self) -> DavPath {
        DavPath { directory: true, ..self }
    }

    /// The same path, marked as a file. The root stays a directory.
    pub fn into_file(self) -> DavPath {
        if self.is_root() { self } else { DavPath { directory: false, ..self } }
    }

    /// True for `/`.
    pub fn is_root(&self) -> bool {
        self.path == "/"
    }

    /// True when the path names a directory.
    pub fn is_directory(&self) -> bool {
        self.directory
    }

    /// The last segment. Empty for the root.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("")
    }
}

impl fmt::Display for DavPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.directory && !self.is_root() {
            write!(f, "{}/", self.path)
        } else {
            f.write_str(&self.path)
        }
    }
}
