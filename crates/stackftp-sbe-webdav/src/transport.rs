use crate::DavError;
use async_trait::async_trait;
use std::{fmt::Debug, time::SystemTime};
use tokio::io::AsyncRead;

/// What the back-end reports about a single resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DavEntry {
    /// Absolute, decoded path below the WebDAV root. Collections end in `/`.
    pub path: String,
    /// Whether the resource is a collection. `None` if the back-end did not say.
    pub is_directory: Option<bool>,
    /// Content length in bytes, 0 when not reported.
    pub size: u64,
    /// Last modification time, if reported and readable.
    pub modified: Option<SystemTime>,
}

/// The WebDAV operations the file system is built on. Every path is absolute and rendered with a
/// trailing `/` for directories.
#[async_trait]
pub trait DavTransport: Send + Sync + Debug {
    /// Tells whether something exists at `path`. Any failure counts as "no".
    async fn exists(&self, path: &str) -> bool;

    /// The properties of the resource at `path` itself.
    async fn stat(&self, path: &str) -> Result<DavEntry, DavError>;

    /// The members of the collection at `path`, without the collection itself.
    async fn list(&self, path: &str) -> Result<Vec<DavEntry>, DavError>;

    /// Starts downloading the file at `path`.
    async fn get(&self, path: &str) -> Result<Box<dyn AsyncRead + Send + Sync + Unpin>, DavError>;

    /// Stores everything `body` yields until its end as the file at `path`.
    async fn put(&self, path: &str, body: Box<dyn AsyncRead + Send + Sync + Unpin>) -> Result<(), DavError>;

    /// Creates a collection.
    async fn mkdir(&self, path: &str) -> Result<(), DavError>;

    /// Deletes a file, or a collection with everything in it.
    async fn delete(&self, path: &str) -> Result<(), DavError>;

    /// Moves `from` to `to`, replacing whatever is at `to`.
    async fn move_to(&self, from: &str, to: &str) -> Result<(), DavError>;
}
