use super::Result;
use async_trait::async_trait;
use std::{fmt::Debug, time::SystemTime};
use tokio::io::{AsyncRead, AsyncWrite};

/// A file or directory as seen by the FTP engine.
#[async_trait]
pub trait FtpFile: Send + Sync + Debug + Sized {
    /// The absolute path of this file. Directories end in `/`, except for the root which is `/`.
    fn absolute_path(&self) -> String;

    /// The last segment of the path. Empty for the root.
    fn name(&self) -> &str;

    /// Tells whether the file should be left out of listings. Defaults to false.
    fn is_hidden(&self) -> bool {
        false
    }

    /// Returns true if the path is an existing directory.
    fn is_directory(&self) -> bool;

    /// Returns true if the path is an existing file.
    fn is_file(&self) -> bool;

    /// Returns true if the path exists.
    fn exists(&self) -> bool;

    /// Defaults to true.
    fn is_readable(&self) -> bool {
        true
    }

    /// Defaults to true.
    fn is_writable(&self) -> bool {
        true
    }

    /// Tells whether [`delete`](FtpFile::delete) may be attempted.
    fn is_removable(&self) -> bool;

    /// The name shown as the owner in listings.
    fn owner_name(&self) -> &str;

    /// The name shown as the group in listings.
    fn group_name(&self) -> &str;

    /// Returns the number of links to the file. Three for a directory and one otherwise, the way
    /// `ls -l` shows a directory without subdirectories.
    fn link_count(&self) -> u32 {
        if self.is_directory() { 3 } else { 1 }
    }

    /// Returns the last modified time, when known.
    fn last_modified(&self) -> Option<SystemTime>;

    /// Changes the last modified time. Returns whether that succeeded; the default refuses.
    fn set_last_modified(&mut self, _time: SystemTime) -> bool {
        false
    }

    /// Returns the length (size) of the file in bytes.
    fn size(&self) -> u64;

    /// Creates this path as a directory.
    async fn mkdir(&self) -> bool;

    /// Deletes this file or directory.
    async fn delete(&self) -> bool;

    /// Moves this file to the path of `destination`.
    async fn move_to(&self, destination: &Self) -> bool;

    /// Lists the children of a directory. `None` when this is not a listable directory.
    async fn list_files(&self) -> Option<Vec<Self>>;

    /// Opens a stream that (over)writes this file. The transfer is only complete once the
    /// returned writer has been shut down successfully.
    async fn create_output_stream(&self, offset: u64) -> Result<Box<dyn AsyncWrite + Send + Unpin>>;

    /// Opens a stream that reads this file.
    async fn create_input_stream(&self, offset: u64) -> Result<Box<dyn AsyncRead + Send + Sync + Unpin>>;
}
