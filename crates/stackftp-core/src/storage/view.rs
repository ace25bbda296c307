use super::{FtpFile, Result};
use async_trait::async_trait;
use std::fmt::Debug;

/// The per session view on a virtual file system.
#[async_trait]
pub trait FileSystemView: Send + Debug {
    /// The concrete type of the files handed out by this view.
    type File: FtpFile;

    /// Returns the user's home directory.
    async fn home_directory(&self) -> Result<Self::File>;

    /// Returns the current working directory.
    async fn working_directory(&self) -> Result<Self::File>;

    /// Changes the working directory to the given path. Returns false, leaving the working
    /// directory as it was, when the path does not exist or could not be checked.
    async fn change_working_directory(&mut self, dir: &str) -> bool;

    /// Returns the file for the given absolute or relative path.
    async fn file(&self, path: &str) -> Result<Self::File>;

    /// Tells if files can be read or written from an offset. Defaults to false.
    fn is_random_accessible(&self) -> bool {
        false
    }

    /// Releases whatever the view holds on to when the session ends.
    fn dispose(&mut self) {}
}
