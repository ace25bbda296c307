use crate::{DavEntry, DavError, DavPath, UploadStream, WebdavUser};
use async_trait::async_trait;
use stackftp_core::storage::{FtpFile, Result};
use std::time::SystemTime;
use tokio::io::{AsyncRead, AsyncWrite};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Unresolved,
    Missing,
    File,
    Directory,
}

/// A path in a user's WebDAV tree together with what the back-end said about it.
#[derive(Clone, Debug)]
pub struct WebdavFile {
    path: DavPath,
    state: State,
    size: u64,
    modified: Option<SystemTime>,
    user: WebdavUser,
}

impl WebdavFile {
    /// A file whose existence has not been looked up yet. The root is always an existing
    /// directory.
    pub fn unresolved(path: DavPath, user: WebdavUser) -> Self {
        let state = if path.is_root() { State::Directory } else { State::Unresolved };
        WebdavFile {
            path,
            state,
            size: 0,
            modified: None,
            user,
        }
    }

    /// Looks up `path` on the back-end. Not finding it is not an error; the file will just not
    /// exist.
    pub async fn resolve_new(path: DavPath, user: WebdavUser) -> std::result::Result<Self, DavError> {
        let mut file = Self::unresolved(path, user);
        file.resolve().await?;
        Ok(file)
    }

    /// Builds a file from a listing entry, without asking the back-end. Only the collection
    /// flag decides the kind; an entry without one is a file.
    pub fn from_entry(entry: DavEntry, user: WebdavUser) -> Self {
        let directory = entry.is_directory.unwrap_or(false);
        let path = DavPath::new(&entry.path, directory);
        WebdavFile {
            state: if directory || path.is_root() { State::Directory } else { State::File },
            path,
            size: entry.size,
            modified: entry.modified,
            user,
        }
    }

    /// (Re)reads existence, kind, size and modification time from the back-end.
    #[tracing_attributes::instrument(skip(self), fields(path = %self.path))]
    pub async fn resolve(&mut self) -> std::result::Result<(), DavError> {
        if self.path.is_root() {
            self.state = State::Directory;
            return Ok(());
        }
        let transport = self.user.transport().clone();
        match transport.stat(&self.path.to_string()).await {
            Ok(entry) => {
                let directory = match entry.is_directory {
                    Some(directory) => directory,
                    None => self.has_children().await,
                };
                self.set_kind(if directory { State::Directory } else { State::File });
                self.size = entry.size;
                self.modified = entry.modified;
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                self.state = State::Missing;
                self.size = 0;
                self.modified = None;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    // Used when the back-end does not tell collections from files: something with members is
    // a directory.
    async fn has_children(&self) -> bool {
        let probe = self.path.clone().into_directory().to_string();
        matches!(self.user.transport().list(&probe).await, Ok(children) if !children.is_empty())
    }

    fn set_kind(&mut self, state: State) {
        self.path = if state == State::Directory {
            self.path.clone().into_directory()
        } else {
            self.path.clone().into_file()
        };
        self.state = state;
    }

    /// The path of this file.
    pub fn path(&self) -> &DavPath {
        &self.path
    }

    /// The user this file belongs to.
    pub fn user(&self) -> &WebdavUser {
        &self.user
    }
}

#[async_trait]
impl FtpFile for WebdavFile {
    fn absolute_path(&self) -> String {
        self.path.to_string()
    }

    fn name(&self) -> &str {
        self.path.name()
    }

    fn is_directory(&self) -> bool {
        self.state == State::Directory
    }

    fn is_file(&self) -> bool {
        self.state == State::File
    }

    fn exists(&self) -> bool {
        matches!(self.state, State::File | State::Directory)
    }

    fn is_removable(&self) -> bool {
        self.exists() && !self.path.is_root()
    }

    fn owner_name(&self) -> &str {
        self.user.login_name()
    }

    fn group_name(&self) -> &str {
        self.user.login_name()
    }

    fn last_modified(&self) -> Option<SystemTime> {
        self.modified
    }

    fn size(&self) -> u64 {
        self.size
    }

    #[tracing_attributes::instrument(skip(self), fields(path = %self.path))]
    async fn mkdir(&self) -> bool {
        let path = self.path.clone().into_directory().to_string();
        match self.user.transport().mkdir(&path).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "mkdir failed");
                false
            }
        }
    }

    #[tracing_attributes::instrument(skip(self), fields(path = %self.path))]
    async fn delete(&self) -> bool {
        if self.path.is_root() {
            return false;
        }
        match self.user.transport().delete(&self.path.to_string()).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "delete failed");
                false
            }
        }
    }

    #[tracing_attributes::instrument(skip(self, destination), fields(from = %self.path, to = %destination.path))]
    async fn move_to(&self, destination: &Self) -> bool {
        if self.path.is_root() {
            return false;
        }
        match self.user.transport().move_to(&self.path.to_string(), &destination.path.to_string()).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "move failed");
                false
            }
        }
    }

    #[tracing_attributes::instrument(skip(self), fields(path = %self.path))]
    async fn list_files(&self) -> Option<Vec<Self>> {
        if !self.is_directory() {
            return None;
        }
        match self.user.transport().list(&self.path.to_string()).await {
            Ok(entries) => Some(
                entries
                    .into_iter()
                    .map(|entry| WebdavFile::from_entry(entry, self.user.clone()))
                    .collect(),
            ),
            Err(err) => {
                tracing::warn!(error = %err, "listing failed");
                None
            }
        }
    }

    // Offsets are not supported: uploads always replace the whole file.
    async fn create_output_stream(&self, offset: u64) -> Result<Box<dyn AsyncWrite + Send + Unpin>> {
        if offset > 0 {
            tracing::debug!(path = %self.path, offset, "ignoring upload offset");
        }
        let upload = UploadStream::start(
            self.user.transport().clone(),
            self.path.clone().into_file().to_string(),
            self.user.settings().upload_buffer,
        );
        Ok(Box::new(upload))
    }

    // Downloads always start at the beginning.
    async fn create_input_stream(&self, offset: u64) -> Result<Box<dyn AsyncRead + Send + Sync + Unpin>> {
        if offset > 0 {
            tracing::debug!(path = %self.path, offset, "ignoring download offset");
        }
        Ok(self.user.transport().get(&self.path.to_string()).await?)
    }
}
