use crate::{DavPath, WebdavFile, WebdavUser};
use async_trait::async_trait;
use stackftp_core::storage::{FileSystemView, Result};

/// One session's window on a user's WebDAV tree. The only thing it keeps is the working
/// directory.
#[derive(Debug)]
pub struct WebdavFileSystemView {
    user: WebdavUser,
    // Always a directory
    cwd: DavPath,
}

impl WebdavFileSystemView {
    /// Creates a view for `user`, starting in the root.
    pub fn new(user: WebdavUser) -> Self {
        WebdavFileSystemView { user, cwd: DavPath::root() }
    }

    /// Turns a path the client sent into an absolute one. A trailing `/` is kept.
    pub fn resolve(&self, path: &str) -> DavPath {
        self.cwd.resolve(path)
    }

    /// The current working directory, without asking the back-end about it.
    pub fn current_dir(&self) -> &DavPath {
        &self.cwd
    }

    /// The user this view belongs to.
    pub fn user(&self) -> &WebdavUser {
        &self.user
    }

    /// Lists the directory at `path`. Fails if the back-end cannot list it.
    #[tracing_attributes::instrument(skip(self))]
    pub async fn list(&self, path: &str) -> Result<Vec<WebdavFile>> {
        let dir = self.resolve(path).into_directory();
        let entries = self.user.transport().list(&dir.to_string()).await?;
        Ok(entries
            .into_iter()
            .map(|entry| WebdavFile::from_entry(entry, self.user.clone()))
            .collect())
    }
}

#[async_trait]
impl FileSystemView for WebdavFileSystemView {
    type File = WebdavFile;

    async fn home_directory(&self) -> Result<WebdavFile> {
        Ok(WebdavFile::unresolved(DavPath::root(), self.user.clone()))
    }

    async fn working_directory(&self) -> Result<WebdavFile> {
        Ok(WebdavFile::resolve_new(self.cwd.clone(), self.user.clone()).await?)
    }

    #[tracing_attributes::instrument(skip(self), fields(user = %self.user))]
    async fn change_working_directory(&mut self, dir: &str) -> bool {
        let target = self.resolve(dir).into_directory();
        if !target.is_root() && !self.user.transport().exists(&target.to_string()).await {
            tracing::debug!(target = %target, "no such directory");
            return false;
        }
        self.cwd = target;
        true
    }

    async fn file(&self, path: &str) -> Result<WebdavFile> {
        Ok(WebdavFile::resolve_new(self.resolve(path), self.user.clone()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryTransport, SessionSettings};
    use pretty_assertions::assert_eq;
    use stackftp_core::storage::{ErrorKind, FtpFile};
    use std::sync::Arc;

    fn view(dav: &Arc<MemoryTransport>) -> WebdavFileSystemView {
        WebdavFileSystemView::new(WebdavUser::new("alice", "storage.example", "secret", dav.clone(), SessionSettings::default()))
    }

    #[tokio::test]
    async fn starts_at_root() {
        let dav = Arc::new(MemoryTransport::new());
        let view = view(&dav);
        assert_eq!(view.current_dir().to_string(), "/");
        let home = view.home_directory().await.unwrap();
        assert!(home.is_directory());
        assert_eq!(home.absolute_path(), "/");
        assert_eq!(dav.calls(), 0);
    }

    #[tokio::test]
    async fn changes_into_existing_directories() {
        let dav = Arc::new(MemoryTransport::new().with_directory("/docs/sub"));
        let mut view = view(&dav);

        assert!(view.change_working_directory("docs").await);
        assert_eq!(view.current_dir().to_string(), "/docs/");
        assert!(view.change_working_directory("sub/").await);
        assert_eq!(view.current_dir().to_string(), "/docs/sub/");
        assert!(view.change_working_directory("..").await);
        assert_eq!(view.current_dir().to_string(), "/docs/");
        assert_eq!(view.working_directory().await.unwrap().absolute_path(), "/docs/");

        let calls = dav.calls();
        assert!(view.change_working_directory("/").await);
        assert!(view.change_working_directory("../..").await);
        assert_eq!(view.current_dir().to_string(), "/");
        assert_eq!(dav.calls(), calls);
    }

    #[tokio::test]
    async fn failed_change_keeps_directory() {
        let dav = Arc::new(MemoryTransport::new().with_directory("/docs"));
        let mut view = view(&dav);
        assert!(view.change_working_directory("/docs/").await);

        assert!(!view.change_working_directory("missing").await);
        assert_eq!(view.current_dir().to_string(), "/docs/");

        // A failing back-end looks the same as a missing directory
        dav.set_rejecting(true);
        assert!(!view.change_working_directory("/docs/").await);
        assert_eq!(view.current_dir().to_string(), "/docs/");
    }

    #[tokio::test]
    async fn resolves_against_working_directory() {
        let dav = Arc::new(MemoryTransport::new().with_file("/docs/a.txt", "abc"));
        let mut view = view(&dav);
        assert!(view.change_working_directory("/docs").await);

        assert_eq!(view.resolve("a.txt").to_string(), "/docs/a.txt");
        assert_eq!(view.resolve("../x/").to_string(), "/x/");
        let file = view.file("a.txt").await.unwrap();
        assert!(file.is_file());
        assert_eq!(file.size(), 3);
        assert!(!view.file("b.txt").await.unwrap().exists());
    }

    #[tokio::test]
    async fn lists_and_surfaces_failures() {
        let dav = Arc::new(MemoryTransport::new().with_file("/docs/a.txt", "abc"));
        let view = view(&dav);
        let names: Vec<String> = view.list("docs").await.unwrap().iter().map(|f| f.absolute_path()).collect();
        assert_eq!(names, vec!["/docs/a.txt".to_string()]);

        assert_eq!(view.list("/nope").await.unwrap_err().kind(), ErrorKind::PermanentFileNotAvailable);
        dav.set_rejecting(true);
        assert_eq!(view.file("/docs/a.txt").await.unwrap_err().kind(), ErrorKind::PermissionDenied);
        assert!(!view.is_random_accessible());
    }
}
