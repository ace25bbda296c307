//! This crate provides a stackftp [`UserManager`] that logs FTP users in with the credentials of
//! their WebDAV account.
//!
//! The login name carries the server: `alice@cloud.example.org` is checked against
//! `https://cloud.example.org/remote.php/webdav` with the account `alice` and the password the
//! FTP client sent. There is no user registry, so every user management operation other than
//! [`authenticate`](UserManager::authenticate) is answered with
//! [`UserManagerError::NotSupported`].
//!
//! ```no_run
//! use stackftp_auth_webdav::Builder;
//! use stackftp_core::auth::{Credentials, UserManager};
//! use std::time::Duration;
//!
//! # async fn login() -> Result<(), Box<dyn std::error::Error>> {
//! let users = Builder::new().with_idle_timeout(Duration::from_secs(300)).build();
//! let alice = users.authenticate("alice@cloud.example.org", &Credentials::from("secret")).await?;
//! # Ok(())
//! # }
//! ```

mod cache;
pub use cache::CredentialCache;

use async_trait::async_trait;
use stackftp_core::auth::{AuthenticationError, Credentials, UserManager, UserManagerError};
use stackftp_sbe_webdav::{DavClient, DavError, DavTransport, SessionSettings, WebdavUser, split_login};
use std::{fmt, sync::Arc, time::Duration};

/// Creates the back-end connection for a login: called with the account, the host and the
/// password.
pub type TransportFactory = Arc<dyn Fn(&str, &str, &str) -> Result<Arc<dyn DavTransport>, DavError> + Send + Sync>;

/// A [`UserManager`] that authenticates against the WebDAV server named in the login.
///
/// Clones share the credential cache.
#[derive(Clone)]
pub struct WebdavUserManager {
    cache: Arc<CredentialCache>,
    settings: SessionSettings,
    transports: TransportFactory,
}

impl fmt::Debug for WebdavUserManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebdavUserManager")
            .field("cache", &self.cache)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Used to build the [`WebdavUserManager`]
#[derive(Default)]
pub struct Builder {
    settings: SessionSettings,
    transports: Option<TransportFactory>,
    cache: Option<Arc<CredentialCache>>,
}

impl Builder {
    /// Creates a new `Builder` with default settings: a 600 second idle timeout, 64 KiB upload
    /// buffers and HTTPS connections to the host in the login name.
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Sets how long the sessions of the users may stay idle.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.settings.idle_timeout = timeout;
        self
    }

    /// Sets how many bytes an upload may buffer between the FTP client and the WebDAV server.
    pub fn with_upload_buffer(mut self, bytes: usize) -> Self {
        self.settings.upload_buffer = bytes;
        self
    }

    /// Replaces the way back-end connections are made, e.g. to point all users at one server or
    /// to use a [`MemoryTransport`](stackftp_sbe_webdav::MemoryTransport) in tests.
    pub fn with_transport_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&str, &str, &str) -> Result<Arc<dyn DavTransport>, DavError> + Send + Sync + 'static,
    {
        let factory: TransportFactory = Arc::new(factory);
        self.transports = Some(factory);
        self
    }

    /// Uses the given session settings.
    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Uses an existing cache, shared with other user managers.
    pub fn with_cache(mut self, cache: Arc<CredentialCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Creates the user manager.
    pub fn build(self) -> WebdavUserManager {
        WebdavUserManager {
            cache: self.cache.unwrap_or_default(),
            settings: self.settings,
            transports: self.transports.unwrap_or_else(|| Arc::new(https_transport) as TransportFactory),
        }
    }
}

fn https_transport(login: &str, host: &str, password: &str) -> Result<Arc<dyn DavTransport>, DavError> {
    Ok(Arc::new(DavClient::new(host, login, password)?))
}

impl WebdavUserManager {
    /// Creates a user manager with default settings. See [`Builder::new`].
    pub fn new() -> Self {
        Builder::new().build()
    }

    /// The identities logged in so far.
    pub fn cache(&self) -> &Arc<CredentialCache> {
        &self.cache
    }

    /// The settings handed to every user.
    pub fn settings(&self) -> SessionSettings {
        self.settings
    }
}

async fn validated(user: WebdavUser) -> Result<WebdavUser, AuthenticationError> {
    if !user.validate().await {
        tracing::info!(user = %user, "WebDAV server refused the credentials");
        return Err(AuthenticationError::BadPassword);
    }
    Ok(user)
}

impl Default for WebdavUserManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserManager<WebdavUser> for WebdavUserManager {
    #[tracing_attributes::instrument(skip(self, creds))]
    async fn authenticate(&self, username: &str, creds: &Credentials) -> Result<WebdavUser, AuthenticationError> {
        let (login, host) = split_login(username).map_err(|_| AuthenticationError::BadName)?;
        let password = creds.password.as_deref().ok_or(AuthenticationError::BadPassword)?;

        if let Some(user) = self.cache.get(username, password) {
            // Cached or not, the server has the final say
            return validated(user).await;
        }

        let transport = (self.transports)(login, host, password)
            .map_err(|e| AuthenticationError::with_source("could not connect to the WebDAV server", e))?;
        let user = validated(WebdavUser::new(login, host, password, transport, self.settings)).await?;
        Ok(self.cache.insert(username, password, user))
    }

    async fn user_by_name(&self, _name: &str) -> Result<WebdavUser, UserManagerError> {
        Err(UserManagerError::NotSupported("user lookup"))
    }

    async fn all_user_names(&self) -> Result<Vec<String>, UserManagerError> {
        Err(UserManagerError::NotSupported("listing users"))
    }

    async fn does_exist(&self, _name: &str) -> Result<bool, UserManagerError> {
        Err(UserManagerError::NotSupported("user existence check"))
    }

    async fn delete(&self, _name: &str) -> Result<(), UserManagerError> {
        Err(UserManagerError::NotSupported("deleting users"))
    }

    async fn save(&self, _user: &WebdavUser) -> Result<(), UserManagerError> {
        Err(UserManagerError::NotSupported("saving users"))
    }

    fn admin_name(&self) -> Result<String, UserManagerError> {
        Err(UserManagerError::NotSupported("admin name"))
    }

    fn is_admin(&self, _name: &str) -> Result<bool, UserManagerError> {
        Err(UserManagerError::NotSupported("admin check"))
    }
}
