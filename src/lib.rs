//! StackFtp lets an FTP server front WebDAV document stores. Each FTP user logs in as
//! `account@host` with the password of that WebDAV account, and browses, downloads and uploads
//! files in it as if they were local.
//!
//! The [`StackFtp`] type ties the pieces together: it authenticates logins through a
//! [`WebdavUserManager`] and creates the [`WebdavFileSystemView`] every session works in.
//!
//! ```no_run
//! use stackftp::{Options, StackFtp};
//! use stackftp::core::auth::Credentials;
//!
//! # async fn session() -> Result<(), Box<dyn std::error::Error>> {
//! let ftp = StackFtp::new(Options::from_env()?)?;
//! let alice = ftp.authenticate("alice@cloud.example.org", &Credentials::from("secret")).await?;
//! let view = ftp.create_file_system_view(&alice);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod options;

pub use options::{ConfigError, Options};
pub use stackftp_auth_webdav as auth;
pub use stackftp_auth_webdav::{Builder, CredentialCache, WebdavUserManager};
pub use stackftp_core as core;
pub use stackftp_sbe_webdav as webdav;
pub use stackftp_sbe_webdav::{WebdavFile, WebdavFileSystemView, WebdavUser};

use async_trait::async_trait;
use slog::Drain;
use stackftp_core::auth::{AuthenticationError, Credentials, UserManager, UserManagerError};
use std::fmt::{self, Debug, Formatter};

/// Authenticates FTP logins against WebDAV and hands out the file system view of each session.
///
/// It is itself a [`UserManager`], so it can be given to an FTP engine directly.
#[derive(Clone)]
pub struct StackFtp {
    options: Options,
    users: WebdavUserManager,
    logger: slog::Logger,
}

impl Debug for StackFtp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackFtp")
            .field("options", &self.options)
            .field("users", &self.users)
            .finish_non_exhaustive()
    }
}

impl StackFtp {
    /// Creates the front with a user manager built from `options`, logging through the `log`
    /// crate.
    pub fn new(options: Options) -> Result<Self, ConfigError> {
        let users = Builder::new().with_settings(options.session_settings()).build();
        Self::with_user_manager(options, users)
    }

    /// Creates the front around an existing user manager.
    pub fn with_user_manager(options: Options, users: WebdavUserManager) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(StackFtp {
            options,
            users,
            logger: slog::Logger::root(slog_stdlog::StdLog {}.fuse(), slog::o!()),
        })
    }

    /// Sets the structured logger to use. `None` keeps the current one.
    pub fn logger<L: Into<Option<slog::Logger>>>(mut self, logger: L) -> Self {
        if let Some(logger) = logger.into() {
            self.logger = logger.new(slog::o!("component" => "stackftp"));
        }
        self
    }

    /// The options in effect.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The user manager logins go through.
    pub fn user_manager(&self) -> &WebdavUserManager {
        &self.users
    }

    /// Logs `username` in, which has the form `account@host`.
    pub async fn authenticate(&self, username: &str, creds: &Credentials) -> Result<WebdavUser, AuthenticationError> {
        match self.users.authenticate(username, creds).await {
            Ok(user) => {
                slog::info!(self.logger, "User logged in"; "username" => username, "source" => %creds.source_ip);
                Ok(user)
            }
            Err(err) => {
                slog::warn!(
                    self.logger,
                    "Login refused";
                    "username" => username,
                    "source" => %creds.source_ip,
                    "reason" => %err
                );
                Err(err)
            }
        }
    }

    /// The file system a session of `user` works in. It starts in the root of the account.
    pub fn create_file_system_view(&self, user: &WebdavUser) -> WebdavFileSystemView {
        slog::debug!(self.logger, "Opening file system"; "user" => %user, "base_url" => user.base_url());
        WebdavFileSystemView::new(user.clone())
    }
}

#[async_trait]
impl UserManager<WebdavUser> for StackFtp {
    async fn authenticate(&self, username: &str, creds: &Credentials) -> Result<WebdavUser, AuthenticationError> {
        StackFtp::authenticate(self, username, creds).await
    }

    async fn user_by_name(&self, name: &str) -> Result<WebdavUser, UserManagerError> {
        self.users.user_by_name(name).await
    }

    async fn all_user_names(&self) -> Result<Vec<String>, UserManagerError> {
        self.users.all_user_names().await
    }

    async fn does_exist(&self, name: &str) -> Result<bool, UserManagerError> {
        self.users.does_exist(name).await
    }

    async fn delete(&self, name: &str) -> Result<(), UserManagerError> {
        self.users.delete(name).await
    }

    async fn save(&self, user: &WebdavUser) -> Result<(), UserManagerError> {
        self.users.save(user).await
    }

    fn admin_name(&self) -> Result<String, UserManagerError> {
        self.users.admin_name()
    }

    fn is_admin(&self, name: &str) -> Result<bool, UserManagerError> {
        self.users.is_admin(name)
    }
}
