use crate::{DavTransport, WebdavFileSystemView, uri::DavUri};
use stackftp_core::auth::UserDetail;
use std::{fmt, sync::Arc, time::Duration};
use thiserror::Error;

/// How long a session may stay idle when nothing else is configured.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// How many bytes an upload buffers between the FTP client and the HTTP request when nothing
/// else is configured.
pub const DEFAULT_UPLOAD_BUFFER: usize = 64 * 1024;

/// Returned when an FTP login name does not name an account on a host.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("login name {0:?} is not of the form <account>@<host>")]
pub struct LoginNameError(pub String);

/// Splits an FTP login name such as `alice@cloud.example.org` into the account (`alice`) and the
/// host of its WebDAV server (`cloud.example.org`). The split is on the last `@`, so accounts
/// may contain `@` themselves.
pub fn split_login(username: &str) -> Result<(&str, &str), LoginNameError> {
    match username.rfind('@') {
        Some(at) if at > 0 && at + 1 < username.len() => Ok((&username[..at], &username[at + 1..])),
        _ => Err(LoginNameError(username.to_string())),
    }
}

/// Per session settings that come from configuration rather than from the login.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSettings {
    /// See [`UserDetail::max_idle_time`].
    pub idle_timeout: Duration,
    /// The capacity of the buffer behind each upload stream.
    pub upload_buffer: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            upload_buffer: DEFAULT_UPLOAD_BUFFER,
        }
    }
}

/// A logged in WebDAV account. Clones share the transport.
#[derive(Clone)]
pub struct WebdavUser {
    login: String,
    host: String,
    password: String,
    settings: SessionSettings,
    transport: Arc<dyn DavTransport>,
}

impl WebdavUser {
    /// Creates the user `login` on `host`, talking to the server through `transport`.
    pub fn new(login: &str, host: &str, password: &str, transport: Arc<dyn DavTransport>, settings: SessionSettings) -> Self {
        WebdavUser {
            login: login.to_string(),
            host: host.to_string(),
            password: password.to_string(),
            settings,
            transport,
        }
    }

    /// The account name, used for display and as the WebDAV user.
    pub fn login_name(&self) -> &str {
        &self.login
    }

    /// The host serving this account.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The WebDAV root URL of this account.
    pub fn base_url(&self) -> String {
        DavUri::for_host(&self.host).base_url().to_string()
    }

    /// Tells whether `password` is the one this user was created with.
    pub fn has_password(&self, password: &str) -> bool {
        self.password == password
    }

    /// The settings this user's sessions run with.
    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    /// The connection to the back-end.
    pub fn transport(&self) -> &Arc<dyn DavTransport> {
        &self.transport
    }

    /// Asks the back-end whether it (still) accepts this user's credentials.
    pub async fn validate(&self) -> bool {
        self.transport.exists("/").await
    }
}

impl fmt::Display for WebdavUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.login, self.host)
    }
}

impl fmt::Debug for WebdavUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebdavUser")
            .field("login", &self.login)
            .field("host", &self.host)
            .field("password", &"********")
            .field("settings", &self.settings)
            .field("transport", &self.transport)
            .finish()
    }
}

impl UserDetail for WebdavUser {
    type View = WebdavFileSystemView;

    fn name(&self) -> &str {
        &self.login
    }

    fn max_idle_time(&self) -> Duration {
        self.settings.idle_timeout
    }

    fn file_system_view(&self) -> WebdavFileSystemView {
        WebdavFileSystemView::new(self.clone())
    }
}
