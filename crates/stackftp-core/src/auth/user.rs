use crate::storage::FileSystemView;
use std::{
    fmt::{Debug, Display},
    time::Duration,
};

/// Something the FTP engine wants a user to be allowed to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorizationRequest {
    /// Write access to the given absolute path.
    Write {
        /// The path that will be written to.
        path: String,
    },
    /// One more concurrent login for the same user.
    ConcurrentLogin {
        /// The number of logins the user already has.
        current: u32,
    },
    /// Upload and download rate limits.
    TransferRate,
}

/// A named permission held by a user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Authority {
    /// The name of the permission.
    pub name: String,
}

/// Defines the requirements for holders of user detail: everything the FTP engine asks a logged in
/// user for during a session.
pub trait UserDetail: Send + Sync + Display + Debug {
    /// The file system view this user works in.
    type View: FileSystemView;

    /// The name the user is displayed and logged with.
    fn name(&self) -> &str;

    /// The user's home directory. Defaults to the root of the view.
    fn home(&self) -> &str {
        "/"
    }

    /// Tells if this account is enabled. Defaults to true.
    fn enabled(&self) -> bool {
        true
    }

    /// How long the user's session may stay idle before the engine closes it.
    fn max_idle_time(&self) -> Duration;

    /// The permissions held by this user. Defaults to none.
    fn authorities(&self) -> Vec<Authority> {
        Vec::new()
    }

    /// Decides on an authorization request. Returns the (possibly adjusted) request when it is
    /// granted and `None` when it is refused. The default grants everything.
    fn authorize(&self, request: AuthorizationRequest) -> Option<AuthorizationRequest> {
        Some(request)
    }

    /// Creates a fresh file system view for a new session of this user.
    fn file_system_view(&self) -> Self::View;
}
