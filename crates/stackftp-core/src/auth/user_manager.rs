//! The service provider interface (SPI) for logging users in

use super::UserDetail;
use crate::BoxError;
use async_trait::async_trait;
use std::{
    fmt::{self, Debug, Formatter},
    net::{IpAddr, Ipv4Addr},
};
use thiserror::Error;

/// Defines the requirements for user managers.
///
/// Only [`authenticate`](UserManager::authenticate) is expected to do real work. The other
/// operations exist because FTP engines traditionally ask for them; implementations without a
/// user registry answer them with [`UserManagerError::NotSupported`].
#[async_trait]
pub trait UserManager<User>: Sync + Send + Debug
where
    User: UserDetail,
{
    /// Authenticate the given user with the given credentials.
    async fn authenticate(&self, username: &str, creds: &Credentials) -> Result<User, AuthenticationError>;

    /// Looks up a user by name without authenticating it.
    async fn user_by_name(&self, name: &str) -> Result<User, UserManagerError>;

    /// Returns the names of all known users.
    async fn all_user_names(&self) -> Result<Vec<String>, UserManagerError>;

    /// Tells whether a user with the given name is known.
    async fn does_exist(&self, name: &str) -> Result<bool, UserManagerError>;

    /// Removes the user with the given name.
    async fn delete(&self, name: &str) -> Result<(), UserManagerError>;

    /// Stores the given user.
    async fn save(&self, user: &User) -> Result<(), UserManagerError>;

    /// Returns the name of the administrator account.
    fn admin_name(&self) -> Result<String, UserManagerError>;

    /// Tells whether the given user is an administrator.
    fn is_admin(&self, name: &str) -> Result<bool, UserManagerError>;
}

/// The error type for authentication errors
#[derive(Error, Debug)]
pub enum AuthenticationError {
    /// The login name does not have the `<account>@<host>` form.
    #[error("bad login name, expected <account>@<host>")]
    BadName,

    /// The back-end did not accept the password, or none was given.
    #[error("bad password")]
    BadPassword,

    /// Another issue occurred during the authentication process.
    #[error("authentication error: {0}")]
    ImplPropagated(String, #[source] Option<BoxError>),
}

impl AuthenticationError {
    /// Creates a new domain specific error
    pub fn new(s: impl Into<String>) -> AuthenticationError {
        AuthenticationError::ImplPropagated(s.into(), None)
    }

    /// Creates a new domain specific error with the given source error.
    pub fn with_source<E>(s: impl Into<String>, source: E) -> AuthenticationError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        AuthenticationError::ImplPropagated(s.into(), Some(Box::new(source)))
    }
}

/// The error returned by the user management operations of a [`UserManager`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UserManagerError {
    /// The user manager has no user registry to answer this with.
    #[error("operation not supported: {0}")]
    NotSupported(&'static str),
}

/// Credentials passed to a [`UserManager`].
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// The password that the client sent.
    pub password: Option<String>,
    /// The IP address of the user's connection.
    pub source_ip: IpAddr,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("password", &self.password.as_ref().map(|_| "*****"))
            .field("source_ip", &self.source_ip)
            .finish()
    }
}

impl From<&str> for Credentials {
    fn from(s: &str) -> Self {
        Credentials {
            password: Some(String::from(s)),
            source_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
        }
    }
}
