//! Contains the [`UserManager`] and [`UserDetail`] traits an FTP engine uses to log users in.
//!
//! There is no user registry behind these traits: a [`UserManager`] turns the raw credentials sent
//! with `USER`/`PASS` into a [`UserDetail`], and that user hands out the
//! [`FileSystemView`](crate::storage::FileSystemView) for the session. For example, a user manager
//! that lets everybody in with a fixed idle timeout:
//!
//! ```no_run
//! use async_trait::async_trait;
//! use stackftp_core::auth::{AuthenticationError, Credentials, UserDetail, UserManager, UserManagerError};
//! # use stackftp_core::storage::{FileSystemView, FtpFile};
//! use std::time::Duration;
//!
//! #[derive(Debug)]
//! struct Everybody;
//!
//! #[derive(Debug)]
//! struct Guest(String);
//!
//! impl std::fmt::Display for Guest {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "guest {}", self.0)
//!     }
//! }
//! # #[derive(Debug)]
//! # struct NoView;
//! # #[derive(Debug)]
//! # struct NoFile;
//! # #[async_trait]
//! # impl FtpFile for NoFile {
//! #     fn absolute_path(&self) -> String { unimplemented!() }
//! #     fn name(&self) -> &str { unimplemented!() }
//! #     fn is_directory(&self) -> bool { unimplemented!() }
//! #     fn is_file(&self) -> bool { unimplemented!() }
//! #     fn exists(&self) -> bool { unimplemented!() }
//! #     fn is_removable(&self) -> bool { unimplemented!() }
//! #     fn owner_name(&self) -> &str { unimplemented!() }
//! #     fn group_name(&self) -> &str { unimplemented!() }
//! #     fn last_modified(&self) -> Option<std::time::SystemTime> { unimplemented!() }
//! #     fn size(&self) -> u64 { unimplemented!() }
//! #     async fn mkdir(&self) -> bool { unimplemented!() }
//! #     async fn delete(&self) -> bool { unimplemented!() }
//! #     async fn move_to(&self, _: &Self) -> bool { unimplemented!() }
//! #     async fn list_files(&self) -> Option<Vec<Self>> { unimplemented!() }
//! #     async fn create_output_stream(&self, _: u64) -> stackftp_core::storage::Result<Box<dyn tokio::io::AsyncWrite + Send + Unpin>> { unimplemented!() }
//! #     async fn create_input_stream(&self, _: u64) -> stackftp_core::storage::Result<Box<dyn tokio::io::AsyncRead + Send + Sync + Unpin>> { unimplemented!() }
//! # }
//! # #[async_trait]
//! # impl FileSystemView for NoView {
//! #     type File = NoFile;
//! #     async fn home_directory(&self) -> stackftp_core::storage::Result<NoFile> { unimplemented!() }
//! #     async fn working_directory(&self) -> stackftp_core::storage::Result<NoFile> { unimplemented!() }
//! #     async fn change_working_directory(&mut self, _: &str) -> bool { unimplemented!() }
//! #     async fn file(&self, _: &str) -> stackftp_core::storage::Result<NoFile> { unimplemented!() }
//! # }
//!
//! impl UserDetail for Guest {
//!     type View = NoView;
//!
//!     fn name(&self) -> &str {
//!         &self.0
//!     }
//!
//!     fn max_idle_time(&self) -> Duration {
//!         Duration::from_secs(300)
//!     }
//!
//!     fn file_system_view(&self) -> NoView {
//!         NoView
//!     }
//! }
//!
//! #[async_trait]
//! impl UserManager<Guest> for Everybody {
//!     async fn authenticate(&self, username: &str, _creds: &Credentials) -> Result<Guest, AuthenticationError> {
//!         Ok(Guest(username.to_string()))
//!     }
//!
//!     async fn user_by_name(&self, _name: &str) -> Result<Guest, UserManagerError> {
//!         Err(UserManagerError::NotSupported("user lookup"))
//!     }
//!
//!     async fn all_user_names(&self) -> Result<Vec<String>, UserManagerError> {
//!         Err(UserManagerError::NotSupported("user listing"))
//!     }
//!
//!     async fn does_exist(&self, _name: &str) -> Result<bool, UserManagerError> {
//!         Err(UserManagerError::NotSupported("user existence check"))
//!     }
//!
//!     async fn delete(&self, _name: &str) -> Result<(), UserManagerError> {
//!         Err(UserManagerError::NotSupported("user deletion"))
//!     }
//!
//!     async fn save(&self, _user: &Guest) -> Result<(), UserManagerError> {
//!         Err(UserManagerError::NotSupported("user persistence"))
//!     }
//!
//!     fn admin_name(&self) -> Result<String, UserManagerError> {
//!         Err(UserManagerError::NotSupported("admin lookup"))
//!     }
//!
//!     fn is_admin(&self, _name: &str) -> Result<bool, UserManagerError> {
//!         Err(UserManagerError::NotSupported("admin check"))
//!     }
//! }
//! ```

mod user_manager;
pub use user_manager::{AuthenticationError, Credentials, UserManager, UserManagerError};

mod user;
pub use user::{AuthorizationRequest, Authority, UserDetail};
