#![forbid(unsafe_code)]

//! A storage back-end for stackftp that serves every FTP user the files of their own WebDAV
//! account, e.g. on a Nextcloud or ownCloud server.
//!
//! The FTP login name says where the account lives: `alice@cloud.example.org` is the account
//! `alice` on `https://cloud.example.org/remote.php/webdav`. Every file system question the FTP
//! engine asks is answered with one or more WebDAV requests; nothing is stored locally.
//!
//! # Usage
//!
//! Add the needed dependencies to Cargo.toml:
//!
//! ```toml
//! [dependencies]
//! stackftp-core = "0.1.0"
//! stackftp-sbe-webdav = "0.1.0"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! And talk to a server:
//!
//! ```no_run
//! use stackftp_core::auth::UserDetail;
//! use stackftp_core::storage::{FileSystemView, FtpFile};
//! use stackftp_sbe_webdav::{DavClient, SessionSettings, WebdavUser, split_login};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (login, host) = split_login("alice@cloud.example.org")?;
//!     let client = DavClient::new(host, login, "secret")?;
//!     let user = WebdavUser::new(login, host, "secret", Arc::new(client), SessionSettings::default());
//!
//!     let mut view = user.file_system_view();
//!     view.change_working_directory("/Documents").await;
//!     for file in view.list(".").await? {
//!         println!("{} {}", file.absolute_path(), file.size());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! For tests and experiments there is [`MemoryTransport`], a WebDAV server that lives in memory.

mod client;
mod error;
mod file;
mod memory;
mod multistatus;
mod path;
mod transport;
mod upload;
mod uri;
mod user;
mod view;

pub use client::DavClient;
pub use error::DavError;
pub use file::WebdavFile;
pub use memory::MemoryTransport;
pub use path::DavPath;
pub use transport::{DavEntry, DavTransport};
pub use upload::UploadStream;
pub use user::{DEFAULT_IDLE_TIMEOUT, DEFAULT_UPLOAD_BUFFER, LoginNameError, SessionSettings, WebdavUser, split_login};
pub use view::WebdavFileSystemView;
