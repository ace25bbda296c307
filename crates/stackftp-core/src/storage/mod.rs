//! Contains the [`FileSystemView`] and [`FtpFile`] traits that make up a virtual file system for
//! an FTP engine.
//!
//! A view belongs to exactly one session. It keeps the session's working directory and turns the
//! paths a client sends into [`FtpFile`]s. The files answer metadata questions (existence, kind,
//! size, timestamps, link counts) and perform the mutations and transfers.
//!
//! Paths handed to a view are FTP paths: absolute (starting with `/`) or relative to the working
//! directory. A trailing `/` marks a directory.
//!
//! Failures of mutating operations are reported as plain booleans, because that is all an FTP
//! engine does with them. Failures that need a reply code travel as [`Error`]s with an
//! [`ErrorKind`].

mod error;
pub use error::{Error, ErrorKind};

mod file;
pub use file::FtpFile;

mod view;
pub use view::FileSystemView;

/// Result type used by traits in this module
pub type Result<T> = std::result::Result<T, Error>;
