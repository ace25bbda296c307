use crate::BoxError;
use derive_more::Display;
use thiserror::Error;

/// The Error returned by file system views and their files. Implementations should choose the
/// `ErrorKind` carefully since that will determine what is returned to the FTP client.
#[derive(Debug, Error)]
#[error("storage error: {kind}")]
pub struct Error {
    kind: ErrorKind,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    /// Creates a new storage error
    pub fn new<E>(kind: ErrorKind, error: E) -> Error
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error {
            kind,
            source: Some(error.into()),
        }
    }

    /// Detailed information about what the FTP engine should do with the failure
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Attempts to get a reference to the inner `std::io::Error` if there is one.
    pub fn get_io_error(&self) -> Option<&std::io::Error> {
        self.source.as_ref()?.downcast_ref::<std::io::Error>()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { kind, source: None }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Error::new(ErrorKind::PermanentFileNotAvailable, err),
            std::io::ErrorKind::PermissionDenied => Error::new(ErrorKind::PermissionDenied, err),
            _ => Error::new(ErrorKind::LocalError, err),
        }
    }
}

/// The `ErrorKind` variants that can be produced by the [`FileSystemView`] and [`FtpFile`]
/// implementations.
///
/// [`FileSystemView`]: super::FileSystemView
/// [`FtpFile`]: super::FtpFile
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum ErrorKind {
    /// 450 Requested file action not taken. The back-end asked us to slow down or was briefly
    /// unreachable; the client may retry.
    #[display("450 Transient file not available")]
    TransientFileNotAvailable,
    /// 550 Requested action not taken. The file does not exist on the back-end.
    #[display("550 Permanent file not available")]
    PermanentFileNotAvailable,
    /// 550 Requested action not taken. The back-end refused the user's credentials for this path.
    #[display("550 Permission denied")]
    PermissionDenied,
    /// 451 Requested action aborted. Local error in processing, e.g. an unexpected HTTP status or
    /// an unreadable response.
    #[display("451 Local error")]
    LocalError,
    /// 553 Requested action not taken. The path cannot be turned into a back-end URL.
    #[display("553 File name not allowed error")]
    FileNameNotAllowedError,
}
