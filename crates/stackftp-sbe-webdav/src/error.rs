use hyper::StatusCode;
use stackftp_core::storage::{Error, ErrorKind};
use thiserror::Error;

/// A failed call to the WebDAV back-end.
#[derive(Debug, Error)]
pub enum DavError {
    /// The back-end answered with a non-success status.
    #[error("HTTP error - status: {status}, body: {body}")]
    Status {
        /// The status the back-end answered with.
        status: StatusCode,
        /// The start of the response body, for diagnostics.
        body: String,
    },
    /// The request never got an answer: DNS, connect or TLS trouble.
    #[error("request failed")]
    Client(#[from] hyper_util::client::legacy::Error),
    /// The response body could not be read.
    #[error("could not read response body")]
    Body(#[source] hyper::Error),
    /// The path could not be turned into a valid URL.
    #[error("invalid URL")]
    InvalidUri(#[from] hyper::http::uri::InvalidUri),
    /// The request could not be constructed.
    #[error("could not build request")]
    Request(#[from] hyper::http::Error),
    /// The TLS connector could not load the platform's root certificates.
    #[error("could not load native root certificates")]
    Connector(#[source] std::io::Error),
    /// Reading or writing the transferred bytes failed.
    #[error("transfer failed")]
    Io(#[from] std::io::Error),
    /// A `207 Multi-Status` answer that could not be understood.
    #[error("malformed multistatus response: {0}")]
    Malformed(String),
}

impl DavError {
    /// Creates the error for a status without a body.
    pub fn from_status(status: StatusCode) -> Self {
        DavError::Status { status, body: String::new() }
    }

    /// The HTTP status of the failure, if the back-end answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            DavError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the back-end reported that the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

impl From<DavError> for Error {
    fn from(err: DavError) -> Self {
        let kind = match &err {
            DavError::Status { status, .. } => match status.as_u16() {
                404 => ErrorKind::PermanentFileNotAvailable,
                401 | 403 => ErrorKind::PermissionDenied,
                429 => ErrorKind::TransientFileNotAvailable,
                _ => ErrorKind::LocalError,
            },
            // If our request fails (not even a HTTP error) the client may retry
            DavError::Client(_) => ErrorKind::TransientFileNotAvailable,
            DavError::InvalidUri(_) => ErrorKind::FileNameNotAllowedError,
            _ => ErrorKind::LocalError,
        };
        Error::new(kind, err)
    }
}
