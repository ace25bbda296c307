//! Core traits and types for stackftp.
//!
//! An FTP engine talks to users through the [`auth`] contracts and to files through the
//! [`storage`] contracts. Back-ends such as `stackftp-sbe-webdav` and `stackftp-auth-webdav`
//! implement them.

pub mod auth;
pub mod storage;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
