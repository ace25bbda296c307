//! Contains the settings of the FTP front, and how they are read from the environment.

use stackftp_sbe_webdav::{DEFAULT_IDLE_TIMEOUT, DEFAULT_UPLOAD_BUFFER, SessionSettings};
use std::{
    fmt::{self, Debug, Formatter},
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};
use thiserror::Error;

pub(crate) const DEFAULT_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
pub(crate) const DEFAULT_PORT: u16 = 21;
pub(crate) const DEFAULT_IMPLICIT_PORT: u16 = 990;

/// A problem with the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable holds something that cannot be used.
    #[error("invalid value {value:?} for {variable}")]
    Invalid {
        /// The environment variable.
        variable: &'static str,
        /// What it was set to.
        value: String,
    },
    /// TLS was asked for but there is nothing to take the certificate from.
    #[error("SSL is enabled but FTP_KEYSTORE is not set")]
    MissingKeystore,
    /// Implicit TLS was asked for without enabling TLS.
    #[error("FTP_IMPLICIT_SSL needs FTP_SSL")]
    ImplicitWithoutSsl,
}

/// How the FTP front is set up. Built with [`Options::default`] and the setters, or read from
/// `FTP_*` environment variables with [`Options::from_env`].
#[derive(Clone, PartialEq, Eq)]
pub struct Options {
    /// The address to listen on. `FTP_ADDRESS`, default `127.0.0.1`.
    pub address: IpAddr,
    /// The plain (or explicit TLS) control port. `FTP_PORT`, default 21.
    pub port: u16,
    /// The implicit TLS control port. `FTP_IMPLICIT_PORT`, default 990.
    pub implicit_port: u16,
    /// Whether clients may upgrade to TLS. `FTP_SSL`, default false.
    pub ssl: bool,
    /// Whether to also listen for implicit TLS. `FTP_IMPLICIT_SSL`, default false.
    pub implicit_ssl: bool,
    /// Where the server certificate and key are kept. `FTP_KEYSTORE`.
    pub keystore: Option<PathBuf>,
    /// The password of the keystore. `FTP_KEYSTORE_PASSWORD`.
    pub keystore_password: Option<String>,
    /// How long a session may be idle. `FTP_IDLE_TIME` in seconds, default 600.
    pub idle_timeout: Duration,
    /// The buffer size of each upload in bytes. `FTP_UPLOAD_BUFFER`, default 65536.
    pub upload_buffer: usize,
}

impl Debug for Options {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("implicit_port", &self.implicit_port)
            .field("ssl", &self.ssl)
            .field("implicit_ssl", &self.implicit_ssl)
            .field("keystore", &self.keystore)
            .field("keystore_password", &self.keystore_password.as_ref().map(|_| "*****"))
            .field("idle_timeout", &self.idle_timeout)
            .field("upload_buffer", &self.upload_buffer)
            .finish()
    }
}

impl Default for Options {
    fn default() -> Self {
        Options {
            address: DEFAULT_ADDRESS,
            port: DEFAULT_PORT,
            implicit_port: DEFAULT_IMPLICIT_PORT,
            ssl: false,
            implicit_ssl: false,
            keystore: None,
            keystore_password: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            upload_buffer: DEFAULT_UPLOAD_BUFFER,
        }
    }
}

impl Options {
    /// Reads the options from the process environment. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|variable| std::env::var(variable).ok())
    }

    /// Reads the options through `lookup`, which gets a variable name and returns its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Options::default();
        let options = Options {
            address: parsed(&lookup, "FTP_ADDRESS")?.unwrap_or(defaults.address),
            port: parsed(&lookup, "FTP_PORT")?.unwrap_or(defaults.port),
            implicit_port: parsed(&lookup, "FTP_IMPLICIT_PORT")?.unwrap_or(defaults.implicit_port),
            ssl: flag(&lookup, "FTP_SSL")?.unwrap_or(defaults.ssl),
            implicit_ssl: flag(&lookup, "FTP_IMPLICIT_SSL")?.unwrap_or(defaults.implicit_ssl),
            keystore: lookup("FTP_KEYSTORE").filter(|v| !v.is_empty()).map(PathBuf::from),
            keystore_password: lookup("FTP_KEYSTORE_PASSWORD"),
            idle_timeout: parsed(&lookup, "FTP_IDLE_TIME")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.idle_timeout),
            upload_buffer: parsed(&lookup, "FTP_UPLOAD_BUFFER")?.unwrap_or(defaults.upload_buffer),
        };
        options.validate()?;
        Ok(options)
    }

    /// Checks that the options fit together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if (self.ssl || self.implicit_ssl) && self.keystore.is_none() {
            return Err(ConfigError::MissingKeystore);
        }
        if self.implicit_ssl && !self.ssl {
            return Err(ConfigError::ImplicitWithoutSsl);
        }
        if self.upload_buffer == 0 {
            return Err(ConfigError::Invalid {
                variable: "FTP_UPLOAD_BUFFER",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Sets the address to listen on.
    pub fn address(mut self, address: IpAddr) -> Self {
        self.address = address;
        self
    }

    /// Sets the control port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enables TLS with the certificate in `keystore`.
    pub fn ssl(mut self, keystore: PathBuf, password: Option<String>) -> Self {
        self.ssl = true;
        self.keystore = Some(keystore);
        self.keystore_password = password;
        self
    }

    /// Also listens for implicit TLS on `port`.
    pub fn implicit_ssl(mut self, port: u16) -> Self {
        self.implicit_ssl = true;
        self.implicit_port = port;
        self
    }

    /// Sets how long a session may be idle.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Sets the buffer size of each upload.
    pub fn upload_buffer(mut self, bytes: usize) -> Self {
        self.upload_buffer = bytes;
        self
    }

    /// Where the control channel listens.
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }

    /// Where the implicit TLS control channel listens when [`implicit_ssl`](Options::implicit_ssl)
    /// is on.
    pub fn implicit_bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.implicit_port)
    }

    /// The settings every user session gets.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            idle_timeout: self.idle_timeout,
            upload_buffer: self.upload_buffer,
        }
    }
}

fn parsed<F, T>(lookup: &F, variable: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(variable) {
        None => Ok(None),
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(ConfigError::Invalid { variable, value }),
        },
    }
}

fn flag<F>(lookup: &F, variable: &'static str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(variable) {
        None => Ok(None),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Some(true)),
            "false" | "no" | "off" | "0" | "" => Ok(Some(false)),
            _ => Err(ConfigError::Invalid { variable, value }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn from(vars: &[(&str, &str)]) -> Result<Options, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Options::from_lookup(|variable| vars.get(variable).cloned())
    }

    #[test]
    fn defaults() {
        let options = from(&[]).unwrap();
        assert_eq!(options, Options::default());
        assert_eq!(options.bind_address(), "127.0.0.1:21".parse().unwrap());
        assert_eq!(options.implicit_bind_address(), "127.0.0.1:990".parse().unwrap());
        assert_eq!(options.session_settings(), SessionSettings::default());
    }

    #[test]
    fn reads_every_variable() {
        let options = from(&[
            ("FTP_ADDRESS", "0.0.0.0"),
            ("FTP_PORT", "2121"),
            ("FTP_IMPLICIT_PORT", "9990"),
            ("FTP_SSL", "true"),
            ("FTP_IMPLICIT_SSL", "TRUE"),
            ("FTP_KEYSTORE", "/etc/stackftp/keystore.p12"),
            ("FTP_KEYSTORE_PASSWORD", "changeit"),
            ("FTP_IDLE_TIME", "30"),
            ("FTP_UPLOAD_BUFFER", "1024"),
        ])
        .unwrap();

        assert_eq!(options.bind_address(), "0.0.0.0:2121".parse().unwrap());
        assert_eq!(options.implicit_bind_address(), "0.0.0.0:9990".parse().unwrap());
        assert_eq!(options.keystore, Some(PathBuf::from("/etc/stackftp/keystore.p12")));
        assert_eq!(options.idle_timeout, Duration::from_secs(30));
        assert_eq!(options.upload_buffer, 1024);
        assert!(!format!("{:?}", options).contains("changeit"));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            from(&[("FTP_PORT", "twenty-one")]),
            Err(ConfigError::Invalid {
                variable: "FTP_PORT",
                value: "twenty-one".to_string()
            })
        );
        assert!(matches!(from(&[("FTP_SSL", "maybe")]), Err(ConfigError::Invalid { variable: "FTP_SSL", .. })));
        assert!(matches!(from(&[("FTP_ADDRESS", "localhost:21")]), Err(ConfigError::Invalid { .. })));
        assert!(matches!(from(&[("FTP_UPLOAD_BUFFER", "0")]), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn tls_needs_a_keystore() {
        assert_eq!(from(&[("FTP_SSL", "true")]), Err(ConfigError::MissingKeystore));
        assert_eq!(from(&[("FTP_IMPLICIT_SSL", "true")]), Err(ConfigError::MissingKeystore));
        assert_eq!(
            from(&[("FTP_IMPLICIT_SSL", "true"), ("FTP_KEYSTORE", "/k")]),
            Err(ConfigError::ImplicitWithoutSsl)
        );
        assert!(from(&[("FTP_SSL", "1"), ("FTP_KEYSTORE", "/k")]).is_ok());
    }

    #[test]
    fn setters() {
        let options = Options::default()
            .port(2121)
            .ssl(PathBuf::from("/k"), None)
            .implicit_ssl(9990)
            .idle_timeout(Duration::from_secs(5))
            .upload_buffer(10);
        assert!(options.validate().is_ok());
        assert_eq!(options.implicit_bind_address().port(), 9990);
    }
}
