use crate::DavError;
use hyper::Uri;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

/// Where a Nextcloud/ownCloud style server exposes the user's files.
pub(crate) const WEBDAV_ROOT: &str = "/remote.php/webdav";

// Everything that may not appear literally in a URL path. '/' stays as it is.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Clone, Debug)]
pub(crate) struct DavUri {
    base_url: String,
    // The path part of base_url, e.g. /remote.php/webdav
    prefix: String,
}

impl DavUri {
    pub fn for_host(host: &str) -> Self {
        Self::with_base_url(format!("https://{}{}", host, WEBDAV_ROOT))
    }

    pub fn with_base_url<S: Into<String>>(base_url: S) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let prefix = strip_authority(&base_url).to_string();
        Self { base_url, prefix }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The full, encoded URL of the resource at `path`.
    pub fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url, utf8_percent_encode(path, PATH))
    }

    pub fn resource(&self, path: &str) -> Result<Uri, DavError> {
        make_uri(self.url(path))
    }

    /// Turns an `href` of a multistatus answer back into a path relative to the WebDAV root.
    /// Hrefs may be absolute URLs or absolute paths; both are percent-decoded.
    pub fn path_of(&self, href: &str) -> String {
        let href = if href.contains("://") { strip_authority(href) } else { href };
        let decoded = percent_decode_str(href).decode_utf8_lossy();
        let relative = decoded.strip_prefix(self.prefix.as_str()).unwrap_or(&*decoded);
        if relative.starts_with('/') {
            relative.to_string()
        } else {
            format!("/{}", relative)
        }
    }
}

// http://host:port/a/b -> /a/b
fn strip_authority(url: &str) -> &str {
    match url.find("://") {
        Some(scheme_end) => {
            let rest = &url[scheme_end + 3..];
            rest.find('/').map(|i| &rest[i..]).unwrap_or("")
        }
        None => url,
    }
}

fn make_uri(url: String) -> Result<Uri, DavError> {
    Ok(Uri::from_maybe_shared(url)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn base_url_embeds_host() {
        let uris = DavUri::for_host("storage.example");
        assert_eq!(uris.base_url(), "https://storage.example/remote.php/webdav");
        assert_eq!(uris.url("/"), "https://storage.example/remote.php/webdav/");
        assert_eq!(uris.url("/docs/"), "https://storage.example/remote.php/webdav/docs/");
    }

    #[test]
    fn spaces_and_reserved_characters_are_encoded() {
        let uris = DavUri::for_host("h");
        assert_eq!(
            uris.url("/my docs/50% #1?.txt"),
            "https://h/remote.php/webdav/my%20docs/50%25%20%231%3F.txt"
        );
        assert!(uris.resource("/my docs/a {b}.txt").is_ok());
    }

    #[test]
    fn hrefs_lose_prefix_and_encoding() {
        let uris = DavUri::for_host("h");
        assert_eq!(uris.path_of("/remote.php/webdav/docs/"), "/docs/");
        assert_eq!(uris.path_of("/remote.php/webdav/my%20docs/a.txt"), "/my docs/a.txt");
        assert_eq!(uris.path_of("https://h/remote.php/webdav/readme.txt"), "/readme.txt");
        assert_eq!(uris.path_of("/remote.php/webdav"), "/");
        assert_eq!(uris.path_of("/elsewhere/x"), "/elsewhere/x");
    }

    #[test]
    fn custom_base_url_prefix() {
        let uris = DavUri::with_base_url("http://127.0.0.1:8080/dav/");
        assert_eq!(uris.base_url(), "http://127.0.0.1:8080/dav");
        assert_eq!(uris.path_of("/dav/a/b"), "/a/b");
        assert_eq!(uris.url("a b"), "http://127.0.0.1:8080/dav/a%20b");
    }
}
