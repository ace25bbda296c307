//! Reads the `207 Multi-Status` answers to PROPFIND requests.
//!
//! Servers differ in the namespace prefixes they use (`d:`, `D:`, `lp1:` or none at all), so
//! elements are matched on their local name only.

use crate::DavError;
use chrono::DateTime;
use lazy_static::lazy_static;
use regex::Regex;
use std::time::SystemTime;

/// The properties of one `<response>` element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Resource {
    pub href: String,
    /// `None` when the server did not report a resource type at all.
    pub is_collection: Option<bool>,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// The PROPFIND request body: ask for exactly the properties we read.
pub(crate) const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:">
  <d:prop>
    <d:resourcetype/>
    <d:getcontentlength/>
    <d:getlastmodified/>
  </d:prop>
</d:propfind>"#;

struct Patterns {
    response: Regex,
    href: Regex,
    propstat: Regex,
    status: Regex,
    resourcetype: Regex,
    collection: Regex,
    content_length: Regex,
    last_modified: Regex,
}

lazy_static! {
    static ref PATTERNS: Result<Patterns, regex::Error> = Patterns::compile();
}

// Matches <name ...>content</name> as well as <name .../>, with or without a namespace prefix.
// Group 1 holds the content and is absent for empty elements.
fn element(name: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?s)<(?:[\w.-]+:)?{0}\b[^>]*?(?:/>|>(.*?)</(?:[\w.-]+:)?{0}\s*>)", name))
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Patterns {
            response: element("response")?,
            href: element("href")?,
            propstat: element("propstat")?,
            status: element("status")?,
            resourcetype: element("resourcetype")?,
            collection: Regex::new(r"<(?:[\w.-]+:)?collection\b")?,
            content_length: element("getcontentlength")?,
            last_modified: element("getlastmodified")?,
        })
    }

    fn text<'a>(&self, pattern: &Regex, haystack: &'a str) -> Option<&'a str> {
        pattern.captures(haystack).and_then(|c| c.get(1)).map(|m| m.as_str().trim())
    }

    // The properties the server could deliver: the propstat block with a 200 status. Servers that
    // leave out propstat altogether put the properties directly in the response.
    fn found_props<'a>(&self, response: &'a str) -> &'a str {
        let blocks: Vec<&str> = self
            .propstat
            .captures_iter(response)
            .map(|c| c.get(1).map_or("", |m| m.as_str()))
            .collect();
        if blocks.is_empty() {
            return response;
        }
        blocks
            .into_iter()
            .find(|block| self.text(&self.status, block).is_none_or(|status| status.contains(" 200")))
            .unwrap_or("")
    }

    fn resource(&self, response: &str) -> Result<Resource, DavError> {
        let href = self
            .text(&self.href, response)
            .ok_or_else(|| DavError::Malformed("response without href".to_string()))?;
        let props = self.found_props(response);
        let is_collection = self
            .resourcetype
            .captures(props)
            .map(|c| c.get(1).is_some_and(|types| self.collection.is_match(types.as_str())));
        let size = self.text(&self.content_length, props).and_then(|s| s.parse().ok()).unwrap_or(0);
        let modified = self
            .text(&self.last_modified, props)
            .and_then(|s| DateTime::parse_from_rfc2822(s).ok())
            .map(SystemTime::from);

        Ok(Resource {
            href: unescape(href),
            is_collection,
            size,
            modified,
        })
    }
}

/// Parses a multistatus document into its responses, in document order.
pub(crate) fn parse(xml: &str) -> Result<Vec<Resource>, DavError> {
    let patterns = PATTERNS.as_ref().map_err(|e| DavError::Malformed(e.to_string()))?;
    patterns
        .response
        .captures_iter(xml)
        .map(|c| patterns.resource(c.get(1).map_or("", |m| m.as_str())))
        .collect()
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    const NEXTCLOUD_LISTING: &str = r#"<?xml version="1.0"?>
<d:multistatus xmlns:d="DAV:" xmlns:s="http://sabredav.org/ns" xmlns:oc="http://owncloud.org/ns">
 <d:response>
  <d:href>/remote.php/webdav/</d:href>
  <d:propstat>
   <d:prop>
    <d:getlastmodified>Tue, 02 Jan 2024 10:00:00 GMT</d:getlastmodified>
    <d:resourcetype><d:collection/></d:resourcetype>
   </d:prop>
   <d:status>HTTP/1.1 200 OK</d:status>
  </d:propstat>
  <d:propstat>
   <d:prop><d:getcontentlength/></d:prop>
   <d:status>HTTP/1.1 404 Not Found</d:status>
  </d:propstat>
 </d:response>
 <d:response>
  <d:href>/remote.php/webdav/my%20docs/</d:href>
  <d:propstat>
   <d:prop>
    <d:resourcetype>
     <d:collection />
    </d:resourcetype>
   </d:prop>
   <d:status>HTTP/1.1 200 OK</d:status>
  </d:propstat>
 </d:response>
 <d:response>
  <d:href>/remote.php/webdav/readme.txt</d:href>
  <d:propstat>
   <d:prop>
    <d:getlastmodified>Wed, 03 Jan 2024 12:30:00 GMT</d:getlastmodified>
    <d:getcontentlength>42</d:getcontentlength>
    <d:resourcetype/>
   </d:prop>
   <d:status>HTTP/1.1 200 OK</d:status>
  </d:propstat>
 </d:response>
</d:multistatus>"#;

    #[test]
    fn parses_every_response_in_order() {
        let resources = parse(NEXTCLOUD_LISTING).unwrap();
        let hrefs: Vec<&str> = resources.iter().map(|r| r.href.as_str()).collect();
        assert_eq!(hrefs, vec!["/remote.php/webdav/", "/remote.php/webdav/my%20docs/", "/remote.php/webdav/readme.txt"]);
    }

    #[test]
    fn collections_files_and_sizes() {
        let resources = parse(NEXTCLOUD_LISTING).unwrap();
        assert_eq!(resources[0].is_collection, Some(true));
        assert_eq!(resources[0].size, 0);
        assert_eq!(resources[1].is_collection, Some(true));
        assert_eq!(resources[2].is_collection, Some(false));
        assert_eq!(resources[2].size, 42);
    }

    #[test]
    fn last_modified_is_rfc1123() {
        let resources = parse(NEXTCLOUD_LISTING).unwrap();
        // 2024-01-03T12:30:00Z
        assert_eq!(resources[2].modified, Some(SystemTime::UNIX_EPOCH + Duration::from_secs(1_704_285_000)));
        assert_eq!(resources[1].modified, None);
    }

    #[test]
    fn other_prefixes_and_no_prefix() {
        let xml = r#"<multistatus xmlns="DAV:">
  <response>
    <href>/dav/a&amp;b.txt</href>
    <propstat><prop><lp1:resourcetype xmlns:lp1="DAV:"></lp1:resourcetype><getcontentlength>7</getcontentlength></prop></propstat>
  </response>
  <D:response xmlns:D="DAV:">
    <D:href>/dav/dir/</D:href>
    <D:propstat><D:prop><D:resourcetype><D:collection xmlns:D="DAV:"/></D:resourcetype></D:prop><D:status>HTTP/1.1 200 OK</D:status></D:propstat>
  </D:response>
</multistatus>"#;
        let resources = parse(xml).unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].href, "/dav/a&b.txt");
        assert_eq!(resources[0].is_collection, Some(false));
        assert_eq!(resources[0].size, 7);
        assert_eq!(resources[1].is_collection, Some(true));
    }

    #[test]
    fn missing_resource_type_is_unknown() {
        let xml = r#"<d:multistatus xmlns:d="DAV:"><d:response><d:href>/x</d:href>
<d:propstat><d:prop><d:getcontentlength>3</d:getcontentlength></d:prop><d:status>HTTP/1.1 200 OK</d:status></d:propstat>
<d:propstat><d:prop><d:resourcetype/></d:prop><d:status>HTTP/1.1 404 Not Found</d:status></d:propstat>
</d:response></d:multistatus>"#;
        let resources = parse(xml).unwrap();
        assert_eq!(resources[0].is_collection, None);
        assert_eq!(resources[0].size, 3);
    }

    #[test]
    fn response_without_href_is_malformed() {
        let xml = r#"<d:multistatus xmlns:d="DAV:"><d:response><d:propstat/></d:response></d:multistatus>"#;
        assert!(matches!(parse(xml), Err(DavError::Malformed(_))));
    }

    #[test]
    fn empty_multistatus() {
        assert_eq!(parse(r#"<d:multistatus xmlns:d="DAV:"/>"#).unwrap(), vec![]);
    }
}
