use crate::{
    DavEntry, DavError, DavTransport,
    multistatus::{self, PROPFIND_BODY, Resource},
    uri::DavUri,
};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use bytes::Bytes;
use futures::prelude::*;
use http_body_util::{BodyExt, Empty, Full, StreamBody, combinators::UnsyncBoxBody};
use hyper::{
    Method, Response, Request,
    body::{Frame, Incoming},
    header,
};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use std::fmt;
use std::io::Error as StdIoError;
use tokio::io::AsyncRead;
use tokio_util::compat::FuturesAsyncReadCompatExt;
use tokio_util::io::ReaderStream;

type HttpBody = UnsyncBoxBody<Bytes, StdIoError>;
type HttpClient = Client<HttpsConnector<HttpConnector>, HttpBody>;

const USER_AGENT: &str = "StackFtp";

/// Talks WebDAV over HTTP(S) to one account on one server.
///
/// Cloning is cheap and clones share the connection pool.
#[derive(Clone)]
pub struct DavClient {
    uris: DavUri,
    authorization: String,
    client: HttpClient,
}

impl fmt::Debug for DavClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DavClient").field("base_url", &self.uris.base_url()).finish_non_exhaustive()
    }
}

impl DavClient {
    /// Creates a client for the Nextcloud/ownCloud style WebDAV endpoint of `host`, i.e.
    /// `https://{host}/remote.php/webdav`, logging in with Basic credentials.
    pub fn new(host: &str, login: &str, password: &str) -> Result<Self, DavError> {
        Self::with_base_url(DavUri::for_host(host).base_url(), login, password)
    }

    /// Creates a client for any WebDAV root URL, plain `http` included.
    pub fn with_base_url(base_url: &str, login: &str, password: &str) -> Result<Self, DavError> {
        let https = HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(DavError::Connector)?
            .https_or_http()
            .enable_http1()
            .build();

        Ok(DavClient {
            uris: DavUri::with_base_url(base_url),
            authorization: format!("Basic {}", BASE64.encode(format!("{}:{}", login, password))),
            client: Client::builder(TokioExecutor::new()).build(https),
        })
    }

    /// The URL all paths are relative to.
    pub fn base_url(&self) -> &str {
        self.uris.base_url()
    }

    async fn http_raw(&self, method: Method, path: &str, body: HttpBody, headers: &[(&str, &str)]) -> Result<Response<Incoming>, DavError> {
        let mut request = Request::builder()
            .method(method)
            .uri(self.uris.resource(path)?)
            .header(header::AUTHORIZATION, self.authorization.as_str())
            .header(header::USER_AGENT, USER_AGENT);

        for (hk, hv) in headers {
            request = request.header(*hk, *hv);
        }

        let response = self.client.request(request.body(body)?).await?;

        if !response.status().is_success() {
            fn first_n_chars(s: &str, n: usize) -> String {
                s.chars().take(n).collect()
            }

            let status = response.status();
            let body = match response.into_body().collect().await {
                Ok(collected) => first_n_chars(&String::from_utf8_lossy(&collected.to_bytes()), 1000),
                Err(e) => format!("error while collecting failed request body: {}", e),
            };
            return Err(DavError::Status { status, body });
        }

        Ok(response)
    }

    async fn propfind(&self, path: &str, depth: &str) -> Result<Vec<DavEntry>, DavError> {
        let response = self
            .http_raw(
                dav_method(b"PROPFIND")?,
                path,
                full(PROPFIND_BODY),
                &[("Depth", depth), (header::CONTENT_TYPE.as_str(), "application/xml; charset=utf-8")],
            )
            .await?;

        let body = response.into_body().collect().await.map_err(DavError::Body)?.to_bytes();
        let resources = multistatus::parse(&String::from_utf8_lossy(&body))?;

        Ok(resources.into_iter().map(|resource| entry(&self.uris, resource)).collect())
    }
}

fn entry(uris: &DavUri, resource: Resource) -> DavEntry {
    let mut path = uris.path_of(&resource.href);
    if resource.is_collection == Some(true) && !path.ends_with('/') {
        path.push('/');
    }
    DavEntry {
        path,
        is_directory: resource.is_collection,
        size: resource.size,
        modified: resource.modified,
    }
}

#[async_trait]
impl DavTransport for DavClient {
    #[tracing_attributes::instrument]
    async fn exists(&self, path: &str) -> bool {
        match self.http_raw(Method::HEAD, path, empty(), &[]).await {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(error = %err, "treating resource as absent");
                false
            }
        }
    }

    #[tracing_attributes::instrument]
    async fn stat(&self, path: &str) -> Result<DavEntry, DavError> {
        self.propfind(path, "0")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DavError::Malformed(format!("no response for {}", path)))
    }

    #[tracing_attributes::instrument]
    async fn list(&self, path: &str) -> Result<Vec<DavEntry>, DavError> {
        Ok(members(self.propfind(path, "1").await?))
    }

    #[tracing_attributes::instrument]
    async fn get(&self, path: &str) -> Result<Box<dyn AsyncRead + Send + Sync + Unpin>, DavError> {
        let response = self.http_raw(Method::GET, path, empty(), &[]).await?;

        let reader = response
            .into_body()
            .into_data_stream()
            .map_err(std::io::Error::other)
            .into_async_read()
            .compat();

        Ok(Box::new(reader))
    }

    #[tracing_attributes::instrument(skip(body))]
    async fn put(&self, path: &str, body: Box<dyn AsyncRead + Send + Sync + Unpin>) -> Result<(), DavError> {
        let body = BodyExt::boxed_unsync(StreamBody::new(ReaderStream::new(body).map_ok(Frame::data)));
        self.http_raw(
            Method::PUT,
            path,
            body,
            &[(header::CONTENT_TYPE.as_str(), "application/octet-stream")],
        )
        .await?;
        Ok(())
    }

    #[tracing_attributes::instrument]
    async fn mkdir(&self, path: &str) -> Result<(), DavError> {
        self.http_raw(dav_method(b"MKCOL")?, path, empty(), &[]).await?;
        Ok(())
    }

    #[tracing_attributes::instrument]
    async fn delete(&self, path: &str) -> Result<(), DavError> {
        self.http_raw(Method::DELETE, path, empty(), &[]).await?;
        Ok(())
    }

    #[tracing_attributes::instrument]
    async fn move_to(&self, from: &str, to: &str) -> Result<(), DavError> {
        let destination = self.uris.url(to);
        self.http_raw(
            dav_method(b"MOVE")?,
            from,
            empty(),
            &[("Destination", destination.as_str()), ("Overwrite", "T")],
        )
        .await?;
        Ok(())
    }
}

// The first response of a Depth: 1 PROPFIND describes the collection itself.
fn members(responses: Vec<DavEntry>) -> Vec<DavEntry> {
    responses
        .into_iter()
        .skip(1)
        .map(|entry| DavEntry {
            is_directory: Some(entry.is_directory.unwrap_or(false)),
            ..entry
        })
        .collect()
}

fn dav_method(name: &[u8]) -> Result<Method, DavError> {
    Method::from_bytes(name).map_err(|e| DavError::Request(e.into()))
}

fn empty() -> HttpBody {
    Empty::<Bytes>::new().map_err(|never| match never {}).boxed_unsync()
}

fn full(text: &'static str) -> HttpBody {
    Full::new(Bytes::from_static(text.as_bytes())).map_err(|never| match never {}).boxed_unsync()
}
