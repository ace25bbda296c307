use crate::{DavEntry, DavError, DavTransport};
use async_trait::async_trait;
use hyper::StatusCode;
use parking_lot::Mutex;
use std::{
    collections::BTreeMap,
    io::Cursor,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::SystemTime,
};
use tokio::io::{AsyncRead, AsyncReadExt};

#[derive(Clone, Debug)]
enum Node {
    Directory { modified: SystemTime },
    File { content: Vec<u8>, modified: SystemTime },
}

/// A WebDAV server kept in memory. It answers like a real server would, status codes included,
/// and counts the calls made to it.
#[derive(Debug)]
pub struct MemoryTransport {
    // Keys have no trailing slash; the root is "/".
    nodes: Mutex<BTreeMap<String, Node>>,
    calls: AtomicUsize,
    rejecting: AtomicBool,
    failing_uploads: AtomicBool,
    untyped: AtomicBool,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn key(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn parent(key: &str) -> Option<&str> {
    match key.rfind('/') {
        _ if key == "/" => None,
        Some(0) => Some("/"),
        Some(i) => Some(&key[..i]),
        None => None,
    }
}

fn is_below(candidate: &str, ancestor: &str) -> bool {
    ancestor == "/" && candidate != "/" || candidate.strip_prefix(ancestor).is_some_and(|rest| rest.starts_with('/'))
}

impl MemoryTransport {
    /// Creates a server holding only the root collection.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::Directory { modified: SystemTime::now() });
        MemoryTransport {
            nodes: Mutex::new(nodes),
            calls: AtomicUsize::new(0),
            rejecting: AtomicBool::new(false),
            failing_uploads: AtomicBool::new(false),
            untyped: AtomicBool::new(false),
        }
    }

    /// Adds a collection, creating missing parents.
    pub fn with_directory(self, path: &str) -> Self {
        self.insert(key(path), Node::Directory { modified: SystemTime::now() });
        self
    }

    /// Adds a file, creating missing parents.
    pub fn with_file(self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.insert(
            key(path),
            Node::File {
                content: content.into(),
                modified: SystemTime::now(),
            },
        );
        self
    }

    /// Makes the server answer every request with `401 Unauthorized`, as it would for a wrong
    /// password.
    pub fn rejecting(self) -> Self {
        self.set_rejecting(true);
        self
    }

    /// Switches the `401 Unauthorized` answers on or off.
    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::SeqCst);
    }

    /// Makes every upload fail with `507 Insufficient Storage`.
    pub fn failing_uploads(self) -> Self {
        self.failing_uploads.store(true, Ordering::SeqCst);
        self
    }

    /// Leaves the resource type out of `stat` answers, like servers that do not report it.
    pub fn without_resource_types(self) -> Self {
        self.untyped.store(true, Ordering::SeqCst);
        self
    }

    /// The number of requests made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The content of the file at `path`, if there is one.
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        match self.nodes.lock().get(&key(path)) {
            Some(Node::File { content, .. }) => Some(content.clone()),
            _ => None,
        }
    }

    /// Tells whether a collection exists at `path`.
    pub fn is_directory(&self, path: &str) -> bool {
        matches!(self.nodes.lock().get(&key(path)), Some(Node::Directory { .. }))
    }

    fn insert(&self, key: String, node: Node) {
        let mut nodes = self.nodes.lock();
        let mut ancestor = parent(&key);
        while let Some(dir) = ancestor {
            nodes
                .entry(dir.to_string())
                .or_insert_with(|| Node::Directory { modified: SystemTime::now() });
            ancestor = parent(dir);
        }
        nodes.insert(key, node);
    }

    // Every request passes here first
    fn request(&self) -> Result<(), DavError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.rejecting.load(Ordering::SeqCst) {
            return Err(DavError::from_status(StatusCode::UNAUTHORIZED));
        }
        Ok(())
    }

    fn entry(key: &str, node: &Node, typed: bool) -> DavEntry {
        match node {
            Node::Directory { modified } => DavEntry {
                path: if key == "/" { "/".to_string() } else { format!("{}/", key) },
                is_directory: typed.then_some(true),
                size: 0,
                modified: Some(*modified),
            },
            Node::File { content, modified } => DavEntry {
                path: key.to_string(),
                is_directory: typed.then_some(false),
                size: content.len() as u64,
                modified: Some(*modified),
            },
        }
    }

    fn check_parent(nodes: &BTreeMap<String, Node>, key: &str) -> Result<(), DavError> {
        match parent(key).and_then(|p| nodes.get(p)) {
            Some(Node::Directory { .. }) => Ok(()),
            _ => Err(DavError::from_status(StatusCode::CONFLICT)),
        }
    }
}

fn not_found() -> DavError {
    DavError::from_status(StatusCode::NOT_FOUND)
}

#[async_trait]
impl DavTransport for MemoryTransport {
    async fn exists(&self, path: &str) -> bool {
        self.request().is_ok() && self.nodes.lock().contains_key(&key(path))
    }

    async fn stat(&self, path: &str) -> Result<DavEntry, DavError> {
        self.request()?;
        let key = key(path);
        let nodes = self.nodes.lock();
        let node = nodes.get(&key).ok_or_else(not_found)?;
        Ok(Self::entry(&key, node, !self.untyped.load(Ordering::SeqCst)))
    }

    async fn list(&self, path: &str) -> Result<Vec<DavEntry>, DavError> {
        self.request()?;
        let key = key(path);
        let nodes = self.nodes.lock();
        match nodes.get(&key) {
            None => Err(not_found()),
            Some(Node::File { .. }) => Ok(vec![]),
            Some(Node::Directory { .. }) => Ok(nodes
                .iter()
                .filter(|(candidate, _)| parent(candidate) == Some(key.as_str()))
                .map(|(candidate, node)| Self::entry(candidate, node, true))
                .collect()),
        }
    }

    async fn get(&self, path: &str) -> Result<Box<dyn AsyncRead + Send + Sync + Unpin>, DavError> {
        self.request()?;
        match self.nodes.lock().get(&key(path)) {
            Some(Node::File { content, .. }) => Ok(Box::new(Cursor::new(content.clone()))),
            Some(Node::Directory { .. }) => Err(DavError::from_status(StatusCode::METHOD_NOT_ALLOWED)),
            None => Err(not_found()),
        }
    }

    async fn put(&self, path: &str, mut body: Box<dyn AsyncRead + Send + Sync + Unpin>) -> Result<(), DavError> {
        self.request()?;
        if self.failing_uploads.load(Ordering::SeqCst) {
            return Err(DavError::from_status(StatusCode::INSUFFICIENT_STORAGE));
        }
        let mut content = Vec::new();
        body.read_to_end(&mut content).await?;

        let key = key(path);
        let mut nodes = self.nodes.lock();
        Self::check_parent(&nodes, &key)?;
        if let Some(Node::Directory { .. }) = nodes.get(&key) {
            return Err(DavError::from_status(StatusCode::METHOD_NOT_ALLOWED));
        }
        nodes.insert(
            key,
            Node::File {
                content,
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    async fn mkdir(&self, path: &str) -> Result<(), DavError> {
        self.request()?;
        let key = key(path);
        let mut nodes = self.nodes.lock();
        if nodes.contains_key(&key) {
            return Err(DavError::from_status(StatusCode::METHOD_NOT_ALLOWED));
        }
        Self::check_parent(&nodes, &key)?;
        nodes.insert(key, Node::Directory { modified: SystemTime::now() });
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), DavError> {
        self.request()?;
        let key = key(path);
        let mut nodes = self.nodes.lock();
        if key == "/" {
            return Err(DavError::from_status(StatusCode::FORBIDDEN));
        }
        if nodes.remove(&key).is_none() {
            return Err(not_found());
        }
        nodes.retain(|candidate, _| !is_below(candidate, &key));
        Ok(())
    }

    async fn move_to(&self, from: &str, to: &str) -> Result<(), DavError> {
        self.request()?;
        let (from, to) = (key(from), key(to));
        let mut nodes = self.nodes.lock();
        if from == "/" || is_below(&to, &from) {
            return Err(DavError::from_status(StatusCode::FORBIDDEN));
        }
        let node = nodes.remove(&from).ok_or_else(not_found)?;
        if let Err(err) = Self::check_parent(&nodes, &to) {
            nodes.insert(from, node);
            return Err(err);
        }

        // Overwrite: T replaces the target, and a collection brings its members along
        let members: Vec<(String, Node)> = nodes
            .iter()
            .filter(|(candidate, _)| is_below(candidate, &from))
            .map(|(candidate, member)| (format!("{}{}", to, &candidate[from.len()..]), member.clone()))
            .collect();
        nodes.retain(|candidate, _| candidate != &to && !is_below(candidate, &to) && !is_below(candidate, &from));
        nodes.extend(members);
        nodes.insert(to, node);
        Ok(())
    }
}
