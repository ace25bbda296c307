use dashmap::DashMap;
use stackftp_sbe_webdav::WebdavUser;
use std::fmt;

/// Identifies an entry in the cache. The password is part of the key, so a changed password
/// never finds the identity built for the old one.
#[derive(PartialEq, Eq, Hash, Clone)]
struct CacheKey {
    username: String,
    password: String,
}

impl CacheKey {
    fn new(username: &str, password: &str) -> Self {
        CacheKey {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// Keeps the identities the back-end accepted for the username and password pairs seen so far,
/// so that a user logging in again gets the same back-end connection. Entries stay for the
/// lifetime of the process.
#[derive(Default)]
pub struct CredentialCache {
    entries: DashMap<CacheKey, WebdavUser>,
}

impl fmt::Debug for CredentialCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialCache").field("entries", &self.entries.len()).finish()
    }
}

impl CredentialCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The identity cached for `username` and `password`, if any.
    pub fn get(&self, username: &str, password: &str) -> Option<WebdavUser> {
        self.entries.get(&CacheKey::new(username, password)).map(|entry| entry.value().clone())
    }

    /// Caches a validated `user` for this pair. When a concurrent login cached one first, that
    /// one is kept and returned.
    pub fn insert(&self, username: &str, password: &str, user: WebdavUser) -> WebdavUser {
        self.entries.entry(CacheKey::new(username, password)).or_insert(user).value().clone()
    }

    /// Tells whether an identity is cached for this exact pair.
    pub fn contains(&self, username: &str, password: &str) -> bool {
        self.entries.contains_key(&CacheKey::new(username, password))
    }

    /// The number of cached identities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
