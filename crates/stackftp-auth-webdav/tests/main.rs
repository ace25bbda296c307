//! Integration tests for the WebDAV user manager.

use pretty_assertions::assert_eq;
use stackftp_auth_webdav::{Builder, CredentialCache, WebdavUserManager};
use stackftp_core::auth::{AuthenticationError, Credentials, UserDetail, UserManager, UserManagerError};
use stackftp_core::storage::{FileSystemView, FtpFile};
use stackftp_sbe_webdav::{DavTransport, MemoryTransport};
use std::{
    net::{IpAddr, Ipv4Addr},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

/// A user manager whose every login lands on `dav`. Records the (login, host, password)
/// triples it was asked to connect with.
fn manager(dav: &Arc<MemoryTransport>) -> (WebdavUserManager, Arc<Mutex<Vec<(String, String, String)>>>) {
    let connects = Arc::new(Mutex::new(Vec::new()));
    let (dav, seen) = (dav.clone(), connects.clone());
    let users = Builder::new()
        .with_idle_timeout(Duration::from_secs(42))
        .with_transport_factory(move |login, host, password| {
            seen.lock().unwrap().push((login.to_string(), host.to_string(), password.to_string()));
            Ok(dav.clone() as Arc<dyn DavTransport>)
        })
        .build();
    (users, connects)
}

fn seeded() -> Arc<MemoryTransport> {
    Arc::new(
        MemoryTransport::new()
            .with_directory("/docs")
            .with_file("/readme.txt", vec![b'x'; 42]),
    )
}

#[tokio::test]
async fn bad_names_never_reach_the_server() {
    let dav = seeded();
    let (users, connects) = manager(&dav);

    for name in ["alice", "@storage.example", "alice@", "@"] {
        let result = users.authenticate(name, &Credentials::from("secret")).await;
        assert!(matches!(result, Err(AuthenticationError::BadName)), "{}", name);
    }
    assert_eq!(dav.calls(), 0);
    assert!(connects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_password_is_refused() {
    let dav = seeded();
    let (users, _) = manager(&dav);
    let creds = Credentials {
        password: None,
        source_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
    };
    assert!(matches!(
        users.authenticate("alice@storage.example", &creds).await,
        Err(AuthenticationError::BadPassword)
    ));
    assert_eq!(dav.calls(), 0);
}

#[tokio::test]
async fn logs_in_and_browses() {
    let dav = seeded();
    let (users, connects) = manager(&dav);

    let alice = users.authenticate("alice@storage.example", &Credentials::from("secret")).await.unwrap();
    assert_eq!(alice.login_name(), "alice");
    assert_eq!(alice.name(), "alice");
    assert!(alice.base_url().contains("storage.example"));
    assert_eq!(alice.max_idle_time(), Duration::from_secs(42));
    assert_eq!(
        *connects.lock().unwrap(),
        vec![("alice".to_string(), "storage.example".to_string(), "secret".to_string())]
    );

    let view = alice.file_system_view();
    let root: Vec<(String, bool)> = view
        .list("/")
        .await
        .unwrap()
        .iter()
        .map(|f| (f.absolute_path(), f.is_directory()))
        .collect();
    assert_eq!(root, vec![("/docs/".to_string(), true), ("/readme.txt".to_string(), false)]);

    let readme = view.file("/readme.txt").await.unwrap();
    assert_eq!(readme.size(), 42);
    assert!(!readme.is_directory());
}

#[tokio::test]
async fn every_login_is_validated_even_when_cached() {
    let dav = seeded();
    let (users, connects) = manager(&dav);

    users.authenticate("alice@storage.example", &Credentials::from("secret")).await.unwrap();
    let after_first = dav.calls();
    users.authenticate("alice@storage.example", &Credentials::from("secret")).await.unwrap();

    assert_eq!(connects.lock().unwrap().len(), 1);
    assert_eq!(users.cache().len(), 1);
    assert_eq!(dav.calls(), after_first + 1);

    // The server changed its mind: the cached identity does not help
    dav.set_rejecting(true);
    assert!(matches!(
        users.authenticate("alice@storage.example", &Credentials::from("secret")).await,
        Err(AuthenticationError::BadPassword)
    ));
}

#[tokio::test]
async fn a_new_password_builds_a_new_identity() {
    let dav = seeded();
    let (users, connects) = manager(&dav);

    users.authenticate("alice@storage.example", &Credentials::from("old")).await.unwrap();
    let fresh = users.authenticate("alice@storage.example", &Credentials::from("new")).await.unwrap();

    assert!(fresh.has_password("new"));
    assert_eq!(connects.lock().unwrap().len(), 2);
    assert_eq!(users.cache().len(), 2);
}

#[tokio::test]
async fn rejected_credentials_are_not_cached() {
    let dav = Arc::new(MemoryTransport::new().rejecting());
    let (users, connects) = manager(&dav);

    for guess in ["guess1", "guess2", "guess3"] {
        assert!(matches!(
            users.authenticate("mallory@storage.example", &Credentials::from(guess)).await,
            Err(AuthenticationError::BadPassword)
        ));
    }
    assert!(users.cache().is_empty());
    assert_eq!(connects.lock().unwrap().len(), 3);

    // Once the server accepts, the identity is kept
    dav.set_rejecting(false);
    users.authenticate("mallory@storage.example", &Credentials::from("guess3")).await.unwrap();
    assert!(users.cache().contains("mallory@storage.example", "guess3"));
    assert_eq!(users.cache().len(), 1);
}

#[tokio::test]
async fn connections_are_built_without_holding_the_cache() {
    let dav = seeded();
    let cache = Arc::new(CredentialCache::new());
    let seen = cache.clone();
    let users = Builder::new()
        .with_cache(cache.clone())
        .with_transport_factory(move |_, _, _| {
            // Would deadlock if the entry for this pair were locked
            assert!(!seen.contains("alice@storage.example", "secret"));
            Ok(dav.clone() as Arc<dyn DavTransport>)
        })
        .build();

    users.authenticate("alice@storage.example", &Credentials::from("secret")).await.unwrap();
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn failing_connection_setup_propagates() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = calls.clone();
    let users = Builder::new()
        .with_transport_factory(move |_, _, _| {
            counted.fetch_add(1, Ordering::SeqCst);
            Err(stackftp_sbe_webdav::DavError::Malformed("no TLS roots".to_string()))
        })
        .build();

    let result = users.authenticate("alice@storage.example", &Credentials::from("secret")).await;
    assert!(matches!(result, Err(AuthenticationError::ImplPropagated(_, Some(_)))));
    assert!(users.cache().is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn user_registry_operations_are_not_supported() {
    let dav = seeded();
    let (users, _) = manager(&dav);
    let alice = users.authenticate("alice@storage.example", &Credentials::from("secret")).await.unwrap();

    assert!(matches!(users.user_by_name("alice").await, Err(UserManagerError::NotSupported(_))));
    assert!(matches!(users.all_user_names().await, Err(UserManagerError::NotSupported(_))));
    assert!(matches!(users.does_exist("alice").await, Err(UserManagerError::NotSupported(_))));
    assert!(matches!(users.delete("alice").await, Err(UserManagerError::NotSupported(_))));
    assert!(matches!(users.save(&alice).await, Err(UserManagerError::NotSupported(_))));
    assert!(matches!(users.admin_name(), Err(UserManagerError::NotSupported(_))));
    assert!(matches!(users.is_admin("alice"), Err(UserManagerError::NotSupported(_))));
}
