use authstore::core::account_service::{AccountService, Registration};
use authstore::core::credential_store::{CredentialStore, FileCredentialStore, StoreOptions};
use authstore::core::error::{AccountError, StoreError};
use authstore::core::local_storage::LocalStorage;
use authstore::core::paths::StorePaths;
use authstore::core::session_store::SessionStore;
use authstore::models::account::Profile;
use tempfile::TempDir;
use zeroize::Zeroizing;

fn options() -> StoreOptions {
    StoreOptions {
        argon2: argon2::Params::new(64, 1, 1, None).unwrap(),
        ..StoreOptions::default()
    }
}

fn alice_profile() -> Profile {
    Profile {
        first_name: "Alice".into(),
        last_name: "A".into(),
        email: "a@x.com".into(),
        contact_number: "1234567890".into(),
        address: "1 Main St".into(),
        profile_picture: String::new(),
    }
}

#[test]
fn alice_walkthrough() {
    let dir = TempDir::new().unwrap();
    let paths = StorePaths::from_root(dir.path().join("store"));
    let store = FileCredentialStore::new(&paths, options());

    store.initialize().unwrap();
    store.initialize().unwrap();

    store.register("alice", "secret1", alice_profile()).unwrap();
    assert!(store.login("alice", "secret1").unwrap());
    assert!(!store.login("alice", "wrong").unwrap());
    assert!(!store.login("bob", "anything").unwrap());

    let err = store
        .register("alice", "secret1", alice_profile())
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateUsername(_)));
    assert_eq!(store.account_count().unwrap(), 1);
}

#[test]
fn partial_profile_update_is_not_merged() {
    let dir = TempDir::new().unwrap();
    let paths = StorePaths::from_root(dir.path().to_path_buf());
    let store = FileCredentialStore::new(&paths, options());
    store.initialize().unwrap();
    store.register("alice", "secret1", alice_profile()).unwrap();

    let p2 = Profile {
        last_name: "Anderson".into(),
        contact_number: "0987654321".into(),
        ..Profile::default()
    };
    store.update_profile("alice", p2.clone()).unwrap();
    assert_eq!(store.profile("alice").unwrap(), Some(p2));
}

#[test]
fn full_app_flow_across_restarts() {
    let dir = TempDir::new().unwrap();
    let paths = StorePaths::from_root(dir.path().to_path_buf());
    let open = || {
        let store = FileCredentialStore::new(&paths, options());
        let sessions = SessionStore::new(LocalStorage::new(paths.session.clone()));
        let mut service = AccountService::new(store, sessions);
        service.start().unwrap();
        service
    };

    let mut app = open();
    assert!(!app.session().logged_in);
    app.submit_registration(&Registration {
        username: "alice".into(),
        password: Zeroizing::new("secret1".into()),
        profile: alice_profile(),
    })
    .unwrap();

    assert!(matches!(
        app.submit_login("alice", "nope"),
        Err(AccountError::InvalidCredentials)
    ));
    app.submit_login("alice", "secret1").unwrap();

    let mut app = open();
    assert_eq!(app.session().username(), Some("alice"));

    let mut edited = alice_profile();
    edited.first_name = "Alicia".into();
    app.save_profile(edited.clone()).unwrap();

    let mut app = open();
    assert_eq!(
        app.session().user.as_ref().map(|u| &u.profile),
        Some(&edited)
    );
    app.logout().unwrap();

    let app = open();
    assert!(!app.session().logged_in);
    assert_eq!(app.store().profile("alice").unwrap(), Some(edited));
}
