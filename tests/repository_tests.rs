//! End-to-end repository tests over a real sqlite database file.

use std::sync::Arc;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use userstore::config::SecurityConfig;
use userstore::entities::tokens;
use userstore::{Argon2Hasher, AuthError, AuthUser, Filter, NewUser, Store};

fn temp_db_url() -> String {
    let db_path = std::env::temp_dir().join(format!("userstore-test-{}.db", uuid::Uuid::new_v4()));
    format!("sqlite:{}", db_path.display())
}

async fn test_store() -> Store {
    // Minimum legal Argon2 costs; these tests exercise the flow, not the KDF.
    let hasher = Arc::new(Argon2Hasher::with_config(SecurityConfig {
        argon2_memory_cost_kib: 8,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
    }));
    Store::with_pool_options(&temp_db_url(), 5, 1, hasher)
        .await
        .expect("failed to open test store")
}

#[tokio::test]
async fn create_assigns_id_hashes_password_and_issues_token() {
    let store = test_store().await;
    let repo = store.users();

    let user = repo
        .create(NewUser::with_username("alice").password("secret"))
        .await
        .unwrap();

    assert!(user.id > 0);
    assert_eq!(user.get_username(), "alice");
    assert!(!user.time_created.is_empty());
    assert_ne!(user.password, "secret");

    assert!(repo.verify_password("alice", "secret").await.unwrap());
    assert!(!repo.verify_password("alice", "wrong").await.unwrap());

    let token = repo.token(&user).await.unwrap().expect("token missing");
    assert_eq!(token.user_id, user.id);
    assert_eq!(token.user_table, "users");
    assert_eq!(token.key.len(), 64);

    // Exactly one token row per created user.
    let rows = tokens::Entity::find()
        .filter(tokens::Column::UserTable.eq("users"))
        .filter(tokens::Column::UserId.eq(user.id))
        .all(&store.conn)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn both_variants_coexist_in_one_store() {
    let store = test_store().await;

    let alice = store
        .users()
        .create(NewUser::with_username("alice"))
        .await
        .unwrap();
    let bob = store
        .email_users()
        .create(NewUser::with_email("bob@example.com"))
        .await
        .unwrap();

    // Each variant table has its own id sequence, so the first row of each
    // gets the same id. Token rows must still stay distinct.
    assert_eq!(alice.id, bob.id);

    let alice_token = store
        .users()
        .token(&alice)
        .await
        .unwrap()
        .expect("token missing for username variant");
    let bob_token = store
        .email_users()
        .token(&bob)
        .await
        .unwrap()
        .expect("token missing for email variant");

    assert_eq!(alice_token.user_table, "users");
    assert_eq!(bob_token.user_table, "email_users");
    assert_ne!(alice_token.id, bob_token.id);
    assert_ne!(alice_token.key, bob_token.key);
}

#[tokio::test]
async fn create_without_password_stores_unusable_sentinel() {
    let store = test_store().await;
    let repo = store.users();

    let user = repo
        .create(NewUser::with_username("svc-account"))
        .await
        .unwrap();

    assert!(user.password.starts_with('!'));
    assert!(!repo.verify_password("svc-account", "").await.unwrap());
    assert!(!repo.verify_password("svc-account", "anything").await.unwrap());
}

#[tokio::test]
async fn get_uses_or_semantics_across_filters() {
    let store = test_store().await;
    let repo = store.users();

    repo.create(NewUser::with_username("alice").password("secret"))
        .await
        .unwrap();

    let by_username = repo
        .get(&[Filter::eq("username", "alice")])
        .await
        .unwrap()
        .expect("user not found by username");
    assert_eq!(by_username.username, "alice");

    // The email disjunct matches nothing, but the username one does.
    let by_or = repo
        .get(&[
            Filter::eq("username", "alice"),
            Filter::eq("email", "nobody@example.com"),
        ])
        .await
        .unwrap()
        .expect("user not found with OR filters");
    assert_eq!(by_or.id, by_username.id);

    let none = repo
        .get(&[Filter::eq("username", "nobody")])
        .await
        .unwrap();
    assert!(none.is_none());
}

#[tokio::test]
async fn ambiguous_lookup_is_a_multiplicity_error() {
    let store = test_store().await;
    let repo = store.users();

    repo.create(NewUser::with_username("alice")).await.unwrap();
    repo.create(NewUser::with_username("bob")).await.unwrap();

    let err = repo
        .get(&[Filter::eq("is_active", true)])
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::MultipleRecords));
}

#[tokio::test]
async fn get_rejects_empty_and_unknown_filters() {
    let store = test_store().await;
    let repo = store.users();

    let empty = repo.get(&[]).await.unwrap_err();
    assert!(matches!(empty, AuthError::Validation(_)));

    let unknown = repo
        .get(&[Filter::eq("favorite_color", "blue")])
        .await
        .unwrap_err();
    assert!(matches!(unknown, AuthError::Validation(_)));
}

#[tokio::test]
async fn get_by_natural_key_matches_identity_filter() {
    let store = test_store().await;
    let repo = store.users();

    let created = repo
        .create(NewUser::with_username("alice").password("secret"))
        .await
        .unwrap();

    let by_key = repo
        .get_by_natural_key("alice")
        .await
        .unwrap()
        .expect("natural key lookup failed");
    let by_filter = repo
        .get(&[Filter::eq("username", "alice")])
        .await
        .unwrap()
        .unwrap();

    assert_eq!(by_key.id, created.id);
    assert_eq!(by_key.id, by_filter.id);
    assert!(repo.get_by_natural_key("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn email_variant_uses_email_as_natural_key() {
    let store = test_store().await;
    let repo = store.email_users();

    let user = repo
        .create(NewUser::with_email("alice@example.com").password("secret"))
        .await
        .unwrap();

    assert_eq!(user.get_username(), "alice@example.com");
    assert!(user.id > 0);

    let found = repo
        .get_by_natural_key("alice@example.com")
        .await
        .unwrap()
        .expect("email lookup failed");
    assert_eq!(found.id, user.id);

    assert!(
        repo.verify_password("alice@example.com", "secret")
            .await
            .unwrap()
    );

    let token = repo.token(&user).await.unwrap().expect("token missing");
    assert_eq!(token.user_id, user.id);
}

#[tokio::test]
async fn create_requires_the_identity_field() {
    let store = test_store().await;

    let err = store
        .users()
        .create(NewUser::default().password("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));

    let err = store
        .email_users()
        .create(NewUser::with_username("alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));
}

#[tokio::test]
async fn duplicate_natural_key_propagates_as_database_error() {
    let store = test_store().await;
    let repo = store.users();

    repo.create(NewUser::with_username("alice")).await.unwrap();
    let err = repo
        .create(NewUser::with_username("alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Database(_)));
}

#[tokio::test]
async fn set_password_rotates_the_stored_hash() {
    let store = test_store().await;
    let repo = store.users();

    repo.create(NewUser::with_username("alice").password("old-secret"))
        .await
        .unwrap();

    repo.set_password("alice", "new-secret").await.unwrap();

    assert!(!repo.verify_password("alice", "old-secret").await.unwrap());
    assert!(repo.verify_password("alice", "new-secret").await.unwrap());

    let err = repo.set_password("ghost", "x").await.unwrap_err();
    assert!(matches!(err, AuthError::NotFound(_)));
}

#[tokio::test]
async fn absent_user_verifies_false() {
    let store = test_store().await;
    assert!(!store.users().verify_password("ghost", "x").await.unwrap());
}

#[tokio::test]
async fn token_keys_resolve_back_to_their_user() {
    let store = test_store().await;
    let repo = store.users();

    let user = repo
        .create(NewUser::with_username("alice"))
        .await
        .unwrap();
    let token = repo.token(&user).await.unwrap().unwrap();

    let resolved = store
        .tokens()
        .get_by_key(&token.key)
        .await
        .unwrap()
        .expect("token key did not resolve");
    assert_eq!(resolved.user_id, user.id);

    assert!(store.tokens().get_by_key("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn inactive_users_cannot_authenticate_but_still_verify() {
    let store = test_store().await;
    let repo = store.users();

    let user = repo
        .create(NewUser::with_username("suspended").password("secret").inactive())
        .await
        .unwrap();

    assert!(!user.can_authenticate());
    // check_password stays a pure hash comparison; gating on is_active is
    // the caller's decision.
    assert!(repo.verify_password("suspended", "secret").await.unwrap());
}

#[tokio::test]
async fn store_ping_works_with_default_hasher() {
    let store = Store::new(&temp_db_url())
        .await
        .expect("failed to open store");
    store.ping().await.unwrap();
}
