use std::marker::PhantomData;
use std::sync::Arc;

use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityName, EntityTrait, QueryFilter, QuerySelect,
};
use tokio::task;
use tracing::info;

use crate::db::repositories::token::TokenRepository;
use crate::entities::tokens;
use crate::error::AuthError;
use crate::hasher::Hasher;
use crate::models::user::{Filter, NewUser, UserVariant};

/// Single point of access for creating and querying one user variant.
///
/// Holds the connection, the injected hasher, and the token repository used
/// for issuance at creation time. Each call is one logical unit of work;
/// there is no retry or transaction coordination in this layer.
pub struct UserRepository<V: UserVariant> {
    conn: DatabaseConnection,
    hasher: Arc<dyn Hasher>,
    tokens: TokenRepository,
    variant: PhantomData<V>,
}

impl<V: UserVariant> UserRepository<V> {
    pub fn new(conn: DatabaseConnection, hasher: Arc<dyn Hasher>, tokens: TokenRepository) -> Self {
        Self {
            conn,
            hasher,
            tokens,
            variant: PhantomData,
        }
    }

    /// Looks up the single record matching the disjunction (OR) of `filters`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MultipleRecords`] when more than one row matches,
    /// and [`AuthError::Validation`] for an empty filter list or a field the
    /// variant does not expose.
    pub async fn get(&self, filters: &[Filter]) -> Result<Option<V>, AuthError> {
        if filters.is_empty() {
            return Err(AuthError::Validation(
                "at least one filter is required".into(),
            ));
        }

        let mut condition = Condition::any();
        for filter in filters {
            let column = V::column_for(&filter.field).ok_or_else(|| {
                AuthError::Validation(format!("unknown filter field: {}", filter.field))
            })?;
            condition = condition.add(column.eq(filter.value.clone()));
        }

        // Two rows are enough to know the lookup was ambiguous.
        let mut matches = V::Entity::find()
            .filter(condition)
            .limit(2)
            .all(&self.conn)
            .await?;

        if matches.len() > 1 {
            return Err(AuthError::MultipleRecords);
        }

        Ok(matches.pop())
    }

    /// Creates a user: hashes the supplied password (or stores the unusable
    /// sentinel), persists the record, issues its token, and returns the
    /// reloaded row with generated fields populated.
    pub async fn create(&self, input: NewUser) -> Result<V, AuthError> {
        let password = input.password.clone();
        let mut user = V::new_record(&input)?;

        let hasher = Arc::clone(&self.hasher);
        // Argon2 is CPU-heavy; keep it off the async runtime.
        let hash = task::spawn_blocking(move || hasher.make_password(password.as_deref()))
            .await
            .map_err(|e| AuthError::Internal(format!("password hashing task panicked: {e}")))??;
        user.set_password_hash(hash);

        let user = user.save(&self.conn).await?;

        // Not atomic with the insert above: a failure here leaves a persisted
        // user without a token.
        let entity = V::Entity::default();
        self.tokens.create(entity.table_name(), user.id()).await?;

        // Reload so generated fields (the assigned id) come from the store.
        let user = self
            .get(&[Filter::eq("id", user.id())])
            .await?
            .ok_or_else(|| AuthError::Internal("created user missing on reload".into()))?;

        info!(
            id = user.id(),
            identity = user.identity(),
            "Created user and issued token"
        );

        Ok(user)
    }

    /// Looks up the record whose natural-key attribute equals `key`. The
    /// field name is resolved from the variant's configuration, so this is
    /// `get(&[Filter::eq(IDENTITY_FIELD, key)])`.
    pub async fn get_by_natural_key(&self, key: &str) -> Result<Option<V>, AuthError> {
        self.get(&[Filter::eq(V::IDENTITY_FIELD, key)]).await
    }

    /// Token issued for `user`, if any. The variant's table name is the
    /// discriminator that keeps token rows apart across variants.
    pub async fn token(&self, user: &V) -> Result<Option<tokens::Model>, AuthError> {
        let entity = V::Entity::default();
        self.tokens.get_for_user(entity.table_name(), user.id()).await
    }

    /// Verifies `raw` against the stored hash of the user identified by
    /// `natural_key`. An absent user verifies false.
    pub async fn verify_password(&self, natural_key: &str, raw: &str) -> Result<bool, AuthError> {
        let Some(user) = self.get_by_natural_key(natural_key).await? else {
            return Ok(false);
        };

        let hasher = Arc::clone(&self.hasher);
        let raw = raw.to_string();
        let is_valid = task::spawn_blocking(move || user.check_password(hasher.as_ref(), &raw))
            .await
            .map_err(|e| {
                AuthError::Internal(format!("password verification task panicked: {e}"))
            })??;

        Ok(is_valid)
    }

    /// Rehashes and persists a new password for an existing user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotFound`] when no user matches `natural_key`.
    pub async fn set_password(&self, natural_key: &str, raw: &str) -> Result<(), AuthError> {
        let mut user = self
            .get_by_natural_key(natural_key)
            .await?
            .ok_or_else(|| AuthError::NotFound(natural_key.to_string()))?;

        let hasher = Arc::clone(&self.hasher);
        let raw = raw.to_string();
        let hash = task::spawn_blocking(move || hasher.make_password(Some(&raw)))
            .await
            .map_err(|e| AuthError::Internal(format!("password hashing task panicked: {e}")))??;

        user.set_password_hash(hash);
        user.save(&self.conn).await?;

        Ok(())
    }
}
