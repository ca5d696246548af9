//! The abstract user contract and its bindings to the shipped variants.
//!
//! `AuthUser` is the storage-independent contract every variant satisfies;
//! `UserVariant` ties a variant to its sea-orm entity so the repository can
//! stay generic over which attribute serves as the natural key. Because the
//! contract is a trait, only concrete variants can ever be constructed.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Set};

use crate::entities::{email_users, users};
use crate::error::AuthError;
use crate::hasher::{HashError, Hasher};

/// Shared shape and behavior of any user variant.
pub trait AuthUser {
    /// Surrogate id, 0 until the record has been persisted.
    fn id(&self) -> i32;
    fn password_hash(&self) -> &str;
    fn is_active(&self) -> bool;
    fn is_superuser(&self) -> bool;
    /// RFC3339 creation timestamp, immutable after creation.
    fn time_created(&self) -> &str;
    /// Value of the variant's designated natural-key attribute.
    fn identity(&self) -> &str;
    /// Replaces the in-memory hash; callers persist separately via `save`.
    fn set_password_hash(&mut self, hash: String);

    fn get_username(&self) -> &str {
        self.identity()
    }

    /// Semantic alias for lookup-by-identity use cases.
    fn natural_key(&self) -> Option<&str> {
        Some(self.identity())
    }

    /// Pure predicate gating authentication.
    fn can_authenticate(&self) -> bool {
        self.is_active()
    }

    /// Compares `raw` against the stored hash. A mismatch is `Ok(false)`;
    /// only a malformed hash errors.
    fn check_password(&self, hasher: &dyn Hasher, raw: &str) -> Result<bool, HashError> {
        hasher.verify_password(raw, self.password_hash())
    }

    /// Replaces the stored hash with a fresh hash of `raw`. In-memory only.
    fn set_password(&mut self, hasher: &dyn Hasher, raw: &str) -> Result<(), HashError> {
        let hash = hasher.make_password(Some(raw))?;
        self.set_password_hash(hash);
        Ok(())
    }

    /// Stores the sentinel hash no plaintext can verify against. Used for
    /// accounts without a settable credential.
    fn set_unusable_password(&mut self, hasher: &dyn Hasher) -> Result<(), HashError> {
        let hash = hasher.make_password(None)?;
        self.set_password_hash(hash);
        Ok(())
    }
}

/// Binds a user variant to its sea-orm entity.
#[async_trait]
pub trait UserVariant: AuthUser + Clone + Send + Sync + 'static {
    type Entity: EntityTrait<Model = Self, Column = Self::Column>;
    type Column: ColumnTrait + Send + Sync;

    /// Name of the one attribute serving as the natural key.
    const IDENTITY_FIELD: &'static str;

    /// Resolves a filter field name to its column, if the variant has it.
    fn column_for(field: &str) -> Option<Self::Column>;

    /// Builds an unsaved record from the create input. The password hash is
    /// assigned by the repository before the record is persisted.
    fn new_record(input: &NewUser) -> Result<Self, AuthError>;

    /// Persists in-memory state: inserts when the record has no id yet,
    /// updates otherwise. Returns the stored row.
    async fn save(&self, db: &DatabaseConnection) -> Result<Self, AuthError>;
}

/// Input for `UserRepository::create`. Identity fields are optional here so
/// one input type serves every variant; each variant validates its own
/// required field in `new_record`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
}

impl Default for NewUser {
    fn default() -> Self {
        Self {
            username: None,
            email: None,
            password: None,
            is_active: true,
            is_superuser: false,
        }
    }
}

impl NewUser {
    #[must_use]
    pub fn with_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn password(mut self, raw: impl Into<String>) -> Self {
        self.password = Some(raw.into());
        self
    }

    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    #[must_use]
    pub fn superuser(mut self) -> Self {
        self.is_superuser = true;
        self
    }
}

/// One equality predicate for repository lookups.
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub value: sea_orm::Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<sea_orm::Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl AuthUser for users::Model {
    fn id(&self) -> i32 {
        self.id
    }

    fn password_hash(&self) -> &str {
        &self.password
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    fn time_created(&self) -> &str {
        &self.time_created
    }

    fn identity(&self) -> &str {
        &self.username
    }

    fn set_password_hash(&mut self, hash: String) {
        self.password = hash;
    }
}

#[async_trait]
impl UserVariant for users::Model {
    type Entity = users::Entity;
    type Column = users::Column;

    const IDENTITY_FIELD: &'static str = "username";

    fn column_for(field: &str) -> Option<users::Column> {
        match field {
            "id" => Some(users::Column::Id),
            "username" => Some(users::Column::Username),
            "email" => Some(users::Column::Email),
            "is_active" => Some(users::Column::IsActive),
            "is_superuser" => Some(users::Column::IsSuperuser),
            _ => None,
        }
    }

    fn new_record(input: &NewUser) -> Result<Self, AuthError> {
        let username = input
            .username
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AuthError::Validation("username is required".into()))?;

        Ok(Self {
            id: 0,
            username: username.to_string(),
            email: input.email.clone(),
            password: String::new(),
            is_active: input.is_active,
            is_superuser: input.is_superuser,
            time_created: chrono::Utc::now().to_rfc3339(),
        })
    }

    async fn save(&self, db: &DatabaseConnection) -> Result<Self, AuthError> {
        let mut record = users::ActiveModel {
            username: Set(self.username.clone()),
            email: Set(self.email.clone()),
            password: Set(self.password.clone()),
            is_active: Set(self.is_active),
            is_superuser: Set(self.is_superuser),
            time_created: Set(self.time_created.clone()),
            ..Default::default()
        };

        if self.id == 0 {
            Ok(record.insert(db).await?)
        } else {
            record.id = Set(self.id);
            Ok(record.update(db).await?)
        }
    }
}

impl AuthUser for email_users::Model {
    fn id(&self) -> i32 {
        self.id
    }

    fn password_hash(&self) -> &str {
        &self.password
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    fn time_created(&self) -> &str {
        &self.time_created
    }

    fn identity(&self) -> &str {
        &self.email
    }

    fn set_password_hash(&mut self, hash: String) {
        self.password = hash;
    }
}

#[async_trait]
impl UserVariant for email_users::Model {
    type Entity = email_users::Entity;
    type Column = email_users::Column;

    const IDENTITY_FIELD: &'static str = "email";

    fn column_for(field: &str) -> Option<email_users::Column> {
        match field {
            "id" => Some(email_users::Column::Id),
            "email" => Some(email_users::Column::Email),
            "username" => Some(email_users::Column::Username),
            "is_active" => Some(email_users::Column::IsActive),
            "is_superuser" => Some(email_users::Column::IsSuperuser),
            _ => None,
        }
    }

    fn new_record(input: &NewUser) -> Result<Self, AuthError> {
        let email = input
            .email
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AuthError::Validation("email is required".into()))?;

        Ok(Self {
            id: 0,
            email: email.to_string(),
            username: input.username.clone(),
            password: String::new(),
            is_active: input.is_active,
            is_superuser: input.is_superuser,
            time_created: chrono::Utc::now().to_rfc3339(),
        })
    }

    async fn save(&self, db: &DatabaseConnection) -> Result<Self, AuthError> {
        let mut record = email_users::ActiveModel {
            email: Set(self.email.clone()),
            username: Set(self.username.clone()),
            password: Set(self.password.clone()),
            is_active: Set(self.is_active),
            is_superuser: Set(self.is_superuser),
            time_created: Set(self.time_created.clone()),
            ..Default::default()
        };

        if self.id == 0 {
            Ok(record.insert(db).await?)
        } else {
            record.id = Set(self.id);
            Ok(record.update(db).await?)
        }
    }
}
