use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::tokens;
use crate::error::AuthError;

const TOKEN_KEY_LEN: usize = 64;

/// Issues and resolves the per-user authentication token rows.
#[derive(Clone)]
pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Issues the token row for a freshly created user. The unique index on
    /// `(user_table, user_id)` keeps the association one-to-one per variant.
    pub async fn create(
        &self,
        user_table: &str,
        user_id: i32,
    ) -> Result<tokens::Model, AuthError> {
        let record = tokens::ActiveModel {
            key: Set(generate_token_key()),
            user_table: Set(user_table.to_string()),
            user_id: Set(user_id),
            created: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        Ok(record.insert(&self.conn).await?)
    }

    /// Token issued for `user_id` in `user_table`, if any.
    pub async fn get_for_user(
        &self,
        user_table: &str,
        user_id: i32,
    ) -> Result<Option<tokens::Model>, AuthError> {
        Ok(tokens::Entity::find()
            .filter(tokens::Column::UserTable.eq(user_table))
            .filter(tokens::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await?)
    }

    /// Resolves a presented token key to its row.
    pub async fn get_by_key(&self, key: &str) -> Result<Option<tokens::Model>, AuthError> {
        Ok(tokens::Entity::find()
            .filter(tokens::Column::Key.eq(key))
            .one(&self.conn)
            .await?)
    }
}

/// Generate a random token key (64 character hex string)
#[must_use]
pub fn generate_token_key() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes
        .iter()
        .fold(String::with_capacity(TOKEN_KEY_LEN), |mut acc, b| {
            use std::fmt::Write;
            let _ = write!(acc, "{b:02x}");
            acc
        })
}
