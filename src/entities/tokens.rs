use sea_orm::entity::prelude::*;

/// Authentication token, one-to-one with a user. The token row owns the
/// link; the user side looks its token up through the token repository
/// instead of carrying a back-pointer.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Random 64-char hex key presented by clients.
    #[sea_orm(unique)]
    pub key: String,

    /// Table name of the owning variant. Variant tables have independent
    /// id sequences, so `user_id` alone does not identify a user.
    pub user_table: String,

    /// Id of the owning user row within `user_table`. `(user_table,
    /// user_id)` is unique, keeping the association one-to-one.
    pub user_id: i32,

    pub created: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
