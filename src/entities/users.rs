use sea_orm::entity::prelude::*;

/// Username-identified user variant.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Natural key of this variant.
    #[sea_orm(unique)]
    pub username: String,

    pub email: Option<String>,

    /// Hash product of the configured hasher, never plaintext.
    pub password: String,

    pub is_active: bool,

    pub is_superuser: bool,

    /// RFC3339, set once at creation.
    pub time_created: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
