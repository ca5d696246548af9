use sea_orm::entity::prelude::*;

/// Email-identified user variant.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "email_users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Natural key of this variant.
    #[sea_orm(unique)]
    pub email: String,

    pub username: Option<String>,

    pub password: String,

    pub is_active: bool,

    pub is_superuser: bool,

    pub time_created: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
