pub use super::email_users::Entity as EmailUsers;
pub use super::tokens::Entity as Tokens;
pub use super::users::Entity as Users;
