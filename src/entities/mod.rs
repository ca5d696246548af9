pub mod prelude;

pub mod email_users;
pub mod tokens;
pub mod users;
