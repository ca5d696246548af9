//! Embeddable user model layer: an abstract user contract, password hashing
//! delegation, and repositories for creating and retrieving user records plus
//! their one-to-one authentication tokens.
//!
//! The crate deliberately stops at the data-access boundary. Request handling,
//! session management, and token cryptography belong to the embedding
//! application; this layer only guarantees that every stored password is a
//! hash product and that every created user gets exactly one token row.

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod hasher;
pub mod models;

pub use config::Config;
pub use db::{Store, TokenRepository, UserRepository};
pub use error::AuthError;
pub use hasher::{Argon2Hasher, HashError, Hasher};
pub use models::user::{AuthUser, Filter, NewUser, UserVariant};
