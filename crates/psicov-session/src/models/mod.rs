//! Data models for the session core

mod identity;
mod session;

pub use identity::{Identity, UserRole};
pub use session::AuthSession;
