//! Cached upstream sessions keyed by opaque tokens.

pub mod persist;
pub mod store;
pub mod token;

pub use persist::PersistError;
pub use store::{SessionRecord, SessionStore};
pub use token::{clear_session_cookie, generate_token, session_cookie, session_token};
