//! Types the site keeps in the server-side session.

pub mod session;

pub use session::{AuthSession, CurrentUser, StoredAuth, keys as session_keys};
