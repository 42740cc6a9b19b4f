//! Session persistence for the bearer token.
//!
//! Sign-in itself happens in the auth collaborator; this module only stores
//! what it hands back. `Session` persists the token and identity to disk and
//! enforces expiry, so the API client can attach the bearer header without
//! re-prompting on every start.

pub mod session;

pub use session::{Session, SessionData};
