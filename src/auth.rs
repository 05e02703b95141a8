//! Credential models, redacted secrets, and identity payloads exchanged with the auth endpoints.

pub mod credential;
pub mod identity;
pub mod secret;

pub use credential::*;
pub use identity::*;
pub use secret::*;
