//! Storage contracts and built-in credential store implementations.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::StoredCredentials};

/// Storage backend contract for the session's credential snapshot.
///
/// Operations are synchronous and idempotent. Implementations must make `replace` and `clear`
/// atomic with respect to `load` so no reader observes a half-written pair.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns the persisted snapshot (empty when nothing is stored).
	fn load(&self) -> Result<StoredCredentials, StoreError>;

	/// Replaces both slots wholesale.
	fn replace(&self, credentials: StoredCredentials) -> Result<(), StoreError>;

	/// Removes both slots unconditionally.
	fn clear(&self) -> Result<(), StoreError>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_client_error_with_source() {
		let store_error = StoreError::Backend { message: "disk full".into() };
		let client_error: Error = store_error.clone().into();

		assert!(matches!(client_error, Error::Storage(_)));
		assert!(client_error.to_string().contains("disk full"));

		let source = StdError::source(&client_error)
			.expect("Client error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
