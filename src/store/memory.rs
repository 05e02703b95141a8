//! Thread-safe in-memory [`CredentialStore`] implementation for tests and non-persistent hosts.

// self
use crate::{
	_prelude::*,
	auth::StoredCredentials,
	store::{CredentialStore, StoreError},
};

/// Process-local storage backend; never fails.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<StoredCredentials>>);
impl CredentialStore for MemoryStore {
	fn load(&self) -> Result<StoredCredentials, StoreError> {
		Ok(self.0.read().clone())
	}

	fn replace(&self, credentials: StoredCredentials) -> Result<(), StoreError> {
		*self.0.write() = credentials;

		Ok(())
	}

	fn clear(&self) -> Result<(), StoreError> {
		*self.0.write() = StoredCredentials::default();

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::auth::{CredentialLifetimes, CredentialPair};

	#[test]
	fn replace_and_clear_are_idempotent() {
		let store = MemoryStore::default();
		let issued = StoredCredentials::issue(
			CredentialPair::new("access-1", "refresh-1"),
			CredentialLifetimes::default(),
			macros::datetime!(2025-11-10 12:00 UTC),
		);

		store.replace(issued.clone()).expect("Memory store replace should succeed.");
		store.replace(issued.clone()).expect("Repeated replace should succeed.");

		assert_eq!(store.load().expect("Memory store load should succeed."), issued);

		store.clear().expect("Memory store clear should succeed.");
		store.clear().expect("Repeated clear should succeed.");

		assert!(store.load().expect("Memory store load should succeed.").is_empty());
	}

	#[test]
	fn clones_share_state() {
		let store = MemoryStore::default();
		let shared = store.clone();

		store
			.replace(StoredCredentials::issue(
				CredentialPair::new("a", "r"),
				CredentialLifetimes::default(),
				OffsetDateTime::now_utc(),
			))
			.expect("Memory store replace should succeed.");

		assert!(!shared.load().expect("Memory store load should succeed.").is_empty());
	}
}
