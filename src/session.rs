//! Injectable credential session shared by every request issued through one client.
//!
//! A [`Session`] owns the credential store, the per-token lifetimes applied on write, a
//! generation counter bumped by every write, and the single-flight refresh guard. Tests build
//! isolated sessions; hosts share one `Arc<Session>` between the live client and the API facade.

// self
use crate::{
	_prelude::*,
	auth::{CredentialLifetimes, CredentialPair, StoredCredentials, TokenSecret},
	store::{CredentialStore, MemoryStore},
};

/// Point-in-time view of the access credential used to dispatch one request.
#[derive(Clone, Debug)]
pub struct CredentialSnapshot {
	/// Credential generation observed together with the token.
	pub generation: u64,
	/// Access token valid at snapshot time, if any.
	pub access_token: Option<TokenSecret>,
}

/// Owned credential session.
pub struct Session {
	store: Arc<dyn CredentialStore>,
	lifetimes: CredentialLifetimes,
	generation: RwLock<u64>,
	refresh_guard: AsyncMutex<()>,
}
impl Session {
	/// Creates a session over the provided store using the default 7/30 day lifetimes.
	pub fn new(store: Arc<dyn CredentialStore>) -> Self {
		Self {
			store,
			lifetimes: CredentialLifetimes::default(),
			generation: RwLock::new(0),
			refresh_guard: AsyncMutex::new(()),
		}
	}

	/// Creates a session backed by a fresh [`MemoryStore`].
	pub fn in_memory() -> Self {
		Self::new(Arc::new(MemoryStore::default()))
	}

	/// Overrides the lifetimes applied to newly stored pairs.
	pub fn with_lifetimes(mut self, lifetimes: CredentialLifetimes) -> Self {
		self.lifetimes = lifetimes;

		self
	}

	/// Lifetimes applied to newly stored pairs.
	pub fn lifetimes(&self) -> CredentialLifetimes {
		self.lifetimes
	}

	/// Returns the stored pair when both tokens are present and unexpired.
	pub fn get(&self) -> Result<Option<CredentialPair>> {
		let _generation = self.generation.read();

		Ok(self.store.load()?.pair_at(OffsetDateTime::now_utc()))
	}

	/// Returns the current access token, if present and unexpired.
	pub fn access_token(&self) -> Result<Option<TokenSecret>> {
		let _generation = self.generation.read();

		Ok(self.store.load()?.access_at(OffsetDateTime::now_utc()).cloned())
	}

	/// Returns the current refresh token, if present and unexpired.
	pub fn refresh_token(&self) -> Result<Option<TokenSecret>> {
		let _generation = self.generation.read();

		Ok(self.store.load()?.refresh_at(OffsetDateTime::now_utc()).cloned())
	}

	/// Stores a freshly issued pair, replacing both tokens atomically.
	pub fn set(&self, pair: CredentialPair) -> Result<()> {
		let mut generation = self.generation.write();
		let issued = StoredCredentials::issue(pair, self.lifetimes, OffsetDateTime::now_utc());

		self.store.replace(issued)?;
		*generation += 1;

		Ok(())
	}

	/// Removes both tokens unconditionally.
	pub fn clear(&self) -> Result<()> {
		let mut generation = self.generation.write();
		let result = self.store.clear();

		*generation += 1;

		result.map_err(Error::from)
	}

	/// Returns `true` while an unexpired access or refresh token is stored.
	pub fn is_authenticated(&self) -> bool {
		let now = OffsetDateTime::now_utc();
		let _generation = self.generation.read();

		self.store
			.load()
			.map(|stored| stored.access_at(now).is_some() || stored.refresh_at(now).is_some())
			.unwrap_or(false)
	}

	/// Current credential generation.
	pub fn generation(&self) -> u64 {
		*self.generation.read()
	}

	/// Reads the access token together with its generation. Never fails: a store read error is
	/// logged and treated as an absent token.
	pub fn snapshot(&self) -> CredentialSnapshot {
		let generation = self.generation.read();
		let access_token = match self.store.load() {
			Ok(stored) => stored.access_at(OffsetDateTime::now_utc()).cloned(),
			Err(e) => {
				tracing::warn!(error = %e, "credential store read failed; sending unauthenticated");

				None
			},
		};

		CredentialSnapshot { generation: *generation, access_token }
	}

	pub(crate) fn refresh_guard(&self) -> &AsyncMutex<()> {
		&self.refresh_guard
	}
}
impl Debug for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session")
			.field("lifetimes", &self.lifetimes)
			.field("generation", &self.generation())
			.finish()
	}
}
