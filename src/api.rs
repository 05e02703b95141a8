//! Application-facing API: one method per logical operation, routed through the selected backend.
//!
//! [`ApiClient`] is the only place failures are published to the [`ErrorSurface`]. Each call
//! resolves its backend once, runs to completion there, and reports at most one event.

pub mod model;

pub use model::*;

// self
use crate::{
	_prelude::*,
	auth::{LoginRequest, Role, User},
	backend::{BackendMode, BackendSelector},
	notify::{ErrorSurface, FailureEvent},
	session::Session,
};
#[cfg(feature = "reqwest")]
use crate::{
	backend::{LiveBackend, SimulatedBackend},
	client::ReqwestSessionClient,
	config::ClientConfig,
};

/// Facade over the session, the backend selector, and the error surface.
pub struct ApiClient {
	session: Arc<Session>,
	selector: BackendSelector,
	surface: Arc<dyn ErrorSurface>,
}
impl ApiClient {
	/// Assembles a client from pre-built parts.
	pub fn with_selector(
		session: Arc<Session>,
		selector: BackendSelector,
		surface: Arc<dyn ErrorSurface>,
	) -> Self {
		Self { session, selector, surface }
	}

	/// Builds the reqwest-backed live backend and the simulated backend described by `config`.
	#[cfg(feature = "reqwest")]
	pub fn from_config(
		config: &ClientConfig,
		session: Arc<Session>,
		surface: Arc<dyn ErrorSurface>,
	) -> Result<Self> {
		let client = ReqwestSessionClient::new(
			config.base_url.clone(),
			session.clone(),
			config.request_timeout,
		)?;
		let live = Arc::new(LiveBackend::new(Arc::new(client)));
		let simulated = Arc::new(SimulatedBackend::new(config.simulated_latency));
		let selector = BackendSelector::new(config.mode, live, simulated);

		Ok(Self::with_selector(session, selector, surface))
	}

	/// Session shared with the live transport.
	pub fn session(&self) -> &Arc<Session> {
		&self.session
	}

	/// Backend mode used by calls starting now.
	pub fn mode(&self) -> BackendMode {
		self.selector.mode()
	}

	/// Switches the backend for subsequent calls.
	pub fn set_mode(&self, mode: BackendMode) {
		self.selector.set_mode(mode);
	}

	/// Whether an access token is currently stored.
	pub fn is_authenticated(&self) -> bool {
		self.session.is_authenticated()
	}

	/// Signs in and stores the returned credential pair.
	pub async fn login(&self, credentials: &LoginRequest) -> Result<User> {
		let result = async {
			let response = self.selector.select().login(credentials).await?;

			self.session.set(response.credentials)?;

			Ok::<_, Error>(response.user)
		}
		.await;

		self.surface_failure("login", result)
	}

	/// Signs out. Local credentials are cleared even when the backend call fails.
	pub async fn logout(&self) -> Result<()> {
		let backend = self.selector.select();
		let refresh_token = self.session.refresh_token().unwrap_or_else(|e| {
			tracing::warn!(error = %e, "refresh token could not be read during logout");

			None
		});

		if let Err(e) = backend.logout(refresh_token.as_ref()).await {
			tracing::warn!(error = %e, mode = %backend.mode(), "logout call failed; clearing locally");
		}

		self.surface_failure("logout", self.session.clear())
	}

	/// Fetches the signed-in profile.
	pub async fn current_user(&self) -> Result<User> {
		let result = self.selector.select().current_user().await;

		self.surface_failure("current_user", result)
	}

	/// Fetches the dashboard of `role`.
	pub async fn dashboard(&self, role: Role) -> Result<Dashboard> {
		let result = self.selector.select().dashboard(role).await;

		self.surface_failure("dashboard", result)
	}

	/// Lists the offers currently available.
	pub async fn list_offers(&self) -> Result<Vec<Offer>> {
		let result = self.selector.select().list_offers().await;

		self.surface_failure("list_offers", result)
	}

	/// Deletes the signed-in account and ends the session.
	pub async fn delete_account(&self) -> Result<()> {
		let result = async {
			self.selector.select().delete_account().await?;
			self.session.clear()
		}
		.await;

		self.surface_failure("delete_account", result)
	}

	fn surface_failure<T>(&self, operation: &'static str, result: Result<T>) -> Result<T> {
		if let Err(e) = &result {
			self.surface.publish(&FailureEvent::from_error(operation, e));
		}

		result
	}
}
impl Debug for ApiClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("session", &self.session)
			.field("selector", &self.selector)
			.finish()
	}
}
