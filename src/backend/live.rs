//! Live backend: routes logical operations through the session client.

// self
use crate::{
	_prelude::*,
	api::{Dashboard, Offer},
	auth::{LoginRequest, LoginResponse, Role, TokenSecret, User},
	backend::{Backend, BackendFuture, BackendMode},
	client::SessionClient,
	config::ENV_USE_SIMULATED,
	http::HttpTransport,
};

/// Profile endpoint path.
pub const PROFILE_PATH: &str = "/auth/me";
/// Offer listing endpoint path.
pub const OFFERS_PATH: &str = "/offers";
/// Account endpoint path.
pub const ACCOUNT_PATH: &str = "/users/me";

/// Backend issuing network calls against the configured API.
pub struct LiveBackend<C>
where
	C: ?Sized + HttpTransport,
{
	client: Arc<SessionClient<C>>,
}
impl<C> LiveBackend<C>
where
	C: ?Sized + HttpTransport,
{
	/// Wraps a session client.
	pub fn new(client: Arc<SessionClient<C>>) -> Self {
		Self { client }
	}

	/// Underlying session client.
	pub fn client(&self) -> &Arc<SessionClient<C>> {
		&self.client
	}

	/// Logs a setup hint when the API cannot be reached at all, then passes `result` through.
	fn diagnose<T>(&self, operation: &'static str, result: Result<T>) -> Result<T> {
		if matches!(&result, Err(Error::Transport(e)) if e.is_unreachable()) {
			tracing::warn!(
				operation,
				base_url = %self.client.base_url,
				"API backend is unreachable; start it or set {ENV_USE_SIMULATED}=true to use simulated data"
			);
		}

		result
	}
}
impl<C> Backend for LiveBackend<C>
where
	C: ?Sized + HttpTransport,
{
	fn mode(&self) -> BackendMode {
		BackendMode::Live
	}

	fn login<'a>(&'a self, credentials: &'a LoginRequest) -> BackendFuture<'a, LoginResponse> {
		Box::pin(async move {
			self.diagnose("login", self.client.exchange_login(credentials).await)
		})
	}

	fn logout<'a>(&'a self, refresh_token: Option<&'a TokenSecret>) -> BackendFuture<'a, ()> {
		Box::pin(async move {
			match refresh_token {
				Some(token) => self.diagnose("logout", self.client.revoke_remote(token).await),
				None => Ok(()),
			}
		})
	}

	fn current_user(&self) -> BackendFuture<'_, User> {
		Box::pin(async move {
			self.diagnose("current_user", self.client.get_json(PROFILE_PATH).await)
		})
	}

	fn dashboard(&self, role: Role) -> BackendFuture<'_, Dashboard> {
		Box::pin(async move {
			let path = format!("/dashboard/{role}");

			self.diagnose("dashboard", self.client.get_json(&path).await)
		})
	}

	fn list_offers(&self) -> BackendFuture<'_, Vec<Offer>> {
		Box::pin(async move {
			self.diagnose("list_offers", self.client.get_json(OFFERS_PATH).await)
		})
	}

	fn delete_account(&self) -> BackendFuture<'_, ()> {
		Box::pin(async move {
			self.diagnose("delete_account", self.client.delete(ACCOUNT_PATH).await)
		})
	}
}
impl<C> Debug for LiveBackend<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LiveBackend").field("client", &self.client).finish()
	}
}
