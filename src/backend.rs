//! Backend selection: one strategy per logical call, live or simulated.
//!
//! Every operation of the API facade asks the [`BackendSelector`] for a backend once, at the start
//! of the call. A live call that fails never falls back to simulated data mid-flight; the
//! failure is surfaced instead.

pub mod live;
pub mod simulated;

pub use live::LiveBackend;
pub use simulated::SimulatedBackend;

// self
use crate::{
	_prelude::*,
	api::{Dashboard, Offer},
	auth::{LoginRequest, LoginResponse, Role, TokenSecret, User},
	error::ConfigError,
};

/// Boxed future returned by [`Backend`] operations.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Where logical operations are routed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
	/// Network calls against the configured API.
	#[default]
	Live,
	/// In-process fixtures with simulated latency.
	Simulated,
}
impl BackendMode {
	/// Returns a stable label suitable for logs and configuration.
	pub const fn as_str(self) -> &'static str {
		match self {
			BackendMode::Live => "live",
			BackendMode::Simulated => "simulated",
		}
	}
}
impl Display for BackendMode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for BackendMode {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"live" => Ok(Self::Live),
			"simulated" | "mock" => Ok(Self::Simulated),
			_ => Err(ConfigError::InvalidMode { value: s.to_owned() }),
		}
	}
}

/// Logical operations shared by the live and simulated backends.
///
/// Both implementations resolve to the same `Result` shapes so callers cannot tell them apart
/// beyond [`Backend::mode`].
pub trait Backend
where
	Self: Send + Sync,
{
	/// Mode implemented by this backend.
	fn mode(&self) -> BackendMode;

	/// Exchanges login credentials for a profile and credential pair.
	fn login<'a>(&'a self, credentials: &'a LoginRequest) -> BackendFuture<'a, LoginResponse>;

	/// Ends the server-side session, when there is one to end.
	fn logout<'a>(&'a self, refresh_token: Option<&'a TokenSecret>) -> BackendFuture<'a, ()>;

	/// Fetches the signed-in profile.
	fn current_user(&self) -> BackendFuture<'_, User>;

	/// Fetches the dashboard of `role`.
	fn dashboard(&self, role: Role) -> BackendFuture<'_, Dashboard>;

	/// Lists the offers currently available.
	fn list_offers(&self) -> BackendFuture<'_, Vec<Offer>>;

	/// Deletes the signed-in account.
	fn delete_account(&self) -> BackendFuture<'_, ()>;
}

/// Chooses the backend for each logical call.
pub struct BackendSelector {
	mode: RwLock<BackendMode>,
	live: Arc<dyn Backend>,
	simulated: Arc<dyn Backend>,
}
impl BackendSelector {
	/// Creates a selector starting in `mode`.
	pub fn new(mode: BackendMode, live: Arc<dyn Backend>, simulated: Arc<dyn Backend>) -> Self {
		Self { mode: RwLock::new(mode), live, simulated }
	}

	/// Mode used for calls starting now.
	pub fn mode(&self) -> BackendMode {
		*self.mode.read()
	}

	/// Switches the mode for subsequent calls; calls already in flight keep their backend.
	pub fn set_mode(&self, mode: BackendMode) {
		let previous = std::mem::replace(&mut *self.mode.write(), mode);

		if previous != mode {
			tracing::info!(from = %previous, to = %mode, "backend mode switched");
		}
	}

	/// Resolves the backend for one logical call.
	pub fn select(&self) -> Arc<dyn Backend> {
		match self.mode() {
			BackendMode::Live => self.live.clone(),
			BackendMode::Simulated => self.simulated.clone(),
		}
	}
}
impl Debug for BackendSelector {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BackendSelector").field("mode", &self.mode()).finish()
	}
}
