//! Client configuration: base URL, backend mode, timeouts, and credential lifetimes.

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	auth::CredentialLifetimes,
	backend::BackendMode,
	error::ConfigError,
	session::Session,
	store::CredentialStore,
};

/// Environment variable overriding the API base URL.
pub const ENV_API_URL: &str = "CASHBACK_API_URL";
/// Environment variable selecting the simulated backend when truthy.
pub const ENV_USE_SIMULATED: &str = "CASHBACK_USE_SIMULATED";
/// Environment variable overriding the request timeout, in seconds.
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "CASHBACK_REQUEST_TIMEOUT_SECS";
/// Environment variable overriding the simulated latency, in milliseconds.
pub const ENV_SIMULATED_LATENCY_MS: &str = "CASHBACK_SIMULATED_LATENCY_MS";

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
/// Request timeout used when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);
/// Simulated latency used when none is configured.
pub const DEFAULT_SIMULATED_LATENCY: StdDuration = StdDuration::from_millis(500);

/// Validated client configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// Base URL every API path resolves against.
	pub base_url: Url,
	/// Backend used when the client starts.
	pub mode: BackendMode,
	/// Upper bound for one HTTP exchange.
	pub request_timeout: StdDuration,
	/// Delay applied by the simulated backend before answering.
	pub simulated_latency: StdDuration,
	/// Validity windows assigned to stored tokens.
	pub lifetimes: CredentialLifetimes,
}
impl ClientConfig {
	/// Starts a builder seeded with defaults.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}

	/// Reads overrides from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads overrides through `lookup`, falling back to defaults for unset variables.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut builder = Self::builder();

		if let Some(url) = lookup(ENV_API_URL) {
			builder = builder.base_url(url);
		}
		if let Some(flag) = lookup(ENV_USE_SIMULATED) {
			let simulated = parse_flag(&flag)
				.ok_or(ConfigError::InvalidEnv { name: ENV_USE_SIMULATED, value: flag })?;

			builder = builder.mode(if simulated { BackendMode::Simulated } else { BackendMode::Live });
		}
		if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
			let secs = parse_number(ENV_REQUEST_TIMEOUT_SECS, secs)?;

			builder = builder.request_timeout(StdDuration::from_secs(secs));
		}
		if let Some(millis) = lookup(ENV_SIMULATED_LATENCY_MS) {
			let millis = parse_number(ENV_SIMULATED_LATENCY_MS, millis)?;

			builder = builder.simulated_latency(StdDuration::from_millis(millis));
		}

		builder.build()
	}

	/// Creates a session over `store` using the configured lifetimes.
	pub fn session(&self, store: Arc<dyn CredentialStore>) -> Session {
		Session::new(store).with_lifetimes(self.lifetimes)
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Raw base URL; parsed and validated by [`ClientConfigBuilder::build`].
	pub base_url: Option<String>,
	/// Starting backend mode.
	pub mode: BackendMode,
	/// Upper bound for one HTTP exchange.
	pub request_timeout: StdDuration,
	/// Simulated backend latency.
	pub simulated_latency: StdDuration,
	/// Token validity windows.
	pub lifetimes: CredentialLifetimes,
}
impl ClientConfigBuilder {
	/// Sets the base URL.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());

		self
	}

	/// Sets the starting backend mode.
	pub fn mode(mut self, mode: BackendMode) -> Self {
		self.mode = mode;

		self
	}

	/// Sets the request timeout.
	pub fn request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Sets the simulated latency.
	pub fn simulated_latency(mut self, latency: StdDuration) -> Self {
		self.simulated_latency = latency;

		self
	}

	/// Sets the token lifetimes.
	pub fn lifetimes(mut self, lifetimes: CredentialLifetimes) -> Self {
		self.lifetimes = lifetimes;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let raw = self.base_url.ok_or(ConfigError::Missing { field: "base URL" })?;
		let base_url = Url::parse(raw.trim())
			.map_err(|source| ConfigError::InvalidUrl { value: raw.clone(), source })?;

		if base_url.cannot_be_a_base() {
			return Err(ConfigError::CannotBeBase { value: raw });
		}
		if self.request_timeout.is_zero() {
			return Err(ConfigError::ZeroTimeout);
		}

		Ok(ClientConfig {
			base_url,
			mode: self.mode,
			request_timeout: self.request_timeout,
			simulated_latency: self.simulated_latency,
			lifetimes: self.lifetimes,
		})
	}
}
impl Default for ClientConfigBuilder {
	fn default() -> Self {
		Self {
			base_url: Some(DEFAULT_BASE_URL.into()),
			mode: BackendMode::default(),
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			simulated_latency: DEFAULT_SIMULATED_LATENCY,
			lifetimes: CredentialLifetimes::default(),
		}
	}
}

fn parse_flag(value: &str) -> Option<bool> {
	match value.trim().to_ascii_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Some(true),
		"false" | "0" | "no" | "off" | "" => Some(false),
		_ => None,
	}
}

fn parse_number(name: &'static str, value: String) -> Result<u64, ConfigError> {
	value.trim().parse().map_err(|_| ConfigError::InvalidEnv { name, value })
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect::<HashMap<_, _>>();

		move |name| vars.get(name).cloned()
	}

	#[test]
	fn defaults_apply_without_overrides() {
		let config = ClientConfig::from_lookup(lookup(&[])).expect("Defaults should validate.");

		assert_eq!(config, ClientConfig::builder().build().expect("Defaults should validate."));
		assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
		assert_eq!(config.mode, BackendMode::Live);
		assert_eq!(config.request_timeout, StdDuration::from_secs(30));
	}

	#[test]
	fn environment_overrides_are_applied() {
		let config = ClientConfig::from_lookup(lookup(&[
			(ENV_API_URL, "https://api.cashback.test/v1"),
			(ENV_USE_SIMULATED, "Yes"),
			(ENV_REQUEST_TIMEOUT_SECS, "5"),
			(ENV_SIMULATED_LATENCY_MS, "0"),
		]))
		.expect("Overrides should validate.");

		assert_eq!(config.base_url.as_str(), "https://api.cashback.test/v1");
		assert_eq!(config.mode, BackendMode::Simulated);
		assert_eq!(config.request_timeout, StdDuration::from_secs(5));
		assert!(config.simulated_latency.is_zero());
	}

	#[test]
	fn malformed_values_are_rejected() {
		let flag = ClientConfig::from_lookup(lookup(&[(ENV_USE_SIMULATED, "maybe")]));
		let timeout = ClientConfig::from_lookup(lookup(&[(ENV_REQUEST_TIMEOUT_SECS, "soon")]));
		let zero = ClientConfig::from_lookup(lookup(&[(ENV_REQUEST_TIMEOUT_SECS, "0")]));

		assert!(matches!(flag, Err(ConfigError::InvalidEnv { name: ENV_USE_SIMULATED, .. })));
		assert!(matches!(timeout, Err(ConfigError::InvalidEnv { name: ENV_REQUEST_TIMEOUT_SECS, .. })));
		assert!(matches!(zero, Err(ConfigError::ZeroTimeout)));
	}

	#[test]
	fn builder_validates_base_url() {
		let invalid = ClientConfig::builder().base_url("not a url").build();
		let opaque = ClientConfig::builder().base_url("mailto:ops@example.com").build();
		let missing = ClientConfigBuilder { base_url: None, ..Default::default() }.build();

		assert!(matches!(invalid, Err(ConfigError::InvalidUrl { .. })));
		assert!(matches!(opaque, Err(ConfigError::CannotBeBase { .. })));
		assert!(matches!(missing, Err(ConfigError::Missing { field: "base URL" })));
	}
}
