//! Session-aware HTTP client for the cashback platform: bearer annotation, single-flight token
//! refresh with exactly-once retries, and a switchable simulated backend in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod annotate;
pub mod api;
pub mod auth;
pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod notify;
pub mod obs;
pub mod session;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::time::Duration as StdDuration;
	// self
	use crate::{
		api::ApiClient,
		auth::CredentialPair,
		backend::{BackendMode, BackendSelector, LiveBackend, SimulatedBackend},
		client::ReqwestSessionClient,
		http::ReqwestHttpClient,
		notify::RecordingSurface,
		session::Session,
		store::MemoryStore,
	};

	/// Session client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = ReqwestSessionClient;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.timeout(StdDuration::from_secs(5))
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds an isolated in-memory session, optionally seeded with a credential pair.
	pub fn test_session(seed: Option<(&str, &str)>) -> Arc<Session> {
		let session = Session::new(Arc::new(MemoryStore::default()));

		if let Some((access, refresh)) = seed {
			session
				.set(CredentialPair::new(access, refresh))
				.expect("Seeding the in-memory session should succeed.");
		}

		Arc::new(session)
	}

	/// Constructs a [`ReqwestTestClient`] pointed at `base_url` and sharing `session`.
	pub fn build_reqwest_test_client(base_url: &str, session: Arc<Session>) -> ReqwestTestClient {
		let base_url = Url::parse(base_url).expect("Mock server URL should parse successfully.");

		ReqwestSessionClient::with_http_client(base_url, session, test_reqwest_http_client())
	}

	/// Constructs an [`ApiClient`] with both backends wired, a recording error surface, and the
	/// requested starting mode. The simulated backend answers without latency.
	pub fn build_test_api(
		base_url: &str,
		session: Arc<Session>,
		mode: BackendMode,
	) -> (ApiClient, Arc<RecordingSurface>) {
		let client = Arc::new(build_reqwest_test_client(base_url, session.clone()));
		let live = Arc::new(LiveBackend::new(client));
		let simulated = Arc::new(SimulatedBackend::new(StdDuration::ZERO));
		let selector = BackendSelector::new(mode, live, simulated);
		let surface = Arc::new(RecordingSurface::default());
		let api = ApiClient::with_selector(session, selector, surface.clone());

		(api, surface)
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
