//! Single-flight session refresh.
//!
//! Requests that receive a 401 call into [`SessionClient::recover`] with the credential
//! generation they were dispatched under. The first one to take the session's refresh guard
//! performs the `POST /auth/refresh-token` exchange; every request queued behind it finds the
//! generation moved once it gets the guard and reuses the rotated access token (or fails as
//! session-expired when the refresh cleared the session) without issuing its own refresh.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, TokenSecret},
	client::{REFRESH_PATH, RefreshTokenBody, SessionClient},
	http::{ApiRequest, HttpTransport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C> SessionClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Forces a refresh of the stored pair, sharing the single-flight guard with 401 recovery.
	pub async fn refresh_session(&self) -> Result<CredentialPair> {
		let _singleflight = self.session.refresh_guard().lock().await;

		self.refresh_locked().await
	}

	/// Resolves a 401 observed by a request dispatched under `dispatched_generation` and
	/// returns the access token its retry must carry.
	pub(crate) async fn recover(&self, dispatched_generation: u64) -> Result<TokenSecret> {
		let _singleflight = self.session.refresh_guard().lock().await;
		let current = self.session.snapshot();

		if current.generation != dispatched_generation {
			self.refresh_metrics.record_shared();

			tracing::debug!(
				dispatched_generation,
				current_generation = current.generation,
				"credentials changed while the request was in flight; reusing them"
			);

			return current.access_token.ok_or(Error::SessionExpired);
		}

		self.refresh_locked().await.map(|pair| pair.access_token)
	}

	/// Runs one refresh cycle. Callers must hold the session's refresh guard.
	async fn refresh_locked(&self) -> Result<CredentialPair> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh_locked");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				self.refresh_metrics.record_attempt();

				let refresh_token = match self.session.refresh_token() {
					Ok(Some(token)) => token,
					Ok(None) => {
						tracing::info!("no refresh token stored; ending session");

						return Err(self.expire());
					},
					Err(e) => {
						tracing::warn!(error = %e, "refresh token could not be read; ending session");

						return Err(self.expire());
					},
				};
				let pair = match self.exchange_refresh(&refresh_token).await {
					Ok(pair) => pair,
					Err(e) => {
						tracing::warn!(error = %e, "refresh exchange failed; ending session");

						return Err(self.expire());
					},
				};

				// The exchange consumed the old refresh token; it must not stay stored.
				if let Err(e) = self.session.set(pair.clone()) {
					tracing::error!(error = %e, "rotated credentials could not be stored; ending session");

					return Err(self.expire());
				}

				self.refresh_metrics.record_success();

				Ok(pair)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn exchange_refresh(&self, refresh_token: &TokenSecret) -> Result<CredentialPair> {
		let body = RefreshTokenBody { refresh_token: refresh_token.expose() };
		let request = ApiRequest::post(REFRESH_PATH).with_json(&body)?;

		self.send_anonymous(&request).await?.json()
	}

	/// Clears the session after an unrecoverable refresh and yields the error to surface.
	fn expire(&self) -> Error {
		self.refresh_metrics.record_failure();

		if let Err(e) = self.session.clear() {
			tracing::error!(error = %e, "failed to clear credentials after session expiry");
		}

		Error::SessionExpired
	}
}
