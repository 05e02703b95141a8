//! Session-managed HTTP client: credential annotation plus exactly-once recovery from 401s.
//!
//! Each call to [`SessionClient::send`] walks a small per-request state machine. The request is
//! dispatched in [`Attempt::Initial`] with the access token read from the session snapshot; a
//! 401 in that state hands off to the single-flight refresh in [`refresh`], after which the
//! original request is re-annotated and dispatched once more in [`Attempt::Retried`]. Whatever
//! the retry returns is final.

pub mod refresh;

pub use refresh::*;

// crates.io
use http::StatusCode;
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	annotate::{BearerAnnotator, RequestAnnotator},
	auth::{LoginRequest, LoginResponse, TokenSecret},
	http::{ApiRequest, ApiResponse, HttpTransport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::Session,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Login endpoint path.
pub const LOGIN_PATH: &str = "/auth/login";
/// Refresh endpoint path.
pub const REFRESH_PATH: &str = "/auth/refresh-token";
/// Logout endpoint path.
pub const LOGOUT_PATH: &str = "/auth/logout";

#[cfg(feature = "reqwest")]
/// Session client specialized for the crate's default reqwest transport.
pub type ReqwestSessionClient = SessionClient<ReqwestHttpClient>;

/// Recovery state of one in-flight request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Attempt {
	/// First dispatch, remembering the credential generation it was annotated with.
	Initial { generation: u64 },
	/// Single replay after a refresh; not eligible for another refresh.
	Retried,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshTokenBody<'a> {
	pub(crate) refresh_token: &'a str,
}

/// Live-backend client bound to one [`Session`].
#[derive(Clone)]
pub struct SessionClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Transport used for every outbound request.
	pub http_client: Arc<C>,
	/// Session providing and receiving credentials.
	pub session: Arc<Session>,
	/// Base URL every request path resolves against.
	pub base_url: Url,
	/// Strategy attaching the access token to outbound requests.
	pub annotator: Arc<dyn RequestAnnotator>,
	/// Shared counters for refresh flow outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
}
impl<C> SessionClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(
		base_url: Url,
		session: Arc<Session>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			session,
			base_url,
			annotator: Arc::new(BearerAnnotator),
			refresh_metrics: Default::default(),
		}
	}

	/// Replaces the request annotator.
	pub fn with_annotator(mut self, annotator: Arc<dyn RequestAnnotator>) -> Self {
		self.annotator = annotator;

		self
	}

	/// Sends a session-managed request.
	///
	/// A 401 triggers at most one refresh-and-retry cycle; the caller only ever observes the
	/// retried response. Non-success statuses resolve to [`Error::Api`], an unrecoverable session
	/// to [`Error::SessionExpired`].
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: FlowKind = FlowKind::Request;

		let span = FlowSpan::new(KIND, "send");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.send_with_recovery(&request)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Sends a request without credentials and without 401 recovery.
	pub async fn send_anonymous(&self, request: &ApiRequest) -> Result<ApiResponse> {
		self.dispatch(request).await?.into_result()
	}

	/// Sends a request with the current credentials but without 401 recovery.
	pub async fn send_once(&self, request: &ApiRequest) -> Result<ApiResponse> {
		let snapshot = self.session.snapshot();
		let outbound = self.annotator.annotate(request, snapshot.access_token.as_ref());

		self.dispatch(&outbound).await?.into_result()
	}

	/// `GET`s `path` and decodes the JSON body.
	pub async fn get_json<T>(&self, path: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.send(ApiRequest::get(path)).await?.json()
	}

	/// `POST`s `body` to `path` and decodes the JSON response.
	pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		self.send(ApiRequest::post(path).with_json(body)?).await?.json()
	}

	/// `DELETE`s `path`, discarding the response body.
	pub async fn delete(&self, path: &str) -> Result<()> {
		self.send(ApiRequest::delete(path)).await.map(|_| ())
	}

	/// Exchanges login credentials for a profile and a credential pair.
	///
	/// The pair is returned, not stored; callers decide when the session begins.
	pub async fn exchange_login(&self, credentials: &LoginRequest) -> Result<LoginResponse> {
		const KIND: FlowKind = FlowKind::Login;

		let span = FlowSpan::new(KIND, "exchange_login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let request = ApiRequest::post(LOGIN_PATH).with_json(credentials)?;

				self.send_anonymous(&request).await?.json::<LoginResponse>()
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Tells the backend to invalidate `refresh_token`. Local credentials are left untouched.
	pub async fn revoke_remote(&self, refresh_token: &TokenSecret) -> Result<()> {
		const KIND: FlowKind = FlowKind::Logout;

		let span = FlowSpan::new(KIND, "revoke_remote");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let body = RefreshTokenBody { refresh_token: refresh_token.expose() };
				let request = ApiRequest::post(LOGOUT_PATH).with_json(&body)?;

				self.send_once(&request).await.map(|_| ())
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn send_with_recovery(&self, request: &ApiRequest) -> Result<ApiResponse> {
		let snapshot = self.session.snapshot();
		let mut attempt = Attempt::Initial { generation: snapshot.generation };
		let mut token = snapshot.access_token;

		loop {
			let outbound = self.annotator.annotate(request, token.as_ref());
			let response = self.dispatch(&outbound).await?;

			match attempt {
				Attempt::Initial { generation } if response.status == StatusCode::UNAUTHORIZED => {
					tracing::debug!(path = %request.path, "access token rejected; recovering session");

					token = Some(self.recover(generation).await?);
					attempt = Attempt::Retried;
				},
				Attempt::Retried if response.status == StatusCode::UNAUTHORIZED => {
					tracing::warn!(path = %request.path, "retried request rejected again");

					return response.into_result();
				},
				_ => return response.into_result(),
			}
		}
	}

	async fn dispatch(&self, outbound: &ApiRequest) -> Result<ApiResponse> {
		let url = outbound.resolve(&self.base_url)?;

		tracing::debug!(method = %outbound.method, %url, "dispatching request");

		Ok(self.http_client.execute(url, outbound).await?)
	}
}
#[cfg(feature = "reqwest")]
impl SessionClient<ReqwestHttpClient> {
	/// Creates a client with its own reqwest transport bounded by `timeout`.
	pub fn new(
		base_url: Url,
		session: Arc<Session>,
		timeout: std::time::Duration,
	) -> Result<Self> {
		let http_client = ReqwestHttpClient::with_timeout(timeout)?;

		Ok(Self::with_http_client(base_url, session, http_client))
	}
}
impl<C> Debug for SessionClient<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionClient")
			.field("base_url", &self.base_url.as_str())
			.field("session", &self.session)
			.finish()
	}
}
