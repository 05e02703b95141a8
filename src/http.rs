//! Transport primitives: replayable requests, buffered responses, and the HTTP client seam.
//!
//! [`ApiRequest`] is the pending, replayable description of an outbound call. The session
//! client never mutates it; annotation produces a fresh outbound copy per dispatch so the single
//! retry after a refresh replays exactly what the caller asked for. [`HttpTransport`] is the
//! crate's only dependency on an HTTP stack, with [`ReqwestHttpClient`] as the default.

// std
#[cfg(feature = "reqwest")] use std::time::Duration as StdDuration;
// crates.io
use http::{
	HeaderMap, HeaderName, HeaderValue, Method, StatusCode,
	header::{ACCEPT, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks able to execute buffered JSON requests.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by every
/// request issued through a session client, and the returned futures must be `Send`.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` to the fully resolved `url` and buffers the response.
	///
	/// Any received response, whatever its status, resolves to `Ok`; `Err` is reserved for
	/// failures where no response arrived.
	fn execute<'a>(&'a self, url: Url, request: &'a ApiRequest) -> TransportFuture<'a>;
}

/// Replayable description of an outbound call.
#[derive(Clone)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the configured base URL.
	pub path: String,
	/// Query string pairs.
	pub query: Vec<(String, String)>,
	/// Serialized JSON body, if any.
	pub body: Option<Vec<u8>>,
	/// Request headers (never includes credentials supplied by the session).
	pub headers: HeaderMap,
}
impl ApiRequest {
	/// Creates a request for `path` with JSON content negotiation.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		let mut headers = HeaderMap::new();

		headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

		Self { method, path: path.into(), query: Vec::new(), body: None, headers }
	}

	/// Shorthand for a `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::GET, path)
	}

	/// Shorthand for a `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::POST, path)
	}

	/// Shorthand for a `DELETE` request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::DELETE, path)
	}

	/// Serializes `body` as the JSON payload.
	pub fn with_json<B>(mut self, body: &B) -> Result<Self, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(body)?);
		self.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

		Ok(self)
	}

	/// Appends a query string pair.
	pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((key.into(), value.into()));

		self
	}

	/// Sets an extra header.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Resolves the request path and query against `base`.
	///
	/// `path` holds path segments only; query pairs go through [`ApiRequest::with_query`]. A path
	/// carrying `?` or `#` is rejected rather than percent-encoded into a segment.
	pub fn resolve(&self, base: &Url) -> Result<Url, ConfigError> {
		if self.path.contains(['?', '#']) {
			return Err(ConfigError::InvalidPath { path: self.path.clone() });
		}

		let mut url = base.clone();

		url.path_segments_mut()
			.map_err(|_| ConfigError::CannotBeBase { value: base.to_string() })?
			.pop_if_empty()
			.extend(self.path.split('/').filter(|segment| !segment.is_empty()));

		if !self.query.is_empty() {
			url.query_pairs_mut().extend_pairs(self.query.iter());
		}

		Ok(url)
	}
}
impl Debug for ApiRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiRequest")
			.field("method", &self.method)
			.field("path", &self.path)
			.field("query", &self.query)
			.field("has_body", &self.body.is_some())
			.finish()
	}
}

/// Fully buffered HTTP response.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// Response status.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Creates a response from its parts.
	pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: HeaderMap::new(), body: body.into() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Passes successful responses through and converts everything else into
	/// [`Error::Api`] carrying the server message, when present.
	pub fn into_result(self) -> Result<Self> {
		if self.is_success() {
			Ok(self)
		} else {
			Err(Error::Api { status: self.status.as_u16(), message: self.server_message() })
		}
	}

	/// Decodes the JSON body, reporting the failing path on mismatch.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| Error::Decode { status: self.status.as_u16(), source })
	}

	/// Extracts a human-readable message from `{ "message": .. }` or `{ "error": .. }` payloads.
	pub fn server_message(&self) -> Option<String> {
		let payload: serde_json::Value = serde_json::from_slice(&self.body).ok()?;
		let candidate = payload
			.get("message")
			.and_then(|value| value.as_str())
			.or_else(|| payload.get("error").and_then(|value| value.as_str()))
			.or_else(|| payload.pointer("/error/message").and_then(|value| value.as_str()))?
			.trim();

		(!candidate.is_empty()).then(|| candidate.to_owned())
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client enforcing `timeout` as the upper bound for every request.
	pub fn with_timeout(timeout: StdDuration) -> Result<Self, ConfigError> {
		Ok(Self(ReqwestClient::builder().timeout(timeout).build()?))
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	fn execute<'a>(&'a self, url: Url, request: &'a ApiRequest) -> TransportFuture<'a> {
		Box::pin(async move {
			let mut builder =
				self.0.request(request.method.clone(), url).headers(request.headers.clone());

			if let Some(body) = &request.body {
				builder = builder.body(body.clone());
			}

			let response = builder.send().await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse { status, headers, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn resolve_appends_path_to_base_segments() {
		let base = Url::parse("https://api.example.com/api").expect("Base URL should parse.");
		let request = ApiRequest::get("/offers/").with_query("page", "2");
		let url = request.resolve(&base).expect("Request path should resolve.");

		assert_eq!(url.as_str(), "https://api.example.com/api/offers?page=2");

		let slashed = Url::parse("https://api.example.com/api/").expect("Base URL should parse.");
		let url = ApiRequest::post("auth/refresh-token")
			.resolve(&slashed)
			.expect("Request path should resolve.");

		assert_eq!(url.as_str(), "https://api.example.com/api/auth/refresh-token");
	}

	#[test]
	fn resolve_rejects_inline_queries() {
		let base = Url::parse("https://api.example.com/api").expect("Base URL should parse.");

		for path in ["/offers?page=2", "/offers#top"] {
			assert!(matches!(
				ApiRequest::get(path).resolve(&base),
				Err(ConfigError::InvalidPath { path: ref p }) if p == path
			));
		}
	}

	#[test]
	fn extra_headers_survive_json_bodies() {
		let request = ApiRequest::post("/offers")
			.with_header(
				HeaderName::from_static("x-request-id"),
				HeaderValue::from_static("req-42"),
			)
			.with_json(&serde_json::json!({ "title": "Spring sale" }))
			.expect("Offer body should serialize.");

		let json = HeaderValue::from_static("application/json");

		assert_eq!(request.headers.get("x-request-id"), Some(&HeaderValue::from_static("req-42")));
		assert_eq!(request.headers.get(CONTENT_TYPE), Some(&json));
		assert_eq!(request.headers.get(ACCEPT), Some(&json));
	}

	#[test]
	fn resolve_rejects_opaque_bases() {
		let base = Url::parse("mailto:ops@example.com").expect("Opaque URL should parse.");

		assert!(matches!(
			ApiRequest::get("/offers").resolve(&base),
			Err(ConfigError::CannotBeBase { .. })
		));
	}

	#[test]
	fn server_message_reads_common_shapes() {
		let message = ApiResponse::new(StatusCode::BAD_REQUEST, r#"{"message":"Email taken"}"#);
		let error = ApiResponse::new(StatusCode::FORBIDDEN, r#"{"error":"Forbidden"}"#);
		let nested = ApiResponse::new(StatusCode::CONFLICT, r#"{"error":{"message":"Exists"}}"#);
		let blank = ApiResponse::new(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");

		assert_eq!(message.server_message().as_deref(), Some("Email taken"));
		assert_eq!(error.server_message().as_deref(), Some("Forbidden"));
		assert_eq!(nested.server_message().as_deref(), Some("Exists"));
		assert_eq!(blank.server_message(), None);
	}

	#[test]
	fn into_result_maps_failures() {
		let err = ApiResponse::new(StatusCode::UNPROCESSABLE_ENTITY, r#"{"message":"Bad"}"#)
			.into_result()
			.expect_err("A 422 response should be rejected.");

		assert!(matches!(err, Error::Api { status: 422, message: Some(ref m) } if m == "Bad"));
		assert!(ApiResponse::new(StatusCode::NO_CONTENT, "").into_result().is_ok());
	}

	#[test]
	fn json_reports_failing_path() {
		#[derive(Debug, Deserialize)]
		struct Payload {
			#[allow(dead_code)]
			count: u32,
		}

		let response = ApiResponse::new(StatusCode::OK, r#"{"count":"many"}"#);
		let err = response.json::<Payload>().expect_err("Mismatched payload should fail.");

		match err {
			Error::Decode { status, source } => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "count");
			},
			other => panic!("Unexpected error: {other:?}"),
		}
	}

	#[test]
	fn debug_hides_request_body() {
		let request = ApiRequest::post("/auth/login")
			.with_json(&serde_json::json!({ "password": "hunter22" }))
			.expect("Login body should serialize.");

		assert!(!format!("{request:?}").contains("hunter22"));
	}
}
