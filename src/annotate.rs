//! Request annotation: attaches session credentials to outbound requests.

// crates.io
use http::{HeaderValue, header::AUTHORIZATION};
// self
use crate::{_prelude::*, auth::TokenSecret, http::ApiRequest};

/// Describes how to attach the current access token to an outbound request.
///
/// Annotation never fails and never blocks: it borrows the caller's pending request and returns
/// the copy that actually goes on the wire.
pub trait RequestAnnotator
where
	Self: Send + Sync,
{
	/// Produces the outbound copy of `request`, authenticated with `token` when present.
	fn annotate(&self, request: &ApiRequest, token: Option<&TokenSecret>) -> ApiRequest;
}

/// Default annotator emitting `Authorization: Bearer <token>`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BearerAnnotator;
impl RequestAnnotator for BearerAnnotator {
	fn annotate(&self, request: &ApiRequest, token: Option<&TokenSecret>) -> ApiRequest {
		let mut outbound = request.clone();
		let Some(token) = token else {
			return outbound;
		};

		match HeaderValue::from_str(&format!("Bearer {}", token.expose())) {
			Ok(mut value) => {
				value.set_sensitive(true);
				outbound.headers.insert(AUTHORIZATION, value);
			},
			Err(_) => {
				tracing::warn!(
					path = %request.path,
					"access token is not a valid header value; sending unauthenticated"
				);
			},
		}

		outbound
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn missing_token_leaves_request_untouched() {
		let request = ApiRequest::get("/offers");
		let outbound = BearerAnnotator.annotate(&request, None);

		assert!(outbound.headers.get(AUTHORIZATION).is_none());
		assert_eq!(outbound.headers, request.headers);
	}

	#[test]
	fn token_becomes_sensitive_bearer_header() {
		let request = ApiRequest::get("/auth/me");
		let token = TokenSecret::new("a1");
		let outbound = BearerAnnotator.annotate(&request, Some(&token));
		let header = outbound.headers.get(AUTHORIZATION).expect("Bearer header should be set.");

		assert_eq!(header, "Bearer a1");
		assert!(header.is_sensitive());
		assert!(request.headers.get(AUTHORIZATION).is_none());
	}

	#[test]
	fn unencodable_token_is_dropped() {
		let token = TokenSecret::new("line\nbreak");
		let outbound = BearerAnnotator.annotate(&ApiRequest::get("/auth/me"), Some(&token));

		assert!(outbound.headers.get(AUTHORIZATION).is_none());
	}
}
