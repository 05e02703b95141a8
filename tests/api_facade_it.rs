#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use cashback_session::{
	_preludet::*,
	auth::{CredentialPair, LoginRequest, Role},
	backend::BackendMode,
	notify::FailureKind,
};

fn login_payload() -> serde_json::Value {
	json!({
		"user": {
			"id": "u-2001",
			"name": "Pat Publisher",
			"email": "publisher@example.com",
			"role": "publisher"
		},
		"accessToken": "a1",
		"refreshToken": "r1"
	})
}

#[tokio::test]
async fn login_stores_pair_and_authenticates_later_calls() {
	let server = MockServer::start_async().await;
	let login = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/auth/login")
				.header_missing("authorization")
				.json_body(json!({ "email": "publisher@example.com", "password": "password123" }));
			then.status(200).json_body(login_payload());
		})
		.await;
	let dashboard = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/dashboard/publisher").header("authorization", "Bearer a1");
			then.status(200).json_body(json!({
				"role": "publisher",
				"balance": 1280.0,
				"pending": 310.4,
				"clicks": 9412,
				"conversions": 221
			}));
		})
		.await;
	let session = test_session(None);
	let (api, surface) = build_test_api(&server.url("/api"), session.clone(), BackendMode::Live);
	let user = api
		.login(&LoginRequest::new("publisher@example.com", "password123"))
		.await
		.expect("Live login should succeed.");

	assert_eq!(user.role, Role::Publisher);
	assert_eq!(
		session.get().expect("Session should be readable."),
		Some(CredentialPair::new("a1", "r1"))
	);

	let stats = api.dashboard(Role::Publisher).await.expect("Dashboard should load.");

	assert_eq!(stats.clicks, 9_412);
	assert!(surface.events().is_empty());

	login.assert_calls_async(1).await;
	dashboard.assert_calls_async(1).await;
}

#[tokio::test]
async fn simulated_login_validates_without_network() {
	let server = MockServer::start_async().await;
	let anything = server
		.mock_async(|_, then| {
			then.status(500);
		})
		.await;
	let (api, surface) =
		build_test_api(&server.url("/api"), test_session(None), BackendMode::Simulated);
	let err = api
		.login(&LoginRequest::new("bad@x.com", "short"))
		.await
		.expect_err("Invalid input should be rejected locally.");
	let events = surface.drain();

	assert!(matches!(err, Error::Validation { .. }));
	assert_eq!(events.len(), 1);
	assert_eq!(events[0].kind, FailureKind::Validation);
	assert_eq!(events[0].message, err.user_message());
	assert!(!api.is_authenticated());

	anything.assert_calls_async(0).await;
}

#[tokio::test]
async fn logout_clears_locally_even_when_backend_fails() {
	let server = MockServer::start_async().await;
	let logout = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/auth/logout")
				.header("authorization", "Bearer a1")
				.json_body(json!({ "refreshToken": "r1" }));
			then.status(503).json_body(json!({ "message": "Maintenance" }));
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh-token");
			then.status(200).json_body(json!({ "accessToken": "a2", "refreshToken": "r2" }));
		})
		.await;
	let session = test_session(Some(("a1", "r1")));
	let (api, surface) = build_test_api(&server.url("/api"), session.clone(), BackendMode::Live);

	api.logout().await.expect("Logout should succeed locally.");

	assert!(!session.is_authenticated());
	assert_eq!(session.get().expect("Session should be readable."), None);
	assert!(surface.events().is_empty());

	logout.assert_calls_async(1).await;
	refresh.assert_calls_async(0).await;
}

#[tokio::test]
async fn each_failed_call_publishes_exactly_one_event() {
	let server = MockServer::start_async().await;
	let offers = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/offers");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh-token");
			then.status(401);
		})
		.await;
	let (api, surface) =
		build_test_api(&server.url("/api"), test_session(Some(("a1", "r1"))), BackendMode::Live);
	let err = api.list_offers().await.expect_err("A failed refresh should expire the session.");
	let events = surface.drain();

	assert!(err.is_session_expired());
	assert_eq!(events.len(), 1);
	assert_eq!(events[0].operation, "list_offers");
	assert_eq!(events[0].kind, FailureKind::SessionExpired);
	assert!(!api.is_authenticated());

	offers.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;
}

#[tokio::test]
async fn unreachable_live_backend_surfaces_transport_error() {
	let (api, surface) =
		build_test_api("http://127.0.0.1:1/api", test_session(None), BackendMode::Live);
	let err = api.list_offers().await.expect_err("Nothing listens on the discard port.");
	let events = surface.drain();

	assert!(matches!(err, Error::Transport(_)));
	assert_eq!(events.len(), 1);
	assert_eq!(events[0].kind, FailureKind::Transport);
	assert_eq!(api.mode(), BackendMode::Live);
}

#[tokio::test]
async fn mode_switch_applies_to_the_next_call() {
	let server = MockServer::start_async().await;
	let offers = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/offers");
			then.status(200).json_body(json!([
				{ "id": "o-9", "title": "Live only", "merchant": "Edge", "cashbackRate": 2.5 }
			]));
		})
		.await;
	let (api, _) = build_test_api(&server.url("/api"), test_session(None), BackendMode::Live);
	let live = api.list_offers().await.expect("Live offers should load.");

	api.set_mode(BackendMode::Simulated);

	let simulated = api.list_offers().await.expect("Simulated offers should load.");

	assert_eq!(live.len(), 1);
	assert!(live[0].active);
	assert!(simulated.iter().all(|offer| offer.id != "o-9"));

	offers.assert_calls_async(1).await;
}
