// crates.io
use httpmock::{Then, prelude::*};
use serde_json::json;
// self
use beatdrops::{_preludet::*, broker::Broker};

const BASIC_AUTH: &str = "Basic dGVzdC1jbGllbnQ6dGVzdC1zZWNyZXQ=";

fn json_reply(then: Then, status: u16, body: serde_json::Value) {
	then.status(status).header("content-type", "application/json").body(body.to_string());
}

fn broker(server: &MockServer) -> Arc<Broker> {
	build_test_broker(&server.base_url(), test_limiter())
}

#[tokio::test]
async fn client_credentials_uses_basic_auth_and_returns_the_token() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/token")
				.header("authorization", BASIC_AUTH)
				.form_urlencoded_tuple("grant_type", "client_credentials");
			json_reply(then, 200, json!({
				"access_token": "catalog-token",
				"token_type": "bearer",
				"expires_in": 3600
			}));
		})
		.await;
	let token = broker(&server)
		.client_credentials_token()
		.await
		.expect("Client credentials exchange should succeed.");

	mock.assert_async().await;

	assert_eq!(token.expose(), "catalog-token");
}

#[tokio::test]
async fn rejected_client_credentials_surface_as_upstream_auth() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			json_reply(then, 400, json!({
				"error": "invalid_client",
				"error_description": "Invalid client secret"
			}));
		})
		.await;
	let err = broker(&server)
		.client_credentials_token()
		.await
		.expect_err("Rejected credentials should fail the exchange.");

	mock.assert_async().await;

	assert!(matches!(err, Error::UpstreamAuth { .. }), "Unexpected error: {err:?}.");
}

#[tokio::test]
async fn unavailable_token_endpoint_is_upstream_auth_with_the_cause() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			json_reply(then, 503, json!({ "error": "temporarily_unavailable" }));
		})
		.await;
	let err = broker(&server)
		.client_credentials_token()
		.await
		.expect_err("Unavailable token endpoint should fail the exchange.");

	match err {
		Error::UpstreamAuth { reason } => assert!(
			reason.contains("temporarily_unavailable"),
			"Reason should carry the upstream cause, got `{reason}`."
		),
		other => panic!("Unexpected error: {other:?}."),
	}
}

#[tokio::test]
async fn unreachable_token_endpoint_is_upstream_auth() {
	let err = build_test_broker("http://127.0.0.1:9", test_limiter())
		.client_credentials_token()
		.await
		.expect_err("Unreachable token endpoint should fail the exchange.");

	assert!(matches!(err, Error::UpstreamAuth { .. }), "Unexpected error: {err:?}.");
}

#[tokio::test]
async fn authorization_code_exchange_returns_user_tokens() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/token")
				.header("authorization", BASIC_AUTH)
				.form_urlencoded_tuple("grant_type", "authorization_code")
				.form_urlencoded_tuple("code", "user-code")
				.form_urlencoded_tuple("redirect_uri", "http://localhost:3000/home");
			json_reply(then, 200, json!({
				"access_token": "user-access",
				"refresh_token": "user-refresh",
				"token_type": "bearer",
				"expires_in": 3600
			}));
		})
		.await;
	let tokens = broker(&server)
		.exchange_auth_code("user-code")
		.await
		.expect("Authorization code exchange should succeed.");

	mock.assert_async().await;

	assert_eq!(tokens.access_token.expose(), "user-access");
	assert_eq!(tokens.refresh_token.expose(), "user-refresh");
	assert_eq!(tokens.expires_in, 3600);

	let body = serde_json::to_value(&tokens).expect("Tokens should serialize.");

	assert_eq!(
		body,
		json!({ "accessToken": "user-access", "refreshToken": "user-refresh", "expiresIn": 3600 })
	);
}

#[tokio::test]
async fn invalid_authorization_code_is_upstream_auth() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			json_reply(then, 400, json!({
				"error": "invalid_grant",
				"error_description": "Invalid authorization code"
			}));
		})
		.await;
	let err = broker(&server)
		.exchange_auth_code("stale-code")
		.await
		.expect_err("Invalid code should fail the exchange.");

	assert!(matches!(err, Error::UpstreamAuth { .. }), "Unexpected error: {err:?}.");
}

#[tokio::test]
async fn refresh_returns_a_new_access_token() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/token")
				.form_urlencoded_tuple("grant_type", "refresh_token")
				.form_urlencoded_tuple("refresh_token", "user-refresh");
			json_reply(then, 200, json!({
				"access_token": "fresh-access",
				"token_type": "bearer",
				"expires_in": 1800
			}));
		})
		.await;
	let refreshed =
		broker(&server).refresh("user-refresh").await.expect("Refresh exchange should succeed.");

	mock.assert_async().await;

	assert_eq!(refreshed.access_token.expose(), "fresh-access");
	assert_eq!(refreshed.expires_in, 1800);
}

#[tokio::test]
async fn authorize_url_targets_the_accounts_service() {
	let server = MockServer::start_async().await;
	let request = broker(&server).start_authorization();
	let pairs = request.url.query_pairs().into_owned().collect::<HashMap<_, _>>();

	assert_eq!(request.url.path(), "/authorize");
	assert_eq!(request.state.len(), 16);
	assert_eq!(pairs.get("state"), Some(&request.state));
	assert_eq!(pairs.get("client_id").map(String::as_str), Some(TEST_CLIENT_ID));
	assert_eq!(pairs.get("response_type").map(String::as_str), Some("code"));
}
