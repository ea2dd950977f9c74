// crates.io
use httpmock::prelude::*;
// self
use oauth2_bearer::{
	auth::Scope,
	error::{Error, TokenError},
	http::ReqwestHttpExecutor,
	manager::{ClientCredentialsManager, TokenManager},
	url::Url,
};

const CLIENT_ID: &str = "client-credentials";
const CLIENT_SECRET: &str = "secret-credentials";
// base64("client-credentials:secret-credentials")
const BASIC_AUTH: &str = "Basic Y2xpZW50LWNyZWRlbnRpYWxzOnNlY3JldC1jcmVkZW50aWFscw==";

fn token_endpoint(server: &MockServer) -> Url {
	Url::parse(&server.url("/token")).expect("Mock token endpoint should parse successfully.")
}

fn build_manager(server: &MockServer) -> ClientCredentialsManager<ReqwestHttpExecutor> {
	ClientCredentialsManager::with_executor(
		Some(token_endpoint(server)),
		CLIENT_ID,
		CLIENT_SECRET,
		ReqwestHttpExecutor::default(),
	)
}

#[tokio::test]
async fn exchange_authenticates_with_basic_header_and_caches_the_token() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("authorization", BASIC_AUTH)
				.body_includes("grant_type=client_credentials");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"cached-token\",\"token_type\":\"bearer\",\"expires_in\":1800}",
			);
		})
		.await;
	let manager = build_manager(&server);
	let first = manager.get_token().await.expect("Initial token acquisition should succeed.");
	let second = manager.get_token().await.expect("Cached token read should succeed.");

	assert_eq!(first.expose(), "cached-token");
	assert_eq!(second.expose(), "cached-token");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn exchange_sends_scopes_space_joined_in_input_order() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.body_includes("scope=user+user%3Aadmin+specialScope");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"scoped-token\",\"token_type\":\"bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let scope = Scope::new(["user", "user:admin", "specialScope"])
		.expect("Scope fixture should be valid for the scope encoding test.");
	let manager = build_manager(&server).with_scope(scope);
	let token = manager.get_token().await.expect("Scoped acquisition should succeed.");

	assert_eq!(token.expose(), "scoped-token");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn concurrent_callers_produce_a_single_exchange() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"guard-token\",\"token_type\":\"bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let manager = build_manager(&server);
	let (first, second, third) =
		tokio::join!(manager.get_token(), manager.get_token(), manager.get_token());
	let first = first.expect("First concurrent call should succeed.");
	let second = second.expect("Second concurrent call should succeed.");
	let third = third.expect("Third concurrent call should succeed.");

	assert_eq!(first.expose(), "guard-token");
	assert_eq!(second.expose(), "guard-token");
	assert_eq!(third.expose(), "guard-token");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn reset_token_forces_a_fresh_exchange() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"rotating-token\",\"token_type\":\"bearer\",\"expires_in\":1800}",
			);
		})
		.await;
	let manager = build_manager(&server);

	manager.get_token().await.expect("Initial token acquisition should succeed.");
	manager.reset_token().await.expect("Reset should succeed.");
	manager.get_token().await.expect("Post-reset acquisition should succeed.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn token_endpoint_failure_maps_to_http_error_with_status_and_body() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(503)
				.header("content-type", "application/json")
				.body("{\"error\":\"temporarily_unavailable\"}");
		})
		.await;
	let manager = build_manager(&server);
	let err = manager.get_token().await.expect_err("503 exchange should fail.");

	match err {
		Error::Token(TokenError::Http(http)) => {
			assert_eq!(http.status, Some(503));
			assert_eq!(http.body.as_deref(), Some("{\"error\":\"temporarily_unavailable\"}"));
		},
		other => panic!("Expected a token HTTP error, got {other:?}."),
	}

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn malformed_token_payload_maps_to_parse_error() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "text/plain").body("not json");
		})
		.await;
	let manager = build_manager(&server);
	let err = manager.get_token().await.expect_err("Malformed payload should fail.");

	assert!(matches!(err, Error::Token(TokenError::ResponseParse { status: Some(200), .. })));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn missing_endpoint_fails_without_any_request() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200);
		})
		.await;
	let manager = ClientCredentialsManager::with_executor(
		None,
		CLIENT_ID,
		CLIENT_SECRET,
		ReqwestHttpExecutor::default(),
	);
	let err = manager.get_token().await.expect_err("Missing endpoint should fail.");

	assert!(matches!(err, Error::Token(TokenError::MissingEndpoint)));

	mock.assert_calls_async(0).await;
}
