//! Credential exchange against the token endpoint.
//!
//! [`TokenFetcher`] performs the `grant_type=client_credentials` POST through
//! the injected [`HttpExecutor`], authenticating with a Basic header built
//! from the client id/secret pair. Failures are never retried here; the
//! caller decides whether to reset and re-fetch.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	auth::Scope,
	error::{TokenError, TokenHttpError},
	http::{HttpExecutor, HttpRequest},
	obs,
};

const EXCHANGE_FAILED: &str = "Failed to request token";

/// Raw token payload returned by the token endpoint.
///
/// Both fields default when absent: a missing `expires_in` yields an
/// immediately invalid token rather than a parse failure.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenData {
	/// Issued access token value.
	#[serde(default)]
	pub access_token: String,
	/// Token lifetime in seconds.
	#[serde(default)]
	pub expires_in: i64,
}

/// Performs the client-credentials exchange via the injected executor.
pub struct TokenFetcher<E>
where
	E: ?Sized + HttpExecutor,
{
	endpoint: Option<Url>,
	client_id: String,
	client_secret: String,
	scope: Option<Scope>,
	executor: Arc<E>,
}
impl<E> TokenFetcher<E>
where
	E: ?Sized + HttpExecutor,
{
	/// Creates a fetcher for the provided endpoint and credential pair.
	///
	/// A `None` endpoint is accepted here and rejected at fetch time, so a
	/// manager can be constructed before its configuration is complete.
	pub fn new(
		endpoint: Option<Url>,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		executor: impl Into<Arc<E>>,
	) -> Self {
		Self {
			endpoint,
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			scope: None,
			executor: executor.into(),
		}
	}

	/// Attaches the scope values sent with every exchange.
	pub fn with_scope(mut self, scope: Scope) -> Self {
		self.scope = Some(scope);

		self
	}

	/// Configured token endpoint, if any.
	pub fn endpoint(&self) -> Option<&Url> {
		self.endpoint.as_ref()
	}

	/// Runs one credential exchange and returns the raw token payload.
	///
	/// Configuration problems (missing endpoint, malformed credentials) are
	/// raised before any network attempt.
	pub async fn fetch(&self) -> Result<TokenData, TokenError> {
		let endpoint = self.endpoint.clone().ok_or(TokenError::MissingEndpoint)?;
		let authorization = basic_authorization(&self.client_id, &self.client_secret)?;
		let mut fields = vec![("grant_type".to_owned(), "client_credentials".to_owned())];

		if let Some(scope) = self.scope.as_ref().filter(|scope| !scope.is_empty()) {
			fields.push(("scope".to_owned(), scope.encoded()));
		}

		let request =
			HttpRequest::new("POST", endpoint).header("Authorization", authorization).form(fields);

		obs::trace_request(&request.method, &request.url, &request.headers);

		let response = self.executor.execute(request).await.map_err(|err| TokenHttpError {
			message: EXCHANGE_FAILED.into(),
			status: err.status,
			body: err.body,
		})?;

		if !response.is_success() {
			return Err(TokenHttpError::from_response(
				EXCHANGE_FAILED,
				response.status,
				response.text(),
			)
			.into());
		}

		response.json::<TokenData>().map_err(|source| TokenError::ResponseParse {
			source,
			status: Some(response.status),
		})
	}
}
impl<E> Debug for TokenFetcher<E>
where
	E: ?Sized + HttpExecutor,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenFetcher")
			.field("endpoint", &self.endpoint)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &!self.client_secret.is_empty())
			.field("scope", &self.scope)
			.finish()
	}
}

/// Builds the `Basic base64(client_id ":" client_secret)` header value.
///
/// The id may not contain `:` (it would be unrecoverable from the encoded
/// pair) and neither half may contain control characters.
pub(crate) fn basic_authorization(
	client_id: &str,
	client_secret: &str,
) -> Result<String, TokenError> {
	if client_id.contains(':') {
		return Err(TokenError::InvalidCredentials {
			reason: "client_id cannot contain ':'".into(),
		});
	}
	if client_id.chars().chain(client_secret.chars()).any(char::is_control) {
		return Err(TokenError::InvalidCredentials {
			reason: "credentials cannot contain control characters".into(),
		});
	}

	let pair = format!("{client_id}:{client_secret}");

	Ok(format!("Basic {}", STANDARD.encode(pair)))
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// crates.io
	use parking_lot::Mutex;
	// self
	use super::*;
	use crate::http::{ExecutorError, ExecutorFuture, HttpBody, HttpResponse};

	#[derive(Default)]
	struct ScriptedExecutor {
		calls: AtomicUsize,
		requests: Mutex<Vec<HttpRequest>>,
		responses: Mutex<Vec<Result<HttpResponse, ExecutorError>>>,
	}
	impl ScriptedExecutor {
		fn respond_with(responses: Vec<Result<HttpResponse, ExecutorError>>) -> Self {
			let mut responses = responses;

			responses.reverse();

			Self { responses: Mutex::new(responses), ..Default::default() }
		}

		fn ok(status: u16, body: &str) -> Result<HttpResponse, ExecutorError> {
			Ok(HttpResponse {
				status,
				headers: BTreeMap::new(),
				body: body.as_bytes().to_vec(),
			})
		}

		fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}

		fn last_request(&self) -> HttpRequest {
			self.requests.lock().last().cloned().expect("Executor should have seen a request.")
		}
	}
	impl HttpExecutor for ScriptedExecutor {
		fn execute(&self, request: HttpRequest) -> ExecutorFuture<'_> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			self.requests.lock().push(request);

			let response = self
				.responses
				.lock()
				.pop()
				.unwrap_or_else(|| Err(ExecutorError::message("script exhausted")));

			Box::pin(async move { response })
		}
	}

	fn endpoint() -> Url {
		Url::parse("https://auth.example/token").expect("Fixture endpoint should parse.")
	}

	fn form_fields(request: &HttpRequest) -> Vec<(String, String)> {
		match &request.body {
			HttpBody::Form(fields) => fields.clone(),
			other => panic!("Exchange body should be form encoded, got {other:?}."),
		}
	}

	#[tokio::test]
	async fn fetch_sends_basic_auth_and_grant_type() {
		let executor = Arc::new(ScriptedExecutor::respond_with(vec![ScriptedExecutor::ok(
			200,
			"{\"access_token\":\"abc\",\"expires_in\":300}",
		)]));
		let fetcher = TokenFetcher::<ScriptedExecutor>::new(Some(endpoint()), "id", "secret", executor.clone());
		let data = fetcher.fetch().await.expect("Exchange should succeed.");

		assert_eq!(data.access_token, "abc");
		assert_eq!(data.expires_in, 300);

		let request = executor.last_request();

		assert_eq!(request.method, "POST");
		assert_eq!(
			request.headers.get("Authorization").map(String::as_str),
			// base64("id:secret")
			Some("Basic aWQ6c2VjcmV0"),
		);
		assert_eq!(
			form_fields(&request),
			[("grant_type".to_owned(), "client_credentials".to_owned())],
		);
	}

	#[tokio::test]
	async fn fetch_joins_scopes_with_single_spaces_in_order() {
		let executor = Arc::new(ScriptedExecutor::respond_with(vec![ScriptedExecutor::ok(
			200,
			"{\"access_token\":\"abc\",\"expires_in\":300}",
		)]));
		let scope = Scope::new(["user", "user:admin", "specialScope"])
			.expect("Scope fixture should be valid.");
		let fetcher =
			TokenFetcher::<ScriptedExecutor>::new(Some(endpoint()), "id", "secret", executor.clone()).with_scope(scope);

		fetcher.fetch().await.expect("Exchange should succeed.");

		let fields = form_fields(&executor.last_request());

		assert_eq!(
			fields,
			[
				("grant_type".to_owned(), "client_credentials".to_owned()),
				("scope".to_owned(), "user user:admin specialScope".to_owned()),
			],
		);
	}

	#[tokio::test]
	async fn fetch_sends_single_scope_verbatim() {
		let executor = Arc::new(ScriptedExecutor::respond_with(vec![ScriptedExecutor::ok(
			200,
			"{\"access_token\":\"abc\",\"expires_in\":300}",
		)]));
		let scope = Scope::single("user").expect("Scope fixture should be valid.");
		let fetcher =
			TokenFetcher::<ScriptedExecutor>::new(Some(endpoint()), "id", "secret", executor.clone()).with_scope(scope);

		fetcher.fetch().await.expect("Exchange should succeed.");

		let fields = form_fields(&executor.last_request());

		assert_eq!(fields[1], ("scope".to_owned(), "user".to_owned()));
	}

	#[tokio::test]
	async fn missing_endpoint_fails_without_network() {
		let executor = Arc::new(ScriptedExecutor::default());
		let fetcher = TokenFetcher::<ScriptedExecutor>::new(None, "id", "secret", executor.clone());
		let err = fetcher.fetch().await.expect_err("Missing endpoint should fail.");

		assert!(matches!(err, TokenError::MissingEndpoint));
		assert_eq!(executor.calls(), 0);
	}

	#[tokio::test]
	async fn malformed_credentials_fail_without_network() {
		let executor = Arc::new(ScriptedExecutor::default());
		let fetcher = TokenFetcher::<ScriptedExecutor>::new(Some(endpoint()), "id:oops", "secret", executor.clone());
		let err = fetcher.fetch().await.expect_err("Colon in client_id should fail.");

		assert!(matches!(err, TokenError::InvalidCredentials { .. }));
		assert_eq!(executor.calls(), 0);
	}

	#[tokio::test]
	async fn non_2xx_maps_to_http_error_with_status_and_body() {
		let executor = Arc::new(ScriptedExecutor::respond_with(vec![ScriptedExecutor::ok(
			503,
			"upstream down",
		)]));
		let fetcher = TokenFetcher::<ScriptedExecutor>::new(Some(endpoint()), "id", "secret", executor);
		let err = fetcher.fetch().await.expect_err("503 should fail.");

		match err {
			TokenError::Http(http) => {
				assert_eq!(http.status, Some(503));
				assert_eq!(http.body.as_deref(), Some("upstream down"));
			},
			other => panic!("Expected TokenError::Http, got {other:?}."),
		}
	}

	#[tokio::test]
	async fn transport_failure_maps_to_http_error() {
		let executor = Arc::new(ScriptedExecutor::respond_with(vec![Err(ExecutorError {
			message: "boom".into(),
			status: Some(401),
			body: Some("boom".into()),
		})]));
		let fetcher = TokenFetcher::<ScriptedExecutor>::new(Some(endpoint()), "id", "secret", executor);
		let err = fetcher.fetch().await.expect_err("Transport failure should fail.");

		match err {
			TokenError::Http(http) => {
				assert_eq!(http.status, Some(401));
				assert_eq!(http.body.as_deref(), Some("boom"));
			},
			other => panic!("Expected TokenError::Http, got {other:?}."),
		}
	}

	#[tokio::test]
	async fn malformed_json_maps_to_parse_error() {
		let executor = Arc::new(ScriptedExecutor::respond_with(vec![ScriptedExecutor::ok(
			200,
			"not json",
		)]));
		let fetcher = TokenFetcher::<ScriptedExecutor>::new(Some(endpoint()), "id", "secret", executor);
		let err = fetcher.fetch().await.expect_err("Malformed JSON should fail.");

		assert!(matches!(err, TokenError::ResponseParse { status: Some(200), .. }));
	}

	#[tokio::test]
	async fn missing_fields_default_to_empty_token() {
		let executor = Arc::new(ScriptedExecutor::respond_with(vec![ScriptedExecutor::ok(
			200, "{}",
		)]));
		let fetcher = TokenFetcher::<ScriptedExecutor>::new(Some(endpoint()), "id", "secret", executor);
		let data = fetcher.fetch().await.expect("Empty payload should still parse.");

		assert_eq!(data.access_token, "");
		assert_eq!(data.expires_in, 0);
	}

	#[test]
	fn basic_authorization_encodes_the_pair() {
		assert_eq!(
			basic_authorization("id", "secret").expect("Credentials should encode."),
			"Basic aWQ6c2VjcmV0",
		);
		assert!(matches!(
			basic_authorization("id", "se\ncret"),
			Err(TokenError::InvalidCredentials { .. }),
		));
	}
}
