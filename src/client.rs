//! Authorized HTTP client with the retry-once-on-stale-token policy.

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	http::{HttpBody, HttpExecutor, HttpRequest, HttpResponse},
	manager::TokenManager,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};
#[cfg(feature = "reqwest")]
use crate::{auth::Scope, http::ReqwestHttpExecutor, manager::ClientCredentialsManager};

/// Status code that marks the bearer token as rejected by the resource server.
const BAD_TOKEN: u16 = 401;

#[cfg(feature = "reqwest")]
/// Authorized client specialized for the crate's default reqwest transport.
pub type ReqwestAuthorizedClient = AuthorizedClient<ReqwestHttpExecutor>;

/// Caller-supplied request parameters merged into every authorized request.
///
/// The bearer header always wins over a caller-supplied `Authorization`
/// header; everything else is passed through untouched, including the
/// timeout, which is opaque to the core and enforced by the executor.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
	/// Extra request headers.
	pub headers: BTreeMap<String, String>,
	/// Request body.
	pub body: HttpBody,
	/// Opaque per-request timeout handed to the executor.
	pub timeout: Option<StdDuration>,
}
impl RequestOptions {
	/// Creates empty options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds (or replaces) a header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Sets the request body.
	pub fn body(mut self, body: HttpBody) -> Self {
		self.body = body;

		self
	}

	/// Sets the per-request timeout.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}
}

/// HTTP client that attaches a bearer token to every request and retries once
/// when the resource server rejects it.
///
/// The executor's connection pool is shared across all requests issued
/// through one client (and, for the reqwest convenience constructor, with the
/// token manager as well); dropping the last handle releases it.
#[derive(Clone)]
pub struct AuthorizedClient<E>
where
	E: ?Sized + HttpExecutor,
{
	executor: Arc<E>,
	manager: Arc<dyn TokenManager>,
}
impl<E> AuthorizedClient<E>
where
	E: ?Sized + HttpExecutor,
{
	/// Creates a client around an existing manager + executor pair.
	pub fn with_executor(
		manager: Arc<dyn TokenManager>,
		executor: impl Into<Arc<E>>,
	) -> Self {
		Self { executor: executor.into(), manager }
	}

	/// Token manager backing this client.
	pub fn manager(&self) -> &Arc<dyn TokenManager> {
		&self.manager
	}

	/// Issues an authorized request.
	///
	/// A `401` response triggers exactly one reset-and-retry cycle; whatever
	/// status the second attempt yields is returned, `401` included. Any
	/// [`TokenError`](crate::error::TokenError) raised while acquiring the
	/// token resets the manager before propagating, so a failed exchange never leaves a token cached
	/// as believed-valid. All other statuses pass through untouched.
	pub async fn request(
		&self,
		method: impl Into<String>,
		url: Url,
		options: RequestOptions,
	) -> Result<HttpResponse> {
		const KIND: FlowKind = FlowKind::AuthorizedRequest;

		let span = FlowSpan::new(KIND, "request");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let method = method.into();
		let result = span.instrument(self.request_with_retry(&method, &url, &options)).await;
		let result = match result {
			Err(err @ Error::Token(_)) => {
				// The original token error wins over any reset failure.
				let _ = self.manager.reset_token().await;

				Err(err)
			},
			other => other,
		};

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn request_with_retry(
		&self,
		method: &str,
		url: &Url,
		options: &RequestOptions,
	) -> Result<HttpResponse> {
		let response = self.authorized_execute(method, url, options).await?;

		if response.status != BAD_TOKEN {
			return Ok(response);
		}

		self.manager.reset_token().await?;
		self.authorized_execute(method, url, options).await
	}

	async fn authorized_execute(
		&self,
		method: &str,
		url: &Url,
		options: &RequestOptions,
	) -> Result<HttpResponse> {
		let token = self.manager.get_token().await?;
		let mut headers = options.headers.clone();

		// Bearer header wins on (case-insensitive) key collision.
		headers.retain(|name, _| !name.eq_ignore_ascii_case("authorization"));
		headers.insert("Authorization".into(), format!("Bearer {}", token.expose()));

		obs::trace_request(method, url, &headers);

		let request = HttpRequest {
			method: method.to_owned(),
			url: url.clone(),
			headers,
			body: options.body.clone(),
			timeout: options.timeout,
		};

		Ok(self.executor.execute(request).await?)
	}
}
#[cfg(feature = "reqwest")]
impl AuthorizedClient<ReqwestHttpExecutor> {
	/// Creates a client-credentials client backed by a fresh reqwest transport.
	///
	/// The manager exchanges credentials through the same connection pool the
	/// resource requests use.
	pub fn new(
		endpoint: Option<Url>,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		Self::scoped(endpoint, client_id, client_secret, None)
	}

	/// Like [`AuthorizedClient::new`] with scope values sent on every exchange.
	pub fn scoped(
		endpoint: Option<Url>,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		scope: impl Into<Option<Scope>>,
	) -> Self {
		let executor = Arc::new(ReqwestHttpExecutor::default());
		let mut manager = ClientCredentialsManager::<ReqwestHttpExecutor>::with_executor(
			endpoint,
			client_id,
			client_secret,
			executor.clone(),
		);

		if let Some(scope) = scope.into() {
			manager = manager.with_scope(scope);
		}

		Self::with_executor(Arc::new(manager), executor)
	}
}
impl<E> Debug for AuthorizedClient<E>
where
	E: ?Sized + HttpExecutor,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("AuthorizedClient(..)")
	}
}
