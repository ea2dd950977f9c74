//! Transport primitives: the injected HTTP executor capability.
//!
//! The module exposes [`HttpExecutor`] alongside the [`HttpRequest`] /
//! [`HttpResponse`] exchange values so downstream crates can plug in custom
//! transports. An executor resolves every HTTP response (whatever its status)
//! as `Ok`; [`ExecutorError`] is reserved for transport-level failures such as
//! DNS, TCP, or TLS problems, carrying whatever status/body information the
//! transport managed to capture.

// std
use std::{borrow::Cow, ops::Deref, time::Duration as StdDuration};
// self
use crate::_prelude::*;

/// Boxed future returned by [`HttpExecutor::execute`].
pub type ExecutorFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, ExecutorError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing outbound requests.
///
/// This trait is the crate's only dependency on an HTTP stack. Implementations
/// must be `Send + Sync + 'static` so one executor (and its connection pool)
/// can be shared behind `Arc` between a token manager and the authorized
/// client; dropping the last handle releases the pool.
pub trait HttpExecutor
where
	Self: 'static + Send + Sync,
{
	/// Executes the request, resolving with the response or a transport failure.
	fn execute(&self, request: HttpRequest) -> ExecutorFuture<'_>;
}

/// Outbound request value; built fresh per attempt, nothing is persisted.
#[derive(Clone, Debug)]
pub struct HttpRequest {
	/// HTTP method, e.g. `GET` or `POST`.
	pub method: String,
	/// Absolute request URL.
	pub url: Url,
	/// Request headers.
	pub headers: BTreeMap<String, String>,
	/// Request body.
	pub body: HttpBody,
	/// Opaque per-request timeout passed through to the transport.
	pub timeout: Option<StdDuration>,
}
impl HttpRequest {
	/// Creates a request with empty headers and body.
	pub fn new(method: impl Into<String>, url: Url) -> Self {
		Self {
			method: method.into(),
			url,
			headers: BTreeMap::new(),
			body: HttpBody::Empty,
			timeout: None,
		}
	}

	/// Adds (or replaces) a header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Sets a form-encoded body.
	pub fn form<I, K, V>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.body =
			HttpBody::Form(fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect());

		self
	}

	/// Sets a per-request timeout.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}
}

/// Request payload variants understood by every executor.
#[derive(Clone, Debug, Default)]
pub enum HttpBody {
	/// No payload.
	#[default]
	Empty,
	/// `application/x-www-form-urlencoded` fields.
	Form(Vec<(String, String)>),
	/// Raw bytes passed through untouched.
	Bytes(Vec<u8>),
}

/// Response value surfaced to the core; any status is a successful transport round trip.
#[derive(Clone, Debug)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers.
	pub headers: BTreeMap<String, String>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Lossy text view of the body.
	pub fn text(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(&self.body)
	}

	/// Deserializes the body as JSON with path-annotated failures.
	pub fn json<T>(&self) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
	where
		T: serde::de::DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
	}
}

/// Transport-level failure carrying whatever the transport captured.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Transport error: {message}.")]
pub struct ExecutorError {
	/// Transport-supplied failure summary.
	pub message: String,
	/// HTTP status code, when a response was received before the failure.
	pub status: Option<u16>,
	/// Response body, when one was captured.
	pub body: Option<String>,
}
impl ExecutorError {
	/// Builds a failure from a bare message.
	pub fn message(message: impl Into<String>) -> Self {
		Self { message: message.into(), status: None, body: None }
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The same executor instance backs both the token managers and the authorized
/// client, so all traffic shares one connection pool that is released when the
/// last `Arc` handle drops.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpExecutor(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpExecutor {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpExecutor {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpExecutor {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpExecutor for ReqwestHttpExecutor {
	fn execute(&self, request: HttpRequest) -> ExecutorFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = reqwest::Method::from_bytes(request.method.as_bytes())
				.map_err(|_| ExecutorError::message(format!("invalid method {}", request.method)))?;
			let mut builder = client.request(method, request.url);

			for (name, value) in &request.headers {
				builder = builder.header(name, value);
			}

			builder = match request.body {
				HttpBody::Empty => builder,
				HttpBody::Form(fields) => builder.form(&fields),
				HttpBody::Bytes(bytes) => builder.body(bytes),
			};

			if let Some(timeout) = request.timeout {
				builder = builder.timeout(timeout);
			}

			let response = builder.send().await.map_err(map_reqwest_error)?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|v| (name.as_str().to_owned(), v.to_owned()))
				})
				.collect();
			let body = response.bytes().await.map_err(map_reqwest_error)?.to_vec();

			Ok(HttpResponse { status, headers, body })
		})
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(err: ReqwestError) -> ExecutorError {
	ExecutorError {
		message: err.to_string(),
		status: err.status().map(|status| status.as_u16()),
		body: None,
	}
}
