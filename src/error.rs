//! Error types shared across managers, the authorized client, and stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token-acquisition failure raised by a manager or the fetcher.
	#[error(transparent)]
	Token(#[from] TokenError),
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Transport failure on an authorized resource request.
	#[error(transparent)]
	Transport(#[from] crate::http::ExecutorError),
}

/// Token-acquisition failures.
#[derive(Debug, ThisError)]
pub enum TokenError {
	/// No token endpoint was configured; raised before any network attempt.
	#[error("Missing token endpoint.")]
	MissingEndpoint,
	/// Client id/secret pair cannot be encoded into a Basic authorization header.
	#[error("Malformed client credentials: {reason}.")]
	InvalidCredentials {
		/// What made the pair unusable.
		reason: String,
	},
	/// Authorization endpoint could not be turned into an authorize URL.
	#[error("Token endpoint cannot be used to build an authorization URL.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Interactive authorization was cancelled before a token arrived.
	#[error("Authorization was cancelled.")]
	Cancelled,
	/// Authorization-completion collaborator reported a failure.
	#[error("Authorization failed: {reason}.")]
	AuthorizationFailed {
		/// Listener-supplied reason string.
		reason: String,
	},
	/// Token endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code the payload arrived with.
		status: Option<u16>,
	},
	/// Exchange call failed at the transport/response layer.
	#[error(transparent)]
	Http(#[from] TokenHttpError),
}

/// Exchange failure carrying the token server's status and raw body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenHttpError {
	/// Short failure summary.
	pub message: String,
	/// HTTP status code, when the server produced a response.
	pub status: Option<u16>,
	/// Raw response body, when the server produced one.
	pub body: Option<String>,
}
impl TokenHttpError {
	/// Builds an error from a concrete token endpoint response.
	pub fn from_response(message: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
		Self { message: message.into(), status: Some(status), body: Some(body.into()) }
	}
}
impl Display for TokenHttpError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		// Suffix mirrors the wire diagnostics only when a body is available.
		match (&self.body, self.status) {
			(Some(body), Some(status)) =>
				write!(f, "{}, StatusCode: {status}, Body: {body}", self.message),
			_ => f.write_str(&self.message),
		}
	}
}
impl StdError for TokenHttpError {}
