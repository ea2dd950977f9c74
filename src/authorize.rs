//! Authorization-completion contracts for the browser-based implicit flow.
//!
//! The local callback web server and the browser launcher are external
//! collaborators; this module defines the seams the
//! [`ImplicitTokenManager`](crate::manager::ImplicitTokenManager) drives:
//! a listener that eventually yields an [`AuthorizationOutcome`], a one-shot
//! browser opener, and the authorize-URL assembly. Implicit-flow tokens
//! arrive in the redirect's URL fragment, which browsers never send to a
//! server, so listeners are expected to serve a bootstrap page that rewrites
//! the fragment into query parameters before resolving.

// std
use std::ops::RangeInclusive;
// crates.io
use rand::Rng;
// self
use crate::{_prelude::*, auth::Scope, error::TokenError};

/// Boxed future resolving with the listener's terminal outcome.
pub type AuthorizationFuture<'a> = Pin<Box<dyn Future<Output = AuthorizationOutcome> + 'a + Send>>;
/// Boxed future returned by [`AuthorizationListener::stop`].
pub type ListenerFuture<'a> = Pin<Box<dyn Future<Output = ()> + 'a + Send>>;

/// Local callback listener awaiting the authorization redirect.
pub trait AuthorizationListener
where
	Self: Send + Sync,
{
	/// Local port the redirect URI must point at.
	fn port(&self) -> u16;

	/// Resolves once the redirect delivers a token, the wait is cancelled, or
	/// the listener fails.
	fn wait(&self) -> AuthorizationFuture<'_>;

	/// Releases the listener's local resources.
	///
	/// Invoked after every [`wait`](Self::wait) resolution, cancelled ones
	/// included, so cancellation never leaks the local socket.
	fn stop(&self) -> ListenerFuture<'_>;
}

/// Launches the user's browser at the authorization URL.
pub trait BrowserOpener
where
	Self: Send + Sync,
{
	/// Opens `url` in a browser; failures are the collaborator's concern.
	fn open(&self, url: &Url);
}

/// Token material delivered by the authorization redirect.
#[derive(Clone, Debug, Deserialize)]
pub struct AuthorizationGrant {
	/// Issued access token value.
	pub access_token: String,
	/// Token type reported alongside the redirect, normally `bearer`.
	#[serde(default)]
	pub token_type: Option<String>,
	/// Token lifetime in seconds, if reported.
	#[serde(default)]
	pub expires_in: Option<u64>,
}

/// Terminal result of one interactive authorization attempt.
#[derive(Clone, Debug)]
pub enum AuthorizationOutcome {
	/// The redirect delivered a token.
	Completed(AuthorizationGrant),
	/// The wait was cancelled before a token arrived.
	Cancelled,
	/// The listener failed.
	Failed {
		/// Listener-supplied reason string.
		reason: String,
	},
}

/// Inclusive port range the callback listener may bind, picked at random.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortRange {
	/// Lowest candidate port.
	pub start: u16,
	/// Highest candidate port.
	pub end: u16,
}
impl PortRange {
	/// Creates a range after ordering the bounds.
	pub fn new(start: u16, end: u16) -> Self {
		if start <= end { Self { start, end } } else { Self { start: end, end: start } }
	}

	/// Picks one candidate port uniformly at random.
	pub fn pick(&self) -> u16 {
		rand::rng().random_range(self.start..=self.end)
	}
}
impl Default for PortRange {
	fn default() -> Self {
		Self { start: 32000, end: 32009 }
	}
}
impl From<RangeInclusive<u16>> for PortRange {
	fn from(range: RangeInclusive<u16>) -> Self {
		Self::new(*range.start(), *range.end())
	}
}

/// Builds the implicit-flow authorization URL.
///
/// Shape: `{endpoint}/authorize?response_type=token&client_id={id}&redirect_uri=
/// http://localhost:{port}` with `&scope=...` (space-joined, input order)
/// appended when a non-empty scope is set. Query values are form-urlencoded.
pub fn authorization_url(
	endpoint: &Url,
	client_id: &str,
	port: u16,
	scope: Option<&Scope>,
) -> Result<Url, TokenError> {
	let base = endpoint.as_str().trim_end_matches('/');
	let mut url = Url::parse(&format!("{base}/authorize"))
		.map_err(|source| TokenError::InvalidEndpoint { source })?;

	{
		let mut query = url.query_pairs_mut();

		query
			.append_pair("response_type", "token")
			.append_pair("client_id", client_id)
			.append_pair("redirect_uri", &format!("http://localhost:{port}"));

		if let Some(scope) = scope.filter(|scope| !scope.is_empty()) {
			query.append_pair("scope", &scope.encoded());
		}
	}

	Ok(url)
}
