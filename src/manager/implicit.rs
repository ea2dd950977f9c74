//! Implicit-flow token manager driving an external authorization collaborator.
//!
//! `get_token` trusts storage first: a stored token is returned as-is, with no
//! expiry check, until `reset_token` cleans it. Only when storage comes up
//! empty does the manager open a browser (at most once per manager lifetime)
//! and await the local callback listener's outcome under the same
//! singleflight lock discipline as the client-credentials manager, so
//! concurrent callers never each open a browser tab.

// self
use crate::{
	_prelude::*,
	auth::{Scope, TokenSecret},
	authorize::{self, AuthorizationListener, AuthorizationOutcome, BrowserOpener},
	error::TokenError,
	manager::{ManagerFuture, TokenManager},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::TokenStorage,
};

/// Explicitly injected implicit-flow collaborators.
///
/// One context is built per callback listener and handed to whichever manager
/// needs it; nothing is shared through type-level state.
#[derive(Clone)]
pub struct ImplicitFlowContext {
	/// Local callback listener awaiting the authorization redirect.
	pub listener: Arc<dyn AuthorizationListener>,
	/// Browser launcher for the authorization URL.
	pub browser: Arc<dyn BrowserOpener>,
	/// Pluggable token storage reused across manager lifetimes.
	pub storage: Arc<dyn TokenStorage>,
}
impl ImplicitFlowContext {
	/// Bundles the three collaborators.
	pub fn new(
		listener: Arc<dyn AuthorizationListener>,
		browser: Arc<dyn BrowserOpener>,
		storage: Arc<dyn TokenStorage>,
	) -> Self {
		Self { listener, browser, storage }
	}
}
impl Debug for ImplicitFlowContext {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ImplicitFlowContext").field("port", &self.listener.port()).finish()
	}
}

/// Browser-based implicit-flow token manager.
pub struct ImplicitTokenManager {
	endpoint: Option<Url>,
	client_id: String,
	scope: Option<Scope>,
	context: ImplicitFlowContext,
	flight: AsyncMutex<()>,
	// One-shot latch: set on first use, never reset, cancelled attempts included.
	browser_opened: Mutex<bool>,
}
impl ImplicitTokenManager {
	/// Creates a manager bound to the provided collaborators.
	pub fn new(
		endpoint: Option<Url>,
		client_id: impl Into<String>,
		context: ImplicitFlowContext,
	) -> Self {
		Self {
			endpoint,
			client_id: client_id.into(),
			scope: None,
			context,
			flight: AsyncMutex::new(()),
			browser_opened: Mutex::new(false),
		}
	}

	/// Attaches the scope values embedded in the authorization URL.
	pub fn with_scope(mut self, scope: Scope) -> Self {
		self.scope = Some(scope);

		self
	}

	fn shall_open_browser(&self) -> bool {
		let mut opened = self.browser_opened.lock();

		if *opened {
			false
		} else {
			*opened = true;

			true
		}
	}

	async fn get_token_inner(&self) -> Result<TokenSecret> {
		let _flight = self.flight.lock().await;

		if let Some(stored) = self.context.storage.load().await? {
			return Ok(stored);
		}

		let endpoint = self.endpoint.as_ref().ok_or(TokenError::MissingEndpoint)?;
		let url = authorize::authorization_url(
			endpoint,
			&self.client_id,
			self.context.listener.port(),
			self.scope.as_ref(),
		)?;

		if self.shall_open_browser() {
			self.context.browser.open(&url);
		}

		let outcome = self.context.listener.wait().await;

		// The listener's resources are released on every path, cancellation included.
		self.context.listener.stop().await;

		match outcome {
			AuthorizationOutcome::Completed(grant) => {
				let token = TokenSecret::new(grant.access_token);

				self.context.storage.save(token.clone()).await?;

				Ok(token)
			},
			AuthorizationOutcome::Cancelled => Err(TokenError::Cancelled.into()),
			AuthorizationOutcome::Failed { reason } =>
				Err(TokenError::AuthorizationFailed { reason }.into()),
		}
	}
}
impl TokenManager for ImplicitTokenManager {
	fn get_token(&self) -> ManagerFuture<'_, TokenSecret> {
		const KIND: FlowKind = FlowKind::Implicit;

		let span = FlowSpan::new(KIND, "get_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		Box::pin(async move {
			let result = span.instrument(self.get_token_inner()).await;

			match &result {
				Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
				Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
			}

			result
		})
	}

	fn reset_token(&self) -> ManagerFuture<'_, ()> {
		Box::pin(async move {
			self.context.storage.clean().await?;

			Ok(())
		})
	}
}
impl Debug for ImplicitTokenManager {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ImplicitTokenManager")
			.field("endpoint", &self.endpoint)
			.field("client_id", &self.client_id)
			.field("scope", &self.scope)
			.field("browser_opened", &*self.browser_opened.lock())
			.finish()
	}
}
