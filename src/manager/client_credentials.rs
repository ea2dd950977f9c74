//! Client Credentials token manager with caching + singleflight refresh.
//!
//! The cached token lives behind one async mutex that is held for the whole
//! "check validity, maybe exchange, store result" sequence, so N concurrent
//! `get_token` calls during an expired/absent state produce exactly one
//! network exchange and all resolve to the same token (or the same failure).

// self
use crate::{
	_prelude::*,
	auth::{Scope, Token, TokenSecret},
	exchange::TokenFetcher,
	http::HttpExecutor,
	manager::{ManagerFuture, TokenManager},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpExecutor;

/// Cached `client_credentials` token manager.
pub struct ClientCredentialsManager<E>
where
	E: ?Sized + HttpExecutor,
{
	fetcher: TokenFetcher<E>,
	// Held across the full check-and-maybe-refresh sequence; this is the
	// singleflight guard.
	current: AsyncMutex<Token>,
}
impl<E> ClientCredentialsManager<E>
where
	E: ?Sized + HttpExecutor,
{
	/// Creates a manager that exchanges credentials through the provided executor.
	///
	/// A missing endpoint is accepted here; `get_token` raises
	/// [`TokenError::MissingEndpoint`](crate::error::TokenError::MissingEndpoint)
	/// without any network attempt.
	pub fn with_executor(
		endpoint: Option<Url>,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		executor: impl Into<Arc<E>>,
	) -> Self {
		Self {
			fetcher: TokenFetcher::new(endpoint, client_id, client_secret, executor),
			current: AsyncMutex::new(Token::expired()),
		}
	}

	/// Attaches the scope values sent with every exchange.
	pub fn with_scope(mut self, scope: Scope) -> Self {
		self.fetcher = self.fetcher.with_scope(scope);

		self
	}

	async fn get_token_inner(&self) -> Result<TokenSecret> {
		let mut current = self.current.lock().await;

		if !current.is_valid() {
			let data = self.fetcher.fetch().await?;

			// On failure the slot is left untouched; the next caller retries.
			*current = Token::new(data.access_token, Duration::seconds(data.expires_in));
		}

		Ok(current.access_token().clone())
	}
}
#[cfg(feature = "reqwest")]
impl ClientCredentialsManager<ReqwestHttpExecutor> {
	/// Creates a manager backed by a fresh reqwest transport.
	pub fn new(
		endpoint: Option<Url>,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		Self::with_executor(endpoint, client_id, client_secret, ReqwestHttpExecutor::default())
	}
}
impl<E> TokenManager for ClientCredentialsManager<E>
where
	E: ?Sized + HttpExecutor,
{
	fn get_token(&self) -> ManagerFuture<'_, TokenSecret> {
		const KIND: FlowKind = FlowKind::ClientCredentials;

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
			*self.current.lock().await = Token::expired();

			Ok(())
		})
	}
}
impl<E> Debug for ClientCredentialsManager<E>
where
	E: ?Sized + HttpExecutor,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentialsManager").field("fetcher", &self.fetcher).finish()
	}
}
