//! Token lifecycle managers.
//!
//! [`TokenManager`] is the polymorphic seam between the authorized client and
//! whichever acquisition strategy is in play; the two built-in strategies are
//! selected at construction:
//!
//! - [`ClientCredentialsManager`] exchanges a client id/secret pair directly.
//! - [`ImplicitTokenManager`] drives an external browser-based authorization
//!   collaborator and a pluggable storage capability.

pub mod client_credentials;
pub mod implicit;

pub use client_credentials::ClientCredentialsManager;
pub use implicit::{ImplicitFlowContext, ImplicitTokenManager};

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Boxed future returned by [`TokenManager`] operations.
pub type ManagerFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Contract for components that can produce and invalidate bearer tokens.
///
/// Concurrency contract: `get_token` is single-flight; however many callers
/// arrive while no valid token is cached, at most one acquisition runs and
/// every caller observes its result (or its failure).
pub trait TokenManager
where
	Self: Send + Sync,
{
	/// Returns a valid access token, acquiring or refreshing one if needed.
	fn get_token(&self) -> ManagerFuture<'_, TokenSecret>;

	/// Discards the current token so the next [`get_token`](Self::get_token)
	/// acquires a fresh one unconditionally.
	///
	/// Called by consumers after the resource server rejected the token; the
	/// local expiry prediction is no longer trustworthy at that point.
	fn reset_token(&self) -> ManagerFuture<'_, ()>;
}
