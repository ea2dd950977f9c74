//! Storage contracts for implicit-flow tokens.
//!
//! Storage lifetime and persistence are external concerns; the crate only
//! defines the capability plus an in-process backend for tests and demos.
//! Stored tokens are trusted as-is until explicitly cleaned; no expiry check
//! is applied on load.

pub mod memory;

pub use memory::MemoryStorage;

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Boxed future returned by [`TokenStorage`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for implicit-flow bearer tokens.
pub trait TokenStorage
where
	Self: Send + Sync,
{
	/// Persists or replaces the stored token.
	fn save(&self, token: TokenSecret) -> StoreFuture<'_, ()>;

	/// Fetches the stored token, if present.
	fn load(&self) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Removes the stored token.
	fn clean(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`TokenStorage`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
