//! Thread-safe in-memory [`TokenStorage`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	store::{StoreError, StoreFuture, TokenStorage},
};

type Slot = Arc<RwLock<Option<TokenSecret>>>;

/// Storage backend that keeps the token in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage(Slot);
impl MemoryStorage {
	fn save_now(slot: Slot, token: TokenSecret) -> Result<(), StoreError> {
		*slot.write() = Some(token);

		Ok(())
	}

	fn load_now(slot: Slot) -> Option<TokenSecret> {
		slot.read().clone()
	}

	fn clean_now(slot: Slot) -> Result<(), StoreError> {
		*slot.write() = None;

		Ok(())
	}
}
impl TokenStorage for MemoryStorage {
	fn save(&self, token: TokenSecret) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move { Self::save_now(slot, token) })
	}

	fn load(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(Self::load_now(slot)) })
	}

	fn clean(&self) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move { Self::clean_now(slot) })
	}
}
