// self
use oauth2_bearer::{
	auth::TokenSecret,
	store::{MemoryStorage, TokenStorage},
};

#[tokio::test]
async fn save_load_clean_round_trip() {
	let storage = MemoryStorage::default();

	assert!(storage.load().await.expect("Empty storage load should succeed.").is_none());

	storage
		.save(TokenSecret::new("persisted-token"))
		.await
		.expect("Saving a token should succeed.");

	let loaded = storage
		.load()
		.await
		.expect("Storage load should succeed.")
		.expect("Stored token should be present.");

	assert_eq!(loaded.expose(), "persisted-token");

	storage.clean().await.expect("Cleaning storage should succeed.");

	assert!(storage.load().await.expect("Cleaned storage load should succeed.").is_none());
}

#[tokio::test]
async fn save_replaces_the_previous_token() {
	let storage = MemoryStorage::default();

	storage.save(TokenSecret::new("first")).await.expect("First save should succeed.");
	storage.save(TokenSecret::new("second")).await.expect("Second save should succeed.");

	let loaded = storage
		.load()
		.await
		.expect("Storage load should succeed.")
		.expect("Stored token should be present.");

	assert_eq!(loaded.expose(), "second");
}

#[tokio::test]
async fn clones_share_the_same_slot() {
	let storage = MemoryStorage::default();
	let view = storage.clone();

	storage.save(TokenSecret::new("shared")).await.expect("Save should succeed.");

	let loaded = view
		.load()
		.await
		.expect("Storage load should succeed.")
		.expect("Clone should observe the saved token.");

	assert_eq!(loaded.expose(), "shared");
}
