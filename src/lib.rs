//! OAuth 2.0 bearer-token provider with cached client-credentials and implicit-flow token managers
//! plus a retry-aware authorized HTTP client, all behind injectable transport, storage, and
//! authorization seams.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod authorize;
pub mod client;
pub mod error;
pub mod exchange;
pub mod http;
pub mod manager;
pub mod obs;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::AuthorizedClient,
		http::ReqwestHttpExecutor,
		manager::ClientCredentialsManager,
	};

	/// Builds a reqwest executor that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_executor() -> ReqwestHttpExecutor {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpExecutor::with_client(client)
	}

	/// Constructs a [`ClientCredentialsManager`] backed by the insecure test executor.
	pub fn build_reqwest_test_manager(
		endpoint: Url,
		client_id: &str,
		client_secret: &str,
	) -> (ClientCredentialsManager<ReqwestHttpExecutor>, Arc<ReqwestHttpExecutor>) {
		let executor = Arc::new(test_reqwest_http_executor());
		let manager = ClientCredentialsManager::with_executor(
			Some(endpoint),
			client_id,
			client_secret,
			executor.clone(),
		);

		(manager, executor)
	}

	/// Constructs an [`AuthorizedClient`] whose manager and resource requests share the
	/// insecure test executor.
	pub fn build_reqwest_test_client(
		endpoint: Url,
		client_id: &str,
		client_secret: &str,
	) -> AuthorizedClient<ReqwestHttpExecutor> {
		let (manager, executor) = build_reqwest_test_manager(endpoint, client_id, client_secret);

		AuthorizedClient::with_executor(Arc::new(manager), executor)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
