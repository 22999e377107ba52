//! Song-sharing feed service: users post songs resolved against a third-party music catalog,
//! like and unlike each other's posts, and browse the feed by recency or popularity.
//!
//! Every outbound catalog call (token exchanges, searches, playback lookups) is funneled through
//! a single [`limiter::OutboundLimiter`] so the process never exceeds the upstream's request
//! budget, no matter how many HTTP requests are in flight.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod broker;
pub mod config;
pub mod error;
pub mod http;
pub mod limiter;
pub mod lookup;
pub mod model;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod repo;
pub mod server;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{ClientCredentials, SessionSigner},
		broker::Broker,
		config::Config,
		http::ReqwestHttpClient,
		limiter::OutboundLimiter,
		lookup::SongLookup,
		provider::ProviderDescriptor,
		repo::{PostRepository, UserRepository},
		server::AppState,
		store::MemoryStore,
	};

	/// Client identifier used by test fixtures.
	pub const TEST_CLIENT_ID: &str = "test-client";
	/// Client secret used by test fixtures.
	pub const TEST_CLIENT_SECRET: &str = "test-secret";
	/// Session signing secret used by test fixtures.
	pub const TEST_SESSION_SECRET: &str = "test-session-secret";

	/// Builds a descriptor whose accounts and API endpoints both point at `base` (an `httpmock`
	/// server URL).
	pub fn test_descriptor(base: &str) -> ProviderDescriptor {
		let base = Url::parse(base).expect("Mock server base URL should parse.");

		ProviderDescriptor::builder()
			.accounts_base(base.clone())
			.api_base(base.join("/v1/").expect("Mock API base should join."))
			.redirect_uri(
				Url::parse("http://localhost:3000/home").expect("Redirect fixture should parse."),
			)
			.build()
			.expect("Test descriptor should build.")
	}

	/// Limiter with no spacing so integration tests are not slowed down.
	pub fn test_limiter() -> Arc<OutboundLimiter> {
		Arc::new(OutboundLimiter::new(std::time::Duration::ZERO))
	}

	/// Constructs a broker against the mock server at `base`.
	pub fn build_test_broker(base: &str, limiter: Arc<OutboundLimiter>) -> Arc<Broker> {
		let credentials = ClientCredentials::new(TEST_CLIENT_ID, TEST_CLIENT_SECRET)
			.expect("Test credentials should be valid.");

		Arc::new(
			Broker::new(test_descriptor(base), credentials, ReqwestHttpClient::default(), limiter)
				.expect("Test broker should build."),
		)
	}

	/// Constructs a song lookup service against the mock server at `base`.
	pub fn build_test_lookup(base: &str) -> SongLookup {
		build_test_lookup_with(base, test_limiter())
	}

	/// Constructs a song lookup whose broker and searches share `limiter`.
	pub fn build_test_lookup_with(base: &str, limiter: Arc<OutboundLimiter>) -> SongLookup {
		let broker = build_test_broker(base, limiter);
		let limiter = broker.limiter().clone();

		SongLookup::new(broker, ReqwestHttpClient::default(), limiter)
	}

	/// Builds a full application state backed by an in-memory store and the mock server at
	/// `base`.
	pub fn build_test_state(base: &str) -> AppState {
		let store = Arc::new(MemoryStore::default());
		let limiter = test_limiter();
		let broker = build_test_broker(base, limiter.clone());
		let lookup = SongLookup::new(broker.clone(), ReqwestHttpClient::default(), limiter);
		let config = Config::for_tests(base);

		AppState {
			posts: PostRepository::new(store.clone()),
			users: UserRepository::new(store),
			broker,
			lookup: Arc::new(lookup),
			sessions: Arc::new(SessionSigner::new(
				TEST_SESSION_SECRET,
				Duration::seconds(config.session_ttl_secs),
			)),
			config: Arc::new(config),
		}
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, BTreeSet, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
use color_eyre as _;
#[cfg(test)] use {httpmock as _, tower as _};
