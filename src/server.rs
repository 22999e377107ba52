//! HTTP surface: axum router, shared state, and the serve loop.
//!
//! Handlers resolve the session user explicitly through [`session::authenticate`] when they need
//! it; nothing is injected into the request implicitly.

pub mod error;
pub mod music;
pub mod posts;
pub mod session;
pub mod users;

pub use error::ApiError;

// crates.io
use axum::{
	Router,
	http::{HeaderValue, Method, header::CONTENT_TYPE},
	routing::{get, post},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, CorsLayer};
// self
use crate::{
	_prelude::*,
	auth::SessionSigner,
	broker::Broker,
	config::Config,
	error::ConfigError,
	http::ReqwestHttpClient,
	limiter::OutboundLimiter,
	lookup::SongLookup,
	repo::{PostRepository, UserRepository},
	store,
};

/// Shared handler state; cheap to clone.
#[derive(Clone, Debug)]
pub struct AppState {
	/// Post persistence.
	pub posts: PostRepository,
	/// User persistence.
	pub users: UserRepository,
	/// Token broker.
	pub broker: Arc<Broker>,
	/// Catalog lookups.
	pub lookup: Arc<SongLookup>,
	/// Session token signer.
	pub sessions: Arc<SessionSigner>,
	/// Resolved configuration.
	pub config: Arc<Config>,
}
impl AppState {
	/// Wires every component from `config`; broker and lookup share one limiter.
	pub fn from_config(config: Config) -> Result<Self> {
		let store = store::open(&config.store)?;
		let limiter = Arc::new(OutboundLimiter::new(config.outbound_min_interval));
		let http_client = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map(ReqwestHttpClient::with_client)
			.map_err(ConfigError::http_client_build)?;

		tracing::info!(min_interval = ?limiter.min_interval(), "outbound limiter ready");

		let broker = Arc::new(Broker::new(
			config.descriptor()?,
			config.credentials.clone(),
			http_client.clone(),
			limiter.clone(),
		)?);
		let lookup = SongLookup::new(broker.clone(), http_client, limiter);
		let sessions = SessionSigner::new(
			config.session_secret.expose(),
			Duration::seconds(config.session_ttl_secs),
		);

		Ok(Self {
			posts: PostRepository::new(store.clone()),
			users: UserRepository::new(store),
			broker,
			lookup: Arc::new(lookup),
			sessions: Arc::new(sessions),
			config: Arc::new(config),
		})
	}
}

/// Builds the application router with credentialed CORS for the configured origin.
pub fn router(state: AppState) -> Result<Router> {
	let origin = HeaderValue::from_str(&state.config.allowed_origin).map_err(|e| {
		ConfigError::InvalidVar { name: "ALLOWED_ORIGIN", reason: e.to_string() }
	})?;
	let cors = CorsLayer::new()
		.allow_origin(AllowOrigin::exact(origin))
		.allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
		.allow_headers([CONTENT_TYPE])
		.allow_credentials(true);

	Ok(Router::new()
		.route("/", get(hello))
		.route("/posts", get(posts::list_posts))
		.route("/create", post(posts::create_post))
		.route("/user/{id}", get(users::get_user))
		.route("/user/{id}/liked", get(users::get_user_liked).patch(posts::toggle_like))
		.route("/signup", post(users::signup))
		.route("/login", post(users::login))
		.route("/logout", get(users::logout))
		.route("/auth/url", get(music::authorize_url))
		.route("/auth/login", post(music::auth_login))
		.route("/auth/refresh", post(music::auth_refresh))
		.route("/current", post(music::currently_playing))
		.layer(cors)
		.with_state(state))
}

/// Binds `0.0.0.0:<port>` and serves until Ctrl-C or SIGTERM.
pub async fn serve(state: AppState) -> Result<()> {
	let port = state.config.port;
	let app = router(state)?;
	let listener = TcpListener::bind(("0.0.0.0", port)).await.map_err(Error::Server)?;

	tracing::info!("listening at http://localhost:{port}");

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await
		.map_err(Error::Server)?;

	tracing::info!("server shut down");

	Ok(())
}

async fn hello() -> &'static str {
	"Hello, World"
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			tracing::warn!("failed to listen for Ctrl-C: {e}");
			std::future::pending::<()>().await;
		}

		tracing::info!("received Ctrl-C, shutting down");
	};
	#[cfg(unix)]
	let terminate = async {
		use tokio::signal::unix::{SignalKind, signal as unix_signal};

		match unix_signal(SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
				tracing::info!("received SIGTERM, shutting down");
			},
			Err(e) => {
				tracing::warn!("failed to install SIGTERM handler: {e}");
				std::future::pending::<()>().await;
			},
		}
	};
	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
}
