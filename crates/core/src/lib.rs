//! Crate for gtfs-relay, a small GTFS-realtime feed relay and static file server.

#[cfg(feature = "rustls-tls")]
#[cfg(feature = "native-tls")]
compile_error!("You can only enable one TLS backend");

pub extern crate url;

mod feeds;
mod http_client;
mod middleware;
mod relay;
mod routes;

pub use feeds::{Feed, FeedSettings, FeedSpec};
pub use relay::{FeedPayload, PROTOBUF_CONTENT_TYPE, RelayError, RelayResult, fetch_feed};

use anyhow::{Result, bail};
use axum::{Router, extract::State, middleware as axum_middleware, routing::get};
use core::{net::SocketAddr, time::Duration};
use http_client::{BuildHttpClientArgs, HttpClient, build_http_client};
use std::{path::PathBuf, sync::Arc};
use tokio::{net::TcpListener, signal};
use tower_http::{
    catch_panic::CatchPanicLayer,
    services::{ServeDir, ServeFile},
    timeout::TimeoutLayer,
    trace::{self, TraceLayer},
};
use tracing::{Level, info};

/// # Example
/// ```rust,no_run
/// use std::net::{SocketAddr, IpAddr, Ipv4Addr};
/// use gtfs_relay::{RelayServer, RelayServerSettings};
///
/// # #[tokio::main]
/// # async fn main() {
/// let server = RelayServer::new(RelayServerSettings::default()).unwrap();
/// server.start(&SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8000)).await.unwrap();
/// # }
/// ```
#[derive(Debug)]
pub struct RelayServer {
    router_inner: Router,
    static_settings: StaticSettings,
}

/// Settings to run the relay server with.
#[derive(Debug, Clone)]
pub struct RelayServerSettings {
    /// Maximum time a request may take before it is abandoned.
    pub request_timeout: Duration,

    /// See [`UpstreamSettings`].
    pub upstream_settings: UpstreamSettings,

    /// See [`FeedSettings`].
    pub feed_settings: FeedSettings,

    /// See [`StaticSettings`].
    pub static_settings: StaticSettings,
}

/// Configuration options used when fetching a feed from its upstream.
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    /// Maximum time a single upstream fetch may take before it is abandoned
    /// and considered failed.
    pub request_timeout: Duration,

    /// The maximum amount of redirects to follow before abandoning the fetch.
    pub max_redirects: usize,
}

/// Where static files are served from.
#[derive(Debug, Clone)]
pub struct StaticSettings {
    /// Directory holding the application bundle. Served for every path that
    /// is not a feed or under `/data`.
    pub app_root: PathBuf,

    /// Directory served under `/data`.
    pub data_dir: PathBuf,

    /// File inside [`StaticSettings::app_root`] served for `/`.
    pub index_file: String,
}

impl Default for RelayServerSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(15),
            upstream_settings: UpstreamSettings::default(),
            feed_settings: FeedSettings::default(),
            static_settings: StaticSettings::default(),
        }
    }
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            max_redirects: 5,
        }
    }
}

impl StaticSettings {
    /// Settings rooted at `app_root`, with the data directory at `<app_root>/data`.
    pub fn from_app_root(app_root: impl Into<PathBuf>) -> Self {
        let app_root = app_root.into();
        Self {
            data_dir: app_root.join("data"),
            app_root,
            index_file: String::from("index.html"),
        }
    }
}

impl Default for StaticSettings {
    fn default() -> Self {
        Self::from_app_root(".")
    }
}

#[derive(Debug)]
struct AppState {
    client: HttpClient,
    settings: RelayServerSettings,
}

impl RelayServer {
    /// Create a new server with the provided settings.
    ///
    /// Fails when `request_timeout` does not outlast the upstream timeout, as a
    /// slow upstream would then be cut off without a relay error.
    pub fn new(settings: RelayServerSettings) -> Result<Self> {
        if settings.request_timeout <= settings.upstream_settings.request_timeout {
            bail!(
                "request timeout ({:?}) must be longer than the upstream request timeout ({:?})",
                settings.request_timeout,
                settings.upstream_settings.request_timeout
            );
        }

        let static_settings = settings.static_settings.clone();

        let mut router = Router::new();
        for feed in Feed::ALL {
            router = router.route(
                feed.route(),
                get(move |State(state): State<Arc<AppState>>| {
                    routes::feed_handler(state, feed)
                }),
            );
        }

        let router = router
            .route_service(
                "/",
                ServeFile::new(static_settings.app_root.join(&static_settings.index_file)),
            )
            .nest_service("/data", ServeDir::new(&static_settings.data_dir))
            .fallback_service(
                ServeDir::new(&static_settings.app_root).append_index_html_on_directories(false),
            )
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(TimeoutLayer::new(settings.request_timeout))
            .layer(CatchPanicLayer::new())
            .layer(axum_middleware::from_fn(middleware::server_header_middleware))
            .with_state(Arc::new(AppState {
                client: build_http_client(BuildHttpClientArgs {
                    max_redirects: settings.upstream_settings.max_redirects,
                    request_timeout: settings.upstream_settings.request_timeout,
                })?,
                settings,
            }));

        Ok(Self {
            router_inner: router,
            static_settings,
        })
    }

    /// Consume the server and return its [`Router`], for embedding into another
    /// service or driving it without a listener.
    pub fn into_router(self) -> Router {
        self.router_inner
    }

    /// Start the server and expose it locally on the provided [`SocketAddr`].
    pub async fn start(self, address: &SocketAddr) -> Result<()> {
        let tcp_listener = TcpListener::bind(&address).await?;
        info!("Listening on http://{}", tcp_listener.local_addr()?);
        info!(
            "Serving static files from {}",
            self.static_settings.app_root.display()
        );
        info!(
            "Serving data files from {}",
            self.static_settings.data_dir.display()
        );
        axum::serve(tcp_listener, self.router_inner)
            .with_graceful_shutdown(Self::shutdown_signal())
            .await?;
        Ok(())
    }

    // https://github.com/tokio-rs/axum/blob/15917c6dbcb4a48707a20e9cfd021992a279a662/examples/graceful-shutdown/src/main.rs#L55
    async fn shutdown_signal() {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    }
}
