use anyhow::Result;
use clap::{
    Parser,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use core::net::SocketAddr;
use dotenvy::dotenv;
use gtfs_relay::{
    FeedSettings, RelayServer, RelayServerSettings, StaticSettings, UpstreamSettings, url::Url,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::BrightMagenta.on_default() | Effects::BOLD)
        .usage(AnsiColor::BrightMagenta.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightGreen.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default())
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about, styles = styles())]
struct Arguments {
    /// Internet socket address that the server should be ran on.
    #[arg(
        long = "address",
        env = "GTFS_RELAY_ADDRESS",
        default_value = "127.0.0.1:8000"
    )]
    address: SocketAddr,

    /// Maximum waiting time before an incoming request is aborted.
    ///
    /// Must be longer than the upstream request timeout.
    #[arg(
        long = "request-timeout",
        env = "GTFS_RELAY_REQUEST_TIMEOUT",
        default_value = "15s"
    )]
    request_timeout: humantime::Duration,

    /// Maximum waiting time before a feed fetch from an upstream is aborted.
    #[arg(
        long = "upstream-request-timeout",
        env = "GTFS_RELAY_UPSTREAM_REQUEST_TIMEOUT",
        default_value = "5s"
    )]
    upstream_request_timeout: humantime::Duration,

    /// Maximum amount of redirects to follow when fetching a feed before aborting.
    #[arg(
        long = "upstream-max-redirects",
        env = "GTFS_RELAY_UPSTREAM_MAX_REDIRECTS",
        default_value_t = 5
    )]
    upstream_max_redirects: usize,

    /// Upstream the trip updates feed is fetched from.
    #[arg(
        long = "trip-updates-url",
        env = "GTFS_RELAY_TRIP_UPDATES_URL",
        default_value = FeedSettings::DEFAULT_TRIP_UPDATES_URL
    )]
    trip_updates_url: Url,

    /// Upstream the vehicle positions feed is fetched from.
    #[arg(
        long = "vehicle-positions-url",
        env = "GTFS_RELAY_VEHICLE_POSITIONS_URL",
        default_value = FeedSettings::DEFAULT_VEHICLE_POSITIONS_URL
    )]
    vehicle_positions_url: Url,

    /// Upstream the alerts feed is fetched from.
    #[arg(
        long = "alerts-url",
        env = "GTFS_RELAY_ALERTS_URL",
        default_value = FeedSettings::DEFAULT_ALERTS_URL
    )]
    alerts_url: Url,

    /// Directory holding the application bundle (index file, scripts, styles).
    #[arg(long = "app-root", env = "GTFS_RELAY_APP_ROOT", default_value = ".")]
    app_root: PathBuf,

    /// Directory served under `/data`.
    ///
    /// When left empty, the `data` directory inside the application root is used.
    #[arg(long = "data-dir", env = "GTFS_RELAY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// File inside the application root that is served for `/`.
    #[arg(
        long = "index-file",
        env = "GTFS_RELAY_INDEX_FILE",
        default_value = "index.html"
    )]
    index_file: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("info")))
        .init();
    let args = Arguments::parse();

    let mut static_settings = StaticSettings::from_app_root(args.app_root);
    static_settings.index_file = args.index_file;
    if let Some(data_dir) = args.data_dir {
        static_settings.data_dir = data_dir;
    }

    RelayServer::new(RelayServerSettings {
        request_timeout: *args.request_timeout,
        upstream_settings: UpstreamSettings {
            request_timeout: *args.upstream_request_timeout,
            max_redirects: args.upstream_max_redirects,
        },
        feed_settings: FeedSettings {
            trip_updates: args.trip_updates_url,
            vehicle_positions: args.vehicle_positions_url,
            alerts: args.alerts_url,
        },
        static_settings,
    })?
    .start(&args.address)
    .await
}
