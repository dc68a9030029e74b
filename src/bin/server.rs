use std::{
    env,
    fs::OpenOptions,
    net::{IpAddr, SocketAddr},
    process::exit,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    http::HeaderName,
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use ledgerline::{
    AppState, CookieIdentityProvider, HeaderIdentityProvider, IdentityProvider, RetryPolicy,
    TracingEventSink, build_router, get_local_offset, graceful_shutdown, logging_middleware,
};

/// The JSON API server for ledgerline.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The address to bind to.
    #[arg(short, long, default_value = "127.0.0.1")]
    address: IpAddr,

    /// The canonical name of the local timezone, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// Trust the identity in this request header instead of a session cookie.
    ///
    /// Only use this behind a proxy that authenticates requests and sets the header itself.
    #[arg(long)]
    identity_header: Option<String>,

    /// How many times a recurring transaction event is attempted before giving up.
    #[arg(long, default_value_t = RetryPolicy::default().max_attempts)]
    event_max_attempts: u32,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    if get_local_offset(&args.timezone).is_none() {
        tracing::error!("Invalid timezone {}", args.timezone);
        exit(1);
    }

    let identity_provider: Arc<dyn IdentityProvider> = match &args.identity_header {
        Some(header) => match HeaderName::try_from(header.as_str()) {
            Ok(header) => Arc::new(HeaderIdentityProvider::new(header)),
            Err(error) => {
                tracing::error!("Invalid identity header {header:?}: {error}");
                exit(1);
            }
        },
        None => match env::var("SECRET") {
            Ok(secret) => Arc::new(CookieIdentityProvider::new(&secret)),
            Err(_) => {
                tracing::error!(
                    "The environment variable 'SECRET' must be set when --identity-header is not given"
                );
                exit(1);
            }
        },
    };

    let conn = match Connection::open(&args.db_path) {
        Ok(conn) => conn,
        Err(error) => {
            tracing::error!("Could not open database at {}: {error}", args.db_path);
            exit(1);
        }
    };

    let event_sink = Arc::new(TracingEventSink::new(RetryPolicy {
        max_attempts: args.event_max_attempts,
    }));

    let app_state = match AppState::new(conn, identity_provider, event_sink, &args.timezone) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not initialize the database: {error}");
            exit(1);
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(app_state.clone()).layer(middleware::from_fn_with_state(
        app_state,
        logging_middleware,
    ));
    let router = add_tracing_layer(router);

    let addr = SocketAddr::from((args.address, args.port));
    tracing::info!("HTTP server listening on {}", addr);

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        exit(1);
    }
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(filter::LevelFilter::INFO);

    let debug_log = match OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
    {
        Ok(log_file) => Some(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(Arc::new(log_file))
                .with_filter(filter::LevelFilter::DEBUG),
        ),
        Err(error) => {
            eprintln!("Could not create log file, logging to stdout only: {error}");
            None
        }
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with(stdout_log)
        .with(debug_log)
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are handled.
        .on_failure(());

    router.layer(tracing_layer)
}
