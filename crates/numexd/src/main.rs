//! numexd - NUMA memory metrics exporter daemon.
//!
//! Reads per-node memory statistics from the sysfs NUMA node tree and
//! serves them as Prometheus metrics over HTTP.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use clap::Parser;
use prometheus::TextEncoder;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

#[cfg(not(target_os = "linux"))]
use numex_core::collector::MockFs;
#[cfg(target_os = "linux")]
use numex_core::collector::RealFs;
use numex_core::collector::{FileSystem, MemoryCollector};
use numex_core::exporter::NumaMemoryExporter;

/// NUMA memory metrics exporter daemon.
#[derive(Parser)]
#[command(name = "numexd", about = "NUMA memory metrics exporter", version = numex_core::VERSION)]
struct Args {
    /// Listen address for the metrics endpoint.
    #[arg(long, default_value = "0.0.0.0:9100", env = "NUMEX_LISTEN")]
    listen: String,

    /// Path to the sysfs filesystem (for testing/mocking).
    #[arg(long, default_value = "/sys", env = "NUMEX_SYSFS")]
    sysfs: String,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("numexd={}", level).parse().unwrap())
        .add_directive(format!("numex_core={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    info!("numexd {} starting", numex_core::VERSION);
    info!("Config: listen={}, sysfs={}", args.listen, args.sysfs);

    #[cfg(target_os = "linux")]
    let exporter = NumaMemoryExporter::new(MemoryCollector::new(RealFs::new(), &args.sysfs));
    #[cfg(not(target_os = "linux"))]
    let exporter =
        NumaMemoryExporter::new(MemoryCollector::new(MockFs::typical_numa_system(), &args.sysfs));

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
        .block_on(serve(args, exporter));
}

type SharedExporter<F> = Arc<Mutex<NumaMemoryExporter<F>>>;

async fn serve<F>(args: Args, exporter: NumaMemoryExporter<F>)
where
    F: FileSystem + 'static,
{
    let state: SharedExporter<F> = Arc::new(Mutex::new(exporter));

    let app = Router::new()
        .route("/", get(handle_index))
        .route("/metrics", get(handle_metrics::<F>))
        .with_state(state);

    let addr: SocketAddr = args.listen.parse().expect("invalid listen address");
    info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");

    axum::serve(listener, app).await.expect("server error");
}

/// GET / - minimal landing page pointing at the metrics endpoint.
async fn handle_index() -> Html<&'static str> {
    Html(
        "<html><head><title>numexd</title></head><body>\
         <h1>NUMA Memory Exporter</h1>\
         <p><a href=\"/metrics\">Metrics</a></p>\
         </body></html>",
    )
}

/// GET /metrics - runs one collection cycle and renders the registry.
///
/// A failed cycle publishes nothing and returns 500; the next scrape is a
/// fresh attempt.
async fn handle_metrics<F: FileSystem + 'static>(
    State(state): State<SharedExporter<F>>,
) -> Response {
    let mut exporter = state.lock().expect("exporter lock poisoned");

    if let Err(e) = exporter.update() {
        error!("collection cycle failed: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("collection failed: {}\n", e),
        )
            .into_response();
    }

    let families = exporter.registry().gather();
    match TextEncoder::new().encode_to_string(&families) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("metrics encoding failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("encoding failed: {}\n", e),
            )
                .into_response()
        }
    }
}
