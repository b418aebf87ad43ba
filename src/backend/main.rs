/**
 * tracksync Server Entry Point
 *
 * Loads settings, opens the state store, starts the in-process scheduler
 * (unless `SYNC_INTERVAL_SECONDS=0`) and serves the HTTP API.
 */

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use tracksync::backend::server::{create_app, init::load_state, Settings};
    use tracksync::backend::sync::SyncScheduler;

    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "tracksync=info,tower_http=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let settings = Settings::load()?;
    let app_state = load_state(&settings).await?;

    match SyncScheduler::new(settings.sync_interval) {
        Some(scheduler) => {
            scheduler.spawn(app_state.sync.clone());
        }
        None => tracing::info!("Scheduler disabled, waiting for /api/sync calls"),
    }

    let app = create_app(app_state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(not(feature = "ssr"))]
fn main() {
    eprintln!("Server requires the 'ssr' feature to be enabled.");
    eprintln!("Run with: cargo run --bin tracksync-server --features ssr");
    std::process::exit(1);
}
