use exposilico::{api, config::Config, SourceCatalog};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let catalog = match config.load_catalog() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load feed catalog: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        projects = catalog.project_count(),
        cutoff = ?config.default_cutoff,
        "Feed catalog loaded"
    );

    let port = config.port;
    let catalog: Arc<dyn SourceCatalog> = Arc::new(catalog);
    let app = api::create_router(api::AppState::new(config, catalog));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
