use std::path::PathBuf;

use tokio::net::TcpListener;

use mini_server::auth::jwt;
use mini_server::config::{generate_config_template, Config};
use mini_server::db::Store;
use mini_server::routes;
use mini_server::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load config with layered precedence: defaults < TOML < env < CLI
    let config = Config::load()?;

    // Handle --generate-config: print template and exit
    if config.generate_config {
        print!("{}", generate_config_template());
        return Ok(());
    }

    // Initialize tracing/logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mini_server=info,tower_http=info"));
    if config.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().pretty().with_env_filter(filter).init();
    }

    tracing::info!("mini-server v{} starting", env!("CARGO_PKG_VERSION"));

    let store = Store::open(&config.data_dir)?;

    // Configured secret wins; otherwise a random key kept in data_dir
    let session_secret = match config.session_secret.as_deref() {
        Some(secret) if !secret.is_empty() => secret.as_bytes().to_vec(),
        _ => jwt::load_or_generate_session_secret(&config.data_dir)?,
    };

    let uploads_dir = PathBuf::from(&config.uploads_dir);
    std::fs::create_dir_all(&uploads_dir)?;

    if config.require_owner_for_post_edit {
        tracing::info!("Post edits are restricted to post owners");
    }

    let app_state = AppState {
        store: store.clone(),
        session_secret,
        session_ttl_secs: config.session_ttl_secs,
        uploads_dir,
        require_owner_for_post_edit: config.require_owner_for_post_edit,
    };

    let app = routes::build_router(app_state, config.max_upload_bytes());

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down");
    store.shutdown().await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
