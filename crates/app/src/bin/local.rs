// Spacegate API - Local Development Server

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use uuid::Uuid;

use spacegate_access::{Identity, MembershipDirectory};
use spacegate_common::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .pretty()
        .init();

    info!("Starting Spacegate API local development server");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Configuration loaded successfully");

    let app = spacegate_app::create_app(&config);
    seed_demo_space(&app, &config).await?;

    let router = app.router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .into_inner(),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("Server starting on http://{}", addr);
    info!("Health check available at http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// The in-memory collaborators start empty; seed one space with a manager
/// session so the API is explorable out of the box.
async fn seed_demo_space(app: &spacegate_app::App, config: &Config) -> anyhow::Result<()> {
    let space = Uuid::new_v4();
    let manager = Uuid::new_v4();

    app.store
        .seed_space(space, &format!("{}/v1/spaces/{}/home", config.base_url, space));
    app.members
        .add_member(space, manager, "administrator")
        .await
        .map_err(|e| anyhow::anyhow!("failed to seed demo manager: {}", e))?;
    app.identity.register_session(
        "demo-manager",
        Identity {
            user_id: manager,
            super_admin: false,
        },
    );

    info!(%space, "Seeded demo space; manage it with 'Authorization: Bearer demo-manager'");
    Ok(())
}

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
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
