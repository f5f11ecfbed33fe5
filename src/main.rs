use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use options_desk::{
    AppState,
    config::Config,
    infrastructure::{IbGateway, SupabaseClient},
    router::create_router,
    utils::TokenService,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");

    let supabase = Arc::new(SupabaseClient::from_config(&config));

    // One connection for the lifetime of the process, shared by all handlers.
    let gateway = IbGateway::connect(&config)
        .await
        .expect("Failed to connect to IB Gateway");

    let state = AppState {
        tokens: TokenService::from_config(&config),
        credentials: supabase.clone(),
        profiles: supabase,
        gateway: Arc::new(gateway),
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");

    // The router, and with it the last gateway handle, is gone at this point.
    tracing::info!("Server stopped, brokerage connection released");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
