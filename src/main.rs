//! Madakoko - a meeting room kiosk server
//!
//! This is the main entry point for the madakoko application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use madakoko::{
    api::create_router,
    config::Config,
    reservations::{HttpReservationProvider, Resolver},
    rooms::RoomCatalog,
    state::AppState,
    tasks::{countdown_timer_task, reservation_resolver_task},
    utils::{shutdown_signal, SystemClock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("madakoko={},tower_http=info", config.log_level()))
        .init();

    info!("Starting madakoko server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, room={}, fallback={}s, refresh={}s",
        config.host, config.port, config.room, config.fallback_seconds, config.refresh_seconds
    );

    let catalog = RoomCatalog::default();
    if !catalog.contains(config.room) {
        anyhow::bail!("Room {} is not in the room catalog", config.room);
    }

    let provider = HttpReservationProvider::new(&config.api_base_url, config.request_timeout())?;
    info!("Reservation service: {}", provider.endpoint());

    // Create application state
    let state = Arc::new(AppState::new(
        catalog,
        config.room,
        config.fallback_duration(),
        Arc::new(SystemClock),
    ));

    // Start the countdown before the first resolution lands
    let timer_state = Arc::clone(&state);
    let countdown = tokio::spawn(async move {
        countdown_timer_task(timer_state).await;
    });

    let resolver_state = Arc::clone(&state);
    let refresh_every = config.refresh_interval();
    let resolver = tokio::spawn(async move {
        reservation_resolver_task(resolver_state, Resolver::new(provider), refresh_every).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /status         - Current reservation and countdown");
    info!("  GET  /rooms          - Selectable rooms");
    info!("  POST /room/:room_id  - Switch room");
    info!("  POST /refresh        - Re-resolve the current room");
    info!("  POST /alert/dismiss  - Close the completion alert");
    info!("  GET  /health         - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    countdown.abort();
    resolver.abort();

    info!("Server shutdown complete");
    Ok(())
}
