//! services/desk/src/bin/desk.rs

use desk_lib::{
    adapters::{BroadcastBus, JsonFileStore, StaticDirectory},
    config::Config,
    engine::{CrossSessionSync, DeskSession},
    error::DeskError,
    web::{
        add_response_handler, create_ticket_handler, list_messages_handler,
        list_notifications_handler, list_tickets_handler, mark_all_read_handler,
        mark_message_read_handler, mark_read_handler, refresh_handler, send_message_handler,
        ticket_stats_handler, unread_count_handler, update_status_handler, AppState,
    },
};

use axum::{
    routing::{get, post},
    Router,
};
use coachdesk_core::ports::{ChangeBus, KeyValueStore};
use coachdesk_core::store::PersistedStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), DeskError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            config.log_level.to_string(),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting desk service...");

    // --- 2. Build the Store, Bus, and Directory Adapters ---
    let backend: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(&config.store_path));
    let bus: Arc<BroadcastBus> = Arc::new(BroadcastBus::new());
    let store = Arc::new(PersistedStore::new(
        backend,
        bus.clone() as Arc<dyn ChangeBus>,
    ));

    let directory = match &config.students_path {
        Some(path) => match StaticDirectory::from_json_file(path) {
            Ok(directory) => Arc::new(directory),
            Err(e) => {
                warn!(error = %e, "student seed unavailable, starting with an empty directory");
                Arc::new(StaticDirectory::empty())
            }
        },
        None => Arc::new(StaticDirectory::empty()),
    };
    info!(store = %config.store_path.display(), "store attached");

    // --- 3. Build the Session & Start the Change Listener ---
    let session = Arc::new(DeskSession::new(store, directory));
    let shutdown = CancellationToken::new();
    let listener_task = tokio::spawn(
        CrossSessionSync::new(session.clone(), bus.as_ref()).run(shutdown.clone()),
    );

    let app_state = Arc::new(AppState {
        session,
        config: config.clone(),
    });

    // --- 4. Create the Web Router ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/tickets", get(list_tickets_handler).post(create_ticket_handler))
        .route("/tickets/stats", get(ticket_stats_handler))
        .route("/tickets/{id}/status", post(update_status_handler))
        .route("/tickets/{id}/responses", post(add_response_handler))
        .route("/notifications", get(list_notifications_handler))
        .route("/notifications/unread-count", get(unread_count_handler))
        .route("/notifications/{id}/read", post(mark_read_handler))
        .route("/notifications/read-all", post(mark_all_read_handler))
        .route("/messages", get(list_messages_handler).post(send_message_handler))
        .route("/messages/{id}/read", post(mark_message_read_handler))
        .route("/refresh", post(refresh_handler))
        .layer(cors)
        .with_state(app_state);

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move {
                let _ = tokio::signal::ctrl_c().await;
                shutdown.cancel();
            }
        })
        .await?;

    shutdown.cancel();
    let _ = listener_task.await;
    Ok(())
}
