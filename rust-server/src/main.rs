use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

mod config;
mod data;
mod framework;
mod mission;
mod protocol;
mod session;

use config::ServerConfig;
use data::ItemRegistry;
use framework::LocalFramework;
use mission::{HotReloadEvent, MissionCatalog, MissionDefinition, MissionService};
use protocol::{ClientMessage, ServerMessage};
use session::SessionRegistry;

// ============================================================================
// App State
// ============================================================================

type Missions = MissionService<LocalFramework, SessionRegistry>;

#[derive(Clone)]
struct AppState {
    missions: Arc<Missions>,
    framework: Arc<LocalFramework>,
    sessions: Arc<SessionRegistry>,
}

impl AppState {
    async fn new(config: &ServerConfig) -> Self {
        let mut items = ItemRegistry::new();
        if let Err(e) = items.load_from_directory(&config.data_dir) {
            warn!("Failed to load item definitions: {}", e);
        }
        let items = Arc::new(items);

        let catalog = Arc::new(MissionCatalog::new(&config.data_dir));
        if let Err(e) = catalog.load_all().await {
            error!("Failed to load mission catalog: {}", e);
        }

        let framework = Arc::new(LocalFramework::new(Arc::clone(&items), config.inventory_slots));
        let sessions = Arc::new(SessionRegistry::new());
        let missions = MissionService::new(
            catalog,
            Arc::clone(&framework),
            Arc::clone(&sessions),
            items,
        )
        .with_notify_length(config.notify_length_ms);

        Self {
            missions: Arc::new(missions),
            framework,
            sessions,
        }
    }

    async fn catalog_message(&self) -> ServerMessage {
        ServerMessage::MissionCatalog {
            missions: self.missions.catalog().all().await,
        }
    }

    /// Reload the catalog from disk and push it to every client
    async fn reload_catalog(&self) -> Result<ReloadSummary, String> {
        let report = self.missions.catalog().load_all().await?;
        self.sessions.broadcast(&self.catalog_message().await);
        Ok(ReloadSummary {
            accepted: report.accepted.len(),
            rejected: report.rejected,
        })
    }
}

#[derive(Serialize)]
struct ReloadSummary {
    accepted: usize,
    rejected: Vec<String>,
}

// ============================================================================
// HTTP Handlers
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "players": state.sessions.len(),
        "missions": state.missions.catalog().count().await,
        "active_missions": state.missions.ledger().len(),
        "timestamp": chrono::Utc::now().timestamp_millis()
    }))
}

async fn list_missions(State(state): State<AppState>) -> Json<Vec<MissionDefinition>> {
    let missions = state.missions.catalog().all().await;
    Json(missions.iter().map(|m| m.as_ref().clone()).collect())
}

async fn reload_missions(State(state): State<AppState>) -> impl IntoResponse {
    match state.reload_catalog().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            error!("Failed to reload missions: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e })),
            )
                .into_response()
        }
    }
}

async fn show_ledger(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "active": state.missions.ledger().snapshot(),
        "players": state.framework.players(),
        "drops": state.framework.world_drops().await,
    }))
}

// ============================================================================
// WebSocket Handler
// ============================================================================

#[derive(Deserialize)]
struct WsQuery {
    /// Display name of the connecting player
    name: Option<String>,
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let name = query
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "Stranger".to_string());
    ws.on_upgrade(move |socket| handle_socket(socket, state, name))
}

async fn handle_socket(socket: WebSocket, state: AppState, player_name: String) {
    let (mut sender, mut receiver) = socket.split();
    let player_id = Uuid::new_v4().to_string();

    state.framework.register_player(&player_id, &player_name);
    info!("Player {} ({}) connected", player_name, player_id);

    // Handshake and current catalog
    let welcome = ServerMessage::Welcome {
        player_id: player_id.clone(),
    };
    for msg in [welcome, state.catalog_message().await] {
        match protocol::encode_server_message(&msg) {
            Ok(bytes) => {
                let _ = sender.send(Message::Binary(bytes)).await;
            }
            Err(e) => warn!("Failed to encode {}: {}", msg.msg_type(), e),
        }
    }

    // Create channel for sending messages to this client
    let (tx, mut rx) = mpsc::channel::<Vec<u8>>(32);
    state.sessions.register(&player_id, tx);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Binary(msg)).await.is_err() {
                break;
            }
        }
    });

    // Messages of one connection are handled in order
    let state_clone = state.clone();
    let player_id_clone = player_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Binary(data) => {
                    if let Err(e) = handle_client_message(&state_clone, &player_id_clone, &data).await {
                        warn!("Error handling message: {}", e);
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    info!("Player {} ({}) disconnected", player_name, player_id);
    state.sessions.unregister(&player_id);
    state.missions.cleanup_player_missions(&player_id).await;
    state.framework.remove_player(&player_id);
}

async fn handle_client_message(state: &AppState, player_id: &str, data: &[u8]) -> Result<(), String> {
    let msg = protocol::decode_client_message(data)?;

    match msg {
        ClientMessage::StartMission { mission_id } => {
            state.missions.start_mission(player_id, &mission_id).await;
        }
        ClientMessage::CollectItem { mission_id, item_name } => {
            state.missions.collect_item(player_id, &mission_id, &item_name).await;
        }
        ClientMessage::CompleteMission { mission_id } => {
            state.missions.complete_mission(player_id, &mission_id).await;
        }
        ClientMessage::CancelMission { mission_id } => {
            state.missions.cancel_mission(player_id, &mission_id).await;
        }
        ClientMessage::RequestMissions => {
            state.reload_catalog().await?;
        }
        ClientMessage::Position(position) => {
            state.framework.set_position(player_id, position);
        }
    }

    Ok(())
}

// ============================================================================
// Hot Reload
// ============================================================================

fn spawn_catalog_watcher(state: AppState) {
    let mut events = match state.missions.catalog().start_file_watcher() {
        Ok(rx) => rx,
        Err(e) => {
            warn!("Mission hot-reload disabled: {}", e);
            return;
        }
    };

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                HotReloadEvent::Reloaded(count) => {
                    info!("Broadcasting reloaded catalog ({} missions)", count);
                    state.sessions.broadcast(&state.catalog_message().await);
                }
                HotReloadEvent::Error(e) => warn!("Mission catalog reload failed: {}", e),
            }
        }
    });
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("crime_server=info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));
    let config = ServerConfig::load_or_default(&config_path)?;

    let state = AppState::new(&config).await;

    if config.hot_reload {
        spawn_catalog_watcher(state.clone());
    }

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/missions", get(list_missions))
        .route("/api/missions/reload", post(reload_missions))
        .route("/api/ledger", get(show_ledger))
        .route("/ws", get(ws_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        )
        .with_state(state);

    let addr: SocketAddr = config.bind_address.parse()?;
    info!("Crime mission server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
