use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use linkage_core::linkage::{Link, Linkage, Snapshot};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

mod api;
mod config;
mod ws;

/// Build the JSON body sent to clients when something goes wrong
fn error_payload(code: &str, message: &str, severity: &str) -> serde_json::Value {
    json!({
        "code": code,
        "message": message,
        "severity": severity
    })
}

/// Format an error as a websocket message for the frontend
fn format_error(code: &str, message: &str, severity: &str) -> String {
    format!("ERROR_UPDATE:{}", error_payload(code, message, severity))
}

/// One solved configuration together with the rods to draw between the joints.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Frame {
    #[serde(flatten)]
    pub snapshot: Snapshot,
    pub links: Vec<Link>,
}

impl Frame {
    pub fn new(snapshot: Snapshot, linkage: &Linkage) -> Self {
        Self { snapshot, links: linkage.links().to_vec() }
    }
}

// Application State
pub(crate) struct AppState {
    /// Solving mutates the stored hints, so solves take the write lock.
    pub mechanisms: RwLock<HashMap<Uuid, Linkage>>,
}

impl AppState {
    pub fn new() -> Self {
        Self { mechanisms: RwLock::new(HashMap::new()) }
    }

    pub async fn insert(&self, linkage: Linkage) -> Uuid {
        let id = Uuid::new_v4();
        self.mechanisms.write().await.insert(id, linkage);
        id
    }
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(api::root))
        .route("/mechanisms", get(api::list_mechanisms).post(api::create_mechanism))
        .route("/mechanisms/:id", get(api::get_mechanism))
        .route("/mechanisms/:id/solve", post(api::solve))
        .route("/mechanisms/:id/sweep", post(api::sweep))
        .route("/ws", get(ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::BackendConfig::parse();

    tracing_subscriber::fmt()
        .with_max_level(config.log_level())
        .init();

    let shared_state = Arc::new(AppState::new());

    if let Some(path) = &config.mechanism {
        let json = tokio::fs::read_to_string(path).await?;
        let linkage = Linkage::from_json(&json)?;
        let dof = linkage.degrees_of_freedom();
        if dof != 0 {
            warn!("{} has {} estimated degrees of freedom", path.display(), dof);
        }
        let id = shared_state.insert(linkage).await;
        info!("Loaded {} as mechanism {}", path.display(), id);
    }

    let listener = tokio::net::TcpListener::bind(config.address).await?;
    info!("listening on {}", config.address);
    axum::serve(listener, app(shared_state)).await?;

    Ok(())
}
