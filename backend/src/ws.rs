use crate::{format_error, AppState, Frame};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use linkage_core::linkage::{Linkage, LinkageError, LinkageSolver, MechanismSpec};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::MAX_SWEEP_STEPS;

/// A text message from the frontend, in `VERB:payload` form.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    Load(MechanismSpec),
    Open(Uuid),
    Solve(f64),
    Sweep(usize),
}

#[derive(Debug, Error, PartialEq)]
pub(crate) enum CommandError {
    #[error("Unknown command")]
    Unknown,
    #[error("{0}")]
    Invalid(String),
}

impl Command {
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let (verb, payload) = text.split_once(':').ok_or(CommandError::Unknown)?;
        let payload = payload.trim();

        match verb {
            "LOAD" => serde_json::from_str(payload)
                .map(Command::Load)
                .map_err(|e| CommandError::Invalid(format!("Invalid mechanism description: {}", e))),
            "OPEN" => Uuid::parse_str(payload)
                .map(Command::Open)
                .map_err(|e| CommandError::Invalid(format!("Invalid mechanism id: {}", e))),
            "SOLVE" => match payload.parse::<f64>() {
                Ok(angle) if angle.is_finite() => Ok(Command::Solve(angle)),
                _ => Err(CommandError::Invalid(format!("Invalid angle: {}", payload))),
            },
            "SWEEP" => match payload.parse::<usize>() {
                Ok(steps) if (1..=MAX_SWEEP_STEPS).contains(&steps) => Ok(Command::Sweep(steps)),
                _ => Err(CommandError::Invalid(format!(
                    "Invalid step count: {} (expected 1 to {})",
                    payload, MAX_SWEEP_STEPS
                ))),
            },
            _ => Err(CommandError::Unknown),
        }
    }
}

fn linkage_error(e: &LinkageError) -> String {
    format_error(e.code(), &e.to_string(), "error")
}

fn snapshot_update(frame: &Frame) -> String {
    format!("SNAPSHOT_UPDATE:{}", serde_json::to_string(frame).unwrap_or("{}".to_string()))
}

fn loaded(id: Uuid, linkage: &Linkage) -> String {
    let summary = json!({
        "id": id,
        "joints": linkage.len(),
        "links": linkage.links().len(),
        "dof": linkage.degrees_of_freedom(),
    });
    format!("LOADED:{}", summary)
}

/// Per-connection state. Each client drives its own copy of the mechanism,
/// so hints from one client never steer another client's solves.
#[derive(Debug, Default)]
pub(crate) struct Session {
    linkage: Option<Linkage>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one command and return the messages to send back, in order.
    pub async fn execute(&mut self, command: Command, state: &AppState) -> Vec<String> {
        match command {
            Command::Load(spec) => match Linkage::from_spec(&spec) {
                Ok(linkage) => {
                    let id = state.insert(linkage.clone()).await;
                    info!("Session loaded mechanism {}", id);
                    let reply = loaded(id, &linkage);
                    self.linkage = Some(linkage);
                    vec![reply]
                }
                Err(e) => {
                    warn!("Rejected mechanism description: {}", e);
                    vec![linkage_error(&e)]
                }
            },
            Command::Open(id) => {
                let found = state.mechanisms.read().await.get(&id).cloned();
                match found {
                    Some(linkage) => {
                        let reply = loaded(id, &linkage);
                        self.linkage = Some(linkage);
                        vec![reply]
                    }
                    None => vec![format_error("NOT_FOUND", &format!("Mechanism {} not found", id), "error")],
                }
            }
            Command::Solve(angle) => {
                let Some(linkage) = self.linkage.as_mut() else {
                    return vec![no_mechanism()];
                };
                match LinkageSolver::solve(linkage, angle) {
                    Ok(snapshot) => vec![snapshot_update(&Frame::new(snapshot, linkage))],
                    Err(e) => vec![linkage_error(&e)],
                }
            }
            Command::Sweep(steps) => {
                let Some(linkage) = self.linkage.as_mut() else {
                    return vec![no_mechanism()];
                };
                let mut replies = Vec::with_capacity(steps);
                for angle in LinkageSolver::revolution(steps) {
                    match LinkageSolver::solve(linkage, angle) {
                        Ok(snapshot) => replies.push(snapshot_update(&Frame::new(snapshot, linkage))),
                        Err(e) => {
                            warn!("Sweep stopped at {:.4} rad: {}", angle, e);
                            replies.push(linkage_error(&e));
                            break;
                        }
                    }
                }
                replies
            }
        }
    }
}

fn no_mechanism() -> String {
    format_error("NO_MECHANISM", "Load or open a mechanism first", "warning")
}

pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    info!("Client connected");
    let (mut sender, mut receiver) = socket.split();
    let mut session = Session::new();

    while let Some(msg) = receiver.next().await {
        let msg = if let Ok(msg) = msg {
            msg
        } else {
            return;
        };

        if let Message::Text(text) = msg {
            debug!("Received message: {}", text);

            let replies = match Command::parse(&text) {
                Ok(command) => session.execute(command, &state).await,
                Err(CommandError::Unknown) => vec![format!("Echo: {}", text)],
                Err(CommandError::Invalid(reason)) => {
                    warn!("Bad command: {}", reason);
                    vec![format_error("BAD_COMMAND", &reason, "warning")]
                }
            };

            for reply in replies {
                if sender.send(Message::Text(reply)).await.is_err() {
                    return;
                }
            }
        }
    }

    info!("Client disconnected");
}
