//! REST endpoints for loading mechanisms and solving them.

use crate::{error_payload, AppState, Frame};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use linkage_core::geometry::Point2;
use linkage_core::linkage::{JointId, Link, Linkage, LinkageError, LinkageSolver, MechanismSpec, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Upper bound on frames computed by a single sweep request
pub(crate) const MAX_SWEEP_STEPS: usize = 3600;

#[derive(Debug, Error)]
pub(crate) enum ApiError {
    #[error("Mechanism {0} not found")]
    NotFound(Uuid),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Linkage(#[from] LinkageError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Linkage(e) if e.is_construction() => (StatusCode::BAD_REQUEST, e.code()),
            ApiError::Linkage(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.code()),
        };
        (status, Json(error_payload(code, &self.to_string(), "error"))).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Created {
    pub id: Uuid,
    pub joints: usize,
    pub links: usize,
    pub dof: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct MechanismView {
    pub id: Uuid,
    pub dof: i32,
    pub spec: MechanismSpec,
    pub links: Vec<Link>,
    pub positions: BTreeMap<JointId, Point2>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SolveRequest {
    /// Motor angle in radians
    pub angle: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SweepRequest {
    pub steps: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct SweepResponse {
    pub frames: Vec<Snapshot>,
    pub links: Vec<Link>,
}

pub(crate) async fn root() -> &'static str {
    "Hello from Linkage Backend!"
}

pub(crate) async fn list_mechanisms(State(state): State<Arc<AppState>>) -> Json<Vec<Uuid>> {
    let mut ids: Vec<Uuid> = state.mechanisms.read().await.keys().copied().collect();
    ids.sort();
    Json(ids)
}

pub(crate) async fn create_mechanism(
    State(state): State<Arc<AppState>>,
    Json(spec): Json<MechanismSpec>,
) -> Result<Json<Created>, ApiError> {
    let linkage = Linkage::from_spec(&spec).map_err(|e| {
        warn!("Rejected mechanism description: {}", e);
        e
    })?;

    let joints = linkage.len();
    let links = linkage.links().len();
    let dof = linkage.degrees_of_freedom();
    if dof != 0 {
        warn!("Mechanism has {} estimated degrees of freedom", dof);
    }

    let id = state.insert(linkage).await;
    info!("Created mechanism {} with {} joints and {} links", id, joints, links);

    Ok(Json(Created { id, joints, links, dof }))
}

pub(crate) async fn get_mechanism(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MechanismView>, ApiError> {
    let mechanisms = state.mechanisms.read().await;
    let linkage = mechanisms.get(&id).ok_or(ApiError::NotFound(id))?;

    Ok(Json(MechanismView {
        id,
        dof: linkage.degrees_of_freedom(),
        spec: linkage.to_spec(),
        links: linkage.links().to_vec(),
        positions: linkage.positions(),
    }))
}

pub(crate) async fn solve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<SolveRequest>,
) -> Result<Json<Frame>, ApiError> {
    if !request.angle.is_finite() {
        return Err(ApiError::BadRequest("angle must be a finite number".to_string()));
    }

    let mut mechanisms = state.mechanisms.write().await;
    let linkage = mechanisms.get_mut(&id).ok_or(ApiError::NotFound(id))?;

    match LinkageSolver::solve(linkage, request.angle) {
        Ok(snapshot) => Ok(Json(Frame::new(snapshot, linkage))),
        Err(e) => {
            warn!("Solve of {} at {} rad failed: {}", id, request.angle, e);
            Err(e.into())
        }
    }
}

pub(crate) async fn sweep(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<SweepRequest>,
) -> Result<Json<SweepResponse>, ApiError> {
    if request.steps == 0 || request.steps > MAX_SWEEP_STEPS {
        return Err(ApiError::BadRequest(format!(
            "steps must be between 1 and {}",
            MAX_SWEEP_STEPS
        )));
    }

    let mut mechanisms = state.mechanisms.write().await;
    let linkage = mechanisms.get_mut(&id).ok_or(ApiError::NotFound(id))?;

    let frames = LinkageSolver::sweep(linkage, LinkageSolver::revolution(request.steps)).map_err(|e| {
        warn!("Sweep of {} failed: {}", id, e);
        e
    })?;
    info!("Swept mechanism {} through {} frames", id, frames.len());

    Ok(Json(SweepResponse { frames, links: linkage.links().to_vec() }))
}
