use super::types::JointId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building a linkage or solving its kinematics.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
pub enum LinkageError {
    #[error("Invalid joint type '{0}': expected \"static\", \"passive\" or \"motor\"")]
    InvalidKind(String),

    #[error("Static joints need coordinates")]
    MissingCoordinates,

    #[error("Coordinates must be finite numbers")]
    NonFiniteCoordinates,

    #[error("Joint {0} does not exist")]
    UnknownJoint(JointId),

    #[error("Invalid motor parent: {0}")]
    InvalidMotorParent(String),

    #[error("Motor joints need a motor_linkage length")]
    MissingMotorLinkage,

    #[error("Motor joint coordinates are set by the solver and cannot be given")]
    MotorCoordinates,

    #[error("Joint {0} cannot be linked to itself")]
    SelfLink(JointId),

    #[error("Length must be a positive finite number, got {0}")]
    InvalidLength(f64),

    #[error("Invalid mechanism description: {0}")]
    Parse(String),

    #[error("Motor angle must be a finite number, got {0}")]
    InvalidAngle(f64),

    /// A passive joint saw more resolved neighbours than its two degrees of freedom can absorb.
    #[error("Structure is overconstrained: joint {joint} has {resolved} resolved neighbours")]
    Overconstrained { joint: JointId, resolved: usize },

    /// The two neighbour circles of a joint do not meet at this motor angle.
    #[error("Linkage cannot be assembled at angle {angle} rad: no position for joint {joint}")]
    Infeasible { joint: JointId, angle: f64 },

    /// A full propagation pass resolved nothing.
    #[error("Structure is underconstrained: propagation stalled with unresolved joints [{}]", join_ids(.unresolved))]
    Stalled { unresolved: Vec<JointId> },
}

impl LinkageError {
    /// True for errors raised while building the graph rather than while solving it.
    pub fn is_construction(&self) -> bool {
        !matches!(
            self,
            Self::InvalidAngle(_)
                | Self::Overconstrained { .. }
                | Self::Infeasible { .. }
                | Self::Stalled { .. }
        )
    }

    /// Stable machine-readable code, used in service error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidKind(_) => "INVALID_KIND",
            Self::MissingCoordinates => "MISSING_COORDINATES",
            Self::NonFiniteCoordinates => "NON_FINITE_COORDINATES",
            Self::UnknownJoint(_) => "UNKNOWN_JOINT",
            Self::InvalidMotorParent(_) => "INVALID_MOTOR_PARENT",
            Self::MissingMotorLinkage => "MISSING_MOTOR_LINKAGE",
            Self::MotorCoordinates => "MOTOR_COORDINATES",
            Self::SelfLink(_) => "SELF_LINK",
            Self::InvalidLength(_) => "INVALID_LENGTH",
            Self::Parse(_) => "PARSE_ERROR",
            Self::InvalidAngle(_) => "INVALID_ANGLE",
            Self::Overconstrained { .. } => "OVERCONSTRAINED",
            Self::Infeasible { .. } => "INFEASIBLE",
            Self::Stalled { .. } => "STALLED",
        }
    }
}

impl From<serde_json::Error> for LinkageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

fn join_ids(ids: &[JointId]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}

/// Result type for linkage operations.
pub type LinkageResult<T> = Result<T, LinkageError>;
