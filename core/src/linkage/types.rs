use super::error::LinkageError;
use crate::geometry::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dense, creation-ordered joint identifier. Ids start at 0 and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointId(pub usize);

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three joint categories, without their per-kind data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum JointType {
    Static,
    Passive,
    Motor,
}

impl FromStr for JointType {
    type Err = LinkageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "static" => Ok(Self::Static),
            "passive" => Ok(Self::Passive),
            "motor" => Ok(Self::Motor),
            _ => Err(LinkageError::InvalidKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for JointType {
    type Error = LinkageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for JointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Static => "static",
            Self::Passive => "passive",
            Self::Motor => "motor",
        };
        f.write_str(name)
    }
}

/// Joint kind together with the data only that kind carries.
#[derive(Debug, Clone, PartialEq)]
pub enum JointKind {
    /// Fixed to the ground; the position never changes after creation.
    Static { position: Point2 },
    /// Placed by the solver. `hint` is the last known position and picks
    /// the assembly branch on the next solve.
    Passive { hint: Option<Point2> },
    /// Driven joint on a rigid arm of `length` rotating about `parent`.
    /// `position` is recomputed on every solve.
    Motor { parent: JointId, length: f64, position: Option<Point2> },
}

impl JointKind {
    pub fn joint_type(&self) -> JointType {
        match self {
            Self::Static { .. } => JointType::Static,
            Self::Passive { .. } => JointType::Passive,
            Self::Motor { .. } => JointType::Motor,
        }
    }

    /// Current coordinate: fixed for static joints, last solved value (or hint) otherwise.
    pub fn position(&self) -> Option<Point2> {
        match self {
            Self::Static { position } => Some(*position),
            Self::Passive { hint } => *hint,
            Self::Motor { position, .. } => *position,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub(crate) id: JointId,
    pub(crate) kind: JointKind,
    /// (neighbour, link length) in link creation order
    pub(crate) adjacent: Vec<(JointId, f64)>,
    pub(crate) resolved: bool,
}

impl Joint {
    pub(crate) fn new(id: JointId, kind: JointKind) -> Self {
        Self { id, kind, adjacent: Vec::new(), resolved: false }
    }

    pub fn id(&self) -> JointId {
        self.id
    }

    pub fn kind(&self) -> &JointKind {
        &self.kind
    }

    pub fn joint_type(&self) -> JointType {
        self.kind.joint_type()
    }

    pub fn position(&self) -> Option<Point2> {
        self.kind.position()
    }

    pub fn adjacent(&self) -> &[(JointId, f64)] {
        &self.adjacent
    }

    /// Whether the joint was placed by the most recent solve.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Overwrite the solver-owned coordinate. Static joints are left untouched.
    pub(crate) fn set_position(&mut self, p: Option<Point2>) {
        match &mut self.kind {
            JointKind::Static { .. } => {}
            JointKind::Passive { hint } => *hint = p,
            JointKind::Motor { position, .. } => *position = p,
        }
    }
}

/// A rigid rod of fixed length between two joints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub a: JointId,
    pub b: JointId,
    pub length: f64,
    /// True for the arm created implicitly with a motor joint
    #[serde(default)]
    pub driver: bool,
}

/// Loose joint creation request, validated by `Linkage::create_joint`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointDef {
    #[serde(rename = "type")]
    pub kind: JointType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Point2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motor_linkage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motor_parent: Option<JointId>,
}

impl JointDef {
    pub fn fixed(position: Point2) -> Self {
        Self { kind: JointType::Static, coordinates: Some(position), motor_linkage: None, motor_parent: None }
    }

    pub fn passive(hint: Option<Point2>) -> Self {
        Self { kind: JointType::Passive, coordinates: hint, motor_linkage: None, motor_parent: None }
    }

    pub fn motor(parent: JointId, length: f64) -> Self {
        Self { kind: JointType::Motor, coordinates: None, motor_linkage: Some(length), motor_parent: Some(parent) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkDef {
    pub a: JointId,
    pub b: JointId,
    pub length: f64,
}

/// Serializable mechanism description. Joint ids are implied by position in `joints`;
/// motor arms are created from the motor joints and are not listed in `links`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MechanismSpec {
    pub joints: Vec<JointDef>,
    #[serde(default)]
    pub links: Vec<LinkDef>,
}
