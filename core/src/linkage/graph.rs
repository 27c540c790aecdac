//! The joint/link graph of a planar mechanism.
//!
//! Joints live in a dense vector indexed by `JointId`, and adjacency is kept
//! as `(JointId, length)` pairs, so closed loops such as four-bars need no
//! shared references. The graph only grows: there is no removal.

use super::error::{LinkageError, LinkageResult};
use super::types::{Joint, JointDef, JointId, JointKind, JointType, Link, LinkDef, MechanismSpec};
use crate::geometry::Point2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serializes as a `MechanismSpec`; deserializing goes through `from_spec`
/// so every joint and link is validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MechanismSpec", into = "MechanismSpec")]
pub struct Linkage {
    joints: Vec<Joint>,
    links: Vec<Link>,
}

fn check_length(length: f64) -> LinkageResult<()> {
    if length.is_finite() && length > 0.0 {
        Ok(())
    } else {
        Err(LinkageError::InvalidLength(length))
    }
}

fn check_point(p: &Point2) -> LinkageResult<()> {
    if p.x.is_finite() && p.y.is_finite() {
        Ok(())
    } else {
        Err(LinkageError::NonFiniteCoordinates)
    }
}

impl Linkage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a joint from a loose definition and return its id.
    ///
    /// Static joints need coordinates. Motor joints need an existing static
    /// or motor parent and a positive arm length; the arm is added as a link
    /// right away. For passive joints the coordinates are only a hint.
    pub fn create_joint(&mut self, def: JointDef) -> LinkageResult<JointId> {
        if let Some(p) = &def.coordinates {
            check_point(p)?;
        }

        let id = JointId(self.joints.len());
        let kind = match def.kind {
            JointType::Static => {
                let position = def.coordinates.ok_or(LinkageError::MissingCoordinates)?;
                JointKind::Static { position }
            }
            JointType::Passive => JointKind::Passive { hint: def.coordinates },
            JointType::Motor => {
                // The arm angle alone places a motor joint
                if def.coordinates.is_some() {
                    return Err(LinkageError::MotorCoordinates);
                }
                let parent = def.motor_parent.ok_or_else(|| {
                    LinkageError::InvalidMotorParent("motor joints need a parent".to_string())
                })?;
                let parent_joint = self.joint(parent).ok_or_else(|| {
                    LinkageError::InvalidMotorParent(format!("joint {} does not exist", parent))
                })?;
                if parent_joint.joint_type() == JointType::Passive {
                    return Err(LinkageError::InvalidMotorParent(format!(
                        "joint {} is passive, the arm needs a static or motor pivot",
                        parent
                    )));
                }
                let length = def.motor_linkage.ok_or(LinkageError::MissingMotorLinkage)?;
                check_length(length)?;
                JointKind::Motor { parent, length, position: None }
            }
        };

        self.joints.push(Joint::new(id, kind));

        if let JointKind::Motor { parent, length, .. } = self.joints[id.0].kind {
            self.connect(id, parent, length, true);
        }

        tracing::trace!("created {} joint {}", def.kind, id);
        Ok(id)
    }

    pub fn add_static(&mut self, position: Point2) -> LinkageResult<JointId> {
        self.create_joint(JointDef::fixed(position))
    }

    pub fn add_passive(&mut self, hint: Option<Point2>) -> LinkageResult<JointId> {
        self.create_joint(JointDef::passive(hint))
    }

    pub fn add_motor(&mut self, parent: JointId, length: f64) -> LinkageResult<JointId> {
        self.create_joint(JointDef::motor(parent, length))
    }

    /// Add a rigid link of `length` between two distinct existing joints.
    pub fn add_link(&mut self, a: JointId, b: JointId, length: f64) -> LinkageResult<()> {
        for id in [a, b] {
            if self.joint(id).is_none() {
                return Err(LinkageError::UnknownJoint(id));
            }
        }
        if a == b {
            return Err(LinkageError::SelfLink(a));
        }
        check_length(length)?;

        self.connect(a, b, length, false);
        Ok(())
    }

    fn connect(&mut self, a: JointId, b: JointId, length: f64, driver: bool) {
        self.joints[a.0].adjacent.push((b, length));
        self.joints[b.0].adjacent.push((a, length));
        self.links.push(Link { a, b, length, driver });
    }

    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id.0)
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub(crate) fn joints_mut(&mut self) -> &mut [Joint] {
        &mut self.joints
    }

    /// All links in creation order, motor arms included.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn joint_type(&self, id: JointId) -> Option<JointType> {
        self.joint(id).map(Joint::joint_type)
    }

    pub fn coordinate(&self, id: JointId) -> Option<Point2> {
        self.joint(id).and_then(Joint::position)
    }

    pub fn adjacency(&self, id: JointId) -> Option<&[(JointId, f64)]> {
        self.joint(id).map(Joint::adjacent)
    }

    /// Every joint that currently has a coordinate.
    pub fn positions(&self) -> BTreeMap<JointId, Point2> {
        self.joints
            .iter()
            .filter_map(|j| j.position().map(|p| (j.id, p)))
            .collect()
    }

    /// Estimated degrees of freedom left after the motor angle is fixed.
    /// Each passive joint has 2 DOF, and each link touching a passive joint removes one.
    /// Negative = over-constrained, 0 = fully constrained, Positive = under-constrained
    pub fn degrees_of_freedom(&self) -> i32 {
        let is_passive = |id: JointId| self.joint_type(id) == Some(JointType::Passive);

        let passive = self.joints.iter().filter(|j| is_passive(j.id)).count() as i32;
        let constraints = self
            .links
            .iter()
            .filter(|l| is_passive(l.a) || is_passive(l.b))
            .count() as i32;

        2 * passive - constraints
    }

    /// Largest deviation between a link's length and the distance between its endpoints.
    /// Links with an endpoint that has no coordinate are skipped.
    pub fn max_link_error(&self) -> f64 {
        self.links
            .iter()
            .filter_map(|l| {
                let pa = self.coordinate(l.a)?;
                let pb = self.coordinate(l.b)?;
                Some((nalgebra::distance(&pa, &pb) - l.length).abs())
            })
            .fold(0.0, f64::max)
    }

    pub(crate) fn snapshot_positions(&self) -> Vec<Option<Point2>> {
        self.joints.iter().map(Joint::position).collect()
    }

    /// Put back coordinates captured with `snapshot_positions` and clear resolved flags.
    pub(crate) fn restore_positions(&mut self, saved: &[Option<Point2>]) {
        for (joint, p) in self.joints.iter_mut().zip(saved) {
            joint.set_position(*p);
            joint.resolved = false;
        }
    }

    /// Build a linkage from a description, validating every joint and link.
    pub fn from_spec(spec: &MechanismSpec) -> LinkageResult<Self> {
        let mut linkage = Self::new();
        for def in &spec.joints {
            linkage.create_joint(def.clone())?;
        }
        for link in &spec.links {
            linkage.add_link(link.a, link.b, link.length)?;
        }
        Ok(linkage)
    }

    pub fn from_json(json: &str) -> LinkageResult<Self> {
        let spec: MechanismSpec = serde_json::from_str(json)?;
        Self::from_spec(&spec)
    }

    /// Describe the linkage so that `from_spec` rebuilds the same topology.
    /// Passive joints carry their current position as the hint.
    pub fn to_spec(&self) -> MechanismSpec {
        let joints = self
            .joints
            .iter()
            .map(|j| match &j.kind {
                JointKind::Static { position } => JointDef::fixed(*position),
                JointKind::Passive { hint } => JointDef::passive(*hint),
                JointKind::Motor { parent, length, .. } => JointDef::motor(*parent, *length),
            })
            .collect();

        let links = self
            .links
            .iter()
            .filter(|l| !l.driver)
            .map(|l| LinkDef { a: l.a, b: l.b, length: l.length })
            .collect();

        MechanismSpec { joints, links }
    }
}

impl TryFrom<MechanismSpec> for Linkage {
    type Error = LinkageError;

    fn try_from(spec: MechanismSpec) -> LinkageResult<Self> {
        Self::from_spec(&spec)
    }
}

impl From<Linkage> for MechanismSpec {
    fn from(linkage: Linkage) -> Self {
        linkage.to_spec()
    }
}
