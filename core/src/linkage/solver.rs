//! Closed-form kinematics for planar linkages.
//!
//! A solve seeds every static and motor joint, then sweeps the joints in id
//! order placing each passive joint as soon as exactly two of its neighbours
//! are known, by intersecting the two neighbour circles.
//!
//! Passive joints remember their last position. That stored hint selects
//! between the two intersection candidates on the next solve, which keeps
//! the mechanism on one assembly branch while the motor angle is stepped in
//! small increments. Successive solves on the same `Linkage` are therefore
//! order dependent.

use super::error::{LinkageError, LinkageResult};
use super::graph::Linkage;
use super::types::{JointId, JointKind};
use crate::geometry::{circle_circle_intersection, dist_sq, polar_offset, Point2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;

/// Positions of every joint for one motor angle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Motor angle in radians
    pub angle: f64,
    pub positions: BTreeMap<JointId, Point2>,
    /// Number of propagation passes needed to place every passive joint
    pub passes: usize,
}

impl Snapshot {
    pub fn position(&self, id: JointId) -> Option<Point2> {
        self.positions.get(&id).copied()
    }
}

pub struct LinkageSolver;

impl LinkageSolver {
    /// Solve every joint position for `motor_angle` (radians).
    ///
    /// Joint coordinates are updated in place. On failure they are rolled
    /// back to what they were before the call.
    pub fn solve(linkage: &mut Linkage, motor_angle: f64) -> LinkageResult<Snapshot> {
        if !motor_angle.is_finite() {
            return Err(LinkageError::InvalidAngle(motor_angle));
        }
        let saved = linkage.snapshot_positions();

        match Self::propagate(linkage, motor_angle) {
            Ok(passes) => {
                tracing::debug!(
                    "solved {} joints at {:.4} rad in {} passes",
                    linkage.len(),
                    motor_angle,
                    passes
                );
                Ok(Snapshot { angle: motor_angle, positions: linkage.positions(), passes })
            }
            Err(e) => {
                tracing::debug!("solve at {:.4} rad failed: {}", motor_angle, e);
                linkage.restore_positions(&saved);
                Err(e)
            }
        }
    }

    /// Solve a sequence of angles in order on the same linkage, stopping at the first failure.
    pub fn sweep<I>(linkage: &mut Linkage, angles: I) -> LinkageResult<Vec<Snapshot>>
    where
        I: IntoIterator<Item = f64>,
    {
        angles
            .into_iter()
            .map(|angle| Self::solve(linkage, angle))
            .collect()
    }

    /// `steps` evenly spaced angles covering one crank revolution, starting at 0.
    pub fn revolution(steps: usize) -> Vec<f64> {
        (0..steps).map(|k| k as f64 * 2.0 * PI / steps as f64).collect()
    }

    fn propagate(linkage: &mut Linkage, motor_angle: f64) -> LinkageResult<usize> {
        Self::seed(linkage, motor_angle)?;

        let joint_count = linkage.len();
        let mut unresolved = linkage.joints().iter().filter(|j| !j.resolved).count();
        let mut passes = 0;

        // Every productive pass places at least one joint
        while unresolved > 0 && passes < joint_count {
            passes += 1;
            let mut placed = 0;

            for index in 0..joint_count {
                if linkage.joints()[index].resolved {
                    continue;
                }
                if let Some(p) = Self::place(linkage, JointId(index), motor_angle)? {
                    let joint = &mut linkage.joints_mut()[index];
                    joint.set_position(Some(p));
                    joint.resolved = true;
                    placed += 1;
                    tracing::trace!("pass {}: joint {} -> ({:.4}, {:.4})", passes, index, p.x, p.y);
                }
            }

            unresolved -= placed;
            if placed == 0 {
                break;
            }
        }

        if unresolved > 0 {
            let unresolved = linkage
                .joints()
                .iter()
                .filter(|j| !j.resolved)
                .map(|j| j.id)
                .collect();
            return Err(LinkageError::Stalled { unresolved });
        }

        Ok(passes)
    }

    /// Phase 1: fix static joints, swing motor arms, and mark passive joints unknown.
    /// Passive hints are kept for branch selection.
    fn seed(linkage: &mut Linkage, motor_angle: f64) -> LinkageResult<()> {
        for index in 0..linkage.len() {
            let pivot = match linkage.joints()[index].kind {
                JointKind::Motor { parent, length, .. } => {
                    // Parents have lower ids, so a motor parent is already placed here
                    let center = linkage.coordinate(parent).ok_or_else(|| {
                        LinkageError::InvalidMotorParent(format!("joint {} has no position", parent))
                    })?;
                    Some(polar_offset(&center, length, motor_angle))
                }
                _ => None,
            };

            let joint = &mut linkage.joints_mut()[index];
            if pivot.is_some() {
                joint.set_position(pivot);
            }
            joint.resolved = !matches!(joint.kind, JointKind::Passive { .. });
        }
        Ok(())
    }

    /// Try to place one passive joint. Returns None while fewer than two neighbours are known.
    fn place(linkage: &Linkage, id: JointId, motor_angle: f64) -> LinkageResult<Option<Point2>> {
        let joints = linkage.joints();
        let joint = &joints[id.0];

        let known: Vec<(Point2, f64)> = joint
            .adjacent
            .iter()
            .filter(|(n, _)| joints[n.0].resolved)
            .filter_map(|(n, len)| joints[n.0].position().map(|p| (p, *len)))
            .collect();

        if known.len() < 2 {
            return Ok(None);
        }
        if known.len() > 2 {
            return Err(LinkageError::Overconstrained { joint: id, resolved: known.len() });
        }

        let (c1, r1) = known[0];
        let (c2, r2) = known[1];
        let (first, second) = circle_circle_intersection(&c1, r1, &c2, r2)
            .ok_or(LinkageError::Infeasible { joint: id, angle: motor_angle })?;

        Ok(Some(Self::choose_branch(joint.position(), first, second)))
    }

    /// Pick the candidate nearest the previous position. Without a hint, or on
    /// an exact tie, the second candidate wins so results stay reproducible.
    fn choose_branch(hint: Option<Point2>, first: Point2, second: Point2) -> Point2 {
        match hint {
            Some(h) if dist_sq(&h, &first) < dist_sq(&h, &second) => first,
            _ => second,
        }
    }
}
