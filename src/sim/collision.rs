//! Boundary and obstacle resolution
//!
//! Runs after the position update. The square platform edge is handled per
//! axis; pillars push the body back out along the line from their center.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::config::{BoundaryPolicy, Pillar};
use super::state::Body;
use crate::{cartesian_to_polar, polar_to_cartesian, sign};

/// Which platform edge was crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryHit {
    PosX,
    NegX,
    PosZ,
    NegZ,
}

impl BoundaryHit {
    fn on_axis(axis: usize, coord: f32) -> Self {
        match (axis, coord > 0.0) {
            (0, true) => BoundaryHit::PosX,
            (0, false) => BoundaryHit::NegX,
            (_, true) => BoundaryHit::PosZ,
            (_, false) => BoundaryHit::NegZ,
        }
    }
}

/// A collision event resolved this tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Collision {
    /// Clamped to the edge and bounced
    Wall(BoundaryHit),
    /// Teleported to the opposite edge
    Wrapped(BoundaryHit),
    /// Pushed out of the pillar with the given index
    Pillar { index: usize, penetration: f32 },
}

/// Apply the boundary policy to both axes, recording what happened
pub fn resolve_boundary(
    body: &mut Body,
    policy: BoundaryPolicy,
    limit: f32,
    restitution: f32,
    events: &mut Vec<Collision>,
) {
    for axis in 0..2 {
        let coord = body.pos[axis];
        if coord.abs() <= limit {
            continue;
        }

        let hit = BoundaryHit::on_axis(axis, coord);
        match policy {
            BoundaryPolicy::Bounce => {
                body.pos[axis] = sign(coord) * limit;
                body.vel[axis] *= restitution;
                events.push(Collision::Wall(hit));
            }
            BoundaryPolicy::Wrap => {
                body.pos[axis] = -sign(coord) * limit;
                events.push(Collision::Wrapped(hit));
            }
        }
    }
}

/// Push the body out of a pillar
///
/// Returns the penetration depth if the body was inside the contact circle
/// (pillar radius plus body radius).
pub fn resolve_pillar(body: &mut Body, pillar: &Pillar, body_radius: f32) -> Option<f32> {
    let contact = pillar.radius + body_radius;
    let offset = body.pos - pillar.center;
    let (dist, theta) = cartesian_to_polar(offset);

    if dist >= contact {
        return None;
    }

    // atan2(0, 0) == 0, so a body exactly on the center exits along +x
    body.pos = pillar.center + polar_to_cartesian(contact, theta);
    body.vel *= pillar.restitution;
    Some(contact - dist)
}

/// Resolve every pillar in order
pub fn resolve_pillars(
    body: &mut Body,
    pillars: &[Pillar],
    body_radius: f32,
    events: &mut Vec<Collision>,
) {
    for (index, pillar) in pillars.iter().enumerate() {
        if let Some(penetration) = resolve_pillar(body, pillar, body_radius) {
            events.push(Collision::Pillar { index, penetration });
        }
    }
}

/// Distance from the body to the contact circle of a pillar (negative inside)
#[inline]
pub fn pillar_clearance(pos: Vec2, pillar: &Pillar, body_radius: f32) -> f32 {
    (pos - pillar.center).length() - (pillar.radius + body_radius)
}
