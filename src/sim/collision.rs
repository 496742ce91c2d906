//! Ball-ball collision detection and response
//!
//! Detection is a plain center-distance test. Response separates the pair
//! along the contact normal and applies a restitution impulse, plus a small
//! tangential damping term standing in for cloth/spin friction.

use glam::Vec2;

use super::state::Ball;
use crate::consts::{BALL_RESTITUTION, TANGENTIAL_DAMPING};

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the discs overlap
    pub hit: bool,
    /// Unit normal from the first ball toward the second (zero if centers coincide)
    pub normal: Vec2,
    /// Overlap depth along the normal
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Material response for a ball-ball contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactResponse {
    /// Normal restitution, near 1 for billiard balls
    pub restitution: f32,
    /// Fraction of tangential relative velocity removed (0 = frictionless)
    pub tangential_damping: f32,
}

impl Default for ContactResponse {
    fn default() -> Self {
        Self {
            restitution: BALL_RESTITUTION,
            tangential_damping: TANGENTIAL_DAMPING,
        }
    }
}

/// Check whether two live balls overlap
pub fn ball_ball_collision(a: &Ball, b: &Ball) -> CollisionResult {
    if a.pocketed || b.pocketed {
        return CollisionResult::miss();
    }

    let delta = b.pos - a.pos;
    let distance = delta.length();
    let min_distance = a.radius + b.radius;

    if distance >= min_distance {
        return CollisionResult::miss();
    }

    CollisionResult {
        hit: true,
        normal: if distance > 0.0 { delta / distance } else { Vec2::ZERO },
        penetration: min_distance - distance,
    }
}

/// Separate an overlapping pair and exchange momentum along the normal.
///
/// Returns true if an impulse was applied. Coincident centers are skipped.
pub fn resolve_collision(a: &mut Ball, b: &mut Ball, response: &ContactResponse) -> bool {
    let delta = b.pos - a.pos;
    let distance = delta.length();
    if distance == 0.0 {
        return false;
    }
    let normal = delta / distance;

    let overlap = a.radius + b.radius - distance;
    if overlap > 0.0 {
        // A resting ball is not kicked out of the way; the mover backs off
        let (share_a, share_b) = match (a.is_stationary(), b.is_stationary()) {
            (true, false) => (0.0, 1.0),
            (false, true) => (1.0, 0.0),
            _ => (0.5, 0.5),
        };
        a.pos -= normal * overlap * share_a;
        b.pos += normal * overlap * share_b;
    }

    let rel_vel = b.vel - a.vel;
    let vel_along_normal = rel_vel.dot(normal);
    if vel_along_normal > 0.0 {
        return false;
    }

    let inv_mass_sum = 1.0 / a.mass + 1.0 / b.mass;

    let j = -(1.0 + response.restitution) * vel_along_normal / inv_mass_sum;
    let impulse = normal * j;
    a.vel -= impulse / a.mass;
    b.vel += impulse / b.mass;

    if response.tangential_damping > 0.0 {
        let tangential = rel_vel - normal * vel_along_normal;
        let friction_impulse = -tangential * response.tangential_damping / inv_mass_sum;
        a.vel -= friction_impulse / a.mass;
        b.vel += friction_impulse / b.mass;
    }

    true
}
