//! Ball and phase types
//!
//! A `Ball` is a point-mass disc; `BallState` is the slice of it that leaves
//! the simulation (renderer, turn reports, peers).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{BALL_MASS, BALL_RADIUS};

/// Id of the cue ball; object balls are 1-15
pub const CUE_BALL_ID: u32 = 0;
/// The black ball that decides the match
pub const EIGHT_BALL_ID: u32 = 8;

/// Reference frame length the friction factor is expressed against
const FRICTION_REFERENCE_DT: f32 = 1.0 / 60.0;

/// Current phase of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Constructed, `setup` not yet called
    Waiting,
    /// Waiting for the striking player's shot
    Aiming,
    /// Balls in motion
    Animating,
    /// A winner was decided; terminal
    Ended,
}

/// Externally visible state of one ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallState {
    pub id: u32,
    pub position: Vec2,
    pub is_pocketed: bool,
}

impl BallState {
    pub fn new(id: u32, position: Vec2) -> Self {
        Self {
            id,
            position,
            is_pocketed: false,
        }
    }
}

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub mass: f32,
    /// Pocketed balls are frozen and skipped by every collision test
    pub pocketed: bool,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2) -> Self {
        Self::with_size(id, pos, BALL_RADIUS, BALL_MASS)
    }

    pub fn with_size(id: u32, pos: Vec2, radius: f32, mass: f32) -> Self {
        debug_assert!(radius > 0.0 && mass > 0.0);
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            radius,
            mass,
            pocketed: false,
        }
    }

    #[inline]
    pub fn is_cue(&self) -> bool {
        self.id == CUE_BALL_ID
    }

    /// Apply an instantaneous impulse (not a force over time)
    pub fn apply_force(&mut self, force: Vec2) {
        self.vel += force / self.mass;
    }

    /// Integrate position, then decay velocity by `friction` (per 1/60 s).
    ///
    /// Velocity is zeroed once speed drops under `stop_speed`, which is what
    /// makes `is_stationary` eventually true.
    pub fn update(&mut self, dt: f32, friction: f32, stop_speed: f32) {
        if self.pocketed {
            return;
        }

        self.pos += self.vel * dt;
        self.vel *= friction.powf(dt / FRICTION_REFERENCE_DT);

        if self.vel.length() < stop_speed {
            self.vel = Vec2::ZERO;
        }
    }

    /// True only for an exactly zero velocity
    #[inline]
    pub fn is_stationary(&self) -> bool {
        self.vel == Vec2::ZERO
    }

    #[inline]
    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.vel.length_squared()
    }

    /// Take the ball off the table
    pub fn pocket(&mut self) {
        self.pocketed = true;
        self.vel = Vec2::ZERO;
    }

    pub fn state(&self) -> BallState {
        BallState {
            id: self.id,
            position: self.pos,
            is_pocketed: self.pocketed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_force_divides_by_mass() {
        let mut ball = Ball::with_size(3, Vec2::ZERO, 15.0, 2.0);
        ball.apply_force(Vec2::new(10.0, -4.0));
        assert_eq!(ball.vel, Vec2::new(5.0, -2.0));
        ball.apply_force(Vec2::new(10.0, 0.0));
        assert_eq!(ball.vel, Vec2::new(10.0, -2.0));
    }

    #[test]
    fn test_update_moves_then_decays() {
        let mut ball = Ball::new(1, Vec2::new(100.0, 100.0));
        ball.vel = Vec2::new(600.0, 0.0);
        ball.update(1.0 / 60.0, 0.98, 2.0);
        assert!((ball.pos.x - 110.0).abs() < 1e-3);
        assert!((ball.vel.x - 588.0).abs() < 1e-2);
    }

    #[test]
    fn test_friction_is_cadence_independent() {
        let mut one = Ball::new(1, Vec2::ZERO);
        let mut two = Ball::new(2, Vec2::ZERO);
        one.vel = Vec2::new(300.0, 0.0);
        two.vel = Vec2::new(300.0, 0.0);

        one.update(1.0 / 60.0, 0.98, 2.0);
        two.update(1.0 / 120.0, 0.98, 2.0);
        two.update(1.0 / 120.0, 0.98, 2.0);

        assert!((one.vel.x - two.vel.x).abs() < 1e-2);
    }

    #[test]
    fn test_slow_ball_stops_exactly() {
        let mut ball = Ball::new(1, Vec2::ZERO);
        ball.vel = Vec2::new(1.5, 0.5);
        assert!(!ball.is_stationary());
        ball.update(1.0 / 60.0, 0.98, 2.0);
        assert!(ball.is_stationary());
        assert_eq!(ball.vel, Vec2::ZERO);
    }

    #[test]
    fn test_tiny_velocity_is_not_stationary() {
        let mut ball = Ball::new(1, Vec2::ZERO);
        ball.vel = Vec2::new(1e-6, 0.0);
        assert!(!ball.is_stationary());
    }

    #[test]
    fn test_pocketed_ball_is_frozen() {
        let mut ball = Ball::new(4, Vec2::new(10.0, 10.0));
        ball.vel = Vec2::new(50.0, 50.0);
        ball.pocket();
        ball.update(1.0 / 60.0, 0.98, 2.0);
        assert_eq!(ball.pos, Vec2::new(10.0, 10.0));
        assert!(ball.is_stationary());
        assert!(ball.state().is_pocketed);
    }
}
