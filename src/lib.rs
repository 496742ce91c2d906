//! Cue Engine - a two-player pocket billiards simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ball physics, table, rules, turn state machine)
//! - `tuning`: Data-driven physics and rule constants
//! - `protocol`: Peer wire messages for turn reports
//! - `controller`: Frame driver, random strikes and scoring around a `Game`

pub mod controller;
pub mod error;
pub mod protocol;
pub mod scoreboard;
pub mod sim;
pub mod tuning;

pub use controller::{MatchController, default_players};
pub use error::EngineError;
pub use scoreboard::Scoreboard;
pub use tuning::{GroupPolicy, Tuning};

use glam::Vec2;

/// Engine configuration constants
pub mod consts {
    use glam::Vec2;

    /// Playing-field dimensions
    pub const TABLE_WIDTH: f32 = 800.0;
    pub const TABLE_HEIGHT: f32 = 400.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 15.0;
    pub const BALL_MASS: f32 = 1.0;

    /// Velocity retained per 1/60 s of rolling
    pub const FRICTION: f32 = 0.98;
    /// Below this speed (units/s) a ball is stopped dead
    pub const STOP_SPEED: f32 = 2.0;

    /// Cushion bounce (velocity scale on the reflected axis)
    pub const WALL_RESTITUTION: f32 = 0.8;
    /// Ball-ball restitution along the contact normal
    pub const BALL_RESTITUTION: f32 = 0.95;
    /// Fraction of tangential relative velocity removed per contact
    pub const TANGENTIAL_DAMPING: f32 = 0.05;

    /// Pocket mouth radius; capture radius is this plus the ball radius
    pub const POCKET_RADIUS: f32 = 20.0;

    /// Longest allowed integration sub-step
    pub const MAX_SUBSTEP_DT: f32 = 1.0 / 60.0;
    /// Sub-step cap for one frame; longer frames get coarser sub-steps
    pub const MAX_SUBSTEPS: u32 = 240;
    /// Ball-ball resolution passes per sub-step
    pub const COLLISION_PASSES: u32 = 4;

    /// Positional error (units) above which reconciliation snaps a ball
    pub const RECONCILE_TOLERANCE: f32 = 5.0;

    /// Cue ball break spot, also used for re-spotting after a foul
    pub const CUE_BREAK_POSITION: Vec2 = Vec2::new(200.0, 200.0);
    /// Apex of the object-ball rack
    pub const RACK_APEX: Vec2 = Vec2::new(580.0, 200.0);
    /// Gap between neighbouring racked balls
    pub const RACK_GAP: f32 = 2.0;

    /// Largest frame time the controller passes to the engine (seconds)
    pub const MAX_FRAME_DT: f32 = 0.05;
    /// Delay before a random strike fires (seconds)
    pub const RANDOM_STRIKE_DELAY: f32 = 0.3;
    /// Random strike power range (integer units, end exclusive)
    pub const RANDOM_POWER_MIN: u32 = 300;
    pub const RANDOM_POWER_MAX: u32 = 3000;
}

/// Convert a cue power and an aim angle in degrees into a strike impulse.
///
/// Angle 0 points along +x.
#[inline]
pub fn strike_vector(power: f32, angle_deg: f32) -> Vec2 {
    let theta = angle_deg.to_radians();
    Vec2::new(theta.cos() * power, theta.sin() * power)
}
