//! Data-driven physics and rule tuning
//!
//! Every constant the engine reads at runtime lives here so that both peers of
//! a match can be pinned to the same values. Defaults come from `crate::consts`.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::EngineError;

/// How (and whether) players are assigned a ball group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupPolicy {
    /// Groups are never assigned; wrong-group fouls cannot happen
    Disabled,
    /// The first legally pocketed object ball after the break decides
    #[default]
    FirstLegalPocket,
}

impl GroupPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupPolicy::Disabled => "disabled",
            GroupPolicy::FirstLegalPocket => "first_legal_pocket",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "disabled" | "off" => Some(GroupPolicy::Disabled),
            "first_legal_pocket" | "on" => Some(GroupPolicy::FirstLegalPocket),
            _ => None,
        }
    }
}

/// Engine tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Table ===
    pub table_width: f32,
    pub table_height: f32,
    /// Pocket mouth radius (capture radius adds the ball radius)
    pub pocket_radius: f32,
    /// Cushion restitution
    pub wall_restitution: f32,

    // === Balls ===
    pub ball_radius: f32,
    pub ball_mass: f32,
    /// Velocity retained per 1/60 s
    pub friction: f32,
    /// Speed under which a ball stops
    pub stop_speed: f32,
    pub ball_restitution: f32,
    pub tangential_damping: f32,

    // === Integration ===
    pub max_substep_dt: f32,
    pub collision_passes: u32,

    // === Match ===
    pub cue_break_position: Vec2,
    pub reconcile_tolerance: f32,
    pub group_policy: GroupPolicy,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            table_width: TABLE_WIDTH,
            table_height: TABLE_HEIGHT,
            pocket_radius: POCKET_RADIUS,
            wall_restitution: WALL_RESTITUTION,

            ball_radius: BALL_RADIUS,
            ball_mass: BALL_MASS,
            friction: FRICTION,
            stop_speed: STOP_SPEED,
            ball_restitution: BALL_RESTITUTION,
            tangential_damping: TANGENTIAL_DAMPING,

            max_substep_dt: MAX_SUBSTEP_DT,
            collision_passes: COLLISION_PASSES,

            cue_break_position: CUE_BREAK_POSITION,
            reconcile_tolerance: RECONCILE_TOLERANCE,
            group_policy: GroupPolicy::default(),
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Save tuning as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let path = path.as_ref();
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Tuning saved to {}", path.display());
        Ok(())
    }
}
