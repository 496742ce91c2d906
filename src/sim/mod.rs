//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied frame times only, split into fixed-bound sub-steps
//! - No RNG
//! - Stable iteration order (by ball ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod game;
pub mod rack;
pub mod rules;
pub mod state;
pub mod table;
pub mod world;

pub use collision::{CollisionResult, ContactResponse, ball_ball_collision, resolve_collision};
pub use game::Game;
pub use rack::{rack_balls, rack_positions, standard_rack};
pub use rules::{BallGroup, Foul, Player, PlayerId, RuleEngine, TurnReport, detect_foul};
pub use state::{Ball, BallState, CUE_BALL_ID, EIGHT_BALL_ID, GamePhase};
pub use table::{PocketProbe, Table};
pub use world::{PhysicsWorld, TurnData};
