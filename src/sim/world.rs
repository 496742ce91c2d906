//! Physics world: integration, collisions, pockets and the per-turn record
//!
//! One `step(dt)` call is one external frame. The frame is split into equal
//! sub-steps no longer than `max_substep_dt`; each sub-step integrates every
//! ball, resolves ball-ball contacts (several passes) and then cushions.
//! Pockets are checked once at the end of the frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{ContactResponse, ball_ball_collision, resolve_collision};
use super::state::{Ball, BallState, CUE_BALL_ID};
use super::table::Table;
use crate::consts::*;
use crate::tuning::Tuning;

/// What happened during one strike, read once at adjudication
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnData {
    /// Pocketed ids in capture order
    pub pocketed_ball_ids: Vec<u32>,
    /// First ball the cue ball touched this turn
    pub first_ball_hit: Option<u32>,
    pub cue_ball_pocketed: bool,
    /// The cue ball moved without touching anything
    pub no_ball_hit: bool,
}

/// Owns the balls and the table
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    /// Sorted by id for a stable pair order
    balls: Vec<Ball>,
    table: Table,
    response: ContactResponse,
    friction: f32,
    stop_speed: f32,
    max_substep_dt: f32,
    collision_passes: u32,
    turn: TurnData,
    /// Cue ball was seen moving since the last turn reset
    cue_moved: bool,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(Table::default())
    }
}

impl PhysicsWorld {
    pub fn new(table: Table) -> Self {
        Self {
            balls: Vec::new(),
            table,
            response: ContactResponse::default(),
            friction: FRICTION,
            stop_speed: STOP_SPEED,
            max_substep_dt: MAX_SUBSTEP_DT,
            collision_passes: COLLISION_PASSES,
            turn: TurnData::default(),
            cue_moved: false,
        }
    }

    pub fn from_tuning(tuning: &Tuning) -> Self {
        let table = Table::with_tuning(
            tuning.table_width,
            tuning.table_height,
            tuning.pocket_radius,
            tuning.wall_restitution,
        );
        Self {
            response: ContactResponse {
                restitution: tuning.ball_restitution,
                tangential_damping: tuning.tangential_damping,
            },
            friction: tuning.friction,
            stop_speed: tuning.stop_speed,
            max_substep_dt: tuning.max_substep_dt,
            collision_passes: tuning.collision_passes.max(1),
            ..Self::new(table)
        }
    }

    /// Add a ball, replacing any ball with the same id
    pub fn add_ball(&mut self, ball: Ball) -> Option<Ball> {
        match self.balls.binary_search_by_key(&ball.id, |b| b.id) {
            Ok(i) => Some(std::mem::replace(&mut self.balls[i], ball)),
            Err(i) => {
                self.balls.insert(i, ball);
                None
            }
        }
    }

    pub fn ball(&self, id: u32) -> Option<&Ball> {
        self.balls
            .binary_search_by_key(&id, |b| b.id)
            .ok()
            .map(|i| &self.balls[i])
    }

    pub fn ball_mut(&mut self, id: u32) -> Option<&mut Ball> {
        self.balls
            .binary_search_by_key(&id, |b| b.id)
            .ok()
            .map(|i| &mut self.balls[i])
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Impulse on one live ball; unknown or pocketed ids are ignored
    pub fn apply_force(&mut self, id: u32, force: Vec2) {
        let Some(ball) = self.ball_mut(id) else {
            log::warn!("apply_force: no ball with id {}", id);
            return;
        };
        if ball.pocketed {
            return;
        }
        ball.apply_force(force);
        if id == CUE_BALL_ID && force != Vec2::ZERO {
            self.cue_moved = true;
        }
    }

    /// Number of equal sub-steps a frame of `dt` seconds is split into,
    /// capped at `MAX_SUBSTEPS`
    pub fn substep_count(&self, dt: f32) -> u32 {
        ((dt / self.max_substep_dt).ceil() as u32).clamp(1, MAX_SUBSTEPS)
    }

    /// Advance the table by one external frame
    pub fn step(&mut self, dt: f32) {
        if !(dt > 0.0 && dt.is_finite()) {
            log::warn!("step: ignoring non-positive frame time {}", dt);
            return;
        }

        let substeps = self.substep_count(dt);
        if substeps == MAX_SUBSTEPS && dt > self.max_substep_dt * MAX_SUBSTEPS as f32 {
            log::warn!("step: frame time {} exceeds the sub-step cap, clamp it upstream", dt);
        }
        let sub_dt = dt / substeps as f32;

        for _ in 0..substeps {
            if self.ball(CUE_BALL_ID).is_some_and(|cue| !cue.is_stationary()) {
                self.cue_moved = true;
            }

            for ball in &mut self.balls {
                ball.update(sub_dt, self.friction, self.stop_speed);
            }

            for _ in 0..self.collision_passes {
                if !self.resolve_contacts() {
                    break;
                }
            }

            for ball in &mut self.balls {
                if !ball.pocketed {
                    self.table.handle_wall_collision(ball);
                }
            }
        }

        self.resolve_pockets();
    }

    /// One O(n²) pass over all live pairs; true if any pair touched
    fn resolve_contacts(&mut self) -> bool {
        let mut touched = false;
        let n = self.balls.len();

        for i in 0..n {
            for j in (i + 1)..n {
                let (left, right) = self.balls.split_at_mut(j);
                let a = &mut left[i];
                let b = &mut right[0];

                if !ball_ball_collision(a, b).hit {
                    continue;
                }
                touched = true;

                // Must be recorded before the response moves anything
                if self.turn.first_ball_hit.is_none() {
                    let other = if a.is_cue() {
                        Some(b.id)
                    } else if b.is_cue() {
                        Some(a.id)
                    } else {
                        None
                    };
                    if let Some(id) = other {
                        log::debug!("Cue ball first hit ball {}", id);
                        self.turn.first_ball_hit = Some(id);
                    }
                }

                resolve_collision(a, b, &self.response);
            }
        }

        touched
    }

    fn resolve_pockets(&mut self) {
        for ball in &mut self.balls {
            if ball.pocketed {
                continue;
            }
            let probe = self.table.probe_pockets(ball);
            if !probe.captured {
                continue;
            }

            log::debug!(
                "Ball {} pocketed (pocket {}, distance {:.1})",
                ball.id,
                probe.nearest,
                probe.distance
            );
            ball.pocket();
            self.turn.pocketed_ball_ids.push(ball.id);
            if ball.is_cue() {
                self.turn.cue_ball_pocketed = true;
            }
        }
    }

    /// True when every ball still on the table has exactly zero velocity
    pub fn is_all_balls_stationary(&self) -> bool {
        self.balls.iter().all(|b| b.pocketed || b.is_stationary())
    }

    pub fn ball_states(&self) -> Vec<BallState> {
        self.balls.iter().map(Ball::state).collect()
    }

    /// Snapshot of this turn's record.
    ///
    /// Flags `no_ball_hit` when nothing was hit but the cue ball moved, either
    /// earlier in the turn or right now.
    pub fn turn_data(&self) -> TurnData {
        let mut turn = self.turn.clone();
        if turn.first_ball_hit.is_none() {
            let cue_moving = self
                .ball(CUE_BALL_ID)
                .is_some_and(|cue| !cue.is_stationary());
            if self.cue_moved || cue_moving {
                turn.no_ball_hit = true;
            }
        }
        turn
    }

    pub fn reset_turn_data(&mut self) {
        self.turn = TurnData::default();
        self.cue_moved = false;
    }

    /// Put the cue ball back on the table at rest
    pub fn reset_cue_ball(&mut self, position: Vec2) {
        if let Some(cue) = self.ball_mut(CUE_BALL_ID) {
            cue.pos = position;
            cue.vel = Vec2::ZERO;
            cue.pocketed = false;
        }
    }

    pub fn total_kinetic_energy(&self) -> f32 {
        self.balls.iter().map(Ball::kinetic_energy).sum()
    }
}
