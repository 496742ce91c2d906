//! Turn state machine
//!
//! `Waiting → Aiming → Animating → (Aiming | Ended)`. The caller drives it with
//! `strike`, one `update(dt)` per rendered frame, and `reconcile` when an
//! authoritative report arrives from a peer. All calls must be serialized.

use glam::Vec2;

use super::rules::{Player, PlayerId, RuleEngine, TurnReport};
use super::state::{Ball, BallState, CUE_BALL_ID, GamePhase};
use super::world::PhysicsWorld;
use crate::error::EngineError;
use crate::tuning::Tuning;

type TurnEndHandler = Box<dyn FnMut(&TurnReport)>;
type StateUpdateHandler = Box<dyn FnMut(&[BallState])>;
type GameOverHandler = Box<dyn FnMut(&str)>;

/// Registered handlers, invoked in registration order
#[derive(Default)]
struct Subscribers {
    turn_end: Vec<TurnEndHandler>,
    state_update: Vec<StateUpdateHandler>,
    game_over: Vec<GameOverHandler>,
}

/// One match between a fixed roster of players
pub struct Game {
    tuning: Tuning,
    world: PhysicsWorld,
    rules: Option<RuleEngine>,
    phase: GamePhase,
    last_report: Option<TurnReport>,
    subscribers: Subscribers,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("phase", &self.phase)
            .field("world", &self.world)
            .field("rules", &self.rules)
            .field("last_report", &self.last_report)
            .finish_non_exhaustive()
    }
}

impl Game {
    pub fn new() -> Self {
        Self::with_tuning(Tuning::default())
    }

    pub fn with_tuning(tuning: Tuning) -> Self {
        Self {
            world: PhysicsWorld::from_tuning(&tuning),
            tuning,
            rules: None,
            phase: GamePhase::Waiting,
            last_report: None,
            subscribers: Subscribers::default(),
        }
    }

    /// Seat the players and place the balls; `Waiting → Aiming`.
    ///
    /// Rejects an empty or duplicated roster, a missing cue ball and
    /// duplicated ball ids.
    pub fn setup(&mut self, players: Vec<Player>, initial_ball_states: &[BallState]) -> Result<(), EngineError> {
        if self.phase != GamePhase::Waiting {
            log::warn!("setup rejected in phase {:?}", self.phase);
            return Err(EngineError::AlreadySetUp(self.phase));
        }
        if !initial_ball_states.iter().any(|b| b.id == CUE_BALL_ID) {
            return Err(EngineError::MissingCueBall);
        }
        for (i, state) in initial_ball_states.iter().enumerate() {
            if initial_ball_states[..i].iter().any(|b| b.id == state.id) {
                return Err(EngineError::DuplicateBallId(state.id));
            }
        }

        let rules = RuleEngine::new(players, self.tuning.group_policy)?;

        let mut world = PhysicsWorld::from_tuning(&self.tuning);
        for state in initial_ball_states {
            let mut ball = Ball::with_size(state.id, state.position, self.tuning.ball_radius, self.tuning.ball_mass);
            ball.pocketed = state.is_pocketed;
            world.add_ball(ball);
        }

        log::info!(
            "Match set up: {} players, {} balls, {} to break",
            rules.players().len(),
            initial_ball_states.len(),
            rules.current_player().name
        );

        self.world = world;
        self.rules = Some(rules);
        self.phase = GamePhase::Aiming;
        Ok(())
    }

    /// Hit the cue ball with `force` (an impulse); `Aiming → Animating`
    pub fn strike(&mut self, force: Vec2) {
        if self.phase != GamePhase::Aiming {
            log::warn!("Cannot strike: not aiming (phase {:?})", self.phase);
            return;
        }

        self.world.reset_turn_data();
        self.world.apply_force(CUE_BALL_ID, force);
        self.phase = GamePhase::Animating;
        log::info!("Strike ({:.1}, {:.1})", force.x, force.y);
    }

    /// Advance one frame while balls are moving; adjudicates on rest
    pub fn update(&mut self, dt: f32) {
        if self.phase != GamePhase::Animating {
            return;
        }

        self.world.step(dt);

        let states = self.world.ball_states();
        for handler in &mut self.subscribers.state_update {
            handler(states.as_slice());
        }

        if self.world.is_all_balls_stationary() {
            self.end_turn(states);
        }
    }

    fn end_turn(&mut self, states: Vec<BallState>) {
        let Some(rules) = self.rules.as_mut() else {
            return;
        };

        let turn = self.world.turn_data();
        let report = rules.analyze_turn(&turn, states);

        if let Some(winner) = &report.turn_winner_id {
            self.phase = GamePhase::Ended;
            log::info!("Game over, winner {}", winner);
            for handler in &mut self.subscribers.game_over {
                handler(winner.as_str());
            }
        } else {
            self.phase = GamePhase::Aiming;
        }

        if report.is_foul {
            self.world.reset_cue_ball(self.tuning.cue_break_position);
        }

        for handler in &mut self.subscribers.turn_end {
            handler(&report);
        }
        self.last_report = Some(report);
    }

    /// Pull local ball states onto an authoritative report.
    ///
    /// Balls further than the tolerance from the report snap to it, closer
    /// ones keep their local position. Pocketed flags are always taken from
    /// the report, velocities zeroed, and the phase forced back to `Aiming`.
    /// Group assignment and the turn count follow the report too. Ignored
    /// before `setup`.
    pub fn reconcile(&mut self, report: &TurnReport) {
        if self.phase == GamePhase::Waiting {
            log::warn!("reconcile ignored: match not set up");
            return;
        }

        for target in &report.final_ball_states {
            let Some(ball) = self.world.ball_mut(target.id) else {
                log::debug!("reconcile: no local ball {}, skipped", target.id);
                continue;
            };

            if ball.pos.distance(target.position) > self.tuning.reconcile_tolerance {
                ball.pos = target.position;
            }
            ball.pocketed = target.is_pocketed;
            ball.vel = Vec2::ZERO;
        }

        // The authority re-spots after capturing its final states
        if report.is_foul {
            self.world.reset_cue_ball(self.tuning.cue_break_position);
        }

        if let Some(rules) = self.rules.as_mut() {
            rules.sync_from_report(report);
            if !rules.set_current_player(&report.next_player_id) {
                log::warn!("reconcile: unknown next player {}", report.next_player_id);
            }
        }

        self.phase = GamePhase::Aiming;
    }

    pub fn ball_states(&self) -> Vec<BallState> {
        self.world.ball_states()
    }

    pub fn current_phase(&self) -> GamePhase {
        self.phase
    }

    /// Player whose shot it is (`None` before setup)
    pub fn current_player(&self) -> Option<&Player> {
        self.rules.as_ref().map(RuleEngine::current_player)
    }

    pub fn players(&self) -> &[Player] {
        self.rules.as_ref().map(RuleEngine::players).unwrap_or_default()
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn last_report(&self) -> Option<&TurnReport> {
        self.last_report.as_ref()
    }

    pub fn on_turn_end(&mut self, handler: impl FnMut(&TurnReport) + 'static) {
        self.subscribers.turn_end.push(Box::new(handler));
    }

    pub fn on_state_update(&mut self, handler: impl FnMut(&[BallState]) + 'static) {
        self.subscribers.state_update.push(Box::new(handler));
    }

    pub fn on_game_over(&mut self, handler: impl FnMut(&str) + 'static) {
        self.subscribers.game_over.push(Box::new(handler));
    }

    /// Winner of a finished match
    pub fn winner(&self) -> Option<&PlayerId> {
        self.last_report.as_ref()?.turn_winner_id.as_ref()
    }
}
