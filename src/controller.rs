//! Match controller
//!
//! Drives a `Game` from a frame loop: clamps frame time, schedules debounced
//! random strikes from a seeded RNG, keeps the scoreboard and a readable
//! match log. Holds no clocks of its own; time only moves through `advance`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::error::EngineError;
use crate::protocol::{PeerMsg, StrikeMsg};
use crate::scoreboard::Scoreboard;
use crate::sim::{Game, GamePhase, Player, PlayerId, TurnReport, rack_balls};
use crate::strike_vector;
use crate::tuning::Tuning;

/// A strike waiting out its debounce
#[derive(Debug, Clone, Copy)]
struct PendingStrike {
    strike: StrikeMsg,
    remaining: f32,
}

/// Two seats, nobody assigned a group yet
pub fn default_players() -> Vec<Player> {
    vec![Player::new("player1", "Player 1"), Player::new("player2", "Player 2")]
}

pub struct MatchController {
    tuning: Tuning,
    seed: u64,
    rng: Pcg32,
    game: Game,
    scoreboard: Scoreboard,
    pending: Option<PendingStrike>,
    /// Filled by the game's handlers, drained after every frame
    reports: Rc<RefCell<VecDeque<TurnReport>>>,
    winners: Rc<RefCell<VecDeque<PlayerId>>>,
    history: Vec<TurnReport>,
    log_lines: Vec<String>,
}

impl MatchController {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            game: Game::with_tuning(tuning.clone()),
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            scoreboard: Scoreboard::new(),
            pending: None,
            reports: Rc::new(RefCell::new(VecDeque::new())),
            winners: Rc::new(RefCell::new(VecDeque::new())),
            history: Vec::new(),
            log_lines: Vec::new(),
        }
    }

    /// Rack up and start a fresh match. The RNG stream carries on.
    pub fn start_new_game(&mut self, players: Vec<Player>) -> Result<(), EngineError> {
        let mut game = Game::with_tuning(self.tuning.clone());

        let reports = Rc::new(RefCell::new(VecDeque::new()));
        let winners = Rc::new(RefCell::new(VecDeque::new()));
        {
            let reports = reports.clone();
            game.on_turn_end(move |report| reports.borrow_mut().push_back(report.clone()));
            let winners = winners.clone();
            game.on_game_over(move |id| winners.borrow_mut().push_back(id.to_string()));
        }

        let rack = rack_balls(
            self.tuning.cue_break_position,
            RACK_APEX,
            self.tuning.ball_radius,
            RACK_GAP,
        );
        game.setup(players, &rack)?;

        self.scoreboard = Scoreboard::with_players(game.players());
        self.game = game;
        self.reports = reports;
        self.winners = winners;
        self.pending = None;
        self.history.clear();
        self.log_lines.clear();
        self.push_line("Game started".to_string());
        Ok(())
    }

    fn can_strike(&self) -> bool {
        self.game.current_phase() == GamePhase::Aiming && self.pending.is_none()
    }

    /// Strike now with the given cue power and aim. False if not our move.
    pub fn request_strike(&mut self, power: f32, angle_deg: f32) -> bool {
        if !self.can_strike() {
            log::warn!("Strike rejected in phase {:?}", self.game.current_phase());
            self.push_line("Cannot strike now".to_string());
            return false;
        }

        self.push_line(format!("Strike: power {:.0}, angle {:.0}", power, angle_deg));
        self.game.strike(strike_vector(power, angle_deg));
        true
    }

    /// Pick a random power and aim and fire it after a short debounce
    pub fn random_strike(&mut self) -> bool {
        if !self.can_strike() {
            log::warn!("Random strike rejected in phase {:?}", self.game.current_phase());
            return false;
        }

        let power = self.rng.random_range(RANDOM_POWER_MIN..RANDOM_POWER_MAX);
        let angle = self.rng.random_range(0..360u32);
        let strike = StrikeMsg {
            power: power as f32,
            angle: angle as f32,
        };
        log::info!("Random strike queued: power {} angle {}", power, angle);
        self.push_line(format!("Random strike: power {}, angle {}", power, angle));
        self.pending = Some(PendingStrike {
            strike,
            remaining: RANDOM_STRIKE_DELAY,
        });
        true
    }

    /// Feed one frame of wall-clock time
    pub fn advance(&mut self, elapsed: f32) {
        let dt = if elapsed.is_finite() {
            elapsed.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };

        if let Some(pending) = self.pending.as_mut() {
            pending.remaining -= dt;
            if pending.remaining <= 0.0 {
                let strike = pending.strike;
                self.pending = None;
                self.game.strike(strike.force());
            }
        }

        if dt > 0.0 {
            self.game.update(dt);
        }
        self.drain_events();
    }

    /// Apply a message from the authoritative peer
    pub fn handle_peer_msg(&mut self, msg: &PeerMsg) {
        match msg {
            PeerMsg::Strike(strike) => {
                self.request_strike(strike.power, strike.angle);
            }
            PeerMsg::TurnReport(inner) => {
                log::debug!("Reconciling turn {} from peer", inner.turn);
                self.pending = None;
                self.game.reconcile(&inner.report);
            }
        }
    }

    fn drain_events(&mut self) {
        let reports: Vec<TurnReport> = self.reports.borrow_mut().drain(..).collect();
        for report in reports {
            self.record_report(report);
        }

        let winners: Vec<PlayerId> = self.winners.borrow_mut().drain(..).collect();
        for winner in winners {
            let line = format!("{} wins!", self.player_name(&winner));
            self.push_line(line);
        }
    }

    fn record_report(&mut self, report: TurnReport) {
        let next = self.player_name(&report.next_player_id).to_string();

        if !report.pocketed_ball_ids.is_empty() {
            self.scoreboard
                .add(&report.next_player_id, report.pocketed_ball_ids.len() as u32);
        }

        let line = if report.is_foul {
            format!("Foul! Turn passes to {}", next)
        } else if !report.pocketed_ball_ids.is_empty() {
            let ids: Vec<String> = report.pocketed_ball_ids.iter().map(u32::to_string).collect();
            format!("Pocketed: {}", ids.join(", "))
        } else {
            format!("No ball pocketed, turn passes to {}", next)
        };
        self.push_line(line);
        self.history.push(report);
    }

    fn player_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.game
            .players()
            .iter()
            .find(|p| p.id == id)
            .map_or(id, |p| p.name.as_str())
    }

    fn push_line(&mut self, line: String) {
        log::info!("{}", line);
        self.log_lines.push(line);
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn phase(&self) -> GamePhase {
        self.game.current_phase()
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    /// Human-readable match log, oldest first
    pub fn log_lines(&self) -> &[String] {
        &self.log_lines
    }

    /// Every adjudicated turn of the current match
    pub fn history(&self) -> &[TurnReport] {
        &self.history
    }

    pub fn turns_played(&self) -> usize {
        self.history.len()
    }

    pub fn pending_strike(&self) -> Option<StrikeMsg> {
        self.pending.map(|p| p.strike)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn started(seed: u64) -> MatchController {
        let mut controller = MatchController::new(Tuning::default(), seed);
        controller.start_new_game(default_players()).unwrap();
        controller
    }

    fn run_turn(controller: &mut MatchController) {
        for _ in 0..10_000 {
            controller.advance(FRAME);
            if controller.phase() != GamePhase::Animating && controller.pending_strike().is_none() {
                return;
            }
        }
        panic!("turn never finished");
    }

    #[test]
    fn test_start_new_game() {
        let controller = started(1);
        assert_eq!(controller.phase(), GamePhase::Aiming);
        assert_eq!(controller.game().ball_states().len(), 16);
        assert_eq!(controller.scoreboard().entries.len(), 2);
        assert_eq!(controller.scoreboard().score_of("player1"), 0);
        assert_eq!(controller.log_lines(), ["Game started".to_string()]);
        assert_eq!(controller.game().current_player().unwrap().id, "player1");
    }

    #[test]
    fn test_start_rejects_empty_roster() {
        let mut controller = MatchController::new(Tuning::default(), 1);
        assert!(matches!(controller.start_new_game(Vec::new()), Err(EngineError::NoPlayers)));
        assert_eq!(controller.phase(), GamePhase::Waiting);
    }

    #[test]
    fn test_strike_rejected_before_start() {
        let mut controller = MatchController::new(Tuning::default(), 1);
        assert!(!controller.request_strike(1000.0, 0.0));
        assert!(!controller.random_strike());
        assert_eq!(controller.log_lines().last().map(String::as_str), Some("Cannot strike now"));
    }

    #[test]
    fn test_manual_strike_logs_outcome() {
        let mut controller = started(2);
        assert!(controller.request_strike(2500.0, 0.0));
        assert_eq!(controller.phase(), GamePhase::Animating);
        assert!(!controller.request_strike(2500.0, 0.0));

        run_turn(&mut controller);
        assert_eq!(controller.turns_played(), 1);

        let report = &controller.history()[0];
        let line = controller
            .log_lines()
            .iter()
            .rev()
            .find(|l| l.starts_with("Foul!") || l.starts_with("Pocketed:") || l.starts_with("No ball"))
            .cloned()
            .unwrap();
        if report.is_foul {
            assert!(line.starts_with("Foul! Turn passes to "));
        } else if report.pocketed_ball_ids.is_empty() {
            assert_eq!(line, "No ball pocketed, turn passes to Player 2");
        } else {
            assert!(line.starts_with("Pocketed: "));
        }
    }

    #[test]
    fn test_random_strike_waits_for_debounce() {
        let mut controller = started(3);
        assert!(controller.random_strike());
        assert!(controller.pending_strike().is_some());
        assert!(!controller.random_strike());
        assert!(!controller.request_strike(500.0, 0.0));

        // Oversized frames are clamped to 0.05 s
        for _ in 0..5 {
            controller.advance(1.0);
        }
        assert!(controller.pending_strike().is_some());
        assert_eq!(controller.phase(), GamePhase::Aiming);

        controller.advance(0.05);
        controller.advance(0.05);
        assert!(controller.pending_strike().is_none());
        assert_eq!(controller.phase(), GamePhase::Animating);
    }

    #[test]
    fn test_random_strikes_in_range_and_seeded() {
        let draws = |seed| {
            let mut controller = started(seed);
            (0..100)
                .map(|_| {
                    assert!(controller.random_strike());
                    controller.pending.take().unwrap().strike
                })
                .collect::<Vec<_>>()
        };

        let first = draws(42);
        assert_eq!(first, draws(42));
        assert_ne!(first, draws(43));
        for strike in &first {
            assert!((300.0..3000.0).contains(&strike.power));
            assert!((0.0..360.0).contains(&strike.angle));
            assert_eq!(strike.power.fract(), 0.0);
            assert_eq!(strike.angle.fract(), 0.0);
        }
    }

    #[test]
    fn test_bad_frame_times_ignored() {
        let mut controller = started(4);
        controller.request_strike(1000.0, 0.0);
        let before = controller.game().ball_states();
        controller.advance(f32::NAN);
        controller.advance(-1.0);
        assert_eq!(controller.game().ball_states(), before);
    }

    #[test]
    fn test_random_match_keeps_score() {
        let mut controller = started(7);
        for _ in 0..60 {
            if controller.phase() != GamePhase::Aiming {
                break;
            }
            assert!(controller.random_strike());
            run_turn(&mut controller);
        }

        let pocketed: usize = controller.history().iter().map(|r| r.pocketed_ball_ids.len()).sum();
        let scored: u32 = controller.scoreboard().entries.iter().map(|e| e.score).sum();
        assert_eq!(scored as usize, pocketed);
        assert!(controller.turns_played() > 0);

        if controller.phase() == GamePhase::Ended {
            let winner = controller.game().winner().unwrap().clone();
            let name = if winner == "player1" { "Player 1" } else { "Player 2" };
            assert_eq!(controller.log_lines().last().unwrap(), &format!("{} wins!", name));
        }
    }

    #[test]
    fn test_peer_messages_drive_replica() {
        let mut authority = started(9);
        let mut replica = started(9);

        authority.request_strike(2200.0, 10.0);
        replica.handle_peer_msg(&PeerMsg::strike(2200.0, 10.0));
        assert_eq!(replica.phase(), GamePhase::Animating);

        run_turn(&mut authority);
        let report = authority.history()[0].clone();
        replica.advance(FRAME);
        replica.handle_peer_msg(&PeerMsg::turn_report(1, report.clone()));

        assert_eq!(replica.phase(), GamePhase::Aiming);
        assert_eq!(replica.game().current_player().unwrap().id, report.next_player_id);
        let pocketed: Vec<bool> = replica.game().ball_states().iter().map(|b| b.is_pocketed).collect();
        let expected: Vec<bool> = authority.game().ball_states().iter().map(|b| b.is_pocketed).collect();
        assert_eq!(pocketed, expected);
    }

    #[test]
    fn test_restart_resets_score_and_log() {
        let mut controller = started(11);
        controller.scoreboard.add("player1", 3);
        controller.request_strike(800.0, 180.0);
        controller.start_new_game(default_players()).unwrap();
        assert_eq!(controller.scoreboard().score_of("player1"), 0);
        assert_eq!(controller.phase(), GamePhase::Aiming);
        assert_eq!(controller.log_lines().len(), 1);
        assert!(controller.history().is_empty());
    }
}
