//! Turn adjudication: fouls, winner and turn handover
//!
//! `RuleEngine::analyze_turn` is called exactly once per resolved turn. It is
//! a function of the turn record, the final ball states and the striker; the
//! only state it advances is the rotation index, the turn counter and (when
//! enabled) group assignment.

use serde::{Deserialize, Serialize};

use super::state::{BallState, CUE_BALL_ID, EIGHT_BALL_ID};
use super::world::TurnData;
use crate::error::EngineError;
use crate::tuning::GroupPolicy;

pub type PlayerId = String;

/// Object-ball group a player must hit first once assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BallGroup {
    /// Balls 1-7
    Solid,
    /// Balls 9-15
    Striped,
}

impl BallGroup {
    /// Group of an object ball; cue and eight ball have none
    pub fn of_ball(id: u32) -> Option<Self> {
        match id {
            1..=7 => Some(BallGroup::Solid),
            9..=15 => Some(BallGroup::Striped),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            BallGroup::Solid => BallGroup::Striped,
            BallGroup::Striped => BallGroup::Solid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// `None` until the player's group is decided
    pub ball_type: Option<BallGroup>,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ball_type: None,
        }
    }
}

/// Why a turn was ruled a foul
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Foul {
    CueBallPocketed,
    /// The cue ball moved but touched nothing
    NoBallHit,
    /// Assigned player's cue ball never made first contact
    NoFirstContact,
    /// Assigned player hit the other group first
    WrongGroupFirst,
}

/// Authoritative outcome of one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnReport {
    pub final_ball_states: Vec<BallState>,
    pub pocketed_ball_ids: Vec<u32>,
    pub is_foul: bool,
    #[serde(default)]
    pub foul: Option<Foul>,
    pub turn_winner_id: Option<PlayerId>,
    pub next_player_id: PlayerId,
    /// Roster after adjudication, carrying any group assignment
    #[serde(default)]
    pub players: Vec<Player>,
    /// Turns adjudicated so far, this one included
    #[serde(default)]
    pub turns_played: u32,
}

/// Decide whether `player`'s turn was a foul, highest-priority reason first
pub fn detect_foul(turn: &TurnData, player: &Player) -> Option<Foul> {
    if turn.cue_ball_pocketed {
        return Some(Foul::CueBallPocketed);
    }
    if turn.no_ball_hit {
        return Some(Foul::NoBallHit);
    }

    let group = player.ball_type?;
    let Some(first) = turn.first_ball_hit else {
        return Some(Foul::NoFirstContact);
    };
    if BallGroup::of_ball(first) == Some(group.opposite()) {
        return Some(Foul::WrongGroupFirst);
    }

    None
}

/// Rotation-aware rule engine, owned by one `Game`
#[derive(Debug, Clone)]
pub struct RuleEngine {
    players: Vec<Player>,
    current_player_index: usize,
    turns_played: u32,
    group_policy: GroupPolicy,
}

impl RuleEngine {
    pub fn new(players: Vec<Player>, group_policy: GroupPolicy) -> Result<Self, EngineError> {
        if players.is_empty() {
            return Err(EngineError::NoPlayers);
        }
        for (i, player) in players.iter().enumerate() {
            if players[..i].iter().any(|p| p.id == player.id) {
                return Err(EngineError::DuplicatePlayerId(player.id.clone()));
            }
        }

        Ok(Self {
            players,
            current_player_index: 0,
            turns_played: 0,
            group_policy,
        })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player_index]
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    fn opponent_index(&self) -> usize {
        (self.current_player_index + 1) % self.players.len()
    }

    /// Hand the turn to a known player; false if the id is unknown
    pub fn set_current_player(&mut self, id: &str) -> bool {
        match self.players.iter().position(|p| p.id == id) {
            Some(i) => {
                self.current_player_index = i;
                true
            }
            None => false,
        }
    }

    /// Adopt the group assignment and turn count of an authoritative report.
    ///
    /// Players missing from the report keep their local group. A report
    /// without a turn count leaves the local counter alone.
    pub fn sync_from_report(&mut self, report: &TurnReport) {
        for remote in &report.players {
            match self.players.iter_mut().find(|p| p.id == remote.id) {
                Some(local) => local.ball_type = remote.ball_type,
                None => log::debug!("sync: unknown player {}", remote.id),
            }
        }
        if report.turns_played > 0 {
            self.turns_played = report.turns_played;
        }
    }

    /// Potting the eight decides the match: the striker wins on a clean
    /// turn, the opponent on a foul
    pub fn check_game_over(&self, turn: &TurnData, is_foul: bool) -> Option<PlayerId> {
        if !turn.pocketed_ball_ids.contains(&EIGHT_BALL_ID) {
            return None;
        }
        let winner = if is_foul {
            self.opponent_index()
        } else {
            self.current_player_index
        };
        Some(self.players[winner].id.clone())
    }

    /// Adjudicate a finished turn and advance the rotation.
    ///
    /// Must be called once per turn: the index moves even when the match ends.
    pub fn analyze_turn(&mut self, turn: &TurnData, ball_states: Vec<BallState>) -> TurnReport {
        let foul = detect_foul(turn, self.current_player());
        let is_foul = foul.is_some();
        let winner = self.check_game_over(turn, is_foul);

        if !is_foul && winner.is_none() {
            self.maybe_assign_groups(turn);
        }

        if is_foul || turn.pocketed_ball_ids.is_empty() {
            self.current_player_index = self.opponent_index();
        }
        self.turns_played += 1;

        let report = TurnReport {
            final_ball_states: ball_states,
            pocketed_ball_ids: turn.pocketed_ball_ids.clone(),
            is_foul,
            foul,
            turn_winner_id: winner,
            next_player_id: self.current_player().id.clone(),
            players: self.players.clone(),
            turns_played: self.turns_played,
        };

        log::info!(
            "Turn {}: foul={:?} pocketed={:?} winner={:?} next={}",
            self.turns_played,
            report.foul,
            report.pocketed_ball_ids,
            report.turn_winner_id,
            report.next_player_id
        );

        report
    }

    fn maybe_assign_groups(&mut self, turn: &TurnData) {
        if self.group_policy != GroupPolicy::FirstLegalPocket
            || self.turns_played == 0
            || self.current_player().ball_type.is_some()
        {
            return;
        }

        let Some(group) = turn
            .pocketed_ball_ids
            .iter()
            .filter(|&&id| id != CUE_BALL_ID)
            .find_map(|&id| BallGroup::of_ball(id))
        else {
            return;
        };

        let striker = self.current_player_index;
        for (i, player) in self.players.iter_mut().enumerate() {
            player.ball_type = Some(if i == striker { group } else { group.opposite() });
        }
        log::info!("{} takes {:?}", self.players[striker].name, group);
    }
}
