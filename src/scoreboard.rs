//! Per-player match score
//!
//! One point per pocketed ball, credited to whoever shoots next.

use serde::{Deserialize, Serialize};

use crate::sim::{Player, PlayerId};

/// A single score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub player_id: PlayerId,
    pub score: u32,
}

/// Running scores, kept in seat order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub entries: Vec<ScoreEntry>,
}

impl Scoreboard {
    /// Create empty scoreboard
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Every player on zero, in seat order
    pub fn with_players(players: &[Player]) -> Self {
        Self {
            entries: players
                .iter()
                .map(|p| ScoreEntry {
                    player_id: p.id.clone(),
                    score: 0,
                })
                .collect(),
        }
    }

    /// Credit `points` to a player, adding them if unseen. Returns the new total.
    pub fn add(&mut self, player_id: &str, points: u32) -> u32 {
        let entry = match self.entries.iter().position(|e| e.player_id == player_id) {
            Some(i) => &mut self.entries[i],
            None => {
                self.entries.push(ScoreEntry {
                    player_id: player_id.to_string(),
                    score: 0,
                });
                let last = self.entries.len() - 1;
                &mut self.entries[last]
            }
        };
        entry.score = entry.score.saturating_add(points);
        entry.score
    }

    /// Unknown players score zero
    pub fn score_of(&self, player_id: &str) -> u32 {
        self.entries
            .iter()
            .find(|e| e.player_id == player_id)
            .map_or(0, |e| e.score)
    }

    /// Highest score first; ties keep seat order
    pub fn standings(&self) -> Vec<ScoreEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.score.cmp(&a.score));
        sorted
    }

    /// Sole top scorer, `None` when empty or tied at the top
    pub fn leader(&self) -> Option<&ScoreEntry> {
        let top = self.entries.iter().map(|e| e.score).max()?;
        let mut at_top = self.entries.iter().filter(|e| e.score == top);
        let first = at_top.next()?;
        at_top.next().is_none().then_some(first)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
