//! Peer wire messages
//!
//! JSON text frames exchanged between two peers playing the same match. The
//! striker's peer is authoritative for a turn: it sends the strike so the
//! other side can animate it, then the `TurnReport` the other side reconciles
//! against. Transport is left to the caller.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::sim::TurnReport;
use crate::strike_vector;

/// Protocol version - increment when making breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PeerMsg {
    #[serde(rename = "turn_report")]
    TurnReport(TurnReportMsg),
    #[serde(rename = "strike")]
    Strike(StrikeMsg),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnReportMsg {
    pub protocol_version: u32,
    /// 1-based turn number on the sending side
    pub turn: u32,
    pub report: TurnReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrikeMsg {
    pub power: f32,
    /// Degrees, 0 along +x
    pub angle: f32,
}

impl StrikeMsg {
    pub fn force(&self) -> Vec2 {
        strike_vector(self.power, self.angle)
    }
}

impl PeerMsg {
    pub fn turn_report(turn: u32, report: TurnReport) -> Self {
        PeerMsg::TurnReport(TurnReportMsg {
            protocol_version: PROTOCOL_VERSION,
            turn,
            report,
        })
    }

    pub fn strike(power: f32, angle: f32) -> Self {
        PeerMsg::Strike(StrikeMsg { power, angle })
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode one frame. Reports from a different protocol version are
    /// still returned, with a warning.
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        let msg: PeerMsg = serde_json::from_str(text)?;
        if let PeerMsg::TurnReport(inner) = &msg
            && inner.protocol_version != PROTOCOL_VERSION
        {
            log::warn!(
                "Peer speaks protocol {}, expected {}",
                inner.protocol_version,
                PROTOCOL_VERSION
            );
        }
        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{BallState, Foul};

    fn sample_report() -> TurnReport {
        let mut cue = BallState::new(0, Vec2::new(12.5, 390.0));
        cue.is_pocketed = true;
        TurnReport {
            final_ball_states: vec![cue, BallState::new(3, Vec2::new(450.0, 210.25))],
            pocketed_ball_ids: vec![0],
            is_foul: true,
            foul: Some(Foul::CueBallPocketed),
            turn_winner_id: None,
            next_player_id: "player2".to_string(),
            players: Vec::new(),
            turns_played: 3,
        }
    }

    #[test]
    fn test_turn_report_roundtrip() {
        let msg = PeerMsg::turn_report(4, sample_report());
        let json = msg.to_json().unwrap();
        assert!(json.contains("\"type\":\"turn_report\""));
        assert!(json.contains("\"protocolVersion\":1"));
        assert!(json.contains("\"finalBallStates\""));
        assert!(json.contains("\"isPocketed\":true"));
        assert!(json.contains("\"nextPlayerId\":\"player2\""));
        assert!(json.contains("\"turnsPlayed\":3"));

        match PeerMsg::from_json(&json).unwrap() {
            PeerMsg::TurnReport(inner) => {
                assert_eq!(inner.turn, 4);
                assert_eq!(inner.report, sample_report());
            }
            other => panic!("Expected TurnReport, got {:?}", other),
        }
    }

    #[test]
    fn test_strike_roundtrip() {
        let json = PeerMsg::strike(1200.0, 90.0).to_json().unwrap();
        assert!(json.contains("\"type\":\"strike\""));
        let PeerMsg::Strike(strike) = PeerMsg::from_json(&json).unwrap() else {
            panic!("Expected Strike");
        };
        assert_eq!(strike.power, 1200.0);
        let force = strike.force();
        assert!(force.x.abs() < 1e-2);
        assert!((force.y - 1200.0).abs() < 1e-2);
    }

    #[test]
    fn test_report_without_foul_reason_decodes() {
        // Minimal report as a peer without the foul field would send it
        let json = r#"{"type":"turn_report","protocolVersion":1,"turn":1,"report":{
            "finalBallStates":[{"id":0,"position":[200.0,200.0],"isPocketed":false}],
            "pocketedBallIds":[],"isFoul":false,"turnWinnerId":null,"nextPlayerId":"p2"}}"#;
        let PeerMsg::TurnReport(inner) = PeerMsg::from_json(json).unwrap() else {
            panic!("Expected TurnReport");
        };
        assert_eq!(inner.report.foul, None);
        assert!(inner.report.players.is_empty());
        assert_eq!(inner.report.turns_played, 0);
        assert_eq!(inner.report.final_ball_states[0].position, Vec2::new(200.0, 200.0));
    }

    #[test]
    fn test_malformed_frames_rejected() {
        assert!(matches!(PeerMsg::from_json("{"), Err(EngineError::Json(_))));
        assert!(matches!(
            PeerMsg::from_json(r#"{"type":"resign"}"#),
            Err(EngineError::Json(_))
        ));
    }
}
