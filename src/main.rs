//! Cue Engine headless driver
//!
//! Plays a seeded match of random strikes and prints the final standings and
//! the last turn report as JSON.
//!
//! Usage: `cue-engine [seed] [tuning.json]`

use std::error::Error;
use std::process::ExitCode;

use cue_engine::sim::GamePhase;
use cue_engine::{MatchController, Tuning, default_players};
use serde::Serialize;

/// Turn cap so a match that never pots the eight still terminates
const MAX_DEMO_TURNS: usize = 500;
/// Simulated frame length
const FRAME_DT: f32 = 1.0 / 60.0;
/// Frames one turn may take before the driver gives up on it
const MAX_FRAMES_PER_TURN: u32 = 60 * 120;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary<'a> {
    seed: u64,
    turns: usize,
    winner: Option<&'a str>,
    /// Top scorer, absent on a tie
    leader: Option<&'a str>,
    standings: Vec<cue_engine::scoreboard::ScoreEntry>,
    last_report: Option<&'a cue_engine::sim::TurnReport>,
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(arg) => arg.parse::<u64>()?,
        None => 0,
    };
    let tuning = match args.next() {
        Some(path) => Tuning::load(&path)?,
        None => Tuning::default(),
    };

    log::info!("Cue Engine (native) starting, seed {}", seed);

    let mut controller = MatchController::new(tuning, seed);
    controller.start_new_game(default_players())?;

    while controller.phase() == GamePhase::Aiming && controller.turns_played() < MAX_DEMO_TURNS {
        controller.random_strike();

        let mut frames = 0;
        while controller.phase() == GamePhase::Animating || controller.pending_strike().is_some() {
            controller.advance(FRAME_DT);
            frames += 1;
            if frames > MAX_FRAMES_PER_TURN {
                return Err("a turn failed to come to rest".into());
            }
        }
    }

    if controller.phase() != GamePhase::Ended {
        log::info!("Stopped after {} turns without a winner", controller.turns_played());
    }

    let summary = Summary {
        seed,
        turns: controller.turns_played(),
        winner: controller.game().winner().map(String::as_str),
        leader: controller.scoreboard().leader().map(|e| e.player_id.as_str()),
        standings: controller.scoreboard().standings(),
        last_report: controller.history().last(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
