//! Round driver: presses fire, follows a round to completion and resets.

use std::sync::mpsc;

use anyhow::{anyhow, bail, Result};
use serde::Serialize;
use tracing::{info, warn};

use seeker_core::commands::PlayerCommand;
use seeker_core::enums::{ButtonState, TerminationCause};
use seeker_core::events::SimEvent;
use seeker_core::state::RoundSnapshot;

use crate::game_loop::GameLoopCommand;

/// Snapshots to wait for a fire press to land before giving up.
const PRESS_WAIT_LIMIT: u64 = 4096;

/// What happened during one round.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoundSummary {
    pub round: u32,
    pub ticks: u64,
    pub started_at_secs: f64,
    pub ended_at_secs: f64,
    pub launched: u32,
    pub hits: u32,
    pub expired: u32,
    pub cleared: u32,
    pub targets_lost: u32,
    pub blocks_lit: u32,
    pub blocks_total: u32,
    /// The round ended naturally (every missile terminated).
    pub completed: bool,
}

impl RoundSummary {
    fn new(round: u32) -> Self {
        Self {
            round,
            ..Self::default()
        }
    }

    /// Fold one snapshot into the summary.
    pub fn record(&mut self, snapshot: &RoundSnapshot) {
        if self.ticks == 0 {
            self.started_at_secs = snapshot.time.elapsed_secs;
        }
        self.ticks += 1;
        self.ended_at_secs = snapshot.time.elapsed_secs;
        self.blocks_lit = snapshot.level.blocks_lit;
        self.blocks_total = snapshot.level.blocks_total;

        for event in &snapshot.events {
            match event {
                SimEvent::MissileLaunched { .. } => self.launched += 1,
                SimEvent::AnyHit => self.hits += 1,
                SimEvent::TargetLost { .. } => self.targets_lost += 1,
                SimEvent::MissileDestroyed { cause, .. } => match cause {
                    TerminationCause::Hit => {}
                    TerminationCause::Expired => self.expired += 1,
                    TerminationCause::Cleared => self.cleared += 1,
                },
                SimEvent::RoundCompleted => self.completed = true,
                _ => {}
            }
        }
    }
}

/// Command and snapshot ends of a running game loop.
pub struct Session<'a> {
    commands: &'a mpsc::Sender<GameLoopCommand>,
    snapshots: &'a mpsc::Receiver<RoundSnapshot>,
    max_ticks: u64,
}

impl<'a> Session<'a> {
    pub fn new(
        commands: &'a mpsc::Sender<GameLoopCommand>,
        snapshots: &'a mpsc::Receiver<RoundSnapshot>,
        max_ticks: u64,
    ) -> Self {
        Self {
            commands,
            snapshots,
            max_ticks,
        }
    }

    /// Play `rounds` rounds back to back on the same level.
    ///
    /// Stops early (without error) if the fire button is disabled.
    pub fn run_rounds(&self, rounds: u32) -> Result<Vec<RoundSummary>> {
        let mut summaries = Vec::new();
        for round in 1..=rounds {
            match self.run_round(round)? {
                Some(summary) => summaries.push(summary),
                None => break,
            }
        }
        Ok(summaries)
    }

    /// Press fire, follow the round until it completes or hits the tick cap,
    /// then reset. `None` if the press was not accepted.
    pub fn run_round(&self, round: u32) -> Result<Option<RoundSummary>> {
        let mut summary = RoundSummary::new(round);

        // Snapshots already buffered when the press was sent predate it.
        self.send(PlayerCommand::PressFireButton)?;
        let mut waited = 0;
        let fired = loop {
            let snapshot = self.next()?;
            if snapshot.has_fired_this_round {
                break snapshot;
            }
            if snapshot.button == ButtonState::Disabled {
                warn!(round, "fire button disabled, stopping");
                return Ok(None);
            }
            waited += 1;
            if waited > PRESS_WAIT_LIMIT {
                bail!("fire button press not taken within {PRESS_WAIT_LIMIT} ticks");
            }
        };
        summary.record(&fired);

        while !summary.completed && summary.ticks < self.max_ticks {
            let snapshot = self.next()?;
            summary.record(&snapshot);
        }
        if !summary.completed {
            warn!(round, ticks = summary.ticks, "tick cap reached, clearing round");
            self.send(PlayerCommand::ClearActive)?;
        }

        // The reset snapshot closes this round.
        self.send(PlayerCommand::ResetRound)?;
        loop {
            let snapshot = self.next()?;
            summary.record(&snapshot);
            if !snapshot.has_fired_this_round {
                break;
            }
        }

        info!(
            round,
            launched = summary.launched,
            hits = summary.hits,
            expired = summary.expired,
            cleared = summary.cleared,
            blocks_lit = summary.blocks_lit,
            blocks_total = summary.blocks_total,
            completed = summary.completed,
            "round finished"
        );
        Ok(Some(summary))
    }

    fn send(&self, command: PlayerCommand) -> Result<()> {
        self.commands
            .send(GameLoopCommand::PlayerCommand(command))
            .map_err(|_| anyhow!("game loop is not running"))
    }

    fn next(&self) -> Result<RoundSnapshot> {
        self.snapshots
            .recv()
            .map_err(|_| anyhow!("game loop stopped before the round finished"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seeker_core::config::MissileConfig;
    use seeker_sim::engine::SimConfig;

    use crate::game_loop::{spawn_game_loop, LevelSettings, Pacing};

    fn run(missile: MissileConfig, rounds: u32, max_ticks: u64) -> Vec<RoundSummary> {
        let handle = spawn_game_loop(
            SimConfig {
                seed: 7,
                missile,
                ..Default::default()
            },
            LevelSettings::default(),
            Pacing::Unpaced,
        )
        .unwrap();

        let summaries = Session::new(&handle.commands, &handle.snapshots, max_ticks)
            .run_rounds(rounds)
            .unwrap();

        handle.commands.send(GameLoopCommand::Shutdown).unwrap();
        drop(handle.snapshots);
        handle.thread.join().unwrap();
        summaries
    }

    #[test]
    fn test_round_runs_to_completion() {
        let summaries = run(MissileConfig::default(), 1, 3600);
        assert_eq!(summaries.len(), 1);

        let summary = &summaries[0];
        assert!(summary.completed);
        assert_eq!(summary.launched, 3);
        assert_eq!(summary.hits + summary.expired, 3);
        assert_eq!(summary.cleared, 0);
        assert_eq!(summary.blocks_lit, summary.hits);
    }

    #[test]
    fn test_rounds_repeat_after_reset() {
        let summaries = run(MissileConfig::default(), 3, 3600);
        assert_eq!(summaries.len(), 3);
        for (i, summary) in summaries.iter().enumerate() {
            assert_eq!(summary.round, i as u32 + 1);
            assert_eq!(summary.launched, 3);
        }
        assert!(summaries[2].blocks_lit >= summaries[0].blocks_lit);
    }

    #[test]
    fn test_tick_cap_clears_round() {
        // Too slow to reach any block or finish before the cap.
        let crawling = MissileConfig {
            speed: 0.01,
            max_lifetime_sec: 30.0,
            ..MissileConfig::default()
        };
        let summaries = run(crawling, 1, 5);
        let summary = &summaries[0];
        assert!(!summary.completed);
        assert!(summary.launched >= 1);
        assert_eq!(summary.hits, 0);
        assert_eq!(summary.cleared, summary.launched);
    }

    #[test]
    fn test_disabled_feature_stops_session() {
        let summaries = run(
            MissileConfig {
                enabled: false,
                ..MissileConfig::default()
            },
            2,
            3600,
        );
        assert!(summaries.is_empty());
    }

    #[test]
    fn test_summary_counts_events() {
        let mut summary = RoundSummary::new(1);
        let snapshot = RoundSnapshot {
            events: vec![
                SimEvent::AnyHit,
                SimEvent::RoundCompleted,
                SimEvent::MissileDestroyed {
                    missile: Default::default(),
                    cause: TerminationCause::Expired,
                },
            ],
            ..RoundSnapshot::default()
        };
        summary.record(&snapshot);
        assert_eq!(summary.hits, 1);
        assert_eq!(summary.expired, 1);
        assert!(summary.completed);
        assert_eq!(summary.ticks, 1);
    }
}
