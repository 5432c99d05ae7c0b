#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fire-and-forget session metrics aggregated from the world event stream.
//!
//! The recorder only observes; it emits no commands and the simulation never
//! depends on it. Persistence format is the collector's business: every
//! summary type serializes with `serde`.

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;
use tower_defence_core::{Event, TowerKind};

/// Number of finished sessions retained by default.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// How a recorded session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SessionOutcome {
    /// The session is still running.
    InProgress,
    /// Every wave was cleared.
    Won,
    /// Lives ran out.
    Lost,
    /// A reset cut the session short.
    Abandoned,
}

/// A single tower purchase, upgrade, or sale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TowerTransaction {
    /// Kind of tower involved.
    pub kind: TowerKind,
    /// What happened to it.
    pub action: TowerAction,
    /// Money that changed hands.
    pub amount: u32,
}

/// Kind of tower transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TowerAction {
    /// The tower was constructed.
    Built,
    /// The tower was upgraded.
    Upgraded,
    /// The tower was sold.
    Sold,
}

/// Kills and leaks recorded for one completed wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct WaveRecord {
    /// Zero-based wave index.
    pub wave: u32,
    /// Enemies killed during the wave.
    pub kills: u32,
    /// Enemies that leaked during the wave.
    pub leaks: u32,
    /// Total enemies the wave spawned.
    pub total: u32,
}

/// Aggregated metrics for one play session.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionSummary {
    /// How the session ended.
    pub outcome: SessionOutcome,
    /// Simulated time the session covered.
    pub play_time: Duration,
    /// Number of waves completed.
    pub final_wave: u32,
    /// Money spent on builds and upgrades.
    pub money_spent: u32,
    /// Money returned by sales.
    pub money_refunded: u32,
    /// Money earned from kill bounties.
    pub bounties_collected: u32,
    /// Every tower transaction in order.
    pub towers: Vec<TowerTransaction>,
    /// Enemies killed.
    pub enemies_killed: u32,
    /// Lives lost to leaks.
    pub lives_lost: u32,
    /// Per-wave tallies in completion order.
    pub waves: Vec<WaveRecord>,
}

impl SessionSummary {
    fn fresh() -> Self {
        Self {
            outcome: SessionOutcome::InProgress,
            play_time: Duration::ZERO,
            final_wave: 0,
            money_spent: 0,
            money_refunded: 0,
            bounties_collected: 0,
            towers: Vec::new(),
            enemies_killed: 0,
            lives_lost: 0,
            waves: Vec::new(),
        }
    }

    fn has_activity(&self) -> bool {
        !self.towers.is_empty()
            || !self.waves.is_empty()
            || self.enemies_killed > 0
            || self.lives_lost > 0
    }
}

/// Event-stream consumer that aggregates session summaries and retains a
/// bounded history of finished ones.
#[derive(Clone, Debug)]
pub struct SessionRecorder {
    capacity: usize,
    current: SessionSummary,
    history: VecDeque<SessionSummary>,
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl SessionRecorder {
    /// Creates a recorder retaining at most `capacity` finished sessions.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            current: SessionSummary::fresh(),
            history: VecDeque::new(),
        }
    }

    /// Metrics of the session currently in progress.
    #[must_use]
    pub fn current(&self) -> &SessionSummary {
        &self.current
    }

    /// Finished sessions, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &SessionSummary> {
        self.history.iter()
    }

    /// Number of finished sessions retained.
    #[must_use]
    pub fn recorded(&self) -> usize {
        self.history.len()
    }

    /// Consumes world events, updating the in-progress summary and closing
    /// it on terminal or reset events.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    self.current.play_time = self.current.play_time.saturating_add(*dt);
                }
                Event::TowerBuilt { kind, cost, .. } => {
                    self.current.money_spent = self.current.money_spent.saturating_add(*cost);
                    self.current.towers.push(TowerTransaction {
                        kind: *kind,
                        action: TowerAction::Built,
                        amount: *cost,
                    });
                }
                Event::TowerUpgraded { kind, cost, .. } => {
                    self.current.money_spent = self.current.money_spent.saturating_add(*cost);
                    self.current.towers.push(TowerTransaction {
                        kind: *kind,
                        action: TowerAction::Upgraded,
                        amount: *cost,
                    });
                }
                Event::TowerSold { kind, refund, .. } => {
                    self.current.money_refunded =
                        self.current.money_refunded.saturating_add(*refund);
                    self.current.towers.push(TowerTransaction {
                        kind: *kind,
                        action: TowerAction::Sold,
                        amount: *refund,
                    });
                }
                Event::EnemyKilled { bounty, .. } => {
                    self.current.enemies_killed = self.current.enemies_killed.saturating_add(1);
                    self.current.bounties_collected =
                        self.current.bounties_collected.saturating_add(*bounty);
                }
                Event::EnemyLeaked { .. } => {
                    self.current.lives_lost = self.current.lives_lost.saturating_add(1);
                }
                Event::WaveCompleted {
                    wave,
                    kills,
                    leaks,
                    total,
                } => {
                    self.current.waves.push(WaveRecord {
                        wave: wave.get(),
                        kills: *kills,
                        leaks: *leaks,
                        total: *total,
                    });
                    self.current.final_wave = self.current.final_wave.max(wave.get() + 1);
                }
                Event::GameWon => self.finish(SessionOutcome::Won),
                Event::GameOver => self.finish(SessionOutcome::Lost),
                Event::WorldReset => {
                    if self.current.has_activity() {
                        self.finish(SessionOutcome::Abandoned);
                    } else {
                        self.current = SessionSummary::fresh();
                    }
                }
                _ => {}
            }
        }
    }

    fn finish(&mut self, outcome: SessionOutcome) {
        let mut finished = std::mem::replace(&mut self.current, SessionSummary::fresh());
        finished.outcome = outcome;
        if self.history.len() == self.capacity {
            let _ = self.history.pop_front();
        }
        self.history.push_back(finished);
    }
}
