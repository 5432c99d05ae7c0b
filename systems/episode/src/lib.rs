#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Episode lifecycle system for reinforcement-learning harnesses: action
//! decoding, reward shaping, observation encoding, and termination.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tower_defence_core::{Event, LedgerSnapshot, TowerKind};

pub use crate::action::{Action, ActionSpace};
pub use crate::observation::ObservationEncoder;

pub mod action;
pub mod observation;

/// Shaped-reward magnitudes.
///
/// The magnitudes are configuration; the ordering is contract: an upgrade
/// outranks a build, a build outranks idling, and idling with defences in
/// place is never worse than idling without them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Reward for a successful build.
    pub build: f32,
    /// Reward for a successful upgrade.
    pub upgrade: f32,
    /// Reward (negative) for a successful sale; the largest single action
    /// penalty, discouraging churn.
    pub sell: f32,
    /// Penalty for a rejected or out-of-range action.
    pub invalid: f32,
    /// One-time bonus for the first build of each kind per episode.
    pub diversity_bonus: f32,
    /// Reward for idling while at least one tower stands.
    pub noop_with_towers: f32,
    /// Reward for idling with no towers at all.
    pub noop_without_towers: f32,
    /// Ambient reward per completed wave.
    pub wave_completed: f32,
    /// Ambient penalty per life lost.
    pub life_lost: f32,
    /// Base reward when the episode ends in the win.
    pub win: f32,
    /// Base reward when the episode ends in the loss.
    pub loss: f32,
    /// Reward when the episode exceeds its time budget.
    pub timeout: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            build: 0.1,
            upgrade: 0.15,
            sell: -0.25,
            invalid: -0.05,
            diversity_bonus: 0.05,
            noop_with_towers: 0.001,
            noop_without_towers: 0.0,
            wave_completed: 1.0,
            life_lost: -0.2,
            win: 2.0,
            loss: -1.0,
            timeout: -0.5,
        }
    }
}

/// Weights of the terminal performance score.
///
/// The weights are configuration; monotonicity is contract: more remaining
/// lives, more completed waves, more kills, more towers, and longer survival
/// all raise the score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerformanceWeights {
    /// Weight of the remaining-life fraction.
    pub life_fraction: f32,
    /// Weight of the completed-wave fraction.
    pub wave_progress: f32,
    /// Score contributed by each kill.
    pub per_kill: f32,
    /// Score contributed by each tower built.
    pub per_tower: f32,
    /// Weight of the survived episode-time fraction.
    pub survival: f32,
}

impl Default for PerformanceWeights {
    fn default() -> Self {
        Self {
            life_fraction: 0.5,
            wave_progress: 0.5,
            per_kill: 0.01,
            per_tower: 0.02,
            survival: 0.25,
        }
    }
}

impl PerformanceWeights {
    /// Computes the weighted performance score from episode statistics.
    #[must_use]
    pub fn score(
        &self,
        life_fraction: f32,
        wave_fraction: f32,
        kills: u32,
        towers_built: u32,
        time_fraction: f32,
    ) -> f32 {
        self.life_fraction * life_fraction
            + self.wave_progress * wave_fraction
            + self.per_kill * kills as f32
            + self.per_tower * towers_built as f32
            + self.survival * time_fraction.clamp(0.0, 1.0)
    }
}

/// How an episode ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeOutcome {
    /// Every wave was cleared.
    Win,
    /// Lives ran out.
    Loss,
    /// The time budget elapsed first.
    Timeout,
}

/// Per-step result handed back to the learning loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    /// Shaped reward earned this step.
    pub reward: f32,
    /// Indicates whether the episode reached a terminal state.
    pub done: bool,
    /// Outcome, present from the terminal step onward.
    pub outcome: Option<EpisodeOutcome>,
}

/// Episode context: counters, accumulated reward, elapsed time, and the
/// reward shaping applied on every step.
#[derive(Clone, Debug)]
pub struct EpisodeShaper {
    rewards: RewardConfig,
    weights: PerformanceWeights,
    timeout: Duration,
    elapsed: Duration,
    kills: u32,
    towers_built: u32,
    tower_count: u32,
    waves_completed: u32,
    lives_lost: u32,
    kinds_built: [bool; TowerKind::COUNT],
    total_reward: f32,
    outcome: Option<EpisodeOutcome>,
}

impl Default for EpisodeShaper {
    fn default() -> Self {
        Self::new(
            RewardConfig::default(),
            PerformanceWeights::default(),
            Duration::from_secs(600),
        )
    }
}

impl EpisodeShaper {
    /// Creates a shaper with the provided reward table, performance weights,
    /// and episode time budget.
    #[must_use]
    pub const fn new(
        rewards: RewardConfig,
        weights: PerformanceWeights,
        timeout: Duration,
    ) -> Self {
        Self {
            rewards,
            weights,
            timeout,
            elapsed: Duration::ZERO,
            kills: 0,
            towers_built: 0,
            tower_count: 0,
            waves_completed: 0,
            lives_lost: 0,
            kinds_built: [false; TowerKind::COUNT],
            total_reward: 0.0,
            outcome: None,
        }
    }

    /// Resets every counter for a fresh episode.
    pub fn begin(&mut self) {
        self.elapsed = Duration::ZERO;
        self.kills = 0;
        self.towers_built = 0;
        self.tower_count = 0;
        self.waves_completed = 0;
        self.lives_lost = 0;
        self.kinds_built = [false; TowerKind::COUNT];
        self.total_reward = 0.0;
        self.outcome = None;
    }

    /// Reward accumulated since the episode began.
    #[must_use]
    pub const fn total_reward(&self) -> f32 {
        self.total_reward
    }

    /// Outcome of the episode, if it has ended.
    #[must_use]
    pub const fn outcome(&self) -> Option<EpisodeOutcome> {
        self.outcome
    }

    /// Simulated time observed since the episode began.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Enemies killed since the episode began.
    #[must_use]
    pub const fn kills(&self) -> u32 {
        self.kills
    }

    /// Waves completed since the episode began.
    #[must_use]
    pub const fn waves_completed(&self) -> u32 {
        self.waves_completed
    }

    /// Shapes the reward for one environment step.
    ///
    /// `action` is the decoded action the agent took this step and `events`
    /// the world events the step produced. Once a terminal step has been
    /// reported, further calls are inert.
    pub fn step(
        &mut self,
        action: Action,
        events: &[Event],
        ledger: &LedgerSnapshot,
        wave_count: u32,
    ) -> StepReport {
        if self.outcome.is_some() {
            return StepReport {
                reward: 0.0,
                done: true,
                outcome: self.outcome,
            };
        }

        let mut reward = 0.0;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    self.elapsed = self.elapsed.saturating_add(*dt);
                }
                Event::EnemyKilled { .. } => self.kills = self.kills.saturating_add(1),
                Event::EnemyLeaked { .. } => {
                    self.lives_lost = self.lives_lost.saturating_add(1);
                    reward += self.rewards.life_lost;
                }
                Event::WaveCompleted { .. } => {
                    self.waves_completed = self.waves_completed.saturating_add(1);
                    reward += self.rewards.wave_completed;
                }
                Event::TowerBuilt { .. } => {
                    self.towers_built = self.towers_built.saturating_add(1);
                    self.tower_count = self.tower_count.saturating_add(1);
                }
                Event::TowerSold { .. } => {
                    self.tower_count = self.tower_count.saturating_sub(1);
                }
                _ => {}
            }
        }

        reward += self.action_reward(action, events);

        let terminal = events.iter().rev().find_map(|event| match event {
            Event::GameWon => Some(EpisodeOutcome::Win),
            Event::GameOver => Some(EpisodeOutcome::Loss),
            _ => None,
        });
        if let Some(outcome) = terminal {
            let score = self.performance_score(ledger, wave_count);
            reward += match outcome {
                EpisodeOutcome::Win => self.rewards.win + score,
                EpisodeOutcome::Loss | EpisodeOutcome::Timeout => self.rewards.loss + score,
            };
            self.outcome = Some(outcome);
        } else if self.elapsed >= self.timeout {
            reward += self.rewards.timeout;
            self.outcome = Some(EpisodeOutcome::Timeout);
        }

        self.total_reward += reward;
        StepReport {
            reward,
            done: self.outcome.is_some(),
            outcome: self.outcome,
        }
    }

    fn action_reward(&mut self, action: Action, events: &[Event]) -> f32 {
        match action {
            Action::Noop => {
                if self.tower_count > 0 {
                    self.rewards.noop_with_towers
                } else {
                    self.rewards.noop_without_towers
                }
            }
            Action::SelectKind(_) => 0.0,
            Action::Build(_) => {
                let built = events.iter().find_map(|event| match event {
                    Event::TowerBuilt { kind, .. } => Some(*kind),
                    _ => None,
                });
                match built {
                    Some(kind) => {
                        let mut reward = self.rewards.build;
                        if !self.kinds_built[kind.index()] {
                            self.kinds_built[kind.index()] = true;
                            reward += self.rewards.diversity_bonus;
                        }
                        reward
                    }
                    None => self.rewards.invalid,
                }
            }
            Action::Upgrade(_) => {
                if events
                    .iter()
                    .any(|event| matches!(event, Event::TowerUpgraded { .. }))
                {
                    self.rewards.upgrade
                } else {
                    self.rewards.invalid
                }
            }
            Action::Sell(_) => {
                if events
                    .iter()
                    .any(|event| matches!(event, Event::TowerSold { .. }))
                {
                    self.rewards.sell
                } else {
                    self.rewards.invalid
                }
            }
            Action::Invalid => self.rewards.invalid,
        }
    }

    fn performance_score(&self, ledger: &LedgerSnapshot, wave_count: u32) -> f32 {
        let life_fraction = if ledger.starting_lives > 0 {
            ledger.lives as f32 / ledger.starting_lives as f32
        } else {
            0.0
        };
        let wave_fraction = if wave_count > 0 {
            self.waves_completed as f32 / wave_count as f32
        } else {
            0.0
        };
        let time_fraction = if self.timeout.is_zero() {
            1.0
        } else {
            self.elapsed.as_secs_f32() / self.timeout.as_secs_f32()
        };
        self.weights.score(
            life_fraction,
            wave_fraction,
            self.kills,
            self.towers_built,
            time_fraction,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{PerformanceWeights, RewardConfig};

    #[test]
    fn default_rewards_honor_the_ordering_contract() {
        let rewards = RewardConfig::default();
        assert!(rewards.upgrade > rewards.build);
        assert!(rewards.build > rewards.noop_with_towers);
        assert!(rewards.noop_with_towers >= rewards.noop_without_towers);
        assert!(rewards.invalid < 0.0);
        assert!(
            rewards.sell < rewards.invalid,
            "selling is the largest single action penalty",
        );
    }

    #[test]
    fn performance_score_is_monotonic() {
        let weights = PerformanceWeights::default();
        let base = weights.score(0.5, 0.4, 10, 3, 0.5);
        assert!(weights.score(0.6, 0.4, 10, 3, 0.5) > base);
        assert!(weights.score(0.5, 0.5, 10, 3, 0.5) > base);
        assert!(weights.score(0.5, 0.4, 11, 3, 0.5) > base);
        assert!(weights.score(0.5, 0.4, 10, 4, 0.5) > base);
        assert!(
            weights.score(0.5, 0.4, 10, 3, 0.6) > base,
            "holding out longer with the same record scores higher",
        );
    }
}
