#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure wave-sequencing system driving the spawn schedule as an explicit
//! resumable state machine.
//!
//! The director observes `TimeAdvanced` events instead of owning a clock, so
//! a single large tick may release several spawns. Completion is gated on
//! both drain and spawn exhaustion: a `CompleteWave` can never fire while
//! spawn commands remain unacknowledged, even when every enemy observed so
//! far has already resolved.

use std::time::Duration;

use tower_defence_core::{Catalog, Command, Event, LedgerSnapshot};

/// Countdown applied before the very first wave when none is configured.
const DEFAULT_INITIAL_COUNTDOWN: Duration = Duration::from_secs(2);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DirectorState {
    Idle {
        countdown: Duration,
    },
    Spawning {
        group: usize,
        spawned: u32,
        until_next: Duration,
    },
    Draining,
    Finished,
}

/// Wave director owning the spawn-sequence state machine.
#[derive(Debug)]
pub struct WaveDirector {
    state: DirectorState,
    initial_countdown: Duration,
    /// Spawn commands emitted but not yet acknowledged by `EnemySpawned`.
    pending_spawns: u32,
    /// Live enemies according to the observed event stream.
    alive: u32,
}

impl Default for WaveDirector {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_COUNTDOWN)
    }
}

impl WaveDirector {
    /// Creates a director idling through the provided initial countdown.
    #[must_use]
    pub const fn new(initial_countdown: Duration) -> Self {
        Self {
            state: DirectorState::Idle {
                countdown: initial_countdown,
            },
            initial_countdown,
            pending_spawns: 0,
            alive: 0,
        }
    }

    /// Reports whether the director reached its terminal state.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self.state, DirectorState::Finished)
    }

    /// Forces the current idle countdown to zero.
    ///
    /// The next call still walks through `BeginWave` and the full spawn
    /// sequence; spawning is never skipped.
    pub fn start_next_wave(&mut self) {
        if let DirectorState::Idle { countdown } = &mut self.state {
            *countdown = Duration::ZERO;
        }
    }

    /// Cancels any in-flight spawn sequence and returns to wave 0.
    ///
    /// The pending-spawn and alive counters are zeroed, so no spawn from a
    /// pre-reset sequence can influence a later completion.
    pub fn reset(&mut self) {
        self.state = DirectorState::Idle {
            countdown: self.initial_countdown,
        };
        self.pending_spawns = 0;
        self.alive = 0;
    }

    /// Consumes world events and emits wave-sequencing commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        ledger: &LedgerSnapshot,
        catalog: &Catalog,
        out: &mut Vec<Command>,
    ) {
        let mut dt = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt: elapsed } => {
                    dt = dt.saturating_add(*elapsed);
                }
                Event::EnemySpawned { .. } => {
                    self.pending_spawns = self.pending_spawns.saturating_sub(1);
                    self.alive = self.alive.saturating_add(1);
                }
                Event::EnemyKilled { .. } | Event::EnemyLeaked { .. } => {
                    self.alive = self.alive.saturating_sub(1);
                }
                Event::GameOver | Event::GameWon => self.state = DirectorState::Finished,
                Event::WorldReset => self.reset(),
                _ => {}
            }
        }
        if ledger.is_terminal() {
            self.state = DirectorState::Finished;
        }

        loop {
            match &mut self.state {
                DirectorState::Idle { countdown } => {
                    if dt < *countdown {
                        *countdown -= dt;
                        break;
                    }
                    dt -= *countdown;
                    out.push(Command::BeginWave);
                    if catalog.wave(ledger.wave_index).is_none() {
                        // The world answers an exhausted wave list with the
                        // win declaration.
                        self.state = DirectorState::Finished;
                        break;
                    }
                    self.state = DirectorState::Spawning {
                        group: 0,
                        spawned: 0,
                        until_next: Duration::ZERO,
                    };
                }
                DirectorState::Spawning {
                    group,
                    spawned,
                    until_next,
                } => {
                    let Some(wave) = catalog.wave(ledger.wave_index) else {
                        self.state = DirectorState::Draining;
                        continue;
                    };
                    let Some(spec) = wave.groups.get(*group) else {
                        self.state = DirectorState::Draining;
                        continue;
                    };
                    if *spawned >= spec.count {
                        *group += 1;
                        *spawned = 0;
                        *until_next = Duration::ZERO;
                        continue;
                    }
                    if dt < *until_next {
                        *until_next -= dt;
                        break;
                    }
                    dt -= *until_next;
                    out.push(Command::SpawnEnemy { kind: spec.enemy });
                    self.pending_spawns = self.pending_spawns.saturating_add(1);
                    *spawned += 1;
                    *until_next = spec.interval;
                }
                DirectorState::Draining => {
                    if self.pending_spawns == 0 && self.alive == 0 {
                        out.push(Command::CompleteWave);
                        let completed = catalog.wave(ledger.wave_index);
                        if catalog.wave(ledger.wave_index + 1).is_none() {
                            self.state = DirectorState::Finished;
                        } else {
                            self.state = DirectorState::Idle {
                                countdown: completed
                                    .map(|wave| wave.inter_wave_delay)
                                    .unwrap_or(self.initial_countdown),
                            };
                        }
                    }
                    break;
                }
                DirectorState::Finished => break,
            }
        }
    }
}
