#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure combat-resolver system: low-frequency target acquisition and fire
//! gating computed from world snapshots.
//!
//! Target scans run on a fixed cadence decoupled from the tick rate; an
//! internal accumulator is driven by observed [`Event::TimeAdvanced`] time.
//! Fire commands are emitted on every call for towers whose cooldown shows
//! ready and whose locked target is still alive. Range is checked when a
//! target is acquired, not again when firing, so an enemy sprinting out of
//! range mid-burst still eats the shot already committed.

use std::time::Duration;

use tower_defence_core::{Command, EnemySnapshot, EnemyView, Event, TowerView};

/// Default cadence of the target re-acquisition scan.
pub const DEFAULT_RETARGET_INTERVAL: Duration = Duration::from_millis(500);

/// Combat resolver owning the retarget cadence timer.
#[derive(Debug)]
pub struct CombatResolver {
    interval: Duration,
    accumulator: Duration,
}

impl Default for CombatResolver {
    fn default() -> Self {
        Self::new(DEFAULT_RETARGET_INTERVAL)
    }
}

impl CombatResolver {
    /// Creates a resolver scanning on the provided cadence.
    ///
    /// The accumulator starts expired so the first call scans immediately.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulator: interval,
        }
    }

    /// Rearms the cadence timer; the next call scans immediately.
    ///
    /// No assignment cache survives a reset: desired targets are recomputed
    /// from the snapshots alone, so stale pre-reset assignments are
    /// structurally impossible.
    pub fn reset(&mut self) {
        self.accumulator = self.interval;
    }

    /// Consumes world events and snapshots, emitting targeting and fire
    /// commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        towers: &TowerView,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    self.accumulator = self.accumulator.saturating_add(*dt);
                }
                Event::WorldReset => self.reset(),
                _ => {}
            }
        }

        if self.accumulator >= self.interval {
            while !self.interval.is_zero() && self.accumulator >= self.interval {
                self.accumulator -= self.interval;
            }
            if self.interval.is_zero() {
                self.accumulator = Duration::ZERO;
            }
            retarget(towers, enemies, out);
        }

        for tower in towers.iter() {
            let Some(target) = tower.target else {
                continue;
            };
            if tower.ready_to_fire() && enemies.get(target).is_some() {
                out.push(Command::FireProjectile {
                    tower: tower.id,
                    target,
                });
            }
        }
    }
}

/// Picks the nearest in-range enemy per tower, ties broken by enemy id
/// enumeration order, and emits an assignment only when it differs from the
/// tower's current target.
fn retarget(towers: &TowerView, enemies: &EnemyView, out: &mut Vec<Command>) {
    for tower in towers.iter() {
        let mut best: Option<&EnemySnapshot> = None;
        for enemy in enemies.iter() {
            let better = match best {
                Some(current) => {
                    tower.position.distance_to(enemy.position)
                        < tower.position.distance_to(current.position)
                }
                None => true,
            };
            if better {
                best = Some(enemy);
            }
        }
        let desired = best
            .filter(|enemy| tower.position.distance_to(enemy.position) <= tower.range)
            .map(|enemy| enemy.id);
        if desired != tower.target {
            out.push(Command::SetTowerTarget {
                tower: tower.id,
                target: desired,
            });
        }
    }
}
