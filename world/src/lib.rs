#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the Tower Defence simulation.
//!
//! The world owns the economy ledger, the placement slots, the tower, enemy,
//! and projectile registries, the shared waypoint path, and the per-wave
//! runtime counters. All mutation flows through [`apply`]; read access flows
//! through the [`query`] module. Validation failures are data: the failing
//! command produces a `*Rejected` event carrying a reason enum and leaves
//! state untouched.

use std::time::Duration;

use tower_defence_core::{
    sell_refund, BuildError, Catalog, Command, EnemyColor, EnemyId, EnemyKind, Event, GameConfig,
    Layout, OverrideCategory, OverrideError, Position, ProjectileId, SellError, SlotId,
    SpecOverride, TowerId, TowerKind, UpgradeError, WaveId,
};

use crate::ledger::Ledger;
use crate::registry::{IdAllocator, Registry};

mod ledger;
mod motion;
mod registry;

/// Represents the authoritative Tower Defence world state.
#[derive(Debug)]
pub struct World {
    config: GameConfig,
    catalog: Catalog,
    waypoints: Vec<Position>,
    slots: Vec<Slot>,
    ledger: Ledger,
    towers: Registry<TowerId, Tower>,
    enemies: Registry<EnemyId, Enemy>,
    projectiles: Registry<ProjectileId, Projectile>,
    wave_runtime: WaveRuntime,
    tower_ids: IdAllocator,
    enemy_ids: IdAllocator,
    projectile_ids: IdAllocator,
    tick_index: u64,
}

impl World {
    /// Creates a new world ready for simulation.
    #[must_use]
    pub fn new(config: GameConfig, catalog: Catalog, layout: Layout) -> Self {
        let slots = layout
            .slot_positions
            .iter()
            .enumerate()
            .map(|(index, position)| Slot {
                id: SlotId::new(index as u32),
                position: *position,
                occupant: None,
            })
            .collect();
        let ledger = Ledger::new(config.starting_money, config.starting_lives);
        Self {
            config,
            catalog,
            waypoints: layout.waypoints,
            slots,
            ledger,
            towers: Registry::new(),
            enemies: Registry::new(),
            projectiles: Registry::new(),
            wave_runtime: WaveRuntime::default(),
            tower_ids: IdAllocator::new(),
            enemy_ids: IdAllocator::new(),
            projectile_ids: IdAllocator::new(),
            tick_index: 0,
        }
    }

    fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.slots.get(id.get() as usize)
    }

    fn slot_mut(&mut self, id: SlotId) -> Option<&mut Slot> {
        self.slots.get_mut(id.get() as usize)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(GameConfig::default(), Catalog::default(), Layout::default())
    }
}

#[derive(Debug)]
struct Slot {
    id: SlotId,
    position: Position,
    occupant: Option<TowerId>,
}

#[derive(Debug)]
struct Tower {
    slot: SlotId,
    kind: TowerKind,
    level: u8,
    position: Position,
    base_cost: u32,
    facing: f32,
    cooldown: Duration,
    target: Option<EnemyId>,
}

#[derive(Debug)]
struct Enemy {
    kind: EnemyKind,
    color: EnemyColor,
    position: Position,
    health: f32,
    max_health: f32,
    speed: f32,
    bounty: u32,
    waypoint_index: usize,
}

#[derive(Debug)]
struct Projectile {
    position: Position,
    target: EnemyId,
    speed: f32,
    damage: f32,
}

#[derive(Debug, Default)]
struct WaveRuntime {
    total: u32,
    alive: u32,
    kills: u32,
    leaks: u32,
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            if !world.ledger.is_terminal() {
                motion::advance(world, dt, out_events);
            }
        }
        Command::BuildTower { slot, kind } => handle_build(world, slot, kind, out_events),
        Command::SellTower { slot } => handle_sell(world, slot, out_events),
        Command::UpgradeTower { slot } => handle_upgrade(world, slot, out_events),
        Command::BeginWave => {
            if world.ledger.is_terminal() {
                return;
            }
            let index = world.ledger.wave_index();
            if world.catalog.wave(index).is_none() {
                world.ledger.declare_win(out_events);
                return;
            }
            world.wave_runtime = WaveRuntime::default();
            out_events.push(Event::WaveStarted {
                wave: WaveId::new(index),
            });
        }
        Command::SpawnEnemy { kind } => handle_spawn(world, kind, out_events),
        Command::CompleteWave => {
            if world.ledger.is_terminal() {
                return;
            }
            let index = world.ledger.wave_index();
            out_events.push(Event::WaveCompleted {
                wave: WaveId::new(index),
                kills: world.wave_runtime.kills,
                leaks: world.wave_runtime.leaks,
                total: world.wave_runtime.total,
            });
            world.ledger.advance_wave();
            if world.catalog.wave(world.ledger.wave_index()).is_none() {
                world.ledger.declare_win(out_events);
            }
        }
        Command::SetTowerTarget { tower, target } => {
            let valid = target.filter(|enemy| world.enemies.contains(*enemy));
            if let Some(state) = world.towers.get_mut(tower) {
                state.target = valid;
            }
        }
        Command::FireProjectile { tower, target } => handle_fire(world, tower, target, out_events),
        Command::OverrideSpec { change } => match apply_override(world, &change) {
            Ok(()) => out_events.push(Event::SpecOverridden { change }),
            Err(reason) => out_events.push(Event::OverrideRejected { change, reason }),
        },
        Command::Reset => {
            world.towers.clear();
            world.enemies.clear();
            world.projectiles.clear();
            for slot in &mut world.slots {
                slot.occupant = None;
            }
            world.wave_runtime = WaveRuntime::default();
            world.tower_ids.reset();
            world.enemy_ids.reset();
            world.projectile_ids.reset();
            world.tick_index = 0;
            out_events.push(Event::WorldReset);
            world.ledger.reset(
                world.config.starting_money,
                world.config.starting_lives,
                out_events,
            );
        }
    }
}

fn handle_build(world: &mut World, slot: SlotId, kind: TowerKind, out_events: &mut Vec<Event>) {
    let Some(state) = world.slot(slot) else {
        out_events.push(Event::BuildRejected {
            slot,
            kind,
            reason: BuildError::UnknownSlot,
        });
        return;
    };
    if state.occupant.is_some() {
        out_events.push(Event::BuildRejected {
            slot,
            kind,
            reason: BuildError::Occupied,
        });
        return;
    }
    let position = state.position;
    let cost = world.catalog.tower(kind).cost;
    if !world.ledger.try_spend(cost, out_events) {
        out_events.push(Event::BuildRejected {
            slot,
            kind,
            reason: BuildError::InsufficientFunds,
        });
        return;
    }
    let tower = TowerId::new(world.tower_ids.allocate());
    world.towers.insert(
        tower,
        Tower {
            slot,
            kind,
            level: 0,
            position,
            base_cost: cost,
            facing: 0.0,
            cooldown: Duration::ZERO,
            target: None,
        },
    );
    if let Some(state) = world.slot_mut(slot) {
        state.occupant = Some(tower);
    }
    out_events.push(Event::TowerBuilt {
        tower,
        slot,
        kind,
        cost,
    });
}

fn handle_sell(world: &mut World, slot: SlotId, out_events: &mut Vec<Event>) {
    let Some(state) = world.slot(slot) else {
        out_events.push(Event::SellRejected {
            slot,
            reason: SellError::UnknownSlot,
        });
        return;
    };
    let Some(tower) = state.occupant else {
        out_events.push(Event::SellRejected {
            slot,
            reason: SellError::Empty,
        });
        return;
    };
    let Some(removed) = world.towers.remove(tower) else {
        out_events.push(Event::SellRejected {
            slot,
            reason: SellError::Empty,
        });
        return;
    };
    if let Some(state) = world.slot_mut(slot) {
        state.occupant = None;
    }
    let refund = sell_refund(removed.base_cost, world.config.sell_refund_ratio);
    out_events.push(Event::TowerSold {
        tower,
        slot,
        kind: removed.kind,
        refund,
    });
    world.ledger.earn(refund, out_events);
}

fn handle_upgrade(world: &mut World, slot: SlotId, out_events: &mut Vec<Event>) {
    let Some(state) = world.slot(slot) else {
        out_events.push(Event::UpgradeRejected {
            slot,
            reason: UpgradeError::UnknownSlot,
        });
        return;
    };
    let Some(tower) = state.occupant else {
        out_events.push(Event::UpgradeRejected {
            slot,
            reason: UpgradeError::Empty,
        });
        return;
    };
    let Some((kind, level)) = world.towers.get(tower).map(|state| (state.kind, state.level))
    else {
        out_events.push(Event::UpgradeRejected {
            slot,
            reason: UpgradeError::Empty,
        });
        return;
    };
    if level >= 1 {
        out_events.push(Event::UpgradeRejected {
            slot,
            reason: UpgradeError::AlreadyUpgraded,
        });
        return;
    }
    let Some(cost) = world
        .catalog
        .tower(kind)
        .upgrade
        .as_ref()
        .map(|path| path.cost)
    else {
        out_events.push(Event::UpgradeRejected {
            slot,
            reason: UpgradeError::NoUpgradePath,
        });
        return;
    };
    if !world.ledger.try_spend(cost, out_events) {
        out_events.push(Event::UpgradeRejected {
            slot,
            reason: UpgradeError::InsufficientFunds,
        });
        return;
    }
    if let Some(state) = world.towers.get_mut(tower) {
        state.level = 1;
    }
    out_events.push(Event::TowerUpgraded {
        tower,
        slot,
        kind,
        cost,
    });
}

fn handle_spawn(world: &mut World, kind: EnemyKind, out_events: &mut Vec<Event>) {
    if world.ledger.is_terminal() {
        return;
    }
    let Some(start) = world.waypoints.first().copied() else {
        return;
    };
    let spec = world.catalog.enemy(kind);
    let enemy = EnemyId::new(world.enemy_ids.allocate());
    world.enemies.insert(
        enemy,
        Enemy {
            kind,
            color: spec.color,
            position: start,
            health: spec.health,
            max_health: spec.health,
            speed: spec.speed,
            bounty: spec.bounty,
            waypoint_index: 1,
        },
    );
    world.wave_runtime.total = world.wave_runtime.total.saturating_add(1);
    world.wave_runtime.alive = world.wave_runtime.alive.saturating_add(1);
    out_events.push(Event::EnemySpawned { enemy, kind });
}

fn handle_fire(world: &mut World, tower: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
    if world.ledger.is_terminal() {
        return;
    }
    let Some((kind, level, position, ready)) = world
        .towers
        .get(tower)
        .map(|state| (state.kind, state.level, state.position, state.cooldown.is_zero()))
    else {
        return;
    };
    if !ready || !world.enemies.contains(target) {
        return;
    }
    let spec = world.catalog.tower_effective(kind, level);
    if spec.fire_rate <= 0.0 {
        return;
    }
    let damage = spec.damage;
    let projectile_speed = spec.projectile_speed;
    let cooldown = Duration::from_secs_f32(1.0 / spec.fire_rate);
    if let Some(state) = world.towers.get_mut(tower) {
        state.cooldown = cooldown;
    }
    match projectile_speed {
        None => damage_enemy(world, target, damage, out_events),
        Some(speed) => {
            let projectile = ProjectileId::new(world.projectile_ids.allocate());
            world.projectiles.insert(
                projectile,
                Projectile {
                    position,
                    target,
                    speed,
                    damage,
                },
            );
        }
    }
}

/// Applies damage; the death path runs exactly once because registry removal
/// is the structural guard.
pub(crate) fn damage_enemy(
    world: &mut World,
    enemy: EnemyId,
    damage: f32,
    out_events: &mut Vec<Event>,
) {
    let Some(state) = world.enemies.get_mut(enemy) else {
        return;
    };
    state.health -= damage;
    if state.health > 0.0 {
        return;
    }
    let Some(dead) = world.enemies.remove(enemy) else {
        return;
    };
    world.wave_runtime.alive = world.wave_runtime.alive.saturating_sub(1);
    world.wave_runtime.kills = world.wave_runtime.kills.saturating_add(1);
    out_events.push(Event::EnemyKilled {
        enemy,
        kind: dead.kind,
        bounty: dead.bounty,
    });
    world.ledger.earn(dead.bounty, out_events);
}

fn apply_override(world: &mut World, change: &SpecOverride) -> Result<(), OverrideError> {
    let value = change.value;
    if !value.is_finite() {
        return Err(OverrideError::NotFinite);
    }
    match change.category {
        OverrideCategory::Tower => {
            let spec = world
                .catalog
                .tower_by_name_mut(&change.target)
                .ok_or(OverrideError::UnknownTarget)?;
            match change.property.as_str() {
                "cost" => {
                    ensure_non_negative(value)?;
                    spec.cost = value.round() as u32;
                }
                "damage" => {
                    ensure_positive(value)?;
                    spec.damage = value;
                }
                "range" => {
                    ensure_positive(value)?;
                    spec.range = value;
                }
                "fire_rate" => {
                    ensure_positive(value)?;
                    spec.fire_rate = value;
                }
                "turn_speed" => {
                    ensure_positive(value)?;
                    spec.turn_speed = value;
                }
                "projectile_speed" => {
                    if spec.projectile_speed.is_none() {
                        return Err(OverrideError::UnknownProperty);
                    }
                    ensure_positive(value)?;
                    spec.projectile_speed = Some(value);
                }
                _ => return Err(OverrideError::UnknownProperty),
            }
        }
        OverrideCategory::Enemy => {
            let spec = world
                .catalog
                .enemy_by_name_mut(&change.target)
                .ok_or(OverrideError::UnknownTarget)?;
            match change.property.as_str() {
                "health" => {
                    ensure_positive(value)?;
                    spec.health = value;
                }
                "speed" => {
                    ensure_positive(value)?;
                    spec.speed = value;
                }
                "bounty" => {
                    ensure_non_negative(value)?;
                    spec.bounty = value.round() as u32;
                }
                _ => return Err(OverrideError::UnknownProperty),
            }
        }
        OverrideCategory::Wave => {
            let index: u32 = change
                .target
                .parse()
                .map_err(|_| OverrideError::UnknownTarget)?;
            let wave = world
                .catalog
                .wave_mut(index)
                .ok_or(OverrideError::UnknownTarget)?;
            match change.property.as_str() {
                "inter_wave_delay" => {
                    ensure_non_negative(value)?;
                    wave.inter_wave_delay = Duration::from_secs_f32(value);
                }
                _ => return Err(OverrideError::UnknownProperty),
            }
        }
        OverrideCategory::Economy => {
            if change.target != "config" {
                return Err(OverrideError::UnknownTarget);
            }
            match change.property.as_str() {
                "starting_money" => {
                    ensure_non_negative(value)?;
                    world.config.starting_money = value.round() as u32;
                }
                "starting_lives" => {
                    ensure_positive(value)?;
                    world.config.starting_lives = value.round() as u32;
                }
                "sell_refund_ratio" => {
                    if !(0.0..=1.0).contains(&value) {
                        return Err(OverrideError::OutOfRange);
                    }
                    world.config.sell_refund_ratio = value;
                }
                _ => return Err(OverrideError::UnknownProperty),
            }
        }
    }
    Ok(())
}

fn ensure_positive(value: f32) -> Result<(), OverrideError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(OverrideError::OutOfRange)
    }
}

fn ensure_non_negative(value: f32) -> Result<(), OverrideError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(OverrideError::OutOfRange)
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use tower_defence_core::{
        Catalog, EnemySnapshot, EnemyView, GameConfig, LedgerSnapshot, Position, SlotSnapshot,
        SlotView, TowerSnapshot, TowerView, WaveProgressSnapshot,
    };

    /// Captures the current economy ledger state.
    #[must_use]
    pub fn ledger(world: &World) -> LedgerSnapshot {
        world.ledger.snapshot()
    }

    /// Provides read-only access to the simulation configuration.
    #[must_use]
    pub fn game_config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Provides read-only access to the mutable spec catalog.
    #[must_use]
    pub fn catalog(world: &World) -> &Catalog {
        &world.catalog
    }

    /// Ordered waypoint path every enemy follows.
    #[must_use]
    pub fn waypoints(world: &World) -> &[Position] {
        &world.waypoints
    }

    /// Captures a read-only view of the live towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        let snapshots = world
            .towers
            .iter()
            .map(|(id, tower)| {
                let spec = world.catalog.tower_effective(tower.kind, tower.level);
                TowerSnapshot {
                    id,
                    slot: tower.slot,
                    kind: tower.kind,
                    level: tower.level,
                    position: tower.position,
                    range: spec.range,
                    damage: spec.damage,
                    cooldown: tower.cooldown,
                    target: tower.target,
                }
            })
            .collect();
        TowerView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of the live enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots = world
            .enemies
            .iter()
            .map(|(id, enemy)| EnemySnapshot {
                id,
                kind: enemy.kind,
                color: enemy.color,
                position: enemy.position,
                health: enemy.health,
                max_health: enemy.max_health,
            })
            .collect();
        EnemyView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of every placement slot.
    #[must_use]
    pub fn slot_view(world: &World) -> SlotView {
        let snapshots = world
            .slots
            .iter()
            .map(|slot| SlotSnapshot {
                id: slot.id,
                position: slot.position,
                occupant: slot.occupant,
            })
            .collect();
        SlotView::from_snapshots(snapshots)
    }

    /// Number of ticks processed since construction or the last reset.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures the per-wave runtime counters.
    #[must_use]
    pub fn wave_progress(world: &World) -> WaveProgressSnapshot {
        WaveProgressSnapshot {
            total: world.wave_runtime.total,
            alive: world.wave_runtime.alive,
            kills: world.wave_runtime.kills,
            leaks: world.wave_runtime.leaks,
        }
    }
}
