#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tower Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fraction of a tower's original cost refunded when it is sold.
pub const SELL_REFUND_RATIO: f32 = 0.75;

/// Computes the money refunded for selling a tower bought at `cost`.
///
/// The refund is always derived from the original purchase cost, never from
/// the upgraded spec. It rounds to the nearest whole unit; exact halves
/// round down, so a 50-cost tower refunds 37.
#[must_use]
pub fn sell_refund(cost: u32, ratio: f32) -> u32 {
    let exact = cost as f32 * ratio;
    (exact - 0.5).ceil().max(0.0) as u32
}

/// Unique identifier assigned to a placement slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(u32);

impl SlotId {
    /// Creates a new slot identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy instance.
///
/// Other entities (towers, projectiles) hold `EnemyId` values as weak
/// handles; the world validates them against the enemy registry on use, so a
/// handle whose referent died is harmless.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Zero-based index of a wave within the configured wave list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaveId(u32);

impl WaveId {
    /// Creates a new wave identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Point in world units on the playfield plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a new position from world-unit coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate in world units.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate in world units.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance between two positions.
    #[must_use]
    pub fn distance_to(&self, other: Position) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerKind {
    /// Rapid-fire hitscan tower.
    Gun,
    /// Slow, heavy tower that lobs homing projectiles.
    Cannon,
}

impl TowerKind {
    /// Every tower kind in canonical order.
    pub const ALL: [TowerKind; 2] = [TowerKind::Gun, TowerKind::Cannon];

    /// Number of configured tower kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// Canonical index of the kind within [`TowerKind::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Gun => 0,
            Self::Cannon => 1,
        }
    }

    /// Resolves a canonical index back to a kind.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Types of enemies that can be spawned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Fast, fragile enemy.
    Runner,
    /// Slow, durable enemy.
    Tanker,
}

impl EnemyKind {
    /// Every enemy kind in canonical order.
    pub const ALL: [EnemyKind; 2] = [EnemyKind::Runner, EnemyKind::Tanker];

    /// Canonical index of the kind within [`EnemyKind::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Runner => 0,
            Self::Tanker => 1,
        }
    }
}

/// Combat and economy parameters for one tower tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerSpec {
    /// Stable name used by the balance interface to address this spec.
    pub name: String,
    /// Purchase cost in money units.
    pub cost: u32,
    /// Damage applied per shot.
    pub damage: f32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Shots per second; the fire cooldown is `1 / fire_rate`.
    pub fire_rate: f32,
    /// Rotation responsiveness used for exponential turn interpolation.
    pub turn_speed: f32,
    /// Projectile travel speed; `None` means the tower hits instantly.
    pub projectile_speed: Option<f32>,
    /// Optional single-step upgrade available from this tier.
    pub upgrade: Option<UpgradePath>,
}

/// Single-step upgrade from a base tower spec to an improved one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradePath {
    /// Money debited when the upgrade is purchased.
    pub cost: u32,
    /// Spec that replaces the tower's base spec after upgrading.
    pub spec: Box<TowerSpec>,
}

/// Visual tag applied to an enemy kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl EnemyColor {
    /// Creates a new enemy color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Stats for one enemy kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySpec {
    /// Stable name used by the balance interface to address this spec.
    pub name: String,
    /// Starting health of each spawned instance.
    pub health: f32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Money paid to the player when the enemy dies.
    pub bounty: u32,
    /// Visual tag adapters may use when presenting the enemy.
    pub color: EnemyColor,
}

/// One homogeneous run of spawns within a wave.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnGroup {
    /// Kind of enemy emitted by this group.
    pub enemy: EnemyKind,
    /// Number of enemies to spawn.
    pub count: u32,
    /// Delay between consecutive spawns within the group.
    pub interval: Duration,
}

/// Ordered spawn schedule for a single wave.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveSpec {
    /// Spawn groups issued sequentially.
    pub groups: Vec<SpawnGroup>,
    /// Idle countdown inserted after this wave completes.
    pub inter_wave_delay: Duration,
}

impl WaveSpec {
    /// Total number of enemies the wave will spawn.
    #[must_use]
    pub fn total_enemies(&self) -> u32 {
        self.groups.iter().map(|group| group.count).sum()
    }
}

/// Mutable book of tower, enemy, and wave specs owned by the world.
///
/// The balance interface addresses entries by category, name, and property;
/// everything else resolves specs through the typed accessors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    towers: [TowerSpec; TowerKind::COUNT],
    enemies: [EnemySpec; EnemyKind::ALL.len()],
    waves: Vec<WaveSpec>,
}

impl Catalog {
    /// Creates a catalog from explicit spec tables.
    #[must_use]
    pub fn new(
        towers: [TowerSpec; TowerKind::COUNT],
        enemies: [EnemySpec; EnemyKind::ALL.len()],
        waves: Vec<WaveSpec>,
    ) -> Self {
        Self {
            towers,
            enemies,
            waves,
        }
    }

    /// Base spec for the provided tower kind.
    #[must_use]
    pub fn tower(&self, kind: TowerKind) -> &TowerSpec {
        &self.towers[kind.index()]
    }

    /// Spec a tower of `kind` at `level` actually fights with.
    ///
    /// Level 1 resolves through the upgrade path when one exists; a level
    /// beyond the configured path falls back to the base spec.
    #[must_use]
    pub fn tower_effective(&self, kind: TowerKind, level: u8) -> &TowerSpec {
        let base = self.tower(kind);
        if level >= 1 {
            if let Some(path) = &base.upgrade {
                return &path.spec;
            }
        }
        base
    }

    /// Spec for the provided enemy kind.
    #[must_use]
    pub fn enemy(&self, kind: EnemyKind) -> &EnemySpec {
        &self.enemies[kind.index()]
    }

    /// All configured waves in play order.
    #[must_use]
    pub fn waves(&self) -> &[WaveSpec] {
        &self.waves
    }

    /// Spec for the wave at the provided index, if one remains.
    #[must_use]
    pub fn wave(&self, index: u32) -> Option<&WaveSpec> {
        self.waves.get(index as usize)
    }

    /// Number of configured waves.
    #[must_use]
    pub fn wave_count(&self) -> u32 {
        self.waves.len() as u32
    }

    /// Mutable access to the wave at the provided index, if one exists.
    #[must_use]
    pub fn wave_mut(&mut self, index: u32) -> Option<&mut WaveSpec> {
        self.waves.get_mut(index as usize)
    }

    /// Looks up a tower spec (base or upgraded tier) by its stable name.
    #[must_use]
    pub fn tower_by_name_mut(&mut self, name: &str) -> Option<&mut TowerSpec> {
        for spec in &mut self.towers {
            if spec.name == name {
                return Some(spec);
            }
            if let Some(path) = &mut spec.upgrade {
                if path.spec.name == name {
                    return Some(&mut path.spec);
                }
            }
        }
        None
    }

    /// Looks up an enemy spec by its stable name.
    #[must_use]
    pub fn enemy_by_name_mut(&mut self, name: &str) -> Option<&mut EnemySpec> {
        self.enemies.iter_mut().find(|spec| spec.name == name)
    }

    /// Iterates every tower spec, upgraded tiers included.
    pub fn tower_specs(&self) -> impl Iterator<Item = &TowerSpec> {
        self.towers.iter().flat_map(|spec| {
            std::iter::once(spec).chain(spec.upgrade.iter().map(|path| path.spec.as_ref()))
        })
    }

    /// Iterates every enemy spec.
    pub fn enemy_specs(&self) -> impl Iterator<Item = &EnemySpec> {
        self.enemies.iter()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let gun = TowerSpec {
            name: "gun".to_owned(),
            cost: 50,
            damage: 10.0,
            range: 5.0,
            fire_rate: 2.0,
            turn_speed: 10.0,
            projectile_speed: None,
            upgrade: Some(UpgradePath {
                cost: 40,
                spec: Box::new(TowerSpec {
                    name: "gun-mk2".to_owned(),
                    cost: 50,
                    damage: 16.0,
                    range: 6.0,
                    fire_rate: 2.5,
                    turn_speed: 10.0,
                    projectile_speed: None,
                    upgrade: None,
                }),
            }),
        };
        let cannon = TowerSpec {
            name: "cannon".to_owned(),
            cost: 80,
            damage: 30.0,
            range: 7.0,
            fire_rate: 0.8,
            turn_speed: 6.0,
            projectile_speed: Some(10.0),
            upgrade: Some(UpgradePath {
                cost: 60,
                spec: Box::new(TowerSpec {
                    name: "cannon-mk2".to_owned(),
                    cost: 80,
                    damage: 48.0,
                    range: 8.0,
                    fire_rate: 1.0,
                    turn_speed: 6.0,
                    projectile_speed: Some(12.0),
                    upgrade: None,
                }),
            }),
        };
        let runner = EnemySpec {
            name: "runner".to_owned(),
            health: 40.0,
            speed: 3.0,
            bounty: 10,
            color: EnemyColor::from_rgb(0xd9, 0x4f, 0x30),
        };
        let tanker = EnemySpec {
            name: "tanker".to_owned(),
            health: 120.0,
            speed: 1.5,
            bounty: 25,
            color: EnemyColor::from_rgb(0x3a, 0x5f, 0xb0),
        };

        let wave = |groups: Vec<SpawnGroup>| WaveSpec {
            groups,
            inter_wave_delay: Duration::from_secs(5),
        };
        let group = |enemy, count, millis| SpawnGroup {
            enemy,
            count,
            interval: Duration::from_millis(millis),
        };
        let waves = vec![
            wave(vec![group(EnemyKind::Runner, 5, 500)]),
            wave(vec![group(EnemyKind::Runner, 8, 450)]),
            wave(vec![
                group(EnemyKind::Runner, 6, 400),
                group(EnemyKind::Tanker, 2, 1_000),
            ]),
            wave(vec![
                group(EnemyKind::Runner, 10, 350),
                group(EnemyKind::Tanker, 4, 900),
            ]),
            wave(vec![
                group(EnemyKind::Tanker, 8, 800),
                group(EnemyKind::Runner, 10, 300),
            ]),
        ];

        Self::new([gun, cannon], [runner, tanker], waves)
    }
}

/// Simulation parameters that stay fixed for the life of a world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Money the player starts each episode with.
    pub starting_money: u32,
    /// Lives the player starts each episode with.
    pub starting_lives: u32,
    /// Countdown before the very first wave begins spawning.
    pub initial_countdown: Duration,
    /// Cadence of the combat resolver's target re-acquisition scan.
    pub retarget_interval: Duration,
    /// Distance at which an enemy is considered to have reached a waypoint.
    pub waypoint_threshold: f32,
    /// Fraction of a tower's original cost refunded when it is sold.
    pub sell_refund_ratio: f32,
    /// Wall-clock budget after which an episode times out.
    pub episode_timeout: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_money: 100,
            starting_lives: 20,
            initial_countdown: Duration::from_secs(2),
            retarget_interval: Duration::from_millis(500),
            waypoint_threshold: 0.4,
            sell_refund_ratio: SELL_REFUND_RATIO,
            episode_timeout: Duration::from_secs(600),
        }
    }
}

/// Static playfield geometry: placement slots and the shared enemy path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Positions of the fixed placement slots, in slot-id order.
    pub slot_positions: Vec<Position>,
    /// Ordered waypoint path every enemy follows from first to last.
    pub waypoints: Vec<Position>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            slot_positions: vec![
                Position::new(4.0, 6.0),
                Position::new(8.0, 6.0),
                Position::new(4.0, 10.0),
                Position::new(8.0, 10.0),
                Position::new(12.0, 5.0),
                Position::new(12.0, 10.0),
                Position::new(16.0, 7.0),
                Position::new(16.0, 13.0),
            ],
            waypoints: vec![
                Position::new(0.0, 8.0),
                Position::new(6.0, 8.0),
                Position::new(6.0, 3.0),
                Position::new(14.0, 3.0),
                Position::new(14.0, 12.0),
                Position::new(20.0, 12.0),
            ],
        }
    }
}

/// Spec category addressed by a balance override.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverrideCategory {
    /// Tower specs, base or upgraded tiers.
    Tower,
    /// Enemy specs.
    Enemy,
    /// Wave schedule parameters.
    Wave,
    /// Economy parameters held by the game config.
    Economy,
}

impl OverrideCategory {
    /// Parses the wire-format category label used by the balance service.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "tower" => Some(Self::Tower),
            "enemy" => Some(Self::Enemy),
            "wave" => Some(Self::Wave),
            "economy" => Some(Self::Economy),
            _ => None,
        }
    }
}

/// A validated spec mutation produced by the balance interface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpecOverride {
    /// Category the target belongs to.
    pub category: OverrideCategory,
    /// Stable name of the spec being adjusted.
    pub target: String,
    /// Property within the spec being adjusted.
    pub property: String,
    /// New value for the property.
    pub value: f32,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests construction of a tower on the provided slot.
    BuildTower {
        /// Slot that should receive the tower.
        slot: SlotId,
        /// Kind of tower to construct.
        kind: TowerKind,
    },
    /// Requests sale of the tower occupying the provided slot.
    SellTower {
        /// Slot whose tower should be sold.
        slot: SlotId,
    },
    /// Requests the single-step upgrade of the tower on the provided slot.
    UpgradeTower {
        /// Slot whose tower should be upgraded.
        slot: SlotId,
    },
    /// Opens the current wave: resets the per-wave runtime counters.
    BeginWave,
    /// Requests that one enemy of the provided kind enter the path.
    SpawnEnemy {
        /// Kind of enemy to spawn.
        kind: EnemyKind,
    },
    /// Records the current wave as complete and advances the wave index.
    CompleteWave,
    /// Assigns or clears a tower's locked target.
    SetTowerTarget {
        /// Tower whose target changes.
        tower: TowerId,
        /// Enemy to lock, or `None` to clear the lock.
        target: Option<EnemyId>,
    },
    /// Requests that a ready tower fire at the provided enemy.
    FireProjectile {
        /// Tower that fires.
        tower: TowerId,
        /// Enemy the shot is aimed at.
        target: EnemyId,
    },
    /// Applies a validated balance override to the spec catalog.
    OverrideSpec {
        /// The mutation to apply.
        change: SpecOverride,
    },
    /// Restores the world to its episode-start state.
    Reset,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports the ledger's money balance after a mutation.
    MoneyChanged {
        /// Balance after the mutation.
        money: u32,
    },
    /// Reports the ledger's remaining lives after a mutation.
    LivesChanged {
        /// Lives after the mutation.
        lives: u32,
    },
    /// Confirms that a tower was constructed.
    TowerBuilt {
        /// Identifier allocated to the tower.
        tower: TowerId,
        /// Slot the tower occupies.
        slot: SlotId,
        /// Kind of tower constructed.
        kind: TowerKind,
        /// Money debited for the construction.
        cost: u32,
    },
    /// Reports that a build request was rejected.
    BuildRejected {
        /// Slot provided in the request.
        slot: SlotId,
        /// Kind provided in the request.
        kind: TowerKind,
        /// Specific reason the build failed.
        reason: BuildError,
    },
    /// Confirms that a tower was sold.
    TowerSold {
        /// Identifier of the sold tower.
        tower: TowerId,
        /// Slot the tower vacated.
        slot: SlotId,
        /// Kind of the sold tower.
        kind: TowerKind,
        /// Money credited by the sale.
        refund: u32,
    },
    /// Reports that a sell request was rejected.
    SellRejected {
        /// Slot provided in the request.
        slot: SlotId,
        /// Specific reason the sale failed.
        reason: SellError,
    },
    /// Confirms that a tower was upgraded to its improved tier.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Slot the tower occupies.
        slot: SlotId,
        /// Kind of the upgraded tower.
        kind: TowerKind,
        /// Money debited for the upgrade.
        cost: u32,
    },
    /// Reports that an upgrade request was rejected.
    UpgradeRejected {
        /// Slot provided in the request.
        slot: SlotId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier allocated to the enemy.
        enemy: EnemyId,
        /// Kind of enemy spawned.
        kind: EnemyKind,
    },
    /// Confirms that an enemy died to tower fire.
    EnemyKilled {
        /// Identifier of the dead enemy.
        enemy: EnemyId,
        /// Kind of the dead enemy.
        kind: EnemyKind,
        /// Money paid for the kill.
        bounty: u32,
    },
    /// Confirms that an enemy reached the path end and cost a life.
    EnemyLeaked {
        /// Identifier of the leaked enemy.
        enemy: EnemyId,
        /// Kind of the leaked enemy.
        kind: EnemyKind,
    },
    /// Announces that a wave opened and its runtime counters reset.
    WaveStarted {
        /// Index of the wave that started.
        wave: WaveId,
    },
    /// Records a wave's final tally as it completes.
    WaveCompleted {
        /// Index of the completed wave.
        wave: WaveId,
        /// Enemies killed during the wave.
        kills: u32,
        /// Enemies that leaked during the wave.
        leaks: u32,
        /// Total enemies the wave spawned.
        total: u32,
    },
    /// Announces victory; emitted at most once per episode.
    GameWon,
    /// Announces defeat; emitted at most once per episode.
    GameOver,
    /// Confirms that a balance override mutated the catalog.
    SpecOverridden {
        /// The mutation that was applied.
        change: SpecOverride,
    },
    /// Reports that a balance override was rejected individually.
    OverrideRejected {
        /// The mutation that was refused.
        change: SpecOverride,
        /// Specific reason the override failed.
        reason: OverrideError,
    },
    /// Announces that the world returned to its episode-start state.
    WorldReset,
}

/// Reasons a build request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum BuildError {
    /// No slot with the provided identifier exists.
    #[error("no slot with the requested identifier exists")]
    UnknownSlot,
    /// The slot already hosts a tower.
    #[error("the slot already hosts a tower")]
    Occupied,
    /// The ledger balance does not cover the tower's cost.
    #[error("insufficient funds for the requested tower")]
    InsufficientFunds,
}

/// Reasons a sell request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum SellError {
    /// No slot with the provided identifier exists.
    #[error("no slot with the requested identifier exists")]
    UnknownSlot,
    /// The slot hosts no tower to sell.
    #[error("the slot hosts no tower")]
    Empty,
}

/// Reasons an upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum UpgradeError {
    /// No slot with the provided identifier exists.
    #[error("no slot with the requested identifier exists")]
    UnknownSlot,
    /// The slot hosts no tower to upgrade.
    #[error("the slot hosts no tower")]
    Empty,
    /// The tower already sits at its maximum tier.
    #[error("the tower is already upgraded")]
    AlreadyUpgraded,
    /// The tower's spec configures no upgrade path.
    #[error("the tower spec has no upgrade path")]
    NoUpgradePath,
    /// The ledger balance does not cover the upgrade cost.
    #[error("insufficient funds for the upgrade")]
    InsufficientFunds,
}

/// Reasons a balance override may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum OverrideError {
    /// No spec with the provided name exists in the category.
    #[error("no spec with the requested name exists")]
    UnknownTarget,
    /// The spec has no property with the provided name.
    #[error("the spec has no such property")]
    UnknownProperty,
    /// The suggested value is NaN or infinite.
    #[error("the suggested value is not finite")]
    NotFinite,
    /// The suggested value lies outside the property's legal range.
    #[error("the suggested value is out of range")]
    OutOfRange,
}

/// Immutable representation of the economy ledger used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedgerSnapshot {
    /// Current money balance; never negative by construction.
    pub money: u32,
    /// Remaining lives.
    pub lives: u32,
    /// Lives the episode started with.
    pub starting_lives: u32,
    /// Zero-based index of the wave currently in play or pending.
    pub wave_index: u32,
    /// Set once when lives reach zero.
    pub game_over: bool,
    /// Set once when the final wave completes.
    pub game_won: bool,
}

impl LedgerSnapshot {
    /// Reports whether the episode reached a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.game_over || self.game_won
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Slot the tower occupies.
    pub slot: SlotId,
    /// Kind of tower constructed.
    pub kind: TowerKind,
    /// Upgrade tier: 0 for base, 1 for upgraded.
    pub level: u8,
    /// Position of the tower on the playfield.
    pub position: Position,
    /// Targeting radius resolved from the tower's effective spec.
    pub range: f32,
    /// Damage per shot resolved from the tower's effective spec.
    pub damage: f32,
    /// Remaining time before the tower may fire again.
    pub cooldown: Duration,
    /// Enemy the tower currently tracks, if any.
    pub target: Option<EnemyId>,
}

impl TowerSnapshot {
    /// Reports whether the fire cooldown has fully elapsed.
    #[must_use]
    pub const fn ready_to_fire(&self) -> bool {
        self.cooldown.is_zero()
    }
}

/// Read-only snapshot describing all live towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of live towers captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no towers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier allocated to the enemy by the world.
    pub id: EnemyId,
    /// Kind of the enemy.
    pub kind: EnemyKind,
    /// Visual tag captured from the enemy's spec at spawn.
    pub color: EnemyColor,
    /// Position of the enemy on the playfield.
    pub position: Position,
    /// Remaining health.
    pub health: f32,
    /// Health the enemy spawned with.
    pub max_health: f32,
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of live enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Returns the snapshot for the provided enemy handle, if it is alive.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a placement slot used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotSnapshot {
    /// Identifier of the slot.
    pub id: SlotId,
    /// Position of the slot on the playfield.
    pub position: Position,
    /// Tower occupying the slot, if any.
    pub occupant: Option<TowerId>,
}

/// Read-only snapshot describing every placement slot.
#[derive(Clone, Debug, Default)]
pub struct SlotView {
    snapshots: Vec<SlotSnapshot>,
}

impl SlotView {
    /// Creates a new slot view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<SlotSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured slot snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &SlotSnapshot> {
        self.snapshots.iter()
    }

    /// Number of slots captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Returns the snapshot for the provided slot, if it exists.
    #[must_use]
    pub fn get(&self, id: SlotId) -> Option<&SlotSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<SlotSnapshot> {
        self.snapshots
    }
}

/// Per-wave runtime counters captured at query time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WaveProgressSnapshot {
    /// Enemies spawned into the wave so far.
    pub total: u32,
    /// Enemies currently alive.
    pub alive: u32,
    /// Enemies killed during the wave.
    pub kills: u32,
    /// Enemies that leaked during the wave.
    pub leaks: u32,
}
