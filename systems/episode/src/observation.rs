//! Fixed-width observation vector handed to the learning side.

use tower_defence_core::{
    Catalog, EnemySnapshot, EnemyView, LedgerSnapshot, Position, SlotId, SlotView, TowerKind,
    TowerView,
};

/// Divisor normalizing money amounts.
pub const MONEY_DIVISOR: f32 = 1_000.0;
/// Divisor normalizing playfield coordinates.
pub const POSITION_DIVISOR: f32 = 20.0;
/// Divisor normalizing per-shot damage values.
pub const DAMAGE_DIVISOR: f32 = 100.0;
/// Divisor normalizing targeting ranges.
pub const RANGE_DIVISOR: f32 = 20.0;
/// Number of enemy slots in the observation; the nearest enemies to the path
/// end fill them, the rest are zero-padded.
pub const MAX_VISIBLE_ENEMIES: usize = 10;

/// Encodes world snapshots into a fixed-width `Vec<f32>`.
///
/// The layout, in order: four ledger values (money, life fraction, wave
/// progress, terminal flag), three spec values per tower kind (cost, damage,
/// range), three values per slot (occupancy, level, affordability), the
/// alive-enemy load, then position and health for the
/// [`MAX_VISIBLE_ENEMIES`] enemies closest to the path end. The width is a
/// pure function of the kind and slot counts.
#[derive(Clone, Copy, Debug)]
pub struct ObservationEncoder {
    slots: usize,
}

impl ObservationEncoder {
    /// Creates an encoder for a playfield with `slots` placement slots.
    #[must_use]
    pub const fn new(slots: usize) -> Self {
        Self { slots }
    }

    /// Width of every vector produced by [`ObservationEncoder::encode`].
    #[must_use]
    pub const fn width(&self) -> usize {
        4 + 3 * TowerKind::COUNT + 3 * self.slots + 1 + 3 * MAX_VISIBLE_ENEMIES
    }

    /// Encodes the provided snapshots.
    #[must_use]
    pub fn encode(
        &self,
        ledger: &LedgerSnapshot,
        catalog: &Catalog,
        slots: &SlotView,
        towers: &TowerView,
        enemies: &EnemyView,
        path_end: Position,
    ) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.width());

        out.push(ledger.money as f32 / MONEY_DIVISOR);
        out.push(if ledger.starting_lives > 0 {
            ledger.lives as f32 / ledger.starting_lives as f32
        } else {
            0.0
        });
        let wave_count = catalog.wave_count();
        out.push(if wave_count > 0 {
            ledger.wave_index as f32 / wave_count as f32
        } else {
            0.0
        });
        out.push(if ledger.is_terminal() { 1.0 } else { 0.0 });

        for kind in TowerKind::ALL {
            let spec = catalog.tower(kind);
            out.push(spec.cost as f32 / MONEY_DIVISOR);
            out.push(spec.damage / DAMAGE_DIVISOR);
            out.push(spec.range / RANGE_DIVISOR);
        }

        let cheapest = TowerKind::ALL
            .iter()
            .map(|kind| catalog.tower(*kind).cost)
            .min()
            .unwrap_or(0);
        for index in 0..self.slots {
            let occupant = slots
                .get(SlotId::new(index as u32))
                .and_then(|slot| slot.occupant)
                .and_then(|id| towers.iter().find(|tower| tower.id == id));
            match occupant {
                Some(tower) => {
                    out.push(1.0);
                    out.push(f32::from(tower.level));
                    let upgradable = tower.level == 0
                        && catalog
                            .tower(tower.kind)
                            .upgrade
                            .as_ref()
                            .is_some_and(|path| ledger.money >= path.cost);
                    out.push(if upgradable { 1.0 } else { 0.0 });
                }
                None => {
                    out.push(0.0);
                    out.push(0.0);
                    out.push(if ledger.money >= cheapest { 1.0 } else { 0.0 });
                }
            }
        }

        out.push(enemies.len() as f32 / MAX_VISIBLE_ENEMIES as f32);

        let mut visible: Vec<&EnemySnapshot> = enemies.iter().collect();
        visible.sort_by(|a, b| {
            let da = a.position.distance_to(path_end);
            let db = b.position.distance_to(path_end);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });
        for slot in 0..MAX_VISIBLE_ENEMIES {
            match visible.get(slot) {
                Some(enemy) => {
                    out.push(enemy.position.x() / POSITION_DIVISOR);
                    out.push(enemy.position.y() / POSITION_DIVISOR);
                    out.push(if enemy.max_health > 0.0 {
                        enemy.health / enemy.max_health
                    } else {
                        0.0
                    });
                }
                None => {
                    out.push(0.0);
                    out.push(0.0);
                    out.push(0.0);
                }
            }
        }

        out
    }
}
