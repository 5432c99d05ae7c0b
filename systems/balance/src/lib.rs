#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! External balance-analysis interface.
//!
//! The simulation exports a [`BalanceSnapshot`] of current spec values and
//! recent session outcomes, and accepts batches of [`BalanceAdjustment`]
//! suggestions back. This crate only serializes, parses, and validates;
//! transport is the caller's business, and a bad suggestion never aborts a
//! batch.

use serde::{Deserialize, Serialize};
use tower_defence_core::{Catalog, Command, GameConfig, OverrideCategory, SpecOverride};
use tower_defence_system_analytics::SessionSummary;

/// Confidence below which suggestions are discarded by default.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// One addressable spec value, flattened to strings the way overrides
/// address it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpecEntry {
    /// Override category the value belongs to.
    pub category: String,
    /// Entry name within the category.
    pub name: String,
    /// Property name within the entry.
    pub property: String,
    /// Current value.
    pub value: f32,
}

/// Point-in-time export of spec values and recent session history.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BalanceSnapshot {
    /// Every overridable spec value.
    pub entries: Vec<SpecEntry>,
    /// Recent finished sessions, oldest first.
    pub sessions: Vec<SessionSummary>,
}

impl BalanceSnapshot {
    /// Captures the current catalog and config alongside session history.
    #[must_use]
    pub fn capture<'a>(
        catalog: &Catalog,
        config: &GameConfig,
        sessions: impl Iterator<Item = &'a SessionSummary>,
    ) -> Self {
        let mut entries = Vec::new();
        for spec in catalog.tower_specs() {
            let name = spec.name.as_str();
            push_entry(&mut entries, "tower", name, "cost", spec.cost as f32);
            push_entry(&mut entries, "tower", name, "damage", spec.damage);
            push_entry(&mut entries, "tower", name, "range", spec.range);
            push_entry(&mut entries, "tower", name, "fire_rate", spec.fire_rate);
            push_entry(&mut entries, "tower", name, "turn_speed", spec.turn_speed);
            if let Some(speed) = spec.projectile_speed {
                push_entry(&mut entries, "tower", name, "projectile_speed", speed);
            }
        }
        for spec in catalog.enemy_specs() {
            let name = spec.name.as_str();
            push_entry(&mut entries, "enemy", name, "health", spec.health);
            push_entry(&mut entries, "enemy", name, "speed", spec.speed);
            push_entry(&mut entries, "enemy", name, "bounty", spec.bounty as f32);
        }
        for (index, wave) in catalog.waves().iter().enumerate() {
            push_entry(
                &mut entries,
                "wave",
                &index.to_string(),
                "inter_wave_delay",
                wave.inter_wave_delay.as_secs_f32(),
            );
        }
        push_entry(
            &mut entries,
            "economy",
            "config",
            "starting_money",
            config.starting_money as f32,
        );
        push_entry(
            &mut entries,
            "economy",
            "config",
            "starting_lives",
            config.starting_lives as f32,
        );
        push_entry(
            &mut entries,
            "economy",
            "config",
            "sell_refund_ratio",
            config.sell_refund_ratio,
        );

        Self {
            entries,
            sessions: sessions.cloned().collect(),
        }
    }
}

fn push_entry(entries: &mut Vec<SpecEntry>, category: &str, name: &str, property: &str, value: f32) {
    entries.push(SpecEntry {
        category: category.to_owned(),
        name: name.to_owned(),
        property: property.to_owned(),
        value,
    });
}

/// One suggested spec change from the external analysis side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BalanceAdjustment {
    /// Category string (`tower`, `enemy`, `wave`, or `economy`).
    pub category: String,
    /// Entry name within the category.
    pub target_name: String,
    /// Property name within the entry.
    pub property_name: String,
    /// Suggested new value.
    pub suggested_value: f32,
    /// Analysis confidence in `[0, 1]`.
    pub confidence: f32,
}

/// Parses a JSON batch of adjustments.
pub fn parse_adjustments(json: &str) -> Result<Vec<BalanceAdjustment>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Turns a batch of suggestions into override commands.
///
/// Suggestions below the confidence threshold, with an unknown category, or
/// with a non-finite value are skipped individually and logged. Name and
/// property validation is the world's business; it answers each override
/// with a `SpecOverridden` or `OverrideRejected` event.
pub fn apply_adjustments(
    batch: &[BalanceAdjustment],
    threshold: f32,
    out_commands: &mut Vec<Command>,
) {
    for adjustment in batch {
        if !adjustment.confidence.is_finite() || adjustment.confidence < threshold {
            tracing::debug!(
                category = %adjustment.category,
                target = %adjustment.target_name,
                property = %adjustment.property_name,
                confidence = adjustment.confidence,
                "skipping low-confidence adjustment"
            );
            continue;
        }
        let Some(category) = OverrideCategory::parse(&adjustment.category) else {
            tracing::warn!(
                category = %adjustment.category,
                "skipping adjustment with unknown category"
            );
            continue;
        };
        if !adjustment.suggested_value.is_finite() {
            tracing::warn!(
                target = %adjustment.target_name,
                property = %adjustment.property_name,
                "skipping adjustment with non-finite value"
            );
            continue;
        }
        out_commands.push(Command::OverrideSpec {
            change: SpecOverride {
                category,
                target: adjustment.target_name.clone(),
                property: adjustment.property_name.clone(),
                value: adjustment.suggested_value,
            },
        });
    }
}
