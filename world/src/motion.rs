//! Per-tick integration: cooldowns, turret rotation, enemy path
//! traversal, and projectile homing.

use std::f32::consts::{PI, TAU};
use std::time::Duration;

use glam::Vec2;
use tower_defence_core::{EnemyId, Event, Position};

use crate::World;

pub(crate) fn advance(world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
    let dt_secs = dt.as_secs_f32();
    cool_towers(world, dt);
    rotate_towers(world, dt_secs);
    advance_enemies(world, dt_secs, out_events);
    advance_projectiles(world, dt_secs, out_events);
}

fn cool_towers(world: &mut World, dt: Duration) {
    for tower in world.towers.values_mut() {
        tower.cooldown = tower.cooldown.saturating_sub(dt);
    }
}

fn rotate_towers(world: &mut World, dt_secs: f32) {
    let World {
        towers,
        enemies,
        catalog,
        ..
    } = world;
    for tower in towers.values_mut() {
        let Some(target) = tower.target else {
            continue;
        };
        let Some(enemy) = enemies.get(target) else {
            continue;
        };
        let delta = to_vec(enemy.position) - to_vec(tower.position);
        if delta.length_squared() <= f32::EPSILON {
            continue;
        }
        let desired = delta.y.atan2(delta.x);
        let turn_speed = catalog.tower_effective(tower.kind, tower.level).turn_speed;
        let factor = (dt_secs * turn_speed).min(1.0);
        tower.facing = rotate_toward(tower.facing, desired, factor);
    }
}

fn advance_enemies(world: &mut World, dt_secs: f32, out_events: &mut Vec<Event>) {
    let mut leaked: Vec<EnemyId> = Vec::new();
    {
        let World {
            enemies,
            waypoints,
            config,
            ..
        } = world;
        for (id, enemy) in enemies.iter_mut() {
            let mut travel = enemy.speed * dt_secs;
            loop {
                let Some(waypoint) = waypoints.get(enemy.waypoint_index).copied() else {
                    leaked.push(id);
                    break;
                };
                let position = to_vec(enemy.position);
                let target = to_vec(waypoint);
                let distance = position.distance(target);
                if distance <= config.waypoint_threshold {
                    enemy.waypoint_index += 1;
                    continue;
                }
                if travel >= distance {
                    enemy.position = waypoint;
                    travel -= distance;
                    enemy.waypoint_index += 1;
                    continue;
                }
                let next = position + (target - position) / distance * travel;
                enemy.position = Position::new(next.x, next.y);
                break;
            }
        }
    }
    for id in leaked {
        let Some(enemy) = world.enemies.remove(id) else {
            continue;
        };
        world.wave_runtime.alive = world.wave_runtime.alive.saturating_sub(1);
        world.wave_runtime.leaks = world.wave_runtime.leaks.saturating_add(1);
        out_events.push(Event::EnemyLeaked {
            enemy: id,
            kind: enemy.kind,
        });
        // Every leaked enemy despawns, even past the loss; only the life
        // loss stops once the episode is decided.
        if !world.ledger.is_terminal() {
            world.ledger.lose_life(out_events);
        }
    }
}

fn advance_projectiles(world: &mut World, dt_secs: f32, out_events: &mut Vec<Event>) {
    let mut hits: Vec<(EnemyId, f32)> = Vec::new();
    for id in world.projectiles.keys() {
        let Some(target) = world.projectiles.get(id).map(|projectile| projectile.target) else {
            continue;
        };
        let Some(target_position) = world.enemies.get(target).map(|enemy| enemy.position) else {
            // Target already resolved; the shot fizzles without damage.
            let _ = world.projectiles.remove(id);
            continue;
        };
        let Some(projectile) = world.projectiles.get_mut(id) else {
            continue;
        };
        let position = to_vec(projectile.position);
        let destination = to_vec(target_position);
        let distance = position.distance(destination);
        let step = projectile.speed * dt_secs;
        if step >= distance {
            let damage = projectile.damage;
            let _ = world.projectiles.remove(id);
            hits.push((target, damage));
        } else {
            let next = position + (destination - position) / distance * step;
            projectile.position = Position::new(next.x, next.y);
        }
    }
    for (target, damage) in hits {
        crate::damage_enemy(world, target, damage, out_events);
    }
}

fn rotate_toward(current: f32, desired: f32, factor: f32) -> f32 {
    let mut delta = desired - current;
    while delta > PI {
        delta -= TAU;
    }
    while delta < -PI {
        delta += TAU;
    }
    current + delta * factor
}

fn to_vec(position: Position) -> Vec2 {
    Vec2::new(position.x(), position.y())
}

#[cfg(test)]
mod tests {
    use super::rotate_toward;
    use std::f32::consts::PI;

    #[test]
    fn rotation_takes_the_short_way_around() {
        let turned = rotate_toward(0.9 * PI, -0.9 * PI, 0.5);
        assert!(turned > 0.9 * PI, "must cross the pi seam, not unwind");
    }

    #[test]
    fn rotation_converges_with_full_factor() {
        let turned = rotate_toward(0.0, 1.0, 1.0);
        assert!((turned - 1.0).abs() < f32::EPSILON);
    }
}
