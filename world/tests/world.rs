use std::time::Duration;

use tower_defence_core::{
    BuildError, Command, EnemyId, EnemyKind, Event, GameConfig, OverrideCategory, OverrideError,
    SlotId, SpecOverride, TowerKind, UpgradeError,
};
use tower_defence_world::{apply, query, World};

fn run(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        apply(world, command, &mut events);
    }
    events
}

fn spawned_ids(events: &[Event]) -> Vec<EnemyId> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .collect()
}

fn tick(seconds: f32) -> Command {
    Command::Tick {
        dt: Duration::from_secs_f32(seconds),
    }
}

#[test]
fn build_occupied_sell_scenario_matches_expected_balances() {
    let mut world = World::default();
    let slot = SlotId::new(0);

    let events = run(
        &mut world,
        vec![Command::BuildTower {
            slot,
            kind: TowerKind::Gun,
        }],
    );
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::TowerBuilt { .. })));
    assert_eq!(query::ledger(&world).money, 50);

    let events = run(
        &mut world,
        vec![Command::BuildTower {
            slot,
            kind: TowerKind::Gun,
        }],
    );
    assert!(events.iter().any(|event| matches!(
        event,
        Event::BuildRejected {
            reason: BuildError::Occupied,
            ..
        }
    )));
    assert_eq!(query::ledger(&world).money, 50);

    let events = run(&mut world, vec![Command::SellTower { slot }]);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::TowerSold { refund: 37, .. })));
    assert_eq!(query::ledger(&world).money, 87);
    assert!(query::slot_view(&world)
        .get(slot)
        .is_some_and(|snapshot| snapshot.occupant.is_none()));
}

#[test]
fn build_fails_closed_when_funds_are_short() {
    let mut world = World::default();
    let events = run(
        &mut world,
        vec![
            Command::BuildTower {
                slot: SlotId::new(0),
                kind: TowerKind::Cannon,
            },
            Command::BuildTower {
                slot: SlotId::new(1),
                kind: TowerKind::Gun,
            },
        ],
    );
    assert!(events.iter().any(|event| matches!(
        event,
        Event::BuildRejected {
            reason: BuildError::InsufficientFunds,
            ..
        }
    )));
    assert_eq!(query::ledger(&world).money, 20);
    assert_eq!(query::tower_view(&world).len(), 1);
}

#[test]
fn upgrade_is_single_tier_and_sell_refunds_base_cost() {
    let mut world = World::default();
    let slot = SlotId::new(2);

    let events = run(
        &mut world,
        vec![
            Command::BuildTower {
                slot,
                kind: TowerKind::Gun,
            },
            Command::UpgradeTower { slot },
            Command::UpgradeTower { slot },
        ],
    );
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::TowerUpgraded { cost: 40, .. })));
    assert!(events.iter().any(|event| matches!(
        event,
        Event::UpgradeRejected {
            reason: UpgradeError::AlreadyUpgraded,
            ..
        }
    )));
    assert_eq!(query::ledger(&world).money, 10);

    let events = run(&mut world, vec![Command::SellTower { slot }]);
    assert!(
        events
            .iter()
            .any(|event| matches!(event, Event::TowerSold { refund: 37, .. })),
        "refund must derive from the base cost, not the upgraded spec",
    );
    assert_eq!(query::ledger(&world).money, 47);
}

#[test]
fn two_hits_resolve_death_exactly_once() {
    let mut world = World::default();
    let slot = SlotId::new(0);
    let events = run(
        &mut world,
        vec![
            Command::OverrideSpec {
                change: SpecOverride {
                    category: OverrideCategory::Enemy,
                    target: "runner".to_owned(),
                    property: "health".to_owned(),
                    value: 100.0,
                },
            },
            Command::OverrideSpec {
                change: SpecOverride {
                    category: OverrideCategory::Tower,
                    target: "gun".to_owned(),
                    property: "damage".to_owned(),
                    value: 60.0,
                },
            },
            Command::BuildTower {
                slot,
                kind: TowerKind::Gun,
            },
            Command::BeginWave,
            Command::SpawnEnemy {
                kind: EnemyKind::Runner,
            },
        ],
    );
    let enemy = spawned_ids(&events)[0];
    let tower = events
        .iter()
        .find_map(|event| match event {
            Event::TowerBuilt { tower, .. } => Some(*tower),
            _ => None,
        })
        .expect("tower built");

    let events = run(
        &mut world,
        vec![
            Command::FireProjectile {
                tower,
                target: enemy,
            },
            tick(0.6),
            Command::FireProjectile {
                tower,
                target: enemy,
            },
            tick(0.6),
            Command::FireProjectile {
                tower,
                target: enemy,
            },
        ],
    );
    let kills = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyKilled { .. }))
        .count();
    assert_eq!(kills, 1, "death path must run exactly once");
    let bounties: u32 = events
        .iter()
        .filter_map(|event| match event {
            Event::EnemyKilled { bounty, .. } => Some(*bounty),
            _ => None,
        })
        .sum();
    assert_eq!(bounties, 10);
    assert!(query::enemy_view(&world).is_empty());
}

#[test]
fn wave_counters_reconcile_kills_and_leaks() {
    let mut world = World::default();
    let slot = SlotId::new(0);
    let mut setup = vec![
        Command::OverrideSpec {
            change: SpecOverride {
                category: OverrideCategory::Tower,
                target: "gun".to_owned(),
                property: "damage".to_owned(),
                value: 1000.0,
            },
        },
        Command::BuildTower {
            slot,
            kind: TowerKind::Gun,
        },
        Command::BeginWave,
    ];
    setup.extend((0..5).map(|_| Command::SpawnEnemy {
        kind: EnemyKind::Runner,
    }));
    let events = run(&mut world, setup);
    let enemies = spawned_ids(&events);
    assert_eq!(enemies.len(), 5);
    let tower = events
        .iter()
        .find_map(|event| match event {
            Event::TowerBuilt { tower, .. } => Some(*tower),
            _ => None,
        })
        .expect("tower built");

    let events = run(
        &mut world,
        vec![
            Command::FireProjectile {
                tower,
                target: enemies[0],
            },
            tick(0.6),
            Command::FireProjectile {
                tower,
                target: enemies[1],
            },
            tick(0.6),
            Command::FireProjectile {
                tower,
                target: enemies[2],
            },
            tick(30.0),
            Command::CompleteWave,
        ],
    );
    let leaks = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyLeaked { .. }))
        .count();
    assert_eq!(leaks, 2);
    assert_eq!(query::ledger(&world).lives, 18);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::WaveCompleted {
            kills: 3,
            leaks: 2,
            total: 5,
            ..
        }
    )));
    assert_eq!(query::ledger(&world).wave_index, 1);
}

#[test]
fn leaks_exhaust_lives_and_game_over_fires_once() {
    let config = GameConfig {
        starting_lives: 1,
        ..GameConfig::default()
    };
    let mut world = World::new(config, Default::default(), Default::default());
    let events = run(
        &mut world,
        vec![
            Command::BeginWave,
            Command::SpawnEnemy {
                kind: EnemyKind::Runner,
            },
            tick(30.0),
            tick(30.0),
        ],
    );
    let game_overs = events
        .iter()
        .filter(|event| matches!(event, Event::GameOver))
        .count();
    assert_eq!(game_overs, 1);
    assert!(query::ledger(&world).game_over);

    // Spawns are ignored once the episode is terminal.
    let events = run(
        &mut world,
        vec![Command::SpawnEnemy {
            kind: EnemyKind::Runner,
        }],
    );
    assert!(events.is_empty());
}

#[test]
fn leaks_beyond_the_last_life_despawn_without_losing_more() {
    let config = GameConfig {
        starting_lives: 1,
        ..GameConfig::default()
    };
    let mut world = World::new(config, Default::default(), Default::default());
    let events = run(
        &mut world,
        vec![
            Command::BeginWave,
            Command::SpawnEnemy {
                kind: EnemyKind::Runner,
            },
            Command::SpawnEnemy {
                kind: EnemyKind::Runner,
            },
            // Both enemies cross the whole path within the one tick.
            tick(30.0),
        ],
    );
    let leaks = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyLeaked { .. }))
        .count();
    assert_eq!(leaks, 2, "both enemies leak even though one loss suffices");
    let lives_changes = events
        .iter()
        .filter(|event| matches!(event, Event::LivesChanged { .. }))
        .count();
    assert_eq!(lives_changes, 1, "the decided loss absorbs the second leak");
    let game_overs = events
        .iter()
        .filter(|event| matches!(event, Event::GameOver))
        .count();
    assert_eq!(game_overs, 1);
    assert!(
        query::enemy_view(&world).is_empty(),
        "no enemy lingers past the end of the path",
    );
    assert_eq!(query::wave_progress(&world).alive, 0);
    assert_eq!(query::wave_progress(&world).leaks, 2);
}

#[test]
fn projectile_fizzles_when_target_resolves_first() {
    let mut world = World::default();
    let events = run(
        &mut world,
        vec![
            Command::BuildTower {
                slot: SlotId::new(0),
                kind: TowerKind::Cannon,
            },
            Command::BeginWave,
            Command::SpawnEnemy {
                kind: EnemyKind::Runner,
            },
        ],
    );
    let enemy = spawned_ids(&events)[0];
    let tower = events
        .iter()
        .find_map(|event| match event {
            Event::TowerBuilt { tower, .. } => Some(*tower),
            _ => None,
        })
        .expect("tower built");

    // The enemy leaks within the same large tick; the in-flight projectile
    // must despawn without applying damage.
    let events = run(
        &mut world,
        vec![
            Command::FireProjectile {
                tower,
                target: enemy,
            },
            tick(30.0),
            tick(1.0),
        ],
    );
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemyLeaked { .. })));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::EnemyKilled { .. })));
}

#[test]
fn reset_restores_episode_start_state() {
    let mut world = World::default();
    let slot = SlotId::new(1);
    let _ = run(
        &mut world,
        vec![
            Command::BuildTower {
                slot,
                kind: TowerKind::Gun,
            },
            Command::BeginWave,
            Command::SpawnEnemy {
                kind: EnemyKind::Runner,
            },
            Command::SpawnEnemy {
                kind: EnemyKind::Tanker,
            },
            tick(1.0),
        ],
    );
    let events = run(&mut world, vec![Command::Reset]);
    assert_eq!(
        events,
        vec![
            Event::WorldReset,
            Event::MoneyChanged { money: 100 },
            Event::LivesChanged { lives: 20 },
        ],
    );
    assert!(query::enemy_view(&world).is_empty());
    assert!(query::tower_view(&world).is_empty());
    assert_eq!(query::wave_progress(&world).total, 0);
    let ledger = query::ledger(&world);
    assert_eq!(ledger.wave_index, 0);
    assert!(!ledger.is_terminal());
    assert!(query::slot_view(&world)
        .iter()
        .all(|snapshot| snapshot.occupant.is_none()));
}

#[test]
fn completing_the_final_wave_declares_the_win_once() {
    let mut world = World::default();
    let waves = query::catalog(&world).wave_count();
    let mut commands = Vec::new();
    for _ in 0..waves {
        commands.push(Command::BeginWave);
        commands.push(Command::CompleteWave);
    }
    commands.push(Command::BeginWave);
    let events = run(&mut world, commands);
    let wins = events
        .iter()
        .filter(|event| matches!(event, Event::GameWon))
        .count();
    assert_eq!(wins, 1);
    assert!(query::ledger(&world).game_won);
    assert!(!query::ledger(&world).game_over);
}

#[test]
fn overrides_are_validated_individually() {
    let mut world = World::default();
    let change = |target: &str, property: &str, value: f32| Command::OverrideSpec {
        change: SpecOverride {
            category: OverrideCategory::Tower,
            target: target.to_owned(),
            property: property.to_owned(),
            value,
        },
    };
    let events = run(
        &mut world,
        vec![
            change("gun", "damage", -5.0),
            change("gun", "damage", f32::NAN),
            change("howitzer", "damage", 12.0),
            change("gun", "blast_radius", 12.0),
            change("gun", "damage", 12.5),
        ],
    );
    let reasons: Vec<OverrideError> = events
        .iter()
        .filter_map(|event| match event {
            Event::OverrideRejected { reason, .. } => Some(*reason),
            _ => None,
        })
        .collect();
    assert_eq!(
        reasons,
        vec![
            OverrideError::OutOfRange,
            OverrideError::NotFinite,
            OverrideError::UnknownTarget,
            OverrideError::UnknownProperty,
        ],
    );
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::SpecOverridden { .. })));
    assert_eq!(query::catalog(&world).tower(TowerKind::Gun).damage, 12.5);
}

#[test]
fn identical_command_logs_produce_identical_event_logs() {
    let script = || {
        vec![
            Command::BuildTower {
                slot: SlotId::new(0),
                kind: TowerKind::Gun,
            },
            Command::BeginWave,
            Command::SpawnEnemy {
                kind: EnemyKind::Runner,
            },
            Command::SpawnEnemy {
                kind: EnemyKind::Tanker,
            },
            tick(0.25),
            tick(0.25),
            tick(5.0),
        ]
    };
    let mut first = World::default();
    let mut second = World::default();
    assert_eq!(run(&mut first, script()), run(&mut second, script()));
}
