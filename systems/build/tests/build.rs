use tower_defence_core::{
    Command, Event, Position, SlotId, SlotSnapshot, SlotView, TowerId, TowerKind,
};
use tower_defence_system_build::BuildController;

fn slots_with_occupancy(occupants: &[Option<TowerId>]) -> SlotView {
    SlotView::from_snapshots(
        occupants
            .iter()
            .enumerate()
            .map(|(index, occupant)| SlotSnapshot {
                id: SlotId::new(index as u32),
                position: Position::new(index as f32, 0.0),
                occupant: *occupant,
            })
            .collect(),
    )
}

#[test]
fn pending_kind_plus_empty_slot_requests_a_build() {
    let mut controller = BuildController::new();
    let slots = slots_with_occupancy(&[None]);
    let mut commands = Vec::new();

    controller.select_tower_kind(TowerKind::Gun);
    controller.select_slot(SlotId::new(0), &slots, &mut commands);

    assert_eq!(
        commands,
        vec![Command::BuildTower {
            slot: SlotId::new(0),
            kind: TowerKind::Gun,
        }],
    );
    assert_eq!(
        controller.pending_kind(),
        Some(TowerKind::Gun),
        "kind stays pending so the player can place several towers",
    );
}

#[test]
fn empty_slot_without_pending_kind_emits_nothing() {
    let mut controller = BuildController::new();
    let slots = slots_with_occupancy(&[None]);
    let mut commands = Vec::new();

    controller.select_slot(SlotId::new(0), &slots, &mut commands);

    assert!(commands.is_empty());
    assert_eq!(controller.selected_slot(), None);
}

#[test]
fn occupied_slot_selection_toggles() {
    let mut controller = BuildController::new();
    let slots = slots_with_occupancy(&[Some(TowerId::new(3))]);
    let mut commands = Vec::new();
    let slot = SlotId::new(0);

    controller.select_slot(slot, &slots, &mut commands);
    assert_eq!(controller.selected_slot(), Some(slot));

    controller.select_slot(slot, &slots, &mut commands);
    assert_eq!(controller.selected_slot(), None);
    assert!(commands.is_empty(), "selection never emits commands");
}

#[test]
fn selecting_a_kind_drops_the_slot_selection() {
    let mut controller = BuildController::new();
    let slots = slots_with_occupancy(&[Some(TowerId::new(1))]);
    let mut commands = Vec::new();

    controller.select_slot(SlotId::new(0), &slots, &mut commands);
    controller.select_tower_kind(TowerKind::Cannon);

    assert_eq!(controller.selected_slot(), None);
    assert_eq!(controller.pending_kind(), Some(TowerKind::Cannon));
}

#[test]
fn sell_and_upgrade_require_a_selected_slot() {
    let mut controller = BuildController::new();
    let mut commands = Vec::new();

    assert!(!controller.request_sell(&mut commands));
    assert!(!controller.request_upgrade(&mut commands));
    assert!(commands.is_empty());

    let slots = slots_with_occupancy(&[Some(TowerId::new(9))]);
    controller.select_slot(SlotId::new(0), &slots, &mut commands);
    assert!(controller.request_upgrade(&mut commands));
    assert!(controller.request_sell(&mut commands));
    assert_eq!(
        commands,
        vec![
            Command::UpgradeTower {
                slot: SlotId::new(0),
            },
            Command::SellTower {
                slot: SlotId::new(0),
            },
        ],
    );
}

#[test]
fn sold_tower_clears_the_matching_selection() {
    let mut controller = BuildController::new();
    let slots = slots_with_occupancy(&[Some(TowerId::new(2)), Some(TowerId::new(4))]);
    let mut commands = Vec::new();

    controller.select_slot(SlotId::new(1), &slots, &mut commands);
    controller.handle(&[Event::TowerSold {
        tower: TowerId::new(7),
        slot: SlotId::new(0),
        kind: TowerKind::Gun,
        refund: 37,
    }]);
    assert_eq!(
        controller.selected_slot(),
        Some(SlotId::new(1)),
        "a sale elsewhere must not disturb the selection",
    );

    controller.handle(&[Event::TowerSold {
        tower: TowerId::new(4),
        slot: SlotId::new(1),
        kind: TowerKind::Gun,
        refund: 37,
    }]);
    assert_eq!(controller.selected_slot(), None);
}

#[test]
fn world_reset_clears_everything() {
    let mut controller = BuildController::new();
    controller.select_tower_kind(TowerKind::Gun);
    controller.handle(&[Event::WorldReset]);
    assert_eq!(controller.pending_kind(), None);
    assert_eq!(controller.selected_slot(), None);
}
