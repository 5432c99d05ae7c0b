//! Headless environment wiring the systems to one authoritative world.
//!
//! Each step runs a fixed command ordering: the agent's decoded action first,
//! then the combat resolver and wave director reacting to the previous
//! frame's events, then the clock tick. The resulting event log feeds the
//! reward shaper, the session recorder, and the build controller before it
//! becomes the next frame's input.

use std::time::Duration;

use tower_defence_core::{Catalog, Command, Event, GameConfig, Layout, Position};
use tower_defence_system_analytics::SessionRecorder;
use tower_defence_system_build::BuildController;
use tower_defence_system_combat::CombatResolver;
use tower_defence_system_episode::{
    Action, ActionSpace, EpisodeShaper, ObservationEncoder, PerformanceWeights, RewardConfig,
    StepReport,
};
use tower_defence_system_wave_director::WaveDirector;
use tower_defence_world::{apply, query, World};

/// One simulation instance with every system attached.
pub(crate) struct Environment {
    world: World,
    controller: BuildController,
    combat: CombatResolver,
    director: WaveDirector,
    shaper: EpisodeShaper,
    recorder: SessionRecorder,
    space: ActionSpace,
    encoder: ObservationEncoder,
    dt: Duration,
    prev_events: Vec<Event>,
}

impl Environment {
    pub(crate) fn new(
        config: GameConfig,
        rewards: RewardConfig,
        weights: PerformanceWeights,
        dt: Duration,
    ) -> Self {
        let combat = CombatResolver::new(config.retarget_interval);
        let director = WaveDirector::new(config.initial_countdown);
        let shaper = EpisodeShaper::new(rewards, weights, config.episode_timeout);
        let world = World::new(config, Catalog::default(), Layout::default());
        let slots = query::slot_view(&world).len();
        Self {
            world,
            controller: BuildController::new(),
            combat,
            director,
            shaper,
            recorder: SessionRecorder::default(),
            space: ActionSpace::new(slots),
            encoder: ObservationEncoder::new(slots),
            dt,
            prev_events: Vec::new(),
        }
    }

    pub(crate) fn action_count(&self) -> usize {
        self.space.size()
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn shaper(&self) -> &EpisodeShaper {
        &self.shaper
    }

    pub(crate) fn recorder(&self) -> &SessionRecorder {
        &self.recorder
    }

    /// Applies out-of-band commands, such as balance overrides, between
    /// episodes.
    pub(crate) fn apply_commands(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            apply(&mut self.world, command, &mut events);
        }
        events
    }

    /// Advances the simulation by one fixed step under the given action index.
    pub(crate) fn step(&mut self, action_index: usize) -> StepReport {
        let action = self.space.decode(action_index);
        let mut commands = Vec::new();
        match action {
            Action::Noop | Action::Invalid => {}
            Action::SelectKind(kind) => self.controller.select_tower_kind(kind),
            Action::Build(slot) => {
                let _ = self.controller.request_build(slot, &mut commands);
            }
            // These actions already name their slot; the controller's
            // selection machine only mediates builds, which need a pending
            // kind. The world validates occupancy either way.
            Action::Upgrade(slot) => commands.push(Command::UpgradeTower { slot }),
            Action::Sell(slot) => commands.push(Command::SellTower { slot }),
        }

        self.combat.handle(
            &self.prev_events,
            &query::tower_view(&self.world),
            &query::enemy_view(&self.world),
            &mut commands,
        );
        self.director.handle(
            &self.prev_events,
            &query::ledger(&self.world),
            query::catalog(&self.world),
            &mut commands,
        );
        commands.push(Command::Tick { dt: self.dt });

        let mut events = Vec::new();
        for command in commands {
            apply(&mut self.world, command, &mut events);
        }

        let ledger = query::ledger(&self.world);
        let wave_count = query::catalog(&self.world).wave_count();
        let report = self.shaper.step(action, &events, &ledger, wave_count);
        self.recorder.handle(&events);
        self.controller.handle(&events);
        self.prev_events = events;
        report
    }

    /// Encodes the current state into the fixed-width observation vector.
    pub(crate) fn observe(&self) -> Vec<f32> {
        let path_end = query::waypoints(&self.world)
            .last()
            .copied()
            .unwrap_or(Position::new(0.0, 0.0));
        self.encoder.encode(
            &query::ledger(&self.world),
            query::catalog(&self.world),
            &query::slot_view(&self.world),
            &query::tower_view(&self.world),
            &query::enemy_view(&self.world),
            path_end,
        )
    }

    /// Rolls the world and every system back to the start of an episode.
    ///
    /// Catalog overrides survive: balance adjustments apply to subsequent
    /// episodes, not just the current one.
    pub(crate) fn reset(&mut self) {
        let mut events = Vec::new();
        apply(&mut self.world, Command::Reset, &mut events);
        self.combat.reset();
        self.director.reset();
        self.shaper.begin();
        self.recorder.handle(&events);
        self.controller.handle(&events);
        self.prev_events = events;
    }
}
