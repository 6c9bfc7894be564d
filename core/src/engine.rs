//! The simulation engine — one eco-simulation session.
//!
//! EXECUTION ORDER per tick (fixed, documented, never reordered):
//!   1. Day counter advances by exactly one
//!   2. Effects subsystem   (every placed entity's effects hit the ledger)
//!   3. Crisis subsystem    (only when day % 5 == 0)
//!   4. Observers notified  (each event, then the tick's resulting state)
//!
//! RULES:
//!   - Every mutation goes through `&mut self`. One writer at a time; a
//!     driver that shares an engine across threads wraps it in a Mutex.
//!   - place/remove/load either fully apply or leave the state untouched.
//!   - All randomness flows through the RngBank (or an injected source).
//!   - The engine performs no I/O. Persistence is the caller's business.

use crate::{
    catalog::{EntityCatalog, EntityType},
    clock::SimClock,
    command::PlayerCommand,
    config::SimConfig,
    crisis::{CrisisEvaluator, CrisisSubsystem},
    effects::EffectSubsystem,
    error::{SimError, SimResult},
    event::SimEvent,
    observer::SimObserver,
    rng::{RandomSource, RngBank, SubsystemSlot},
    snapshot::SavePayload,
    state::SimulationState,
    subsystem::SimSubsystem,
    types::{Coord, Day},
};
use std::sync::Arc;

pub struct SimEngine {
    pub clock:    SimClock,
    config:       SimConfig,
    catalog:      EntityCatalog,
    state:        SimulationState,
    rng_bank:     RngBank,
    rng_override: Option<Box<dyn RandomSource>>,
    subsystems:   Vec<(SubsystemSlot, Box<dyn SimSubsystem>)>,
    observers:    Vec<Box<dyn SimObserver>>,
}

impl SimEngine {
    /// Start a session on day 1 with an empty grid and the config's
    /// starting resources. No subsystems registered.
    pub fn new(config: SimConfig, seed: u64) -> SimResult<Self> {
        config.validate()?;
        let catalog = config.catalog()?;
        let state = SimulationState::new(&config);
        Ok(Self {
            clock: SimClock::new(),
            config,
            catalog,
            state,
            rng_bank: RngBank::new(seed),
            rng_override: None,
            subsystems: Vec::new(),
            observers: Vec::new(),
        })
    }

    /// Build a fully wired engine with all subsystems registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(config: SimConfig, seed: u64) -> SimResult<Self> {
        let currency = config.currency().to_string();
        let mut engine = SimEngine::new(config, seed)?;

        // EXECUTION ORDER — fixed, documented, never reordered.
        engine.register(SubsystemSlot::Effects, Box::new(EffectSubsystem::new()));
        engine.register(
            SubsystemSlot::Crisis,
            Box::new(CrisisSubsystem::new(CrisisEvaluator::new(currency))),
        );
        engine.log_start();
        Ok(engine)
    }

    /// Fully wired engine on SimConfig::default_test().
    pub fn build_test(seed: u64) -> SimResult<Self> {
        Self::build(SimConfig::default_test(), seed)
    }

    /// Register a subsystem. Call in the documented execution order.
    pub fn register(&mut self, slot: SubsystemSlot, subsystem: Box<dyn SimSubsystem>) {
        self.subsystems.push((slot, subsystem));
    }

    pub fn register_observer(&mut self, observer: Box<dyn SimObserver>) {
        self.observers.push(observer);
    }

    /// Replace the seeded streams with a fixed source for every subsystem.
    /// Tests use this to force or suppress random destruction.
    pub fn with_rng(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.rng_override = Some(rng);
        self
    }

    // ── Accessors ──────────────────────────────────────────────

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    pub fn day(&self) -> Day {
        self.state.day
    }

    pub fn seed(&self) -> u64 {
        self.rng_bank.master_seed()
    }

    // ── Placement ──────────────────────────────────────────────

    /// Place a catalog entity at (x, y), paying its cost.
    ///
    /// Checks run in order: known id, in bounds, cell empty, every cost
    /// entry affordable. The ledger and grid are only touched once all
    /// checks pass.
    pub fn place(&mut self, x: Coord, y: Coord, entity_id: &str) -> SimResult<Arc<EntityType>> {
        let entity = self
            .catalog
            .get(entity_id)
            .cloned()
            .ok_or_else(|| SimError::UnknownEntity { id: entity_id.to_string() })?;

        if self.state.grid.is_occupied(x, y)? {
            return Err(SimError::CellOccupied { x, y });
        }
        self.state.resources.charge(&entity.cost)?;
        self.state.grid.put(x, y, Arc::clone(&entity))?;

        log::trace!("day={} placed {} at ({x}, {y})", self.state.day, entity.id);
        self.notify(&[SimEvent::EntityPlaced {
            day: self.state.day,
            x,
            y,
            entity_id: entity.id.clone(),
        }]);
        Ok(entity)
    }

    /// Clear (x, y). No refund. Returns the removed entity, or None if the
    /// cell was already empty.
    pub fn remove(&mut self, x: Coord, y: Coord) -> SimResult<Option<Arc<EntityType>>> {
        let removed = self.state.grid.take(x, y)?;
        if let Some(entity) = &removed {
            log::trace!("day={} removed {} at ({x}, {y})", self.state.day, entity.id);
            self.notify(&[SimEvent::EntityRemoved {
                day: self.state.day,
                x,
                y,
                entity_id: entity.id.clone(),
            }]);
        }
        Ok(removed)
    }

    // ── Ticking ────────────────────────────────────────────────

    /// Advance one day. This is the core simulation step.
    /// Returns every event the tick produced, ending with TickCompleted.
    pub fn tick(&mut self) -> Vec<SimEvent> {
        let day = self.state.advance_day();
        let mut tick_events = Vec::new();

        for (slot, subsystem) in &mut self.subsystems {
            let new_events = match self.rng_override.as_mut() {
                Some(rng) => subsystem.update(day, &mut self.state, rng.as_mut()),
                None => {
                    let mut rng = self.rng_bank.for_subsystem_at_tick(*slot, day);
                    subsystem.update(day, &mut self.state, &mut rng)
                }
            };
            tick_events.extend(new_events);
        }

        tick_events.push(SimEvent::TickCompleted { day });

        log::debug!(
            "day={day} tick: {} events, {} buildings",
            tick_events.len(),
            self.state.grid.occupied_count()
        );

        self.notify(&tick_events);
        for observer in &mut self.observers {
            observer.on_tick(&self.state, &tick_events);
        }
        tick_events
    }

    /// Run n ticks in a loop. Used for testing and fast-forward.
    pub fn run_ticks(&mut self, n: u64) -> Vec<SimEvent> {
        let mut events = Vec::new();
        for _ in 0..n {
            events.extend(self.tick());
        }
        events
    }

    /// Apply one player command. Commands that fail leave the state as it was.
    pub fn apply_command(&mut self, command: &PlayerCommand) -> SimResult<()> {
        match command {
            PlayerCommand::Pause => self.clock.pause(),
            PlayerCommand::Resume => self.clock.resume(),
            PlayerCommand::SetSpeed { speed } => self.clock.set_speed(*speed),
            PlayerCommand::Place { x, y, entity_id } => {
                self.place(*x, *y, entity_id)?;
            }
            PlayerCommand::Remove { x, y } => {
                self.remove(*x, *y)?;
            }
        }
        Ok(())
    }

    // ── Save / load ────────────────────────────────────────────

    /// Capture the session as a save payload. Title defaults to the
    /// config's title.
    pub fn save(&self, title: Option<&str>) -> SavePayload {
        SavePayload::capture(title, &self.config, &self.state)
    }

    /// Replace the live session with `payload`. Everything is validated
    /// first; on error the live session is untouched.
    pub fn load(&mut self, payload: SavePayload) -> SimResult<()> {
        let (catalog, state) = payload.restore()?;
        let currency = payload.config.currency().to_string();

        self.config = payload.config;
        self.catalog = catalog;
        self.state = state;
        for (slot, subsystem) in &mut self.subsystems {
            if *slot == SubsystemSlot::Crisis {
                *subsystem = Box::new(CrisisSubsystem::new(CrisisEvaluator::new(currency.clone())));
            }
        }

        log::info!(
            "Loaded '{}' at day {} ({} buildings)",
            payload.title,
            self.state.day,
            self.state.grid.occupied_count()
        );
        self.notify(&[SimEvent::StateLoaded {
            day: self.state.day,
            title: payload.title,
        }]);
        for observer in &mut self.observers {
            observer.on_load(&self.state);
        }
        Ok(())
    }

    /// Build a fully wired engine directly from a save.
    pub fn from_save(payload: SavePayload, seed: u64) -> SimResult<Self> {
        let mut engine = Self::build(payload.config.clone(), seed)?;
        engine.load(payload)?;
        Ok(engine)
    }

    fn notify(&mut self, events: &[SimEvent]) {
        for event in events {
            for observer in &mut self.observers {
                observer.on_event(event);
            }
        }
    }

    fn log_start(&self) {
        log::info!(
            "Session '{}' started: {}x{} grid, {} entity types, {} resources",
            self.config.title,
            self.config.grid.width,
            self.config.grid.height,
            self.catalog.len(),
            self.state.resources.iter().count()
        );
    }
}
