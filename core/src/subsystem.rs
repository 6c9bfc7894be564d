//! Subsystem trait.
//!
//! RULE: Every per-tick pass implements SimSubsystem.
//! The engine calls update() on each registered subsystem
//! in registration order, every tick, after the day has advanced.
//! Execution order is fixed and documented in engine.rs.

use crate::{
    event::SimEvent,
    rng::RandomSource,
    state::SimulationState,
    types::Day,
};

/// The contract every subsystem must fulfill.
pub trait SimSubsystem: Send {
    /// Unique stable name for this subsystem.
    fn name(&self) -> &'static str;

    /// Called once per tick by the engine.
    ///
    /// - `day`:   the day just entered (already written to `state.day`)
    /// - `state`: the session state, mutable
    /// - `rng`:   this subsystem's random source for this day
    ///
    /// Returns the events this pass produced. Subsystems never fail: any
    /// ledger value, however negative, is a legal state.
    fn update(
        &mut self,
        day: Day,
        state: &mut SimulationState,
        rng: &mut dyn RandomSource,
    ) -> Vec<SimEvent>;
}
