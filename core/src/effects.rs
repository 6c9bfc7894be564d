use crate::{
    event::SimEvent,
    rng::RandomSource,
    state::SimulationState,
    subsystem::SimSubsystem,
    types::Day,
};

/// Applies every placed entity's per-tick effects to the ledger.
///
/// Effects only add, so cell order cannot change the result; cells are
/// still visited row-major so float accumulation is reproducible.
/// Effects on resources the ledger does not track are dropped.
pub struct EffectSubsystem;

impl EffectSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EffectSubsystem {
    fn default() -> Self { Self::new() }
}

impl SimSubsystem for EffectSubsystem {
    fn name(&self) -> &'static str { "effects" }

    fn update(
        &mut self,
        day: Day,
        state: &mut SimulationState,
        _rng: &mut dyn RandomSource,
    ) -> Vec<SimEvent> {
        let SimulationState { grid, resources, .. } = state;

        let mut applied = 0usize;
        for (_, _, entity) in grid.occupied() {
            for (name, delta) in entity.effects.iter() {
                if resources.apply_delta(name, delta) {
                    applied += 1;
                }
            }
        }

        log::trace!("day={day} effects: {applied} deltas applied");
        Vec::new()
    }
}
