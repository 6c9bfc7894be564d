//! Threshold-triggered crisis rules.
//!
//! Evaluated only on days that are a multiple of CRISIS_INTERVAL, after
//! the day's effects have been applied. Rules run in this fixed order and
//! are cumulative:
//!
//!   1. Smog                 50 < pollution <= 100   score -1, alert on day % 3 == 0
//!   2. Health crisis        pollution > 100         currency -100, score -10
//!   3. Ecological collapse  pollution > 200         10% chance to destroy one building
//!   4. Bankruptcy           any other resource < 0  score -10 per offending resource
//!
//! Smog and health crisis are exclusive by band; collapse stacks on top of
//! health crisis. Bankruptcy sees the ledger after rule 2's fine.
//!
//! Penalties only touch resources the ledger tracks. A session without a
//! `pollution` resource never triggers rules 1–3.

use crate::{
    event::SimEvent,
    rng::RandomSource,
    state::SimulationState,
    subsystem::SimSubsystem,
    types::{Day, DEFAULT_CURRENCY, POLLUTION, SCORE},
};

pub const CRISIS_INTERVAL: Day = 5;
pub const SMOG_ALERT_INTERVAL: Day = 3;

pub const SMOG_THRESHOLD: f64 = 50.0;
pub const HEALTH_CRISIS_THRESHOLD: f64 = 100.0;
pub const COLLAPSE_THRESHOLD: f64 = 200.0;

pub const SMOG_SCORE_PENALTY: f64 = 1.0;
pub const HEALTH_CRISIS_FINE: f64 = 100.0;
pub const HEALTH_CRISIS_SCORE_PENALTY: f64 = 10.0;
pub const COLLAPSE_DESTROY_CHANCE: f64 = 0.1;
pub const BANKRUPTCY_SCORE_PENALTY: f64 = 10.0;

/// The rule set, parameterised only by which resource is the currency.
#[derive(Debug, Clone)]
pub struct CrisisEvaluator {
    currency: String,
}

impl CrisisEvaluator {
    pub fn new(currency: impl Into<String>) -> Self {
        Self { currency: currency.into() }
    }

    /// Whether the evaluator runs on `day`.
    pub fn is_due(day: Day) -> bool {
        day.is_multiple_of(CRISIS_INTERVAL)
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Run every rule once against `state`. Never fails.
    pub fn evaluate(&self, state: &mut SimulationState, rng: &mut dyn RandomSource) -> Vec<SimEvent> {
        let day = state.day;
        let mut events = Vec::new();

        if let Some(pollution) = state.resources.get(POLLUTION) {
            // 1. Smog
            if pollution > SMOG_THRESHOLD && pollution <= HEALTH_CRISIS_THRESHOLD {
                if day.is_multiple_of(SMOG_ALERT_INTERVAL) {
                    events.push(SimEvent::SmogAlert { day, pollution });
                }
                state.resources.apply_delta(SCORE, -SMOG_SCORE_PENALTY);
            }

            // 2. Health crisis
            if pollution > HEALTH_CRISIS_THRESHOLD {
                events.push(SimEvent::HealthCrisis {
                    day,
                    pollution,
                    fine: HEALTH_CRISIS_FINE,
                });
                state.resources.apply_delta(&self.currency, -HEALTH_CRISIS_FINE);
                state.resources.apply_delta(SCORE, -HEALTH_CRISIS_SCORE_PENALTY);
            }

            // 3. Ecological collapse
            if pollution > COLLAPSE_THRESHOLD {
                events.push(SimEvent::EcologicalCollapse { day, pollution });
                if rng.chance(COLLAPSE_DESTROY_CHANCE) {
                    if let Some(destroyed) = destroy_random_building(state, rng) {
                        events.push(destroyed);
                    }
                }
            }
        }

        // 4. Bankruptcy
        let bankrupt: Vec<(String, f64)> = state
            .resources
            .iter()
            .filter(|(name, balance)| *name != POLLUTION && *name != SCORE && *balance < 0.0)
            .map(|(name, balance)| (name.to_string(), balance))
            .collect();
        for (resource, balance) in bankrupt {
            state.resources.apply_delta(SCORE, -BANKRUPTCY_SCORE_PENALTY);
            events.push(SimEvent::BankruptcyWarning { day, resource, balance });
        }

        for event in &events {
            if let Some(message) = event.message() {
                log::warn!("day={day} crisis: {message}");
            }
        }
        events
    }
}

impl Default for CrisisEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY)
    }
}

/// Clear one occupied cell, chosen uniformly. No-op on an empty grid.
fn destroy_random_building(
    state: &mut SimulationState,
    rng: &mut dyn RandomSource,
) -> Option<SimEvent> {
    let occupied: Vec<_> = state.grid.occupied().map(|(x, y, _)| (x, y)).collect();
    if occupied.is_empty() {
        return None;
    }
    let (x, y) = occupied[rng.next_u64_below(occupied.len() as u64) as usize];
    // Coordinates come from the grid itself, so take() cannot go out of bounds.
    let entity = state.grid.take(x, y).ok().flatten()?;
    Some(SimEvent::BuildingDestroyed {
        day: state.day,
        x,
        y,
        entity_id: entity.id.clone(),
        name: entity.name.clone(),
    })
}

/// Tick pass wrapping the evaluator with its periodicity gate.
pub struct CrisisSubsystem {
    evaluator: CrisisEvaluator,
}

impl CrisisSubsystem {
    pub fn new(evaluator: CrisisEvaluator) -> Self {
        Self { evaluator }
    }
}

impl SimSubsystem for CrisisSubsystem {
    fn name(&self) -> &'static str { "crisis" }

    fn update(
        &mut self,
        day: Day,
        state: &mut SimulationState,
        rng: &mut dyn RandomSource,
    ) -> Vec<SimEvent> {
        if !CrisisEvaluator::is_due(day) {
            return Vec::new();
        }
        self.evaluator.evaluate(state, rng)
    }
}
