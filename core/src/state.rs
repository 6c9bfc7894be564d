//! The mutable aggregate of one session: grid, ledger and day counter.
//!
//! This is the unit that is captured for saving and replaced wholesale on
//! load. Nothing else in a session is mutable.

use crate::{
    config::SimConfig,
    grid::Grid,
    ledger::ResourceLedger,
    types::Day,
};

pub const FIRST_DAY: Day = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub grid:      Grid,
    pub resources: ResourceLedger,
    pub day:       Day,
}

impl SimulationState {
    /// Fresh state for a new session: empty grid, starting ledger, day 1.
    pub fn new(config: &SimConfig) -> Self {
        Self {
            grid:      Grid::new(config.grid.width, config.grid.height),
            resources: ResourceLedger::new(config.global_resources.clone()),
            day:       FIRST_DAY,
        }
    }

    /// Advance the day counter by exactly one. Returns the new day.
    pub fn advance_day(&mut self) -> Day {
        self.day += 1;
        self.day
    }
}
