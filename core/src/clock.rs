//! Simulation clock — speed control and pause for the external tick driver.
//!
//! The engine never schedules itself. A driver (the runner's real-time
//! loop, a UI timer, a test) asks the clock how long to wait and then calls
//! `SimEngine::tick()`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub speed:  SimSpeed,
    pub paused: bool,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            speed:  SimSpeed::Normal,
            paused: false,
        }
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    pub fn set_speed(&mut self, speed: SimSpeed) {
        self.speed = speed;
    }

    pub fn ticks_per_real_second(&self) -> u32 {
        match self.speed {
            SimSpeed::Normal      => 1,
            SimSpeed::Accelerated => 5,
            SimSpeed::FastForward => 30,
        }
    }

    /// Real time between two ticks at the current speed.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.ticks_per_real_second()))
    }
}

impl Default for SimClock {
    fn default() -> Self { Self::new() }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SimSpeed {
    Normal,       // 1 day per real second
    Accelerated,  // one crisis cycle per real second
    FastForward,  // one month per real second
}
