//! State-change notification.
//!
//! The engine never talks to a view. Front-ends, loggers and tests register
//! observers and are told about each event as it happens and about each
//! tick's resulting state.

use crate::{event::SimEvent, state::SimulationState};

pub trait SimObserver: Send {
    /// Called for every event, in emission order.
    fn on_event(&mut self, _event: &SimEvent) {}

    /// Called once per tick, after all of the tick's events.
    fn on_tick(&mut self, _state: &SimulationState, _events: &[SimEvent]) {}

    /// Called after a load has replaced the live state.
    fn on_load(&mut self, _state: &SimulationState) {}
}

/// Collects every event it sees. Useful for tests and for front-ends that
/// poll rather than subscribe.
#[derive(Debug, Default)]
pub struct EventRecorder {
    pub events: Vec<SimEvent>,
    pub ticks:  usize,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn crisis_events(&self) -> impl Iterator<Item = &SimEvent> + '_ {
        self.events.iter().filter(|e| e.is_crisis())
    }
}

impl SimObserver for EventRecorder {
    fn on_event(&mut self, event: &SimEvent) {
        self.events.push(event.clone());
    }

    fn on_tick(&mut self, _state: &SimulationState, _events: &[SimEvent]) {
        self.ticks += 1;
    }
}

/// Forward to a shared observer, so a caller can keep a handle to it after
/// registration.
impl<T: SimObserver> SimObserver for std::sync::Arc<std::sync::Mutex<T>> {
    fn on_event(&mut self, event: &SimEvent) {
        match self.lock() {
            Ok(mut inner) => inner.on_event(event),
            Err(_) => log::warn!("observer mutex poisoned; on_event dropped"),
        }
    }

    fn on_tick(&mut self, state: &SimulationState, events: &[SimEvent]) {
        match self.lock() {
            Ok(mut inner) => inner.on_tick(state, events),
            Err(_) => log::warn!("observer mutex poisoned; on_tick dropped"),
        }
    }

    fn on_load(&mut self, state: &SimulationState) {
        match self.lock() {
            Ok(mut inner) => inner.on_load(state),
            Err(_) => log::warn!("observer mutex poisoned; on_load dropped"),
        }
    }
}
