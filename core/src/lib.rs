//! Headless engine for the eco city-builder simulation.
//!
//! A session is a fixed-size grid of placed entities, a ledger of named
//! resources, and a day counter. Each tick applies every placed entity's
//! effects to the ledger; every fifth day a rule-based crisis check may
//! fine, warn, or destroy a building. Sessions save to and load from a
//! transport-neutral payload.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`catalog`] | Placeable entity types, shared by reference |
//! | [`clock`] | Pause and speed for the external tick driver |
//! | [`command`] | Player commands (place, remove, clock control) |
//! | [`config`] | Session configuration (catalog, resources, grid) |
//! | [`crisis`] | Pollution and bankruptcy rules |
//! | [`effects`] | Per-tick entity effects |
//! | [`engine`] | The session: placement, ticking, save/load |
//! | [`event`] | Notifications emitted by the engine |
//! | [`grid`] | Fixed-size placement surface |
//! | [`ledger`] | Ordered resource balances |
//! | [`observer`] | Event and tick subscriptions |
//! | [`rng`] | Deterministic, injectable randomness |
//! | [`snapshot`] | Save payload capture and validated restore |
//! | [`state`] | Grid + ledger + day |
//! | [`store`] | SQLite persistence for saves and the event log |

pub mod catalog;
pub mod clock;
pub mod command;
pub mod config;
pub mod crisis;
pub mod effects;
pub mod engine;
pub mod error;
pub mod event;
pub mod grid;
pub mod ledger;
pub mod observer;
pub mod rng;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod subsystem;
pub mod types;
