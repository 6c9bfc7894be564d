//! Everything the engine tells the outside world.
//!
//! Events are transient notifications. They are never part of the saved
//! state; a front-end decides how to present them and a runner may log them.

use crate::types::{Coord, Day, EntityTypeId};
use serde::{Deserialize, Serialize};

/// Every event emitted by the engine.
/// Variants are only appended — never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    TickCompleted {
        day: Day,
    },
    StateLoaded {
        day: Day,
        title: String,
    },

    // ── Player actions ─────────────────────────────
    EntityPlaced {
        day: Day,
        x: Coord,
        y: Coord,
        entity_id: EntityTypeId,
    },
    EntityRemoved {
        day: Day,
        x: Coord,
        y: Coord,
        entity_id: EntityTypeId,
    },

    // ── Crisis events ──────────────────────────────
    SmogAlert {
        day: Day,
        pollution: f64,
    },
    HealthCrisis {
        day: Day,
        pollution: f64,
        fine: f64,
    },
    EcologicalCollapse {
        day: Day,
        pollution: f64,
    },
    BuildingDestroyed {
        day: Day,
        x: Coord,
        y: Coord,
        entity_id: EntityTypeId,
        name: String,
    },
    BankruptcyWarning {
        day: Day,
        resource: String,
        balance: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info     => "info",
            Self::Warning  => "warning",
            Self::Critical => "critical",
        }
    }
}

impl SimEvent {
    pub fn day(&self) -> Day {
        match self {
            Self::TickCompleted { day }
            | Self::StateLoaded { day, .. }
            | Self::EntityPlaced { day, .. }
            | Self::EntityRemoved { day, .. }
            | Self::SmogAlert { day, .. }
            | Self::HealthCrisis { day, .. }
            | Self::EcologicalCollapse { day, .. }
            | Self::BuildingDestroyed { day, .. }
            | Self::BankruptcyWarning { day, .. } => *day,
        }
    }

    /// Severity tag for crisis events; `None` for routine events.
    pub fn severity(&self) -> Option<Severity> {
        match self {
            Self::SmogAlert { .. } | Self::BankruptcyWarning { .. } => Some(Severity::Warning),
            Self::HealthCrisis { .. }
            | Self::EcologicalCollapse { .. }
            | Self::BuildingDestroyed { .. } => Some(Severity::Critical),
            _ => None,
        }
    }

    pub fn is_crisis(&self) -> bool {
        self.severity().is_some()
    }

    /// Player-facing text for crisis events.
    pub fn message(&self) -> Option<String> {
        let text = match self {
            Self::SmogAlert { .. } => "Smog Alert! Efficiency dropping.".to_string(),
            Self::HealthCrisis { .. } => "Health Crisis! Medical costs soaring!".to_string(),
            Self::EcologicalCollapse { .. } => {
                "ECOLOGICAL COLLAPSE! STRUCTURES FAILING!".to_string()
            }
            Self::BuildingDestroyed { name, .. } => {
                format!("Disaster! {name} destroyed by pollution!")
            }
            Self::BankruptcyWarning { resource, .. } => {
                format!("Bankruptcy Warning! You are out of {resource}!")
            }
            _ => return None,
        };
        Some(text)
    }

    /// Stable string name, used for the event_type column in event_log.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::TickCompleted { .. }      => "tick_completed",
            Self::StateLoaded { .. }        => "state_loaded",
            Self::EntityPlaced { .. }       => "entity_placed",
            Self::EntityRemoved { .. }      => "entity_removed",
            Self::SmogAlert { .. }          => "smog_alert",
            Self::HealthCrisis { .. }       => "health_crisis",
            Self::EcologicalCollapse { .. } => "ecological_collapse",
            Self::BuildingDestroyed { .. }  => "building_destroyed",
            Self::BankruptcyWarning { .. }  => "bankruptcy_warning",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub session_id: String,
    pub day:        Day,
    pub event_type: String,
    pub severity:   Option<String>,
    pub payload:    String, // JSON-serialized SimEvent
}

impl EventLogEntry {
    pub fn from_event(session_id: &str, event: &SimEvent) -> serde_json::Result<Self> {
        Ok(Self {
            id:         None,
            session_id: session_id.to_string(),
            day:        event.day(),
            event_type: event.type_name().to_string(),
            severity:   event.severity().map(|s| s.as_str().to_string()),
            payload:    serde_json::to_string(event)?,
        })
    }
}
