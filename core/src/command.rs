use serde::{Deserialize, Serialize};
use crate::types::{Coord, EntityTypeId};

/// All player-issued commands.
/// Variants are only appended — never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Clock control ─────────────────────────────
    Pause,
    Resume,
    SetSpeed { speed: crate::clock::SimSpeed },

    // ── Grid ──────────────────────────────────────
    Place {
        x:         Coord,
        y:         Coord,
        entity_id: EntityTypeId,
    },
    Remove {
        x: Coord,
        y: Coord,
    },
}

impl PlayerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pause           => "pause",
            Self::Resume          => "resume",
            Self::SetSpeed { .. } => "set_speed",
            Self::Place { .. }    => "place",
            Self::Remove { .. }   => "remove",
        }
    }
}
