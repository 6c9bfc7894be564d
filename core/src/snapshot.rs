//! Snapshot serialization — session state to/from a transport-neutral payload.
//!
//! A save carries the config it was played with, so a load restores the
//! catalog and the state together. Grid cells are stored by entity id and
//! resolved back against that catalog on load.
//!
//! Loading validates everything before building anything; a payload that
//! fails validation never touches the live session.

use crate::{
    catalog::EntityCatalog,
    config::SimConfig,
    error::LoadError,
    grid::Grid,
    ledger::{ResourceLedger, ResourceMap},
    state::{SimulationState, FIRST_DAY},
    types::{Coord, Day, EntityTypeId},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const UNTITLED: &str = "Untitled Simulation";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePayload {
    pub title:  String,
    pub config: SimConfig,
    pub state:  SavedState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    /// Rows top to bottom; each cell an entity id or null.
    pub grid:      Vec<Vec<Option<SavedCell>>>,
    pub resources: ResourceMap,
    #[serde(alias = "gameDay")]
    pub day:       Day,
}

/// A saved cell. New saves always write `Id`; `Embedded` accepts saves that
/// stored the whole entity object, and only its `id` is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SavedCell {
    Id(EntityTypeId),
    Embedded { id: EntityTypeId },
}

impl SavedCell {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) | Self::Embedded { id } => id,
        }
    }
}

impl SavedState {
    pub fn capture(state: &SimulationState) -> Self {
        let grid = state
            .grid
            .rows()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.as_ref().map(|e| SavedCell::Id(e.id.clone())))
                    .collect()
            })
            .collect();
        Self {
            grid,
            resources: state.resources.as_map().clone(),
            day: state.day,
        }
    }

    /// Rebuild a live state, resolving ids against `catalog`.
    pub fn restore(
        &self,
        config: &SimConfig,
        catalog: &EntityCatalog,
    ) -> Result<SimulationState, LoadError> {
        let (width, height) = (config.grid.width, config.grid.height);
        if self.grid.len() != height as usize {
            return Err(LoadError::GridHeightMismatch {
                expected: height,
                actual:   self.grid.len(),
            });
        }
        if self.day < FIRST_DAY {
            return Err(LoadError::InvalidDay { day: self.day });
        }

        let mut grid = Grid::new(width, height);
        for (y, row) in self.grid.iter().enumerate() {
            if row.len() != width as usize {
                return Err(LoadError::GridWidthMismatch {
                    row: y,
                    expected: width,
                    actual: row.len(),
                });
            }
            for (x, cell) in row.iter().enumerate() {
                let Some(cell) = cell else { continue };
                let entity = catalog.get(cell.id()).ok_or_else(|| LoadError::UnknownEntity {
                    id: cell.id().to_string(),
                    x,
                    y,
                })?;
                grid.put(x as Coord, y as Coord, Arc::clone(entity))
                    .map_err(|e| LoadError::Malformed(e.to_string()))?;
            }
        }

        Ok(SimulationState {
            grid,
            resources: ResourceLedger::new(self.resources.clone()),
            day: self.day,
        })
    }
}

impl SavePayload {
    pub fn capture(title: Option<&str>, config: &SimConfig, state: &SimulationState) -> Self {
        let title = title
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                if config.title.trim().is_empty() {
                    UNTITLED.to_string()
                } else {
                    config.title.clone()
                }
            });
        Self {
            title,
            config: config.clone(),
            state: SavedState::capture(state),
        }
    }

    /// Validate and rebuild the catalog and state this payload describes.
    pub fn restore(&self) -> Result<(EntityCatalog, SimulationState), LoadError> {
        self.config.validate()?;
        let catalog = self.config.catalog()?;
        let state = self.state.restore(&self.config, &catalog)?;
        Ok((catalog, state))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        serde_json::from_str(json).map_err(|e| LoadError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_writes_ids_and_nulls() {
        let config = SimConfig::default_test();
        let catalog = config.catalog().unwrap();
        let mut state = SimulationState::new(&config);
        state.grid.put(1, 0, Arc::clone(catalog.get("tree").unwrap())).unwrap();

        let saved = SavedState::capture(&state);
        let json = serde_json::to_value(&saved).unwrap();
        assert_eq!(json["grid"][0][0], serde_json::Value::Null);
        assert_eq!(json["grid"][0][1], "tree");
        assert_eq!(json["day"], 1);
    }

    #[test]
    fn reads_embedded_entities_and_game_day() {
        let json = r#"{
            "grid": [[{"id": "tree", "name": "Tree", "icon": "T", "cost": {"budget": 10}}, null]],
            "resources": {"budget": 5},
            "gameDay": 7
        }"#;
        let saved: SavedState = serde_json::from_str(json).unwrap();
        assert_eq!(saved.day, 7);
        assert_eq!(saved.grid[0][0].as_ref().map(SavedCell::id), Some("tree"));
        assert!(saved.grid[0][1].is_none());
    }

    #[test]
    fn default_title_falls_back_to_config_then_untitled() {
        let mut config = SimConfig::default_test();
        let state = SimulationState::new(&config);
        assert_eq!(SavePayload::capture(Some("Mine"), &config, &state).title, "Mine");
        assert_eq!(SavePayload::capture(None, &config, &state).title, "Test City");
        config.title.clear();
        assert_eq!(SavePayload::capture(Some("  "), &config, &state).title, UNTITLED);
    }
}
