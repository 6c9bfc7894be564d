use crate::{
    catalog::{EntityCatalog, EntityType},
    error::LoadError,
    ledger::ResourceMap,
    types::DEFAULT_CURRENCY,
};
use serde::{Deserialize, Serialize};

/// Upper bound on width * height. Cells are allocated up front.
pub const MAX_GRID_CELLS: u64 = 1 << 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub width:  u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Any other display metadata. Carried through saves untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GridConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background_color: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// Everything needed to start a session: the catalog, the starting
/// ledger and the grid shape. Usually produced by an external generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub grid: GridConfig,
    pub global_resources: ResourceMap,
    #[serde(default)]
    pub entities: Vec<EntityType>,
    /// Resource that absorbs the health-crisis fine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl SimConfig {
    /// Load a JSON config from disk.
    /// In tests, use SimConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config = Self::from_json(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {path}: {e}"))?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let config: SimConfig =
            serde_json::from_str(json).map_err(|e| LoadError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(LoadError::InvalidConfig(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid.width, self.grid.height
            )));
        }
        // Coordinates are i32; wider grids would have unreachable cells.
        let max_side = i32::MAX as u32;
        if self.grid.width > max_side || self.grid.height > max_side {
            return Err(LoadError::InvalidConfig(format!(
                "grid sides must be at most {max_side}, got {}x{}",
                self.grid.width, self.grid.height
            )));
        }
        let cells = u64::from(self.grid.width).checked_mul(u64::from(self.grid.height));
        if !cells.is_some_and(|n| n <= MAX_GRID_CELLS) {
            return Err(LoadError::InvalidConfig(format!(
                "grid of {}x{} exceeds {MAX_GRID_CELLS} cells",
                self.grid.width, self.grid.height
            )));
        }
        self.catalog().map(|_| ())
    }

    /// Build the entity catalog in config order.
    pub fn catalog(&self) -> Result<EntityCatalog, LoadError> {
        EntityCatalog::new(self.entities.clone())
    }

    pub fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        let resources = |entries: &[(&str, f64)]| -> ResourceMap {
            entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
        };
        let entity = |id: &str, name: &str, cost: ResourceMap, effects: ResourceMap| EntityType {
            id: id.into(),
            name: name.into(),
            icon: String::new(),
            description: String::new(),
            cost,
            effects,
        };

        Self {
            title: "Test City".into(),
            description: "Deterministic fixture".into(),
            grid: GridConfig::new(5, 5),
            global_resources: resources(&[("budget", 1000.0), ("pollution", 0.0), ("score", 0.0)]),
            entities: vec![
                entity(
                    "tree",
                    "Tree",
                    resources(&[("budget", 10.0)]),
                    resources(&[("pollution", -1.0)]),
                ),
                entity(
                    "factory",
                    "Factory",
                    resources(&[("budget", 200.0)]),
                    resources(&[("budget", 20.0), ("pollution", 5.0)]),
                ),
                entity(
                    "house",
                    "House",
                    resources(&[("budget", 50.0)]),
                    resources(&[("score", 1.0)]),
                ),
            ],
            currency: None,
        }
    }
}
