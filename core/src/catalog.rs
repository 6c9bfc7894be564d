//! Placeable entity types.
//!
//! The catalog is read-only for the life of a session. Grid cells hold
//! shared `Arc<EntityType>` handles into it, never private copies.

use crate::{
    error::LoadError,
    ledger::ResourceMap,
    types::EntityTypeId,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityType {
    pub id:   EntityTypeId,
    pub name: String,
    /// Display glyph. Opaque to the engine.
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    /// Deducted once, at placement.
    #[serde(default)]
    pub cost: ResourceMap,
    /// Applied to the ledger every tick while placed.
    #[serde(default)]
    pub effects: ResourceMap,
}

/// Ordered, id-indexed set of entity types.
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    entities: Vec<Arc<EntityType>>,
    by_id:    HashMap<EntityTypeId, usize>,
}

impl EntityCatalog {
    /// Build a catalog, rejecting duplicate ids. Input order is kept as the
    /// catalog's iteration order.
    pub fn new(entities: Vec<EntityType>) -> Result<Self, LoadError> {
        let mut catalog = Self {
            entities: Vec::with_capacity(entities.len()),
            by_id:    HashMap::with_capacity(entities.len()),
        };
        for entity in entities {
            if catalog.by_id.contains_key(&entity.id) {
                return Err(LoadError::DuplicateEntity { id: entity.id });
            }
            catalog.by_id.insert(entity.id.clone(), catalog.entities.len());
            catalog.entities.push(Arc::new(entity));
        }
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<EntityType>> {
        self.by_id.get(id).map(|&i| &self.entities[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<EntityType>> + '_ {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
