//! Named resource quantities.
//!
//! RULE: the ledger never grows. Keys present at session start are the
//! only keys that ticks, penalties and charges may touch. A cost or effect
//! that names an unknown resource reads it as 0 and writes nothing.

use crate::{
    error::{SimError, SimResult},
    types::ResourceName,
};
use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::fmt;

/// An insertion-ordered `name -> amount` map.
///
/// Order matters: cost checks report the first failing entry in
/// configuration order, and bankruptcy warnings are raised in ledger order.
/// Serialises as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceMap {
    entries: Vec<(ResourceName, f64)>,
}

impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| *v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut f64> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    /// Insert or overwrite. An overwritten key keeps its original position.
    pub fn insert(&mut self, name: impl Into<ResourceName>, amount: f64) -> Option<f64> {
        let name = name.into();
        match self.get_mut(&name) {
            Some(slot) => Some(std::mem::replace(slot, amount)),
            None => {
                self.entries.push((name, amount));
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<ResourceName>> FromIterator<(K, f64)> for ResourceMap {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut map = ResourceMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for ResourceMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ResourceMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ResourceMapVisitor;

        impl<'de> Visitor<'de> for ResourceMapVisitor {
            type Value = ResourceMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of resource names to numbers")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = ResourceMap::new();
                while let Some((k, v)) = access.next_entry::<ResourceName, f64>()? {
                    map.insert(k, v);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(ResourceMapVisitor)
    }
}

/// The live resource balances of one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceLedger {
    balances: ResourceMap,
}

impl ResourceLedger {
    pub fn new(initial: ResourceMap) -> Self {
        Self { balances: initial }
    }

    /// Balance of `name`, or `None` if the ledger does not track it.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.balances.get(name)
    }

    /// Balance of `name`, reading untracked resources as 0.
    pub fn balance(&self, name: &str) -> f64 {
        self.balances.get(name).unwrap_or(0.0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.balances.contains(name)
    }

    /// Verify every cost entry can be paid. Reports the first shortfall in
    /// the cost map's own order. Never mutates.
    pub fn check_cost(&self, cost: &ResourceMap) -> SimResult<()> {
        for (name, required) in cost.iter() {
            let available = self.balance(name);
            if available < required {
                return Err(SimError::InsufficientResource {
                    resource: name.to_string(),
                    required,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Check the whole cost, then deduct it. Either every entry is deducted
    /// or none is.
    pub fn charge(&mut self, cost: &ResourceMap) -> SimResult<()> {
        self.check_cost(cost)?;
        for (name, amount) in cost.iter() {
            self.apply_delta(name, -amount);
        }
        Ok(())
    }

    /// Add `delta` to an existing balance. Returns false (and changes
    /// nothing) for resources the ledger does not track.
    pub fn apply_delta(&mut self, name: &str, delta: f64) -> bool {
        match self.balances.get_mut(name) {
            Some(balance) => {
                *balance += delta;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.balances.iter()
    }

    pub fn as_map(&self) -> &ResourceMap {
        &self.balances
    }

    pub fn into_map(self) -> ResourceMap {
        self.balances
    }
}
