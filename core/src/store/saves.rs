//! Store methods for saved sessions.

use crate::{
    config::SimConfig,
    error::{LoadError, SimResult},
    snapshot::{SavePayload, SavedState},
    types::{Day, SaveId},
};
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::SimStore;

/// One row of a save listing. Payloads are only read on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveSummary {
    pub id:       SaveId,
    pub title:    String,
    pub day:      Day,
    pub saved_at: String,
}

impl SimStore {
    /// Persist a save for `owner`. Returns the new save id.
    pub fn save_simulation(&self, owner: &str, payload: &SavePayload) -> SimResult<SaveId> {
        let config_json = serde_json::to_string(&payload.config)?;
        let state_json = serde_json::to_string(&payload.state)?;
        let saved_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true);
        self.conn.execute(
            "INSERT INTO simulation_saves (owner, title, config_json, state_json, day, saved_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                owner,
                payload.title,
                config_json,
                state_json,
                payload.state.day as i64,
                saved_at,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        log::info!("Saved '{}' for {owner} as #{id} (day {})", payload.title, payload.state.day);
        Ok(id)
    }

    /// Saves for `owner`, newest first.
    pub fn list_saves(&self, owner: &str) -> SimResult<Vec<SaveSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, day, saved_at FROM simulation_saves
             WHERE owner = ?1
             ORDER BY saved_at DESC, id DESC",
        )?;
        let saves = stmt
            .query_map(params![owner], |row| {
                Ok(SaveSummary {
                    id:       row.get(0)?,
                    title:    row.get(1)?,
                    day:      row.get::<_, i64>(2)? as u64,
                    saved_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(saves)
    }

    /// Read a save back. Rows whose JSON no longer parses are reported as
    /// `LoadError::Malformed`; validation against the config happens in
    /// `SimEngine::load`.
    pub fn load_simulation(&self, save_id: SaveId) -> SimResult<SavePayload> {
        let row: Option<(String, String, String)> = self
            .conn
            .query_row(
                "SELECT title, config_json, state_json FROM simulation_saves WHERE id = ?1",
                params![save_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;
        let (title, config_json, state_json) =
            row.ok_or(LoadError::NotFound { save_id })?;

        let config: SimConfig = serde_json::from_str(&config_json)
            .map_err(|e| LoadError::Malformed(format!("config: {e}")))?;
        let state: SavedState = serde_json::from_str(&state_json)
            .map_err(|e| LoadError::Malformed(format!("state: {e}")))?;
        Ok(SavePayload { title, config, state })
    }

    /// Delete a save. Returns false if it did not exist.
    pub fn delete_save(&self, save_id: SaveId) -> SimResult<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM simulation_saves WHERE id = ?1",
            params![save_id],
        )?;
        Ok(deleted > 0)
    }
}
