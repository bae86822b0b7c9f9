//! Itinerary storage: upsert, load, list, and delete.

use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::model::Itinerary;

use super::{Result, Storage, StorageError};

impl Storage {
    /// Writes an itinerary, replacing any stored version with the same id.
    pub fn save_itinerary(&self, itinerary: &Itinerary) -> Result<()> {
        let body = serde_json::to_string(itinerary)?;
        self.connect()?.execute(
            "INSERT INTO itinerary (id, title, destination, created_at, updated_at, body)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (id) DO UPDATE SET
                 title = excluded.title,
                 destination = excluded.destination,
                 updated_at = excluded.updated_at,
                 body = excluded.body",
            rusqlite::params![
                itinerary.id.to_string(),
                &itinerary.title,
                &itinerary.destination,
                itinerary.created_at.as_millisecond(),
                itinerary.updated_at.as_millisecond(),
                body,
            ],
        )?;
        Ok(())
    }

    /// Loads a single itinerary.
    pub fn load_itinerary(&self, id: Uuid) -> Result<Itinerary> {
        let conn = self.connect()?;
        let row = conn
            .query_row(
                "SELECT id, body FROM itinerary WHERE id = ?1",
                [id.to_string()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        let (id_str, body) = row.ok_or(StorageError::ItineraryNotFound(id))?;
        decode(&id_str, &body)
    }

    /// Lists every itinerary, most recently updated first.
    pub fn list_itineraries(&self) -> Result<Vec<Itinerary>> {
        let conn = self.connect()?;
        list_rows(&conn)
    }

    /// Deletes an itinerary.
    pub fn delete_itinerary(&self, id: Uuid) -> Result<()> {
        let rows = self
            .connect()?
            .execute("DELETE FROM itinerary WHERE id = ?1", [id.to_string()])?;
        if rows == 0 {
            return Err(StorageError::ItineraryNotFound(id));
        }
        Ok(())
    }
}

fn list_rows(conn: &Connection) -> Result<Vec<Itinerary>> {
    let mut stmt = conn.prepare("SELECT id, body FROM itinerary ORDER BY updated_at DESC, id")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    let mut itineraries = Vec::new();
    for row in rows {
        let (id_str, body) = row?;
        itineraries.push(decode(&id_str, &body)?);
    }
    Ok(itineraries)
}

/// Decodes a stored body, checking it against its row id.
fn decode(id_str: &str, body: &str) -> Result<Itinerary> {
    let id = id_str
        .parse::<Uuid>()
        .map_err(|e| StorageError::Corrupt(format!("invalid itinerary id: {e}")))?;
    let itinerary: Itinerary = serde_json::from_str(body)?;
    if itinerary.id != id {
        return Err(StorageError::Corrupt(format!(
            "row {id} holds itinerary {}",
            itinerary.id
        )));
    }
    Ok(itinerary)
}
