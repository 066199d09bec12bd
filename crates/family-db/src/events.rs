use anyhow::Result;
use rusqlite::{Connection, Row};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use family_types::models::{Event, EventDraft, EventPatch};
use family_types::validation::ValidationError;

use crate::models::EventRow;
use crate::{Database, OptionalExt, migrations};

const EVENT_COLUMNS: &str =
    "id, title, date, start_time, end_time, location, required_items, username, family_id";

/// Result of [`EventStore::update_in_family`].
#[derive(Debug, PartialEq, Eq)]
pub enum EventUpdate {
    /// Number of records modified.
    Applied(usize),
    /// No event with that id in the given family.
    NotFound,
    /// The patched event would be invalid; nothing was written.
    Rejected(ValidationError),
}

/// Event store: one SQLite file holding family events.
///
/// The family id is the only partition key. Listing returns insertion order.
pub struct EventStore {
    db: Database,
}

impl EventStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            db: Database::open(path, migrations::run_events)?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            db: Database::open_in_memory(migrations::run_events)?,
        })
    }

    pub fn add_event(&self, draft: &EventDraft, username: &str, family_id: &str) -> Result<EventRow> {
        let row = EventRow {
            id: Uuid::new_v4().to_string(),
            title: draft.title.clone(),
            date: draft.date.clone(),
            start_time: draft.start_time.clone(),
            end_time: draft.end_time.clone(),
            location: draft.location.clone(),
            required_items: draft.required_items.clone(),
            username: username.to_string(),
            family_id: family_id.to_string(),
        };

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO events (id, title, date, start_time, end_time, location, required_items, username, family_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    &row.id,
                    &row.title,
                    &row.date,
                    &row.start_time,
                    &row.end_time,
                    &row.location,
                    &row.required_items,
                    &row.username,
                    &row.family_id,
                ],
            )?;
            Ok(())
        })?;

        info!("Event {} added to family {} by {}", row.id, row.family_id, row.username);
        Ok(row)
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<EventRow>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"),
                [id],
                event_from_row,
            )
            .optional()
        })
    }

    pub fn list_by_family(&self, family_id: &str) -> Result<Vec<EventRow>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {EVENT_COLUMNS} FROM events WHERE family_id = ?1 ORDER BY rowid"
            ))?;
            let rows = stmt
                .query_map([family_id], event_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Merge the supplied fields into the stored event; returns the number of
    /// records modified (0 if the id is unknown).
    pub fn update(&self, id: &str, patch: &EventPatch) -> Result<usize> {
        let updated = self.db.with_conn(|conn| apply_patch(conn, id, patch))?;

        info!("Event {} updated, {} records modified", id, updated);
        Ok(updated)
    }

    /// Patch an event of `family_id`, provided the merged event still
    /// validates. The read, the check and the write hold one connection lock,
    /// so concurrent patches can't combine into an invalid event.
    pub fn update_in_family(&self, id: &str, family_id: &str, patch: &EventPatch) -> Result<EventUpdate> {
        let outcome = self.db.with_conn(|conn| {
            let existing = conn
                .query_row(
                    &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1 AND family_id = ?2"),
                    [id, family_id],
                    event_from_row,
                )
                .optional()?;
            let Some(existing) = existing else {
                return Ok(EventUpdate::NotFound);
            };

            if let Err(e) = Event::from(existing).draft().merged(patch).validate() {
                return Ok(EventUpdate::Rejected(e));
            }
            Ok(EventUpdate::Applied(apply_patch(conn, id, patch)?))
        })?;

        if let EventUpdate::Applied(updated) = outcome {
            info!("Event {} updated, {} records modified", id, updated);
        }
        Ok(outcome)
    }

    /// Returns the number of records removed; an unknown id removes nothing.
    pub fn delete(&self, id: &str) -> Result<usize> {
        let removed = self
            .db
            .with_conn(|conn| Ok(conn.execute("DELETE FROM events WHERE id = ?1", [id])?))?;

        info!("Event {} deleted, {} records removed", id, removed);
        Ok(removed)
    }
}

fn apply_patch(conn: &Connection, id: &str, patch: &EventPatch) -> Result<usize> {
    Ok(conn.execute(
        "UPDATE events SET
            title          = COALESCE(?2, title),
            date           = COALESCE(?3, date),
            start_time     = COALESCE(?4, start_time),
            end_time       = COALESCE(?5, end_time),
            location       = COALESCE(?6, location),
            required_items = COALESCE(?7, required_items)
         WHERE id = ?1",
        rusqlite::params![
            id,
            patch.title,
            patch.date,
            patch.start_time,
            patch.end_time,
            patch.location,
            patch.required_items,
        ],
    )?)
}

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        id: row.get(0)?,
        title: row.get(1)?,
        date: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        location: row.get(5)?,
        required_items: row.get(6)?,
        username: row.get(7)?,
        family_id: row.get(8)?,
    })
}
