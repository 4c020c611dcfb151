//! Event statements. Stateless: every function takes the connection (or
//! transaction) it should run on, and all values are bound parameters.

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::StoreResult;
use crate::event::{Event, EventData, EventWindow};

const SELECT_EVENT: &str =
    "SELECT id, start_date, end_date, text, event_pid, event_length, rec_type FROM events";

pub struct EventRepo;

impl EventRepo {
    pub fn fetch(conn: &Connection, id: i64) -> StoreResult<Option<Event>> {
        let event = conn
            .query_row(
                &format!("{SELECT_EVENT} WHERE id = ?1 LIMIT 1"),
                params![id],
                event_from_row,
            )
            .optional()?;
        Ok(event)
    }

    /// All rows, or only those overlapping `[from, to)` when a window is given.
    pub fn list(conn: &Connection, window: Option<&EventWindow>) -> StoreResult<Vec<Event>> {
        let events = match window {
            Some(window) => {
                let mut stmt = conn.prepare(&format!(
                    "{SELECT_EVENT} WHERE end_date >= ?1 AND start_date < ?2 ORDER BY id"
                ))?;
                let rows = stmt
                    .query_map(params![window.from, window.to], event_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(&format!("{SELECT_EVENT} ORDER BY id"))?;
                let rows = stmt
                    .query_map([], event_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(events)
    }

    /// Insert a row and return its generated id.
    pub fn insert(conn: &Connection, data: &EventData) -> StoreResult<i64> {
        conn.execute(
            "INSERT INTO events (start_date, end_date, text, event_pid, event_length, rec_type) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                data.start_date,
                data.end_date,
                data.text,
                data.event_pid_or_default(),
                data.event_length_or_default(),
                data.rec_type,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Overwrite every field of row `id`. Returns the number of rows changed.
    pub fn update(conn: &Connection, id: i64, data: &EventData) -> StoreResult<usize> {
        let changed = conn.execute(
            "UPDATE events SET start_date = ?1, end_date = ?2, text = ?3, \
             event_pid = ?4, event_length = ?5, rec_type = ?6 WHERE id = ?7",
            params![
                data.start_date,
                data.end_date,
                data.text,
                data.event_pid_or_default(),
                data.event_length_or_default(),
                data.rec_type,
                id,
            ],
        )?;
        Ok(changed)
    }

    /// Remove every detached occurrence of series `master_id`.
    pub fn delete_occurrences(conn: &Connection, master_id: i64) -> StoreResult<usize> {
        let removed = conn.execute("DELETE FROM events WHERE event_pid = ?1", params![master_id])?;
        Ok(removed)
    }

    pub fn delete(conn: &Connection, id: i64) -> StoreResult<usize> {
        let removed = conn.execute("DELETE FROM events WHERE id = ?1", params![id])?;
        Ok(removed)
    }
}

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get(0)?,
        start_date: row.get(1)?,
        end_date: row.get(2)?,
        text: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        // NULL from rows written outside this crate reads as "no master"
        event_pid: row.get::<_, Option<i64>>(4)?.unwrap_or(0),
        event_length: row.get::<_, Option<i64>>(5)?.unwrap_or(0),
        rec_type: row.get(6)?,
    })
}
