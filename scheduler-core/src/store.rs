//! Event store with recurring-series consistency.
//!
//! A series is one master row (`rec_type` holds the rule) plus detached
//! occurrence rows pointing at it through `event_pid`. The rules:
//!
//! - Editing a master with a rule purges its detached occurrences first,
//!   since they were computed against the old rule.
//! - Deleting a detached occurrence keeps the row as a `"none"` tombstone so
//!   the series still knows that date is excluded.
//! - Deleting a master takes its detached occurrences with it.
//!
//! Update and delete each run in one `IMMEDIATE` transaction, so a failure part
//! way through leaves the table as it was. Taking the write lock up front makes
//! concurrent writers queue on `busy_timeout` instead of failing on a
//! read-to-write upgrade.

use rusqlite::{Connection, TransactionBehavior};
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::db::{ConnectionPool, EventRepo, open_pool, run_migrations};
use crate::error::{StoreError, StoreResult};
use crate::event::{EventData, EventRole, EventView, EventWindow, REC_TYPE_NONE};
use crate::protocol::{Action, ActionResponse};

#[derive(Clone)]
pub struct EventStore {
    pool: ConnectionPool,
}

impl EventStore {
    /// Open the configured database and bring its schema up to date.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        let pool = open_pool(config)?;
        let store = Self::from_pool(pool)?;
        info!(
            path = %config.path.display(),
            pool_size = config.pool_size,
            "event store ready"
        );
        Ok(store)
    }

    pub fn from_pool(pool: ConnectionPool) -> StoreResult<Self> {
        let mut conn = pool.get()?;
        let applied = run_migrations(&mut conn)?;
        if applied > 0 {
            info!(applied, "schema migrated");
        }
        drop(conn);
        Ok(EventStore { pool })
    }

    // READS:

    /// Events overlapping `window`, or every event when no window is given,
    /// with dates rendered for display.
    pub async fn list(&self, window: Option<EventWindow>) -> StoreResult<Vec<EventView>> {
        self.with_conn("list", move |conn| {
            let events = EventRepo::list(conn, window.as_ref())?;
            debug!(count = events.len(), windowed = window.is_some(), "listed events");
            Ok(events.iter().map(|event| event.to_view()).collect())
        })
        .await
    }

    // WRITES:

    /// Create one row. Reports `deleted` instead of `inserted` for a `"none"`
    /// row, which is how the client excludes a date from a series.
    pub async fn insert(&self, data: EventData) -> StoreResult<ActionResponse> {
        self.with_conn("insert", move |conn| {
            let tid = EventRepo::insert(conn, &data)?;
            let action = Action::for_insert(data.rec_type.as_deref());
            debug!(tid, ?action, "inserted event");
            Ok(ActionResponse::with_tid(action, tid))
        })
        .await
    }

    pub async fn update(&self, id: i64, data: EventData) -> StoreResult<ActionResponse> {
        self.with_conn("update", move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let action = apply_update(&tx, id, &data)?;
            tx.commit()?;
            Ok(ActionResponse::new(action))
        })
        .await
    }

    /// Delete an event, honouring series semantics.
    ///
    /// Reports `updated` when the target is a detached occurrence (it becomes a
    /// tombstone rather than disappearing) and `deleted` otherwise. Fails with
    /// [`StoreError::EventNotFound`] when no row has this id.
    pub async fn delete(&self, id: i64) -> StoreResult<ActionResponse> {
        self.with_conn("delete", move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let action = apply_delete(&tx, id)?;
            tx.commit()?;
            Ok(ActionResponse::new(action))
        })
        .await
    }

    /// Run blocking SQLite work off the async runtime on a pooled connection.
    ///
    /// Waits for a free connection when the pool is exhausted.
    async fn with_conn<T, F>(&self, op: &'static str, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Internal(format!("{op} task failed: {e}")))?
    }
}

/// Purge stale occurrences, then overwrite the row. The purge runs first so
/// `event_pid = id` still matches the occurrences of the series as it was.
fn apply_update(conn: &Connection, id: i64, data: &EventData) -> StoreResult<Action> {
    if data.has_recurrence_rule() {
        let removed = EventRepo::delete_occurrences(conn, id)?;
        debug!(id, removed, "cleared detached occurrences of edited series");
    }

    if EventRepo::update(conn, id, data)? == 0 {
        warn!(id, "update matched no event");
    }
    debug!(id, "updated event");

    Ok(Action::Updated)
}

fn apply_delete(conn: &Connection, id: i64) -> StoreResult<Action> {
    let event = EventRepo::fetch(conn, id)?.ok_or(StoreError::EventNotFound(id))?;

    match event.role() {
        EventRole::Occurrence { master_id } => {
            debug!(id, master_id, "excluding occurrence from series");
            let mut data = EventData::from(event);
            data.rec_type = Some(REC_TYPE_NONE.to_string());
            apply_update(conn, id, &data)
        }
        EventRole::Master { rule } => {
            let removed = EventRepo::delete_occurrences(conn, id)?;
            EventRepo::delete(conn, id)?;
            debug!(id, %rule, removed, "deleted series");
            Ok(Action::Deleted)
        }
        EventRole::Plain => {
            EventRepo::delete(conn, id)?;
            debug!(id, "deleted event");
            Ok(Action::Deleted)
        }
    }
}
