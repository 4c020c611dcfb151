//! Action tags exchanged with the scheduler UI.
//!
//! Every write answers with an action tag the client uses to reconcile its
//! local copy. Inserts also carry the storage id (`tid`); errors carry a message.

use serde::{Deserialize, Serialize};

use crate::event::REC_TYPE_NONE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Inserted,
    Updated,
    Deleted,
    Error,
}

impl Action {
    /// Tag reported for an insert.
    ///
    /// The client excludes a single date from a series by inserting a `"none"`
    /// occurrence, and expects that insert to be acknowledged as `deleted`.
    pub fn for_insert(rec_type: Option<&str>) -> Self {
        if rec_type == Some(REC_TYPE_NONE) {
            Action::Deleted
        } else {
            Action::Inserted
        }
    }
}

/// Response body for insert, update, delete and failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tid: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionResponse {
    pub fn new(action: Action) -> Self {
        ActionResponse {
            action,
            tid: None,
            message: None,
        }
    }

    pub fn with_tid(action: Action, tid: i64) -> Self {
        ActionResponse {
            action,
            tid: Some(tid),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ActionResponse {
            action: Action::Error,
            tid: None,
            message: Some(message.into()),
        }
    }
}
