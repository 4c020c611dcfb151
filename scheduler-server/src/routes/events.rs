//! Event endpoints

use std::fmt;

use axum::{
    Form, Json, Router,
    extract::{FromRequest, Path, Query, Request, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use chrono::NaiveDateTime;
use scheduler_core::utils::parse_timestamp;
use scheduler_core::{ActionResponse, EventData, EventView, EventWindow, StoreError, StoreResult};
use serde::{
    Deserialize, Deserializer,
    de::{self, Unexpected, Visitor},
};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/{id}", put(update_event).delete(delete_event))
}

/// Optional `?from=…&to=…` window; ignored unless both are given.
#[derive(Deserialize, Default)]
pub struct WindowQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl WindowQuery {
    fn window(&self) -> StoreResult<Option<EventWindow>> {
        let from = self.from.as_deref().filter(|s| !s.trim().is_empty());
        let to = self.to.as_deref().filter(|s| !s.trim().is_empty());

        match (from, to) {
            (Some(from), Some(to)) => Ok(Some(EventWindow::new(
                parse_timestamp(from)?,
                parse_timestamp(to)?,
            ))),
            _ => Ok(None),
        }
    }
}

/// Event fields as sent by the scheduler UI.
///
/// Extra fields the client sends along (its own `id`, editor status) are ignored.
#[derive(Deserialize, Default, Debug)]
pub struct EventForm {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub event_pid: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub event_length: Option<i64>,
    pub rec_type: Option<String>,
}

impl EventForm {
    pub fn into_event_data(self) -> StoreResult<EventData> {
        Ok(EventData {
            start_date: required_timestamp("start_date", self.start_date)?,
            end_date: required_timestamp("end_date", self.end_date)?,
            text: self.text.unwrap_or_default(),
            event_pid: self.event_pid,
            event_length: self.event_length,
            rec_type: self.rec_type,
        })
    }
}

fn required_timestamp(field: &str, value: Option<String>) -> StoreResult<NaiveDateTime> {
    let value = value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| StoreError::InvalidInput(format!("{field} is required")))?;
    parse_timestamp(&value)
}

/// Accepts a number or a numeric string. An empty string or null is absent.
fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientI64;

    impl<'de> Visitor<'de> for LenientI64 {
        type Value = Option<i64>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an integer or a numeric string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            i64::try_from(v)
                .map(Some)
                .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse()
                .map(Some)
                .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
            d.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(LenientI64)
}

/// Request body extractor: JSON when the client says so, url-encoded form otherwise.
pub struct EventPayload(pub EventForm);

impl<S> FromRequest<S> for EventPayload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        if is_json {
            let Json(form) = Json::<EventForm>::from_request(req, state)
                .await
                .map_err(|rejection| {
                    (rejection.status(), Json(ActionResponse::error(rejection.body_text())))
                        .into_response()
                })?;
            Ok(EventPayload(form))
        } else {
            let Form(form) = Form::<EventForm>::from_request(req, state)
                .await
                .map_err(|rejection| {
                    (rejection.status(), Json(ActionResponse::error(rejection.body_text())))
                        .into_response()
                })?;
            Ok(EventPayload(form))
        }
    }
}

/// GET /events - List events, optionally limited to `?from=&to=`
async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Vec<EventView>>, AppError> {
    let window = query.window()?;
    let events = state.store().list(window).await?;
    Ok(Json(events))
}

/// POST /events - Create an event (or a series exclusion)
async fn create_event(
    State(state): State<AppState>,
    EventPayload(form): EventPayload,
) -> Result<Json<ActionResponse>, AppError> {
    let data = form.into_event_data()?;
    Ok(Json(state.store().insert(data).await?))
}

/// PUT /events/{id} - Update an event
async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    EventPayload(form): EventPayload,
) -> Result<Json<ActionResponse>, AppError> {
    let data = form.into_event_data()?;
    Ok(Json(state.store().update(id, data).await?))
}

/// DELETE /events/{id} - Delete an event
async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(state.store().delete(id).await?))
}
