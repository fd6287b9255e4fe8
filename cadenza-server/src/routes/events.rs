//! Event series endpoints

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cadenza_core::{
    NewSeries, Recurrence, Series, SeriesOccurrences, UpdateData, UpdatePatch, UpdateScope,
};

use crate::routes::{requester_id, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event))
        .route("/events/mine/{horizon}", get(my_events))
        .route("/events/raw/{event_id}", get(raw_event))
        .route("/events/{event_id}/{index}", put(update_event))
        .route("/events/{event_id}", delete(delete_event))
}

/// Request body for creating a series
#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub participants: Vec<String>,
    pub recurrence: Recurrence,
}

#[derive(Serialize)]
pub struct CreateEventResponse {
    pub event_id: Uuid,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// POST /events - Create a new series
async fn create_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateEventRequest>,
) -> Result<Json<CreateEventResponse>, AppError> {
    let creator = requester_id(&headers)?;

    let event_id = state
        .service
        .create_series(
            creator,
            NewSeries {
                title: req.title,
                description: req.description,
                start_time: req.start_time,
                end_time: req.end_time,
                participants: req.participants,
                recurrence: req.recurrence,
            },
        )
        .await?;

    Ok(Json(CreateEventResponse { event_id }))
}

/// GET /events/mine/:horizon - Expanded occurrences of the caller's series,
/// up to the RFC 3339 horizon
async fn my_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(horizon): Path<DateTime<Utc>>,
) -> Result<Json<Vec<SeriesOccurrences>>, AppError> {
    let creator = requester_id(&headers)?;
    let occurrences = state.service.list_occurrences(creator, horizon).await?;
    Ok(Json(occurrences))
}

/// GET /events/raw/:event_id - The stored series document, no expansion
async fn raw_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Series>, AppError> {
    let series = state.service.get_raw_series(event_id).await?;
    Ok(Json(series))
}

/// Request body for updating occurrences of a series
#[derive(Deserialize)]
pub struct UpdateEventRequest {
    pub scope: UpdateScope,
    pub title: Option<String>,
    pub description: Option<String>,
    pub new_start_time: Option<DateTime<Utc>>,
    pub new_end_time: Option<DateTime<Utc>>,
    pub new_participants: Option<Vec<String>>,
    pub participants_to_remove: Option<Vec<String>>,
}

/// PUT /events/:event_id/:index - Append a layered update against one
/// occurrence index
async fn update_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((event_id, index)): Path<(Uuid, u32)>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let requester = requester_id(&headers)?;

    let patch = UpdatePatch {
        scope: req.scope,
        data: UpdateData {
            title: req.title,
            description: req.description,
            new_start_time: req.new_start_time,
            new_end_time: req.new_end_time,
            new_participants: req.new_participants,
            participants_to_remove: req.participants_to_remove,
        },
    };
    state
        .service
        .apply_update(requester, event_id, index, patch)
        .await?;

    Ok(Json(SuccessResponse { success: true }))
}

/// DELETE /events/:event_id - Delete a series
async fn delete_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, AppError> {
    let requester = requester_id(&headers)?;
    state.service.delete_series(requester, event_id).await?;
    Ok(Json(SuccessResponse { success: true }))
}
