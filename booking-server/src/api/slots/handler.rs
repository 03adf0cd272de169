//! Slot API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::error::ApiResponse;
use shared::schedule::TimeSlot;

use crate::api::run_blocking;
use crate::audit_log;
use crate::auth::CurrentActor;
use crate::core::ServerState;
use crate::slots::NewSlot;
use crate::utils::time::{parse_date, parse_time};
use crate::utils::{AppError, AppResult};

/// Create slot request (provider wall clock)
#[derive(Debug, Deserialize)]
pub struct CreateSlotRequest {
    /// YYYY-MM-DD
    pub date: String,
    /// HH:MM
    pub start_time: String,
    /// HH:MM
    pub end_time: String,
}

fn require_provider(actor: &CurrentActor) -> AppResult<()> {
    if actor.is_provider() {
        Ok(())
    } else {
        Err(AppError::permission_denied("Only providers manage slots"))
    }
}

pub async fn create(
    State(state): State<ServerState>,
    actor: CurrentActor,
    Json(req): Json<CreateSlotRequest>,
) -> AppResult<(StatusCode, Json<TimeSlot>)> {
    require_provider(&actor)?;
    let input = NewSlot {
        date: parse_date(&req.date)?,
        start_time: parse_time(&req.start_time)?,
        end_time: parse_time(&req.end_time)?,
    };

    let slots = state.slots.clone();
    let provider_id = actor.id().to_string();
    let slot = run_blocking(move || {
        Ok(slots.create_slot(&provider_id, input, shared::util::now_millis())?)
    })
    .await?;

    audit_log!(actor.id(), "slot.create", slot.id);
    Ok((StatusCode::CREATED, Json(slot)))
}

pub async fn block(
    State(state): State<ServerState>,
    actor: CurrentActor,
    Path(id): Path<String>,
) -> AppResult<Json<TimeSlot>> {
    require_provider(&actor)?;
    let slots = state.slots.clone();
    let provider_id = actor.id().to_string();
    let slot = run_blocking(move || {
        Ok(slots.block(&provider_id, &id, shared::util::now_millis())?)
    })
    .await?;

    audit_log!(actor.id(), "slot.block", slot.id);
    Ok(Json(slot))
}

pub async fn unblock(
    State(state): State<ServerState>,
    actor: CurrentActor,
    Path(id): Path<String>,
) -> AppResult<Json<TimeSlot>> {
    require_provider(&actor)?;
    let slots = state.slots.clone();
    let provider_id = actor.id().to_string();
    let slot = run_blocking(move || {
        Ok(slots.unblock(&provider_id, &id, shared::util::now_millis())?)
    })
    .await?;

    audit_log!(actor.id(), "slot.unblock", slot.id);
    Ok(Json(slot))
}

pub async fn remove(
    State(state): State<ServerState>,
    actor: CurrentActor,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    require_provider(&actor)?;
    let slots = state.slots.clone();
    let provider_id = actor.id().to_string();
    let slot_id = id.clone();
    run_blocking(move || Ok(slots.remove_slot(&provider_id, &slot_id)?)).await?;

    audit_log!(actor.id(), "slot.delete", id);
    Ok(Json(ApiResponse::ok()))
}
