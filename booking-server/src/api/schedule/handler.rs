//! Schedule API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Duration;
use serde::Deserialize;
use shared::schedule::DaySchedule;

use crate::api::run_blocking;
use crate::auth::CurrentActor;
use crate::core::ServerState;
use crate::utils::time::{parse_date, today, validate_range};
use crate::utils::{AppError, AppResult};

/// Days returned when `to` is omitted
const DEFAULT_RANGE_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    /// YYYY-MM-DD, defaults to today in the business time zone
    pub from: Option<String>,
    /// YYYY-MM-DD, inclusive
    pub to: Option<String>,
    #[serde(default)]
    pub all: bool,
}

pub async fn get_schedule(
    State(state): State<ServerState>,
    actor: CurrentActor,
    Path(provider_id): Path<String>,
    Query(query): Query<ScheduleQuery>,
) -> AppResult<Json<Vec<DaySchedule>>> {
    let from = match query.from.as_deref() {
        Some(s) => parse_date(s)?,
        None => today(state.config.timezone),
    };
    let to = match query.to.as_deref() {
        Some(s) => parse_date(s)?,
        None => from + Duration::days(DEFAULT_RANGE_DAYS - 1),
    };
    validate_range(from, to, state.config.max_schedule_range_days)?;

    if query.all && !(actor.is_provider() && actor.id() == provider_id) {
        return Err(AppError::permission_denied(
            "Only the provider may list slots of every status",
        ));
    }

    let slots = state.slots.clone();
    let include_all = query.all;
    let days =
        run_blocking(move || Ok(slots.schedule(&provider_id, from, to, include_all)?)).await?;
    Ok(Json(days))
}
