//! Catalog API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{DesignInfo, DesignUpsert, ServiceInfo, ServiceUpsert};

use crate::api::run_blocking;
use crate::audit_log;
use crate::auth::CurrentActor;
use crate::core::ServerState;
use crate::utils::validation::{MAX_ID_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

fn require_provider(actor: &CurrentActor) -> AppResult<()> {
    if actor.is_provider() {
        Ok(())
    } else {
        Err(AppError::permission_denied("Only providers manage the catalog"))
    }
}

pub async fn upsert_service(
    State(state): State<ServerState>,
    actor: CurrentActor,
    Path(id): Path<String>,
    Json(payload): Json<ServiceUpsert>,
) -> AppResult<Json<ServiceInfo>> {
    require_provider(&actor)?;
    validate_required_text(&id, "id", MAX_ID_LEN)?;

    let catalog = state.catalog.clone();
    let provider_id = actor.id().to_string();
    let service =
        run_blocking(move || catalog.upsert_service(&provider_id, &id, payload)).await?;

    audit_log!(actor.id(), "catalog.service.upsert", service.id, price = %service.price);
    Ok(Json(service))
}

pub async fn upsert_design(
    State(state): State<ServerState>,
    actor: CurrentActor,
    Path(id): Path<String>,
    Json(payload): Json<DesignUpsert>,
) -> AppResult<Json<DesignInfo>> {
    require_provider(&actor)?;
    validate_required_text(&id, "id", MAX_ID_LEN)?;

    let catalog = state.catalog.clone();
    let provider_id = actor.id().to_string();
    let design = run_blocking(move || catalog.upsert_design(&provider_id, &id, payload)).await?;

    audit_log!(actor.id(), "catalog.design.upsert", design.id, price = %design.price);
    Ok(Json(design))
}

/// Services of a provider (served from the cache)
pub async fn list_services(
    State(state): State<ServerState>,
    _actor: CurrentActor,
    Path(provider_id): Path<String>,
) -> Json<Vec<ServiceInfo>> {
    Json(state.catalog.list_services(&provider_id))
}

pub async fn list_designs(
    State(state): State<ServerState>,
    _actor: CurrentActor,
    Path(provider_id): Path<String>,
) -> Json<Vec<DesignInfo>> {
    Json(state.catalog.list_designs(&provider_id))
}
