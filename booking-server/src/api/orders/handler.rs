//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::order::{Order, OrderCommand, OrderCommandPayload, OrderEvent, OrderStatus};

use crate::api::run_blocking;
use crate::auth::CurrentActor;
use crate::core::ServerState;
use crate::utils::validation::{
    MAX_ID_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// Create order request
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub provider_id: String,
    pub service_id: String,
    pub slot_id: String,
    #[serde(default)]
    pub design_id: Option<String>,
}

/// Decline request (body `{}` when no reason is given)
#[derive(Debug, Default, Deserialize)]
pub struct DeclineRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProposeTimeRequest {
    pub new_slot_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompleteRequest {
    #[serde(default)]
    pub rating: Option<u8>,
}

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<String>,
}

/// Run one command for the current actor
async fn execute(
    state: &ServerState,
    actor: CurrentActor,
    payload: OrderCommandPayload,
) -> AppResult<Json<Order>> {
    let manager = state.orders_manager.clone();
    let cmd = OrderCommand::new(actor.into_actor(), payload);
    let order = run_blocking(move || Ok(manager.execute_command(cmd)?)).await?;
    Ok(Json(order))
}

/// Create an order on a provider's slot
pub async fn create(
    State(state): State<ServerState>,
    actor: CurrentActor,
    Json(req): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<Order>)> {
    validate_required_text(&req.provider_id, "provider_id", MAX_ID_LEN)?;
    validate_required_text(&req.service_id, "service_id", MAX_ID_LEN)?;
    validate_required_text(&req.slot_id, "slot_id", MAX_ID_LEN)?;
    validate_optional_text(&req.design_id, "design_id", MAX_ID_LEN)?;

    let payload = OrderCommandPayload::CreateOrder {
        provider_id: req.provider_id,
        service_id: req.service_id,
        slot_id: req.slot_id,
        design_id: req.design_id,
    };
    let order = execute(&state, actor, payload).await?;
    Ok((StatusCode::CREATED, order))
}

/// List the actor's own orders, newest first
pub async fn list(
    State(state): State<ServerState>,
    actor: CurrentActor,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()
        .map_err(|e| AppError::validation(e).with_detail("field", "status"))?;

    let manager = state.orders_manager.clone();
    let orders = run_blocking(move || Ok(manager.list_orders(actor.id(), status)?)).await?;
    Ok(Json(orders))
}

/// Get order by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    actor: CurrentActor,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let manager = state.orders_manager.clone();
    let order = run_blocking(move || Ok(manager.get_order_for(&actor.0, &id)?)).await?;
    Ok(Json(order))
}

/// Event history of an order
pub async fn events(
    State(state): State<ServerState>,
    actor: CurrentActor,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<OrderEvent>>> {
    let manager = state.orders_manager.clone();
    let events = run_blocking(move || Ok(manager.get_events(&actor.0, &id)?)).await?;
    Ok(Json(events))
}

pub async fn confirm(
    State(state): State<ServerState>,
    actor: CurrentActor,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    execute(&state, actor, OrderCommandPayload::ConfirmOrder { order_id: id }).await
}

/// Decline
///
/// Provider on a pending order → `DeclineOrder`. The order's client on an
/// `alternative_proposed` order → `DeclineProposedTime` (older clients use
/// this route to turn down a proposal).
pub async fn decline(
    State(state): State<ServerState>,
    actor: CurrentActor,
    Path(id): Path<String>,
    Json(req): Json<DeclineRequest>,
) -> AppResult<Json<Order>> {
    validate_optional_text(&req.reason, "reason", MAX_NOTE_LEN)?;

    let payload = if actor.is_client() {
        let manager = state.orders_manager.clone();
        let (lookup_actor, lookup_id) = (actor.0.clone(), id.clone());
        let order =
            run_blocking(move || Ok(manager.get_order_for(&lookup_actor, &lookup_id)?)).await?;
        if order.status == OrderStatus::AlternativeProposed {
            OrderCommandPayload::DeclineProposedTime { order_id: id }
        } else {
            OrderCommandPayload::DeclineOrder {
                order_id: id,
                reason: req.reason,
            }
        }
    } else {
        OrderCommandPayload::DeclineOrder {
            order_id: id,
            reason: req.reason,
        }
    };

    execute(&state, actor, payload).await
}

pub async fn propose_time(
    State(state): State<ServerState>,
    actor: CurrentActor,
    Path(id): Path<String>,
    Json(req): Json<ProposeTimeRequest>,
) -> AppResult<Json<Order>> {
    validate_required_text(&req.new_slot_id, "new_slot_id", MAX_ID_LEN)?;
    execute(
        &state,
        actor,
        OrderCommandPayload::ProposeTime {
            order_id: id,
            new_slot_id: req.new_slot_id,
        },
    )
    .await
}

pub async fn accept_proposed_time(
    State(state): State<ServerState>,
    actor: CurrentActor,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    execute(
        &state,
        actor,
        OrderCommandPayload::AcceptProposedTime { order_id: id },
    )
    .await
}

pub async fn decline_proposed_time(
    State(state): State<ServerState>,
    actor: CurrentActor,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    execute(
        &state,
        actor,
        OrderCommandPayload::DeclineProposedTime { order_id: id },
    )
    .await
}

pub async fn cancel(
    State(state): State<ServerState>,
    actor: CurrentActor,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    execute(&state, actor, OrderCommandPayload::CancelOrder { order_id: id }).await
}

pub async fn complete(
    State(state): State<ServerState>,
    actor: CurrentActor,
    Path(id): Path<String>,
    Json(req): Json<CompleteRequest>,
) -> AppResult<Json<Order>> {
    execute(
        &state,
        actor,
        OrderCommandPayload::CompleteOrder {
            order_id: id,
            rating: req.rating,
        },
    )
    .await
}
