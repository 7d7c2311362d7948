//! Order Point API Handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::audit_log;
use crate::auth::{check_point_of_sale, Identity};
use crate::core::AppState;
use crate::db::repository::order_point::{self, OrderFilter};
use crate::db::repository::{company, dining_table, payment_method};
use crate::utils::time::parse_date_range;
use crate::utils::validation::{validate_optional_text, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN};
use shared::models::{
    OrderLineInput, OrderLinesRemove, OrderPoint, OrderPointCreate, OrderPointProcess,
    OrderPointStatus, OrderPointUpdate, SendToKitchen,
};
use shared::query::Page;
use shared::{AppError, AppResult, ErrorCode};

const RESOURCE: &str = "order_point";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub table_id: Option<i64>,
    pub status: Option<String>,
    pub point_of_sale_id: Option<i64>,
    pub subtotal: Option<f64>,
    pub user_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

impl ListQuery {
    fn filter(&self) -> OrderFilter {
        OrderFilter {
            table_id: self.table_id,
            status: parse_status(self.status.as_deref()),
            point_of_sale_id: self.point_of_sale_id,
            subtotal: self.subtotal,
            user_id: self.user_id,
            date_range: parse_date_range(&self.start_date, &self.end_date),
        }
    }
}

/// Unknown status values degrade to no filter rather than erroring.
fn parse_status(raw: Option<&str>) -> Option<OrderPointStatus> {
    match raw {
        Some("PENDING") => Some(OrderPointStatus::Pending),
        Some("PREPARING") => Some(OrderPointStatus::Preparing),
        Some("READY") => Some(OrderPointStatus::Ready),
        Some("SERVED") => Some(OrderPointStatus::Served),
        Some("PAID") => Some(OrderPointStatus::Paid),
        Some("CANCELED") => Some(OrderPointStatus::Canceled),
        _ => None,
    }
}

/// Requested lines must carry a positive quantity and bounded texts.
fn validate_lines(lines: &[OrderLineInput]) -> AppResult<()> {
    for line in lines {
        if line.amount <= 0 {
            return Err(AppError::validation(format!(
                "amount for product {} must be positive",
                line.product_id
            )));
        }
        validate_optional_text(&line.note, "note", MAX_NOTE_LEN)?;
        if let Some(options) = &line.options_selected {
            for option in options {
                if option.len() > MAX_SHORT_TEXT_LEN {
                    return Err(AppError::validation(format!(
                        "option label is too long ({} chars, max {MAX_SHORT_TEXT_LEN})",
                        option.len()
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Load an order and verify the caller may act on it.
async fn find_order(state: &AppState, identity: &Identity, id: i64) -> AppResult<OrderPoint> {
    let order = order_point::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found"))
    })?;
    check_point_of_sale(&state.pool, identity, order.point_of_sale_id).await?;
    Ok(order)
}

/// Whether the caller's company decrements product stock on sale.
async fn stock_tracking(state: &AppState, identity: &Identity) -> AppResult<bool> {
    let company = company::find_by_id(&state.pool, identity.company_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::CompanyNotFound,
                format!("Company {} not found", identity.company_id),
            )
        })?;
    Ok(company.is_stock_active)
}

/// POST /api/order-points - open an order on a dining table
pub async fn create(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<OrderPointCreate>,
) -> AppResult<Json<OrderPoint>> {
    if payload.products.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::OrderEmpty,
            "An order needs at least one product",
        ));
    }
    validate_lines(&payload.products)?;
    check_point_of_sale(&state.pool, &identity, payload.point_of_sale_id).await?;

    dining_table::find_by_id(&state.pool, payload.table_id)
        .await?
        .filter(|t| t.company_id == identity.company_id)
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::TableNotFound,
                format!("Table {} not found", payload.table_id),
            )
        })?;

    let stock_active = stock_tracking(&state, &identity).await?;
    let order = order_point::create(
        &state.pool,
        identity.company_id,
        identity.user_id,
        payload,
        stock_active,
    )
    .await?;

    audit_log!(
        "order_created",
        RESOURCE,
        order.id,
        user_id = identity.user_id,
        table_id = order.table_id,
        subtotal = order.subtotal,
    );
    Ok(Json(order))
}

/// PUT /api/order-points/{id}/products - add products, merging lines
/// that repeat a product already on the order
pub async fn update_products(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
    Json(payload): Json<OrderPointUpdate>,
) -> AppResult<Json<OrderPoint>> {
    if payload.products.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::OrderEmpty,
            "No products to add",
        ));
    }
    validate_lines(&payload.products)?;

    let order = find_order(&state, &identity, id).await?;
    let stock_active = stock_tracking(&state, &identity).await?;
    let order = order_point::update(&state.pool, &order, payload, stock_active).await?;

    audit_log!(
        "order_updated",
        RESOURCE,
        order.id,
        user_id = identity.user_id,
        subtotal = order.subtotal,
    );
    Ok(Json(order))
}

/// DELETE /api/order-points/{id}/products - remove every line of the
/// given products and restore their stock
pub async fn remove_products(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
    Json(payload): Json<OrderLinesRemove>,
) -> AppResult<Json<OrderPoint>> {
    if payload.product_ids.is_empty() {
        return Err(AppError::validation("No products to remove"));
    }

    let order = find_order(&state, &identity, id).await?;
    let stock_active = stock_tracking(&state, &identity).await?;
    let order = order_point::remove_lines(&state.pool, &order, payload, stock_active).await?;

    audit_log!(
        "order_lines_removed",
        RESOURCE,
        order.id,
        user_id = identity.user_id,
        subtotal = order.subtotal,
    );
    Ok(Json(order))
}

/// POST /api/order-points/{id}/send-to-kitchen - fire pending lines
pub async fn send_to_kitchen(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
    Json(payload): Json<SendToKitchen>,
) -> AppResult<Json<OrderPoint>> {
    let order = find_order(&state, &identity, id).await?;
    let order = order_point::send_to_kitchen(&state.pool, &order, payload).await?;

    audit_log!(
        "order_sent_to_kitchen",
        RESOURCE,
        order.id,
        user_id = identity.user_id,
    );
    Ok(Json(order))
}

/// POST /api/order-points/{id}/process - take payment and free the table
pub async fn process(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
    Json(payload): Json<OrderPointProcess>,
) -> AppResult<Json<OrderPoint>> {
    // Non-positive discounts are treated as no discount downstream, but
    // NaN and infinity would poison every derived figure.
    if let Some(discount) = payload.discount
        && !discount.is_finite()
    {
        return Err(AppError::validation("discount must be a finite number"));
    }
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;

    let order = find_order(&state, &identity, id).await?;

    payment_method::find_by_id(&state.pool, payload.payment_method_id)
        .await?
        .filter(|m| m.company_id == identity.company_id && m.is_active)
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::PaymentMethodNotFound,
                format!("Payment method {} not found", payload.payment_method_id),
            )
        })?;

    let payment_method_id = payload.payment_method_id;
    let order = order_point::process(&state.pool, &order, payload, identity.user_id).await?;

    audit_log!(
        "order_processed",
        RESOURCE,
        order.id,
        user_id = identity.user_id,
        payment_method_id = payment_method_id,
        total = order.total,
    );
    Ok(Json(order))
}

/// GET /api/order-points - paginated orders, newest first
pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<OrderPoint>>> {
    let page = query.page.max(1);
    let limit = query.limit.max(1);
    let (orders, total) =
        order_point::find_with_pagination(&state.pool, identity.company_id, &query.filter(), page, limit)
            .await?;
    Ok(Json(Page::new(orders, total, page, limit)))
}

/// GET /api/order-points/{id} - one order with its lines
pub async fn get_by_id(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderPoint>> {
    let order = order_point::find_with_lines(&state.pool, id)
        .await?
        .filter(|o| o.company_id == identity.company_id)
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found"))
        })?;
    Ok(Json(order))
}
