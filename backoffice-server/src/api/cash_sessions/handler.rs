//! Cash Session API Handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::audit_log;
use crate::auth::{check_point_of_sale, Identity};
use crate::core::AppState;
use crate::db::repository::cash_session::{self, SessionFilter};
use crate::utils::time::parse_date_range;
use crate::utils::validation::{validate_cash, validate_optional_text, MAX_NOTE_LEN};
use shared::models::{
    CashCloseSummary, CashSession, CashSessionClose, CashSessionCreate, CashSessionStatus,
    SessionsSummary,
};
use shared::query::Page;
use shared::{AppError, AppResult, ErrorCode};

const RESOURCE: &str = "cash_session";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub point_of_sale_id: Option<i64>,
    pub user_id: Option<i64>,
    pub status: Option<String>,
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
    fn filter(&self) -> SessionFilter {
        SessionFilter {
            point_of_sale_id: self.point_of_sale_id,
            user_id: self.user_id,
            status: parse_status(self.status.as_deref()),
            date_range: parse_date_range(&self.start_date, &self.end_date),
        }
    }
}

/// Unknown status values degrade to no filter rather than erroring.
fn parse_status(raw: Option<&str>) -> Option<CashSessionStatus> {
    match raw {
        Some("OPEN") => Some(CashSessionStatus::Open),
        Some("CLOSED") => Some(CashSessionStatus::Closed),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
pub struct ActiveQuery {
    pub point_of_sale_id: i64,
    pub user_id: Option<i64>,
}

/// Closed session plus its reconciliation figures
#[derive(Debug, Serialize)]
pub struct CloseResponse {
    pub session: CashSession,
    pub summary: CashCloseSummary,
}

/// POST /api/cash-sessions - open a session on a point of sale
pub async fn create(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<CashSessionCreate>,
) -> AppResult<Json<CashSession>> {
    validate_cash(payload.initial_cash, "initial_cash")?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    check_point_of_sale(&state.pool, &identity, payload.point_of_sale_id).await?;

    let session = cash_session::create(
        &state.pool,
        identity.company_id,
        identity.user_id,
        payload,
        state.config.number_retry_max,
    )
    .await?;

    audit_log!(
        "session_opened",
        RESOURCE,
        session.id,
        user_id = identity.user_id,
        point_of_sale_id = session.point_of_sale_id,
        initial_cash = session.initial_cash,
    );
    Ok(Json(session))
}

/// POST /api/cash-sessions/{id}/close - close and reconcile a session
pub async fn close(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
    Json(payload): Json<CashSessionClose>,
) -> AppResult<Json<CloseResponse>> {
    validate_cash(payload.final_cash, "final_cash")?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;

    let session = cash_session::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::SessionNotFound, format!("Cash session {id} not found"))
    })?;
    check_point_of_sale(&state.pool, &identity, session.point_of_sale_id).await?;

    let (session, summary) = cash_session::close(&state.pool, &session, payload, identity.user_id).await?;

    audit_log!(
        "session_closed",
        RESOURCE,
        session.id,
        user_id = identity.user_id,
        final_cash = summary.final_cash,
        cash_difference = summary.cash_difference,
    );
    Ok(Json(CloseResponse { session, summary }))
}

/// GET /api/cash-sessions/active - the open session on a point of sale,
/// optionally narrowed to one user
pub async fn get_active(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<ActiveQuery>,
) -> AppResult<Json<Option<CashSession>>> {
    check_point_of_sale(&state.pool, &identity, query.point_of_sale_id).await?;
    let session = cash_session::find_active(&state.pool, query.point_of_sale_id, query.user_id).await?;
    Ok(Json(session))
}

/// GET /api/cash-sessions - paginated session history, newest first
pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<CashSession>>> {
    let page = query.page.max(1);
    let limit = query.limit.max(1);
    let (sessions, total) =
        cash_session::find_with_pagination(&state.pool, identity.company_id, &query.filter(), page, limit)
            .await?;
    Ok(Json(Page::new(sessions, total, page, limit)))
}

/// GET /api/cash-sessions/summary - aggregate over the filtered set
pub async fn summary(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<SessionsSummary>> {
    let sessions =
        cash_session::list_filtered(&state.pool, identity.company_id, &query.filter()).await?;
    Ok(Json(SessionsSummary::from_sessions(&sessions)))
}

/// GET /api/cash-sessions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
) -> AppResult<Json<CashSession>> {
    let session = cash_session::find_by_id(&state.pool, id)
        .await?
        .filter(|s| s.company_id == identity.company_id)
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::SessionNotFound, format!("Cash session {id} not found"))
        })?;
    Ok(Json(session))
}
