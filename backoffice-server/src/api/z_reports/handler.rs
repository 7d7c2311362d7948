//! Z Report API Handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::audit_log;
use crate::auth::{check_point_of_sale, Identity};
use crate::core::AppState;
use crate::db::repository::z_report::{self, ReportFilter};
use crate::db::repository::{cash_session, point_of_sale};
use crate::utils::time::parse_date_range;
use crate::utils::validation::{validate_optional_text, MAX_NOTE_LEN};
use shared::models::{
    ZReport, ZReportClose, ZReportGenerate, ZReportPrint, ZReportStatus, ZReportsSummary,
};
use shared::query::Page;
use shared::{AppError, AppResult, ErrorCode};

const RESOURCE: &str = "z_report";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub point_of_sale_id: Option<i64>,
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
    fn filter(&self) -> ReportFilter {
        ReportFilter {
            point_of_sale_id: self.point_of_sale_id,
            status: parse_status(self.status.as_deref()),
            date_range: parse_date_range(&self.start_date, &self.end_date),
        }
    }
}

/// Unknown status values degrade to no filter rather than erroring.
fn parse_status(raw: Option<&str>) -> Option<ZReportStatus> {
    match raw {
        Some("GENERATED") => Some(ZReportStatus::Generated),
        Some("CLOSED") => Some(ZReportStatus::Closed),
        _ => None,
    }
}

/// Load a report and verify the caller may act on it.
async fn find_report(state: &AppState, identity: &Identity, id: i64) -> AppResult<ZReport> {
    let report = z_report::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::ReportNotFound, format!("Z report {id} not found"))
    })?;
    check_point_of_sale(&state.pool, identity, report.point_of_sale_id).await?;
    Ok(report)
}

/// POST /api/z-reports/generate - snapshot a closed session into a report
pub async fn generate(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<ZReportGenerate>,
) -> AppResult<Json<ZReport>> {
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;

    let session = cash_session::find_by_id(&state.pool, payload.cash_session_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::SessionNotFound,
                format!("Cash session {} not found", payload.cash_session_id),
            )
        })?;
    check_point_of_sale(&state.pool, &identity, session.point_of_sale_id).await?;

    let report = z_report::generate(
        &state.pool,
        &session,
        payload.notes,
        identity.user_id,
        state.config.number_retry_max,
    )
    .await?;

    audit_log!(
        "report_generated",
        RESOURCE,
        report.id,
        user_id = identity.user_id,
        cash_session_id = session.id,
        gross_sales = report.gross_sales,
    );
    Ok(Json(report))
}

/// POST /api/z-reports/{id}/close - lock a generated report
pub async fn close(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
    Json(payload): Json<ZReportClose>,
) -> AppResult<Json<ZReport>> {
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;

    let report = find_report(&state, &identity, id).await?;
    let report = z_report::close(&state.pool, &report, payload, identity.user_id).await?;

    audit_log!(
        "report_closed",
        RESOURCE,
        report.id,
        user_id = identity.user_id,
    );
    Ok(Json(report))
}

/// GET /api/z-reports - paginated reports, newest first
pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<ZReport>>> {
    let page = query.page.max(1);
    let limit = query.limit.max(1);
    let (reports, total) =
        z_report::find_with_pagination(&state.pool, identity.company_id, &query.filter(), page, limit)
            .await?;
    Ok(Json(Page::new(reports, total, page, limit)))
}

/// GET /api/z-reports/summary - aggregate over the filtered set
pub async fn summary(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ZReportsSummary>> {
    let reports = z_report::list_filtered(&state.pool, identity.company_id, &query.filter()).await?;
    Ok(Json(ZReportsSummary::from_reports(&reports)))
}

/// GET /api/z-reports/{id} - one report with payment and product breakdowns
pub async fn get_by_id(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
) -> AppResult<Json<ZReport>> {
    let report = z_report::find_with_children(&state.pool, id)
        .await?
        .filter(|r| r.company_id == identity.company_id)
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::ReportNotFound, format!("Z report {id} not found"))
        })?;
    Ok(Json(report))
}

/// GET /api/z-reports/{id}/print - assembled print document
pub async fn print(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i64>,
) -> AppResult<Json<ZReportPrint>> {
    let report = z_report::find_with_children(&state.pool, id)
        .await?
        .filter(|r| r.company_id == identity.company_id)
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::ReportNotFound, format!("Z report {id} not found"))
        })?;

    // The point of sale name heads the printed document.
    let point_of_sale = point_of_sale::find_by_id(&state.pool, report.point_of_sale_id)
        .await?
        .map(|p| p.name)
        .unwrap_or_else(|| format!("Point of sale {}", report.point_of_sale_id));

    Ok(Json(report.print_document(&point_of_sale)))
}
