//! Cash Session Model

use serde::{Deserialize, Serialize};

use crate::util::round2;

/// Cash session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum CashSessionStatus {
    #[default]
    Open,
    Closed,
}

impl CashSessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CashSessionStatus::Open => "OPEN",
            CashSessionStatus::Closed => "CLOSED",
        }
    }
}

impl std::fmt::Display for CashSessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cash session entity - one drawer count cycle on a point of sale
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CashSession {
    pub id: i64,
    pub company_id: i64,
    pub point_of_sale_id: i64,
    /// User who opened the session
    pub user_id: i64,
    /// Per-company-per-day sequential number, `YYYYMMDD-NNN`
    pub session_number: String,
    pub status: CashSessionStatus,
    pub start_date: i64,
    pub end_date: Option<i64>,
    /// Cash counted into the drawer at open
    pub initial_cash: f64,
    /// Cash counted at close
    pub final_cash: Option<f64>,
    /// Sum of cash-method PAID order subtotals, computed at close
    pub expected_cash: Option<f64>,
    /// final_cash - expected_cash, signed
    pub cash_difference: Option<f64>,
    pub notes: Option<String>,
    pub closed_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl CashSession {
    pub fn is_open(&self) -> bool {
        self.status == CashSessionStatus::Open
    }

    /// Session duration in hours, 2 decimals. Open sessions are measured
    /// against `now` (Unix millis).
    pub fn duration_hours(&self, now: i64) -> f64 {
        let end = self.end_date.unwrap_or(now);
        round2((end - self.start_date) as f64 / (1000.0 * 60.0 * 60.0))
    }
}

/// Open session payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashSessionCreate {
    pub point_of_sale_id: i64,
    pub initial_cash: f64,
    pub notes: Option<String>,
}

/// Close session payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashSessionClose {
    pub final_cash: f64,
    pub notes: Option<String>,
}

/// Reconciliation summary returned alongside the closed session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashCloseSummary {
    pub initial_cash: f64,
    pub final_cash: f64,
    pub expected_cash: f64,
    pub cash_difference: f64,
    /// Duration in hours, 2 decimals
    pub session_duration: f64,
}

/// Aggregate over a filtered set of sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsSummary {
    pub total_sessions: u64,
    pub open_sessions: u64,
    pub closed_sessions: u64,
    pub total_initial_cash: f64,
    pub total_final_cash: f64,
    pub total_cash_difference: f64,
    /// Mean duration in hours over sessions that have ended, 2 decimals
    pub average_session_duration: f64,
}

impl SessionsSummary {
    pub fn from_sessions(sessions: &[CashSession]) -> Self {
        let total_sessions = sessions.len() as u64;
        let open_sessions = sessions.iter().filter(|s| s.is_open()).count() as u64;
        let closed_sessions = total_sessions - open_sessions;

        let total_initial_cash = sessions.iter().map(|s| s.initial_cash).sum();
        let total_final_cash = sessions.iter().map(|s| s.final_cash.unwrap_or(0.0)).sum();
        let total_cash_difference = sessions
            .iter()
            .map(|s| s.cash_difference.unwrap_or(0.0))
            .sum();

        // Only sessions that have ended contribute a duration.
        let durations: Vec<f64> = sessions
            .iter()
            .filter(|s| s.end_date.is_some())
            .map(|s| s.duration_hours(0))
            .collect();
        let average_session_duration = if durations.is_empty() {
            0.0
        } else {
            round2(durations.iter().sum::<f64>() / durations.len() as f64)
        };

        Self {
            total_sessions,
            open_sessions,
            closed_sessions,
            total_initial_cash,
            total_final_cash,
            total_cash_difference,
            average_session_duration,
        }
    }
}
