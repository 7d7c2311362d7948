//! Identity Extractor
//!
//! Custom extractor resolving the authenticated caller from trusted
//! gateway headers

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};

use shared::{AppError, ErrorCode};

pub(crate) const HEADER_COMPANY_ID: &str = "x-company-id";
pub(crate) const HEADER_USER_ID: &str = "x-user-id";
pub(crate) const HEADER_USER_ROLE: &str = "x-user-role";

const DEFAULT_ROLE: &str = "user";

/// Authenticated caller identity
///
/// Every `/api/` request carries one; all data access is scoped to
/// `company_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub company_id: i64,
    pub user_id: i64,
    pub role: String,
}

impl Identity {
    /// Parse identity from request headers.
    ///
    /// Returns `Ok(None)` when no identity headers are present at all,
    /// and `IdentityInvalid` when they are present but incomplete or
    /// malformed.
    pub fn from_headers(headers: &http::HeaderMap) -> Result<Option<Self>, AppError> {
        let company = headers.get(HEADER_COMPANY_ID);
        let user = headers.get(HEADER_USER_ID);

        if company.is_none() && user.is_none() {
            return Ok(None);
        }

        let company_id = parse_id_header(company, HEADER_COMPANY_ID)?;
        let user_id = parse_id_header(user, HEADER_USER_ID)?;

        let role = headers
            .get(HEADER_USER_ROLE)
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_ROLE)
            .to_string();

        Ok(Some(Self {
            company_id,
            user_id,
            role,
        }))
    }
}

fn parse_id_header(
    value: Option<&http::HeaderValue>,
    name: &str,
) -> Result<i64, AppError> {
    let raw = value.ok_or_else(|| {
        AppError::with_message(ErrorCode::IdentityInvalid, format!("{name} header is missing"))
    })?;

    raw.to_str()
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::IdentityInvalid,
                format!("{name} header is malformed"),
            )
        })
}

/// Identity extractor
///
/// Use in handlers to resolve the caller. The [`require_identity`]
/// middleware has normally already parsed the headers; this reuses the
/// cached value from request extensions.
///
/// [`require_identity`]: crate::auth::require_identity
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Check if already extracted (from middleware)
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(identity.clone());
        }

        let identity =
            Identity::from_headers(&parts.headers)?.ok_or_else(AppError::not_authenticated)?;

        // Store in extensions for potential reuse
        parts.extensions.insert(identity.clone());

        Ok(identity)
    }
}
