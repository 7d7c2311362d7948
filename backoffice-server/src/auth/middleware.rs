//! Identity middleware

use axum::{extract::Request, middleware::Next, response::Response};

use crate::auth::Identity;
use crate::security_log;
use shared::AppError;

/// Identity middleware - requires gateway identity headers on API routes
///
/// Parses `X-Company-Id` / `X-User-Id` / `X-User-Role` and injects
/// [`Identity`] into request extensions
/// (`req.extensions_mut().insert(identity)`).
///
/// # Paths that skip identity
///
/// - `OPTIONS *` (CORS preflight)
/// - anything outside `/api/` (health check, unknown routes return 404)
///
/// # Errors
///
/// | Condition | Response |
/// |-----------|----------|
/// | No identity headers | 401 NotAuthenticated |
/// | Malformed identity headers | 401 IdentityInvalid |
pub async fn require_identity(mut req: Request, next: Next) -> Result<Response, AppError> {
    // Allow CORS preflight OPTIONS requests through
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // Non-API routes skip identity (they 404 or serve health normally)
    if !req.uri().path().starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    match Identity::from_headers(req.headers()) {
        Ok(Some(identity)) => {
            req.extensions_mut().insert(identity);
            Ok(next.run(req).await)
        }
        Ok(None) => {
            security_log!("WARN", "identity_missing", uri = format!("{:?}", req.uri()));
            Err(AppError::not_authenticated())
        }
        Err(e) => {
            security_log!(
                "WARN",
                "identity_invalid",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );
            Err(e)
        }
    }
}
