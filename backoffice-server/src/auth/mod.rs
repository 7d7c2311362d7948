//! Request identity
//!
//! Requests arrive pre-authenticated by the API gateway. Identity is
//! carried in trusted headers (`X-Company-Id`, `X-User-Id`,
//! `X-User-Role`), parsed once by [`require_identity`] and injected into
//! request extensions. Handlers receive it through the [`Identity`]
//! extractor.

mod extractor;
mod middleware;
mod permission;

pub use extractor::Identity;
pub use middleware::require_identity;
pub use permission::check_point_of_sale;
