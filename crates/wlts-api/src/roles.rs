use std::convert::Infallible;
use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use wlts_core::models::Roles;

use crate::state::AppState;

/// Header carrying the caller's roles.
///
/// The service does not authenticate callers. The header is only read when
/// `trust_roles_header` is enabled, and the gateway in front of the service
/// must then set it for authenticated callers and strip it from everyone else.
pub const ROLES_HEADER: &str = "x-wlts-roles";

/// Roles of the current caller; untrusted, absent or unreadable headers mean anonymous
#[derive(Debug, Clone, Default)]
pub struct CallerRoles(pub Roles);

impl FromRequestParts<Arc<AppState>> for CallerRoles {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if !state.trust_roles_header {
            return Ok(CallerRoles::default());
        }

        let roles = parts
            .headers
            .get(ROLES_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(Roles::from_csv)
            .unwrap_or_default();
        Ok(CallerRoles(roles))
    }
}
