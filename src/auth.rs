//! Identity and entitlement handling.
//!
//! Authentication itself happens at the gateway in front of this service;
//! by the time a request arrives here the gateway has validated the user's
//! token and injected trusted headers:
//! - `x-user-id`: the authenticated user id (required)
//! - `x-user-plan`: subscription plan slug (optional)
//! - `x-user-features`: comma-separated feature flags (optional)

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const PLAN_HEADER: &str = "x-user-plan";
pub const FEATURES_HEADER: &str = "x-user-features";

/// Resolved subscription entitlement for one user.
#[derive(Debug, Clone, Default)]
pub struct Entitlement {
    /// Plan slug, e.g. "pro". Empty when the user has no paid plan.
    pub plan: String,
    /// Feature flags granted by the plan, e.g. "10_companion_limit".
    pub features: Vec<String>,
}

impl Entitlement {
    pub fn has_plan(&self, plan: &str) -> bool {
        self.plan == plan
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

/// The authenticated caller, extracted from gateway headers.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub entitlement: Entitlement,
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or((StatusCode::UNAUTHORIZED, "missing authenticated identity"))?
            .to_string();

        let plan = parts
            .headers
            .get(PLAN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        let features = parts
            .headers
            .get(FEATURES_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Identity {
            user_id,
            entitlement: Entitlement { plan, features },
        })
    }
}
