mod auth;
mod healthcheck;
mod meetings;
mod users;
mod whoami;

use chrono::Utc;
use salvo::Router;

use confab_service::context::Context;

use crate::config::get_config_from_depot;
use crate::error::AppResult;
use crate::middleware::auth::AuthMiddleware;
use crate::store_handler::get_store_from_depot;

// Re-export route constants from core
pub use confab_core::constants::{
    API_ROUTE_COMPONENT, API_ROUTE_PREFIX, AUTH_ROUTE_COMPONENT, AUTH_ROUTE_PREFIX,
    MEETINGS_ROUTE_COMPONENT, MEETINGS_ROUTE_PREFIX, USERS_ROUTE_COMPONENT, USERS_ROUTE_PREFIX,
};

/// Per-request service dependencies pulled out of the depot.
pub(crate) struct RequestEnv {
    pub store: std::sync::Arc<dyn confab_db::store::Store>,
    pub settings: std::sync::Arc<crate::config::Settings>,
}

impl RequestEnv {
    pub fn from_depot(depot: &salvo::Depot) -> AppResult<Self> {
        Ok(Self {
            store: get_store_from_depot(depot)?,
            settings: get_config_from_depot(depot)?,
        })
    }

    /// A service context evaluated at the current instant.
    pub fn context(&self) -> Context<'_> {
        Context::new(
            self.store.as_ref(),
            self.settings.store.op_timeout(),
            Utc::now(),
        )
    }
}

/// Parses a JSON request body, surfacing a 400 for malformed input.
pub(crate) async fn parse_body<T: for<'de> serde::Deserialize<'de>>(
    req: &mut salvo::Request,
) -> AppResult<T> {
    req.parse_json::<T>().await.map_err(|e| {
        tracing::debug!(error = %e, "Failed to parse request body");
        crate::error::AppError::ServiceError(
            confab_service::error::ServiceError::ValidationError(
                "Invalid request body".to_owned(),
            ),
        )
    })
}

/// ## Summary
/// Constructs the main API router with all application handlers.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .hoop(AuthMiddleware)
        .push(healthcheck::routes())
        .push(whoami::routes())
        .push(auth::routes())
        .push(users::routes())
        .push(meetings::routes())
}
