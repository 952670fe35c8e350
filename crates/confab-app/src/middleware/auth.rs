use chrono::Utc;
use salvo::Depot;
use tracing::error;

use confab_db::types::AuthedUser;
use confab_service::auth::{depot::depot_keys, session};
use confab_service::context::Context;
use confab_service::error::ServiceError;

use crate::{config::get_config_from_depot, store_handler::get_store_from_depot};

fn bearer_token(req: &salvo::Request) -> Option<String> {
    req.headers()
        .get(salvo::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_owned())
        .filter(|token| !token.is_empty())
}

/// ## Summary
/// Authentication middleware that resolves the `Authorization: Bearer`
/// token and stores the identity in the depot.
///
/// Requests without a valid token proceed as [`AuthedUser::Public`];
/// individual handlers decide whether public access is acceptable.
///
/// ## Side Effects
/// Inserts the resolved identity (and, when present, the bearer token)
/// into the depot for downstream handlers.
pub struct AuthMiddleware;

#[salvo::async_trait]
impl salvo::Handler for AuthMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        tracing::trace!("Authenticating request");

        let config = match get_config_from_depot(depot) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!(error = ?e, "Failed to get config from depot");
                res.status_code(salvo::http::StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        let store = match get_store_from_depot(depot) {
            Ok(s) => s,
            Err(e) => {
                error!(error = ?e, "Failed to get store from depot");
                res.status_code(salvo::http::StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        let Some(token) = bearer_token(req) else {
            depot.insert(depot_keys::AUTHENTICATED_USER, AuthedUser::Public);
            return;
        };

        let ctx = Context::new(store.as_ref(), config.store.op_timeout(), Utc::now());

        match session::resolve(&ctx, &token).await {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "Request authenticated");
                depot.insert(depot_keys::AUTHENTICATED_USER, AuthedUser::User(user));
                depot.insert(depot_keys::SESSION_TOKEN, token);
            }
            Err(ServiceError::NotAuthenticated) => {
                tracing::debug!("Bearer token did not resolve, treating as public");
                depot.insert(depot_keys::AUTHENTICATED_USER, AuthedUser::Public);
            }
            Err(service_err) => {
                error!(error = ?service_err, "Authentication failed with error");
                res.status_code(salvo::http::StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
            }
        }
    }
}
