use salvo::prelude::Json;
use salvo::{Depot, Router, handler};
use serde_json::json;

use confab_db::types::AuthedUser;
use confab_service::auth::depot::depot_keys;

/// ## Summary
/// Returns the authenticated user's information as JSON.
/// The user is retrieved from the depot set by the `AuthMiddleware`.
#[handler]
async fn whoami(depot: &Depot) -> salvo::prelude::Json<serde_json::Value> {
    match depot.get::<AuthedUser>(depot_keys::AUTHENTICATED_USER) {
        Ok(val) => match val {
            AuthedUser::User(user) => Json(serde_json::to_value(user).unwrap_or(json!(null))),
            AuthedUser::Public => Json(json!({"status":"public"})),
        },
        Err(_) => Json(json!({"error":"User not found in depot"})),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("whoami").get(whoami)
}
