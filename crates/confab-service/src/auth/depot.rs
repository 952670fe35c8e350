//! Depot helpers for extracting the authenticated identity from Salvo
//! requests.

use confab_db::model::user::User;
use confab_db::types::AuthedUser;

use crate::error::{ServiceError, ServiceResult};

pub mod depot_keys {
    pub const AUTHENTICATED_USER: &str = "__authenticated_user";
    pub const SESSION_TOKEN: &str = "__session_token";
}

/// Get the authenticated user from the depot.
///
/// ## Errors
///
/// Returns `NotAuthenticated` if no user is found in the depot or if the
/// request is public.
pub fn get_user_from_depot(depot: &salvo::Depot) -> ServiceResult<&User> {
    let authed = depot
        .get::<AuthedUser>(depot_keys::AUTHENTICATED_USER)
        .map_err(|_e| ServiceError::NotAuthenticated)?;

    authed.user().ok_or(ServiceError::NotAuthenticated)
}

/// Check if the request is from an authenticated user (not public).
#[must_use]
pub fn is_authenticated(depot: &salvo::Depot) -> bool {
    depot
        .get::<AuthedUser>(depot_keys::AUTHENTICATED_USER)
        .is_ok_and(|u| matches!(u, AuthedUser::User(_)))
}

/// Get the bearer token the current request authenticated with, if any.
#[must_use]
pub fn get_session_token_from_depot(depot: &salvo::Depot) -> Option<&str> {
    depot
        .get::<String>(depot_keys::SESSION_TOKEN)
        .ok()
        .map(String::as_str)
}
