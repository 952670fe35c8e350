use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Duration;

use confab_db::model::session::Session;
use confab_db::model::user::User;
use confab_db::store::{SessionStore, UserStore};

use crate::context::Context;
use crate::error::{ServiceError, ServiceResult};

const TOKEN_BYTES: usize = 32;

/// Opaque bearer token. 256 bits of OS randomness, URL-safe base64.
fn generate_token() -> String {
    let mut bytes = [0_u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// ## Summary
/// Issues a fresh session for the user with the configured time to live.
///
/// ## Errors
/// Returns an error if the session cannot be stored.
pub async fn issue(ctx: &Context<'_>, user: &User, ttl: Duration) -> ServiceResult<Session> {
    let session = Session {
        token: generate_token(),
        user_id: user.id,
        created_at: ctx.now,
        expires_at: ctx.now + ttl,
    };

    let session = ctx.run(ctx.store.insert_session(session)).await?;

    tracing::debug!(user_id = %user.id, "Session issued");
    Ok(session)
}

/// ## Summary
/// Resolves a bearer token to its user.
///
/// Expired sessions are removed on sight; sessions whose user has been
/// deactivated or deleted resolve to nothing.
///
/// ## Errors
/// Returns `NotAuthenticated` for an unknown, expired, or orphaned token.
pub async fn resolve(ctx: &Context<'_>, token: &str) -> ServiceResult<User> {
    let session = ctx
        .run(ctx.store.find_session(token))
        .await?
        .ok_or(ServiceError::NotAuthenticated)?;

    if session.is_expired(ctx.now) {
        ctx.run(ctx.store.remove_session(token)).await?;
        tracing::debug!(user_id = %session.user_id, "Expired session removed");
        return Err(ServiceError::NotAuthenticated);
    }

    let user = ctx
        .run(ctx.store.find_user(session.user_id))
        .await?
        .ok_or(ServiceError::NotAuthenticated)?;

    if !user.is_usable() {
        return Err(ServiceError::NotAuthenticated);
    }

    Ok(user)
}

/// ## Summary
/// Revokes a session token. Revoking an unknown token is a no-op.
///
/// ## Errors
/// Returns an error if the store operation fails.
pub async fn revoke(ctx: &Context<'_>, token: &str) -> ServiceResult<()> {
    ctx.run(ctx.store.remove_session(token)).await?;
    Ok(())
}
