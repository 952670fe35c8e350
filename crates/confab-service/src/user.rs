//! Account commands: registration, login, profile and off-hours updates,
//! password recovery, deactivation, and soft deletion.

use chrono::Duration;

use confab_core::slot::DailySlot;
use confab_core::types::UserId;
use confab_db::error::DbError;
use confab_db::model::session::Session;
use confab_db::model::user::{PasswordRecovery, User};
use confab_db::store::UserStore;

use crate::auth::{password, session};
use crate::context::Context;
use crate::error::{ServiceError, ServiceResult};

const MAX_NAME_LEN: usize = 40;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub recovery_question: String,
    pub recovery_answer: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub blocked_slots: Option<Vec<DailySlot>>,
}

#[derive(Debug, Clone)]
pub struct ResetPassword {
    pub email: String,
    pub recovery_answer: String,
    pub password: String,
    pub password_confirm: String,
}

fn validated_name(name: &str) -> ServiceResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::ValidationError(
            "name must not be empty".to_owned(),
        ));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ServiceError::ValidationError(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_owned())
}

/// Structural email check: one `@` with a non-empty local part and a
/// dotted domain. Deliverability is out of scope.
fn validated_email(email: &str) -> ServiceResult<String> {
    let normalized = email.trim().to_lowercase();
    let valid = normalized
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !domain.contains('@')
        });
    if !valid {
        return Err(ServiceError::ValidationError(format!(
            "{email:?} is not a valid email address"
        )));
    }
    Ok(normalized)
}

fn validated_password(password: &str, confirm: &str) -> ServiceResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::ValidationError(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password != confirm {
        return Err(ServiceError::ValidationError(
            "password confirmation does not match".to_owned(),
        ));
    }
    Ok(())
}

async fn load_user(ctx: &Context<'_>, id: UserId) -> ServiceResult<User> {
    ctx.run(ctx.store.find_user(id))
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("user {id}")))
}

/// ## Summary
/// Registers a new account. Emails are normalized to lowercase and must be
/// unique among non-deleted accounts; the recovery question/answer pair is
/// mandatory because it is the only password-reset path.
///
/// ## Errors
/// - `ValidationError` for malformed inputs
/// - `Conflict` when the email is already registered
#[tracing::instrument(skip(ctx, cmd), fields(email = %cmd.email))]
pub async fn register(ctx: &Context<'_>, cmd: RegisterUser) -> ServiceResult<User> {
    let name = validated_name(&cmd.name)?;
    let email = validated_email(&cmd.email)?;
    validated_password(&cmd.password, &cmd.password_confirm)?;

    let question = cmd.recovery_question.trim().to_owned();
    let answer = cmd.recovery_answer.trim().to_owned();
    if question.is_empty() || answer.is_empty() {
        return Err(ServiceError::ValidationError(
            "recovery question and answer are required".to_owned(),
        ));
    }

    let password_hash = password::hash_password(&cmd.password)?;
    let user = User::register(
        name,
        email,
        password_hash,
        PasswordRecovery { question, answer },
        ctx.now,
    );

    // The store enforces email uniqueness under its write lock; translate
    // its constraint violation into the domain conflict.
    let user = match ctx.run(ctx.store.insert_user(user)).await {
        Err(ServiceError::StoreError(DbError::EmailTaken(email))) => {
            return Err(ServiceError::Conflict(format!(
                "email {email} is already registered"
            )));
        }
        other => other?,
    };

    tracing::info!(user_id = %user.id, "User registered");
    Ok(user)
}

/// ## Summary
/// Authenticates by email and password, records the login, and issues a
/// session with the given time to live.
///
/// Unknown emails and wrong passwords both surface as `NotAuthenticated`
/// so the response does not leak which accounts exist.
///
/// ## Errors
/// - `NotAuthenticated` for bad credentials
/// - `Unauthorized` for a deactivated account
#[tracing::instrument(skip(ctx, email, plaintext))]
pub async fn login(
    ctx: &Context<'_>,
    email: &str,
    plaintext: &str,
    session_ttl: Duration,
) -> ServiceResult<(User, Session)> {
    let normalized = email.trim().to_lowercase();
    let mut user = ctx
        .run(ctx.store.find_user_by_email(&normalized))
        .await?
        .ok_or(ServiceError::NotAuthenticated)?;

    password::verify_password(plaintext, &user.password_hash)?;

    if !user.active {
        return Err(ServiceError::Unauthorized(
            "account is deactivated".to_owned(),
        ));
    }

    user.record_login(ctx.now);
    let user = ctx.run(ctx.store.save_user(user)).await?;
    let session = session::issue(ctx, &user, session_ttl).await?;

    tracing::info!(user_id = %user.id, total_logins = user.total_logins, "User logged in");
    Ok((user, session))
}

/// ## Summary
/// Ends a session. Logging out an already-dead token succeeds.
///
/// ## Errors
/// Returns an error if the store operation fails.
pub async fn logout(ctx: &Context<'_>, token: &str) -> ServiceResult<()> {
    session::revoke(ctx, token).await
}

/// ## Summary
/// Updates the caller's display name and/or recurring blocked off-hours.
/// The blocked-slot list is replaced wholesale, never merged.
///
/// ## Errors
/// - `NotFound` when the account is missing or deleted
/// - `ValidationError` for a bad name or an inverted slot
#[tracing::instrument(skip(ctx, cmd), fields(user_id = %user_id))]
pub async fn update_profile(
    ctx: &Context<'_>,
    user_id: UserId,
    cmd: UpdateProfile,
) -> ServiceResult<User> {
    let mut user = load_user(ctx, user_id).await?;

    if let Some(name) = cmd.name {
        user.name = validated_name(&name)?;
    }
    if let Some(slots) = cmd.blocked_slots {
        for slot in &slots {
            slot.validate()?;
        }
        user.blocked_slots = slots;
    }

    user.last_updated_at = Some(ctx.now);
    let user = ctx.run(ctx.store.save_user(user)).await?;

    tracing::info!(user_id = %user.id, "Profile updated");
    Ok(user)
}

/// ## Summary
/// Deactivates the caller's account. Existing sessions stop resolving and
/// the account disappears from directory listings; the record itself is
/// kept and can be distinguished from a deleted one.
///
/// ## Errors
/// - `NotFound` when the account is missing or deleted
/// - `Conflict` when already deactivated
#[tracing::instrument(skip(ctx), fields(user_id = %user_id))]
pub async fn deactivate(ctx: &Context<'_>, user_id: UserId) -> ServiceResult<User> {
    let mut user = load_user(ctx, user_id).await?;

    if !user.active {
        return Err(ServiceError::Conflict(
            "account is already deactivated".to_owned(),
        ));
    }

    user.deactivate(ctx.now);
    let user = ctx.run(ctx.store.save_user(user)).await?;

    tracing::info!(user_id = %user.id, "Account deactivated");
    Ok(user)
}

/// ## Summary
/// Soft-deletes the caller's account. The record vanishes from every
/// lookup; its email becomes available for a fresh registration.
///
/// ## Errors
/// `NotFound` when the account is missing or already deleted.
#[tracing::instrument(skip(ctx), fields(user_id = %user_id))]
pub async fn delete_account(ctx: &Context<'_>, user_id: UserId) -> ServiceResult<()> {
    let mut user = load_user(ctx, user_id).await?;

    user.soft_delete(ctx.now);
    ctx.run(ctx.store.save_user(user)).await?;

    tracing::info!(user_id = %user_id, "Account deleted");
    Ok(())
}

/// ## Summary
/// Resets a forgotten password after checking the recovery answer
/// (case-insensitively). The new password must differ from the old one.
///
/// The reset does not require an authenticated session; the recovery
/// answer is the credential.
///
/// ## Errors
/// - `NotFound` for an unknown email
/// - `NotAuthenticated` for a wrong recovery answer
/// - `ValidationError` for a weak or mismatched new password
/// - `Conflict` when the new password equals the current one
#[tracing::instrument(skip(ctx, cmd), fields(email = %cmd.email))]
pub async fn reset_password(ctx: &Context<'_>, cmd: ResetPassword) -> ServiceResult<()> {
    let email = cmd.email.trim().to_lowercase();
    let mut user = ctx
        .run(ctx.store.find_user_by_email(&email))
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("no account for {email}")))?;

    let expected = user.recovery.answer.trim().to_lowercase();
    let given = cmd.recovery_answer.trim().to_lowercase();
    if expected != given {
        tracing::debug!(user_id = %user.id, "Recovery answer mismatch");
        return Err(ServiceError::NotAuthenticated);
    }

    validated_password(&cmd.password, &cmd.password_confirm)?;

    if password::verify_password(&cmd.password, &user.password_hash).is_ok() {
        return Err(ServiceError::Conflict(
            "new password must differ from the current one".to_owned(),
        ));
    }

    user.password_hash = password::hash_password(&cmd.password)?;
    user.last_updated_at = Some(ctx.now);
    ctx.run(ctx.store.save_user(user)).await?;

    tracing::info!("Password reset");
    Ok(())
}

/// ## Summary
/// Fetches one account for display. Deactivated accounts are hidden from
/// other users the same way deleted ones are.
///
/// ## Errors
/// `NotFound` when the account is missing, deactivated, or deleted.
pub async fn get_user(ctx: &Context<'_>, id: UserId) -> ServiceResult<User> {
    let user = load_user(ctx, id).await?;
    if !user.is_usable() {
        return Err(ServiceError::NotFound(format!("user {id}")));
    }
    Ok(user)
}

/// ## Summary
/// Directory listing of every active account, ordered by registration
/// time.
///
/// ## Errors
/// Returns an error if the store scan fails.
pub async fn list_users(ctx: &Context<'_>) -> ServiceResult<Vec<User>> {
    ctx.run(ctx.store.list_users()).await
}
