use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde::{Deserialize, Serialize};

use confab_db::model::session::Session;
use confab_db::model::user::User;
use confab_service::auth::depot::get_session_token_from_depot;
use confab_service::user;

use crate::error::{AppResult, write_error};

use super::{RequestEnv, parse_body};

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    name: String,
    email: String,
    password: String,
    password_confirm: String,
    recovery_question: String,
    recovery_answer: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    expires_at: chrono::DateTime<chrono::Utc>,
    user: User,
}

#[derive(Debug, Deserialize)]
struct PasswordResetRequest {
    email: String,
    recovery_answer: String,
    password: String,
    password_confirm: String,
}

/// POST /api/auth/register
#[handler]
async fn register_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result: AppResult<User> = async {
        let body: RegisterRequest = parse_body(req).await?;
        let env = RequestEnv::from_depot(depot)?;

        let user = user::register(
            &env.context(),
            user::RegisterUser {
                name: body.name,
                email: body.email,
                password: body.password,
                password_confirm: body.password_confirm,
                recovery_question: body.recovery_question,
                recovery_answer: body.recovery_answer,
            },
        )
        .await?;
        Ok(user)
    }
    .await;

    match result {
        Ok(user) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(user));
        }
        Err(e) => write_error(res, &e),
    }
}

/// POST /api/auth/login
#[handler]
async fn login_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result: AppResult<(User, Session)> = async {
        let body: LoginRequest = parse_body(req).await?;
        let env = RequestEnv::from_depot(depot)?;

        let issued = user::login(
            &env.context(),
            &body.email,
            &body.password,
            env.settings.auth.session_ttl(),
        )
        .await?;
        Ok(issued)
    }
    .await;

    match result {
        Ok((user, session)) => res.render(Json(LoginResponse {
            token: session.token,
            expires_at: session.expires_at,
            user,
        })),
        Err(e) => write_error(res, &e),
    }
}

/// POST /api/auth/logout
///
/// Revokes the bearer token the request authenticated with. Succeeds even
/// when the request carried no live token.
#[handler]
async fn logout_handler(depot: &mut Depot, res: &mut Response) {
    let result: AppResult<()> = async {
        let Some(token) = get_session_token_from_depot(depot).map(str::to_owned) else {
            return Ok(());
        };
        let env = RequestEnv::from_depot(depot)?;
        user::logout(&env.context(), &token).await?;
        Ok(())
    }
    .await;

    match result {
        Ok(()) => {
            res.status_code(StatusCode::NO_CONTENT);
        }
        Err(e) => write_error(res, &e),
    }
}

/// POST /api/auth/password-reset
///
/// Unauthenticated; the recovery answer is the credential.
#[handler]
async fn password_reset_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result: AppResult<()> = async {
        let body: PasswordResetRequest = parse_body(req).await?;
        let env = RequestEnv::from_depot(depot)?;

        user::reset_password(
            &env.context(),
            user::ResetPassword {
                email: body.email,
                recovery_answer: body.recovery_answer,
                password: body.password,
                password_confirm: body.password_confirm,
            },
        )
        .await?;
        Ok(())
    }
    .await;

    match result {
        Ok(()) => {
            res.status_code(StatusCode::NO_CONTENT);
        }
        Err(e) => write_error(res, &e),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(super::AUTH_ROUTE_COMPONENT)
        .push(Router::with_path("register").post(register_handler))
        .push(Router::with_path("login").post(login_handler))
        .push(Router::with_path("logout").post(logout_handler))
        .push(Router::with_path("password-reset").post(password_reset_handler))
}
