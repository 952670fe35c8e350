use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde::Deserialize;

use confab_core::slot::{DailySlot, parse_time_of_day};
use confab_core::types::UserId;
use confab_db::model::user::User;
use confab_service::auth::depot::get_user_from_depot;
use confab_service::error::ServiceError;
use confab_service::user;

use crate::error::{AppResult, write_error};

use super::{RequestEnv, parse_body};

#[derive(Debug, Deserialize)]
struct DailySlotPayload {
    start: String,
    end: String,
}

impl DailySlotPayload {
    fn into_slot(self) -> AppResult<DailySlot> {
        let start = parse_time_of_day(&self.start)?;
        let end = parse_time_of_day(&self.end)?;
        Ok(DailySlot::new(start, end)?)
    }
}

#[derive(Debug, Deserialize)]
struct UpdateProfileRequest {
    name: Option<String>,
    blocked_slots: Option<Vec<DailySlotPayload>>,
}

/// GET /api/users
#[handler]
async fn list_users_handler(depot: &mut Depot, res: &mut Response) {
    let result: AppResult<Vec<User>> = async {
        get_user_from_depot(depot)?;
        let env = RequestEnv::from_depot(depot)?;
        Ok(user::list_users(&env.context()).await?)
    }
    .await;

    match result {
        Ok(users) => res.render(Json(users)),
        Err(e) => write_error(res, &e),
    }
}

/// GET /api/users/{user_id}
#[handler]
async fn get_user_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result: AppResult<User> = async {
        get_user_from_depot(depot)?;
        let id = req
            .param::<UserId>("user_id")
            .ok_or_else(|| ServiceError::ValidationError("Invalid user id".to_owned()))?;
        let env = RequestEnv::from_depot(depot)?;
        Ok(user::get_user(&env.context(), id).await?)
    }
    .await;

    match result {
        Ok(found) => res.render(Json(found)),
        Err(e) => write_error(res, &e),
    }
}

/// PATCH /api/users/me
#[handler]
async fn update_me_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result: AppResult<User> = async {
        let caller_id = get_user_from_depot(depot)?.id;
        let body: UpdateProfileRequest = parse_body(req).await?;

        let blocked_slots = match body.blocked_slots {
            Some(payloads) => Some(
                payloads
                    .into_iter()
                    .map(DailySlotPayload::into_slot)
                    .collect::<AppResult<Vec<_>>>()?,
            ),
            None => None,
        };

        let env = RequestEnv::from_depot(depot)?;
        let updated = user::update_profile(
            &env.context(),
            caller_id,
            user::UpdateProfile {
                name: body.name,
                blocked_slots,
            },
        )
        .await?;
        Ok(updated)
    }
    .await;

    match result {
        Ok(updated) => res.render(Json(updated)),
        Err(e) => write_error(res, &e),
    }
}

/// POST /api/users/me/deactivate
#[handler]
async fn deactivate_handler(depot: &mut Depot, res: &mut Response) {
    let result: AppResult<User> = async {
        let caller_id = get_user_from_depot(depot)?.id;
        let env = RequestEnv::from_depot(depot)?;
        Ok(user::deactivate(&env.context(), caller_id).await?)
    }
    .await;

    match result {
        Ok(updated) => res.render(Json(updated)),
        Err(e) => write_error(res, &e),
    }
}

/// DELETE /api/users/me
#[handler]
async fn delete_me_handler(depot: &mut Depot, res: &mut Response) {
    let result: AppResult<()> = async {
        let caller_id = get_user_from_depot(depot)?.id;
        let env = RequestEnv::from_depot(depot)?;
        user::delete_account(&env.context(), caller_id).await?;
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
    Router::with_path(super::USERS_ROUTE_COMPONENT)
        .get(list_users_handler)
        .push(
            Router::with_path("me")
                .patch(update_me_handler)
                .delete(delete_me_handler)
                .push(Router::with_path("deactivate").post(deactivate_handler)),
        )
        .push(Router::with_path("{user_id}").get(get_user_handler))
}
