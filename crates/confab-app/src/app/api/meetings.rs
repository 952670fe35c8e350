use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde::{Deserialize, Serialize};

use confab_core::slot::{TimeSlot, parse_wall_clock};
use confab_core::types::{MeetingId, UserId};
use confab_db::model::meeting::{Meeting, MeetingStatus};
use confab_service::auth::depot::get_user_from_depot;
use confab_service::error::ServiceError;
use confab_service::meeting;

use crate::error::{AppResult, write_error};

use super::{RequestEnv, parse_body};

#[derive(Debug, Deserialize)]
struct CreateMeetingRequest {
    guest: UserId,
    title: String,
    agenda: String,
    start: String,
    end: String,
}

#[derive(Debug, Deserialize)]
struct UpdateMeetingRequest {
    title: Option<String>,
    agenda: Option<String>,
    start: Option<String>,
    end: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum InvitationDecisionPayload {
    Accept,
    Reject,
}

#[derive(Debug, Deserialize)]
struct InvitationRequest {
    decision: InvitationDecisionPayload,
}

/// A meeting plus its derived presentation status.
#[derive(Debug, Serialize)]
struct MeetingResponse {
    #[serde(flatten)]
    meeting: Meeting,
    status: MeetingStatus,
}

impl From<Meeting> for MeetingResponse {
    fn from(meeting: Meeting) -> Self {
        let status = meeting.status();
        Self { meeting, status }
    }
}

#[derive(Debug, Serialize)]
struct InvitationResponse {
    #[serde(flatten)]
    meeting: MeetingResponse,
    #[serde(flatten)]
    outcome: meeting::InvitationOutcome,
}

fn parse_slot(start: &str, end: &str) -> AppResult<TimeSlot> {
    Ok(TimeSlot::new(
        parse_wall_clock(start)?,
        parse_wall_clock(end)?,
    )?)
}

fn meeting_id_param(req: &Request) -> AppResult<MeetingId> {
    req.param::<MeetingId>("meeting_id")
        .ok_or_else(|| ServiceError::ValidationError("Invalid meeting id".to_owned()).into())
}

/// POST /api/meetings
#[handler]
async fn create_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result: AppResult<Meeting> = async {
        let caller_id = get_user_from_depot(depot)?.id;
        let body: CreateMeetingRequest = parse_body(req).await?;
        let time = parse_slot(&body.start, &body.end)?;

        let env = RequestEnv::from_depot(depot)?;
        let created = meeting::create_meeting(
            &env.context(),
            caller_id,
            meeting::CreateMeeting {
                guest: body.guest,
                title: body.title,
                agenda: body.agenda,
                time,
            },
        )
        .await?;
        Ok(created)
    }
    .await;

    match result {
        Ok(created) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(MeetingResponse::from(created)));
        }
        Err(e) => write_error(res, &e),
    }
}

/// GET /api/meetings?user_id=
///
/// Lists the caller's meetings. A `user_id` query parameter is accepted
/// but must name the caller; browsing someone else's schedule is not
/// allowed.
#[handler]
async fn list_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result: AppResult<Vec<MeetingResponse>> = async {
        let caller_id = get_user_from_depot(depot)?.id;

        if let Some(raw) = req.query::<String>("user_id") {
            let requested: UserId = raw.parse().map_err(|_e| {
                ServiceError::ValidationError("Invalid user id".to_owned())
            })?;
            if requested != caller_id {
                return Err(ServiceError::Unauthorized(
                    "cannot list another user's meetings".to_owned(),
                )
                .into());
            }
        }

        let env = RequestEnv::from_depot(depot)?;
        let meetings = meeting::list_meetings(&env.context(), caller_id).await?;
        Ok(meetings.into_iter().map(MeetingResponse::from).collect())
    }
    .await;

    match result {
        Ok(meetings) => res.render(Json(meetings)),
        Err(e) => write_error(res, &e),
    }
}

/// GET /api/meetings/{meeting_id}
#[handler]
async fn get_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result: AppResult<Meeting> = async {
        let caller_id = get_user_from_depot(depot)?.id;
        let id = meeting_id_param(req)?;

        let env = RequestEnv::from_depot(depot)?;
        let found = meeting::get_meeting(&env.context(), id).await?;

        // Meetings are visible to their parties only.
        if !found.involves(caller_id) {
            return Err(ServiceError::Unauthorized(
                "not a party to this meeting".to_owned(),
            )
            .into());
        }
        Ok(found)
    }
    .await;

    match result {
        Ok(found) => res.render(Json(MeetingResponse::from(found))),
        Err(e) => write_error(res, &e),
    }
}

/// PATCH /api/meetings/{meeting_id}
#[handler]
async fn update_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result: AppResult<Meeting> = async {
        let caller_id = get_user_from_depot(depot)?.id;
        let id = meeting_id_param(req)?;
        let body: UpdateMeetingRequest = parse_body(req).await?;

        let time = match (body.start.as_deref(), body.end.as_deref()) {
            (Some(start), Some(end)) => Some(parse_slot(start, end)?),
            (None, None) => None,
            _ => {
                return Err(ServiceError::ValidationError(
                    "start and end must be supplied together".to_owned(),
                )
                .into());
            }
        };

        let env = RequestEnv::from_depot(depot)?;
        let updated = meeting::update_meeting(
            &env.context(),
            caller_id,
            id,
            meeting::UpdateMeeting {
                title: body.title,
                agenda: body.agenda,
                time,
            },
        )
        .await?;
        Ok(updated)
    }
    .await;

    match result {
        Ok(updated) => res.render(Json(MeetingResponse::from(updated))),
        Err(e) => write_error(res, &e),
    }
}

/// POST /api/meetings/{meeting_id}/invitation
#[handler]
async fn invitation_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result: AppResult<(Meeting, meeting::InvitationOutcome)> = async {
        let caller_id = get_user_from_depot(depot)?.id;
        let id = meeting_id_param(req)?;
        let body: InvitationRequest = parse_body(req).await?;

        let decision = match body.decision {
            InvitationDecisionPayload::Accept => meeting::InvitationDecision::Accept,
            InvitationDecisionPayload::Reject => meeting::InvitationDecision::Reject,
        };

        let env = RequestEnv::from_depot(depot)?;
        let responded =
            meeting::respond_to_invitation(&env.context(), caller_id, id, decision).await?;
        Ok(responded)
    }
    .await;

    match result {
        Ok((responded, outcome)) => res.render(Json(InvitationResponse {
            meeting: MeetingResponse::from(responded),
            outcome,
        })),
        Err(e) => write_error(res, &e),
    }
}

/// POST /api/meetings/{meeting_id}/cancel
#[handler]
async fn cancel_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result: AppResult<Meeting> = async {
        let caller_id = get_user_from_depot(depot)?.id;
        let id = meeting_id_param(req)?;

        let env = RequestEnv::from_depot(depot)?;
        Ok(meeting::cancel_meeting(&env.context(), caller_id, id).await?)
    }
    .await;

    match result {
        Ok(cancelled) => res.render(Json(MeetingResponse::from(cancelled))),
        Err(e) => write_error(res, &e),
    }
}

/// DELETE /api/meetings/{meeting_id}
#[handler]
async fn delete_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result: AppResult<()> = async {
        let caller_id = get_user_from_depot(depot)?.id;
        let id = meeting_id_param(req)?;

        let env = RequestEnv::from_depot(depot)?;
        meeting::delete_meeting(&env.context(), caller_id, id).await?;
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
    Router::with_path(super::MEETINGS_ROUTE_COMPONENT)
        .post(create_handler)
        .get(list_handler)
        .push(
            Router::with_path("{meeting_id}")
                .get(get_handler)
                .patch(update_handler)
                .delete(delete_handler)
                .push(Router::with_path("invitation").post(invitation_handler))
                .push(Router::with_path("cancel").post(cancel_handler)),
        )
}
