//! Meeting lifecycle commands: create, update, invitation response,
//! cancellation, soft deletion, and read paths.
//!
//! Every command is a single load / mutate / save round against the store;
//! the optimistic version token on the record turns concurrent edits of
//! the same meeting into a retryable conflict instead of a lost update.

use serde::Serialize;

use confab_core::slot::TimeSlot;
use confab_core::types::{MeetingId, UserId};
use confab_db::model::meeting::Meeting;
use confab_db::model::user::User;
use confab_db::store::{MeetingStore, UserStore};

use crate::availability::{check_parties, require_both_available};
use crate::context::Context;
use crate::error::{ServiceError, ServiceResult, UnavailableParties};

/// Create command inputs; the host comes from the authenticated identity.
#[derive(Debug, Clone)]
pub struct CreateMeeting {
    pub guest: UserId,
    pub title: String,
    pub agenda: String,
    pub time: TimeSlot,
}

/// Update command inputs; absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateMeeting {
    pub title: Option<String>,
    pub agenda: Option<String>,
    pub time: Option<TimeSlot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationDecision {
    Accept,
    Reject,
}

/// How an invitation response resolved.
///
/// `RejectedUnavailable` is the degraded outcome of an `Accept` whose
/// re-validation found a party no longer available; the guest committed to
/// responding, so this is an outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InvitationOutcome {
    Accepted,
    Rejected,
    RejectedUnavailable { parties: UnavailableParties },
}

async fn load_meeting(ctx: &Context<'_>, id: MeetingId) -> ServiceResult<Meeting> {
    ctx.run(ctx.store.find_meeting(id))
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("meeting {id}")))
}

async fn load_party(ctx: &Context<'_>, id: UserId, role: &str) -> ServiceResult<User> {
    let user = ctx
        .run(ctx.store.find_user(id))
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("{role} {id}")))?;

    if !user.is_usable() {
        return Err(ServiceError::NotFound(format!("{role} {id}")));
    }

    Ok(user)
}

fn validated_text(value: String, field: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::ValidationError(format!(
            "{field} must not be empty"
        )));
    }
    Ok(trimmed.to_owned())
}

/// ## Summary
/// Creates a meeting proposal and issues the first review request to the
/// guest.
///
/// The interval must be well-formed and must not start in the past (this
/// is the only point where the past-start rule applies); host and guest
/// must both be available for the slot.
///
/// ## Errors
/// - `ValidationError` for malformed inputs or a past start
/// - `NotFound` when the guest is missing, inactive, or deleted
/// - `SlotUnavailable` naming the blocked parties
#[tracing::instrument(skip(ctx, cmd), fields(host = %host, guest = %cmd.guest))]
pub async fn create_meeting(
    ctx: &Context<'_>,
    host: UserId,
    cmd: CreateMeeting,
) -> ServiceResult<Meeting> {
    cmd.time.validate()?;
    if cmd.time.start < ctx.wall_clock() {
        return Err(ServiceError::ValidationError(
            "meeting cannot start in the past".to_owned(),
        ));
    }
    if cmd.guest == host {
        return Err(ServiceError::ValidationError(
            "guest must be a different user than the host".to_owned(),
        ));
    }

    let title = validated_text(cmd.title, "title")?;
    let agenda = validated_text(cmd.agenda, "agenda")?;

    let host_user = load_party(ctx, host, "host").await?;
    let guest_user = load_party(ctx, cmd.guest, "guest").await?;

    require_both_available(ctx, &host_user, &guest_user, cmd.time, None).await?;

    let meeting = Meeting::propose(host, cmd.guest, title, agenda, cmd.time, ctx.now);
    let meeting = ctx.run(ctx.store.insert_meeting(meeting)).await?;

    tracing::info!(meeting_id = %meeting.id, "Meeting created");
    Ok(meeting)
}

/// ## Summary
/// Updates a meeting's title, agenda, and/or time slot.
///
/// A time change re-runs availability for both parties against the new
/// slot (the meeting being edited is excluded from its own conflict scan),
/// invalidates the guest's previous review, and bumps the review-request
/// counter. Title/agenda changes leave the review state untouched.
///
/// ## Errors
/// - `NotFound` when the meeting is missing or deleted
/// - `Unauthorized` when the actor is neither host nor guest
/// - `Conflict` when the meeting is cancelled
/// - `SlotUnavailable` for a blocked new slot
#[tracing::instrument(skip(ctx, cmd), fields(meeting_id = %meeting_id, actor = %actor))]
pub async fn update_meeting(
    ctx: &Context<'_>,
    actor: UserId,
    meeting_id: MeetingId,
    cmd: UpdateMeeting,
) -> ServiceResult<Meeting> {
    let mut meeting = load_meeting(ctx, meeting_id).await?;

    if !meeting.involves(actor) {
        return Err(ServiceError::Unauthorized(
            "only the host or guest may update a meeting".to_owned(),
        ));
    }
    if meeting.is_cancelled {
        return Err(ServiceError::Conflict("meeting is cancelled".to_owned()));
    }

    if let Some(time) = cmd.time {
        time.validate()?;

        let host_user = load_party(ctx, meeting.host, "host").await?;
        let guest_user = load_party(ctx, meeting.guest, "guest").await?;

        require_both_available(ctx, &host_user, &guest_user, time, Some(meeting.id)).await?;

        meeting.reschedule(time, ctx.now);
        tracing::debug!(
            total_review_requests = meeting.total_review_requests,
            "Meeting rescheduled, guest review reset"
        );
    }

    if let Some(title) = cmd.title {
        meeting.title = validated_text(title, "title")?;
    }
    if let Some(agenda) = cmd.agenda {
        meeting.agenda = validated_text(agenda, "agenda")?;
    }

    meeting.touch(actor, ctx.now);
    let meeting = ctx.run(ctx.store.save_meeting(meeting)).await?;

    tracing::info!(meeting_id = %meeting.id, "Meeting updated");
    Ok(meeting)
}

/// ## Summary
/// Records the guest's response to a pending invitation.
///
/// An `Accept` re-validates availability for both parties at the current
/// meeting time; if the slot has gone stale the acceptance degrades to a
/// rejection outcome naming the unavailable parties. A second `Accept` on
/// an already-accepted meeting is a conflict, not a re-application.
///
/// ## Errors
/// - `NotFound` when the meeting is missing or deleted
/// - `Unauthorized` when the actor is not the guest
/// - `Conflict` when the meeting is cancelled or already accepted
#[tracing::instrument(skip(ctx), fields(meeting_id = %meeting_id, actor = %actor))]
pub async fn respond_to_invitation(
    ctx: &Context<'_>,
    actor: UserId,
    meeting_id: MeetingId,
    decision: InvitationDecision,
) -> ServiceResult<(Meeting, InvitationOutcome)> {
    let mut meeting = load_meeting(ctx, meeting_id).await?;

    if meeting.guest != actor {
        return Err(ServiceError::Unauthorized(
            "only the guest may respond to this invitation".to_owned(),
        ));
    }
    if meeting.is_cancelled {
        return Err(ServiceError::Conflict("meeting is cancelled".to_owned()));
    }
    if meeting.is_guest_accepted {
        return Err(ServiceError::Conflict(
            "invitation is already accepted".to_owned(),
        ));
    }

    let outcome = match decision {
        InvitationDecision::Accept => {
            let host_user = load_party(ctx, meeting.host, "host").await?;
            let guest_user = load_party(ctx, meeting.guest, "guest").await?;

            let parties =
                check_parties(ctx, &host_user, &guest_user, meeting.time, Some(meeting.id))
                    .await?;

            if parties.any() {
                tracing::info!(%parties, "Acceptance degraded to rejection, slot went stale");
                meeting.reject(ctx.now);
                InvitationOutcome::RejectedUnavailable { parties }
            } else {
                meeting.accept(ctx.now);
                InvitationOutcome::Accepted
            }
        }
        InvitationDecision::Reject => {
            meeting.reject(ctx.now);
            InvitationOutcome::Rejected
        }
    };

    let meeting = ctx.run(ctx.store.save_meeting(meeting)).await?;

    tracing::info!(meeting_id = %meeting.id, ?outcome, "Invitation response recorded");
    Ok((meeting, outcome))
}

/// ## Summary
/// Cancels an active meeting. Either party may cancel; cancellation
/// freezes the record against further edits and invitation responses.
///
/// ## Errors
/// - `NotFound` when the meeting is missing or deleted
/// - `Unauthorized` when the actor is neither host nor guest
/// - `Conflict` when already cancelled
#[tracing::instrument(skip(ctx), fields(meeting_id = %meeting_id, actor = %actor))]
pub async fn cancel_meeting(
    ctx: &Context<'_>,
    actor: UserId,
    meeting_id: MeetingId,
) -> ServiceResult<Meeting> {
    let mut meeting = load_meeting(ctx, meeting_id).await?;

    if !meeting.involves(actor) {
        return Err(ServiceError::Unauthorized(
            "only the host or guest may cancel a meeting".to_owned(),
        ));
    }
    if meeting.is_cancelled {
        return Err(ServiceError::Conflict(
            "meeting is already cancelled".to_owned(),
        ));
    }

    meeting.cancel(actor, ctx.now);
    let meeting = ctx.run(ctx.store.save_meeting(meeting)).await?;

    tracing::info!(meeting_id = %meeting.id, "Meeting cancelled");
    Ok(meeting)
}

/// ## Summary
/// Soft-deletes a meeting. Host-only; prior cancellation is not required.
/// Deleted meetings disappear from every query.
///
/// ## Errors
/// - `NotFound` when the meeting is missing or already deleted
/// - `Unauthorized` when the actor is not the host
#[tracing::instrument(skip(ctx), fields(meeting_id = %meeting_id, actor = %actor))]
pub async fn delete_meeting(
    ctx: &Context<'_>,
    actor: UserId,
    meeting_id: MeetingId,
) -> ServiceResult<()> {
    let mut meeting = load_meeting(ctx, meeting_id).await?;

    if meeting.host != actor {
        return Err(ServiceError::Unauthorized(
            "only the host may delete a meeting".to_owned(),
        ));
    }

    meeting.soft_delete(actor, ctx.now);
    ctx.run(ctx.store.save_meeting(meeting)).await?;

    tracing::info!(meeting_id = %meeting_id, "Meeting deleted");
    Ok(())
}

/// ## Summary
/// Fetches one non-deleted meeting.
///
/// ## Errors
/// `NotFound` when the meeting is missing or deleted.
pub async fn get_meeting(ctx: &Context<'_>, meeting_id: MeetingId) -> ServiceResult<Meeting> {
    load_meeting(ctx, meeting_id).await
}

/// ## Summary
/// Lists every non-deleted meeting where the user is host or guest,
/// regardless of cancellation or review state; filtering for display is a
/// presentation concern.
///
/// ## Errors
/// Returns an error if the store scan fails.
pub async fn list_meetings(ctx: &Context<'_>, user: UserId) -> ServiceResult<Vec<Meeting>> {
    ctx.run(ctx.store.meetings_for_user(user)).await
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use confab_core::slot::{parse_time_of_day, parse_wall_clock, DailySlot};
    use confab_db::error::DbError;
    use confab_db::model::meeting::MeetingStatus;
    use confab_db::model::user::PasswordRecovery;
    use confab_db::store::memory::MemoryStore;

    fn slot(start: &str, end: &str) -> TimeSlot {
        TimeSlot::new(
            parse_wall_clock(start).expect("valid start"),
            parse_wall_clock(end).expect("valid end"),
        )
        .expect("valid slot")
    }

    fn daily(start: &str, end: &str) -> DailySlot {
        DailySlot::new(
            parse_time_of_day(start).expect("valid start"),
            parse_time_of_day(end).expect("valid end"),
        )
        .expect("valid daily slot")
    }

    async fn seed_user(store: &MemoryStore, email: &str, blocked: Vec<DailySlot>) -> User {
        let mut user = User::register(
            email.split('@').next().unwrap_or("user").to_owned(),
            email.to_owned(),
            "hash".into(),
            PasswordRecovery {
                question: "q".into(),
                answer: "a".into(),
            },
            Utc::now(),
        );
        user.blocked_slots = blocked;
        store.insert_user(user).await.expect("insert user")
    }

    /// Fixed evaluation instant well before the test meetings.
    fn ctx(store: &MemoryStore) -> Context<'_> {
        Context::new(
            store,
            std::time::Duration::from_secs(2),
            Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).single().expect("valid instant"),
        )
    }

    fn create_cmd(guest: UserId, start: &str, end: &str) -> CreateMeeting {
        CreateMeeting {
            guest,
            title: "Design review".into(),
            agenda: "Walk through the proposal".into(),
            time: slot(start, end),
        }
    }

    #[test_log::test(tokio::test)]
    async fn create_issues_first_review_request() {
        let store = MemoryStore::new();
        let host = seed_user(&store, "host@example.com", vec![]).await;
        let guest = seed_user(&store, "guest@example.com", vec![]).await;

        let meeting = create_meeting(
            &ctx(&store),
            host.id,
            create_cmd(guest.id, "2025-06-01T10:00", "2025-06-01T11:00"),
        )
        .await
        .expect("create");

        assert!(meeting.is_review_request_sent);
        assert_eq!(meeting.total_review_requests, 1);
        assert_eq!(meeting.status(), MeetingStatus::Pending);
    }

    #[test_log::test(tokio::test)]
    async fn create_rejects_past_start_and_bad_interval() {
        let store = MemoryStore::new();
        let host = seed_user(&store, "host@example.com", vec![]).await;
        let guest = seed_user(&store, "guest@example.com", vec![]).await;

        let past = create_meeting(
            &ctx(&store),
            host.id,
            create_cmd(guest.id, "2025-04-01T10:00", "2025-04-01T11:00"),
        )
        .await;
        assert!(matches!(past, Err(ServiceError::ValidationError(_))));

        let inverted = create_meeting(
            &ctx(&store),
            host.id,
            CreateMeeting {
                time: TimeSlot {
                    start: parse_wall_clock("2025-06-01T11:00").expect("valid"),
                    end: parse_wall_clock("2025-06-01T10:00").expect("valid"),
                },
                ..create_cmd(guest.id, "2025-06-01T10:00", "2025-06-01T11:00")
            },
        )
        .await;
        assert!(matches!(
            inverted,
            Err(ServiceError::CoreError(
                confab_core::error::CoreError::ValidationError(_)
            ))
        ));
    }

    #[test_log::test(tokio::test)]
    async fn create_rejects_guest_blocked_hours() {
        let store = MemoryStore::new();
        let host = seed_user(&store, "host@example.com", vec![]).await;
        let guest =
            seed_user(&store, "guest@example.com", vec![daily("09:00", "10:00")]).await;

        let result = create_meeting(
            &ctx(&store),
            host.id,
            create_cmd(guest.id, "2025-06-01T09:30", "2025-06-01T10:30"),
        )
        .await;

        assert!(matches!(
            result,
            Err(ServiceError::SlotUnavailable(UnavailableParties {
                host: false,
                guest: true
            }))
        ));
    }

    #[test_log::test(tokio::test)]
    async fn confirmed_meeting_blocks_guest_but_pending_does_not() {
        let store = MemoryStore::new();
        let host = seed_user(&store, "host@example.com", vec![]).await;
        let guest = seed_user(&store, "guest@example.com", vec![]).await;
        let other_host = seed_user(&store, "other@example.com", vec![]).await;

        let first = create_meeting(
            &ctx(&store),
            host.id,
            create_cmd(guest.id, "2025-06-01T10:00", "2025-06-01T11:00"),
        )
        .await
        .expect("create first");

        // Still pending: an overlapping proposal for the same guest is fine.
        let while_pending = create_meeting(
            &ctx(&store),
            other_host.id,
            create_cmd(guest.id, "2025-06-01T10:30", "2025-06-01T11:30"),
        )
        .await;
        assert!(while_pending.is_ok());

        respond_to_invitation(&ctx(&store), guest.id, first.id, InvitationDecision::Accept)
            .await
            .expect("accept");

        // Now confirmed: the same overlap is rejected, naming the guest.
        let after_accept = create_meeting(
            &ctx(&store),
            other_host.id,
            create_cmd(guest.id, "2025-06-01T10:15", "2025-06-01T10:45"),
        )
        .await;
        assert!(matches!(
            after_accept,
            Err(ServiceError::SlotUnavailable(UnavailableParties {
                host: false,
                guest: true
            }))
        ));
    }

    #[test_log::test(tokio::test)]
    async fn reschedule_resets_review_and_bumps_counter() {
        let store = MemoryStore::new();
        let host = seed_user(&store, "host@example.com", vec![]).await;
        let guest = seed_user(&store, "guest@example.com", vec![]).await;

        let meeting = create_meeting(
            &ctx(&store),
            host.id,
            create_cmd(guest.id, "2025-06-01T10:00", "2025-06-01T11:00"),
        )
        .await
        .expect("create");

        respond_to_invitation(&ctx(&store), guest.id, meeting.id, InvitationDecision::Accept)
            .await
            .expect("accept");

        let updated = update_meeting(
            &ctx(&store),
            host.id,
            meeting.id,
            UpdateMeeting {
                time: Some(slot("2025-06-01T14:00", "2025-06-01T15:00")),
                ..UpdateMeeting::default()
            },
        )
        .await
        .expect("update");

        assert!(!updated.is_guest_accepted);
        assert!(!updated.is_guest_reviewed);
        assert_eq!(updated.total_review_requests, 2);
        assert_eq!(updated.status(), MeetingStatus::Pending);

        // Title-only update leaves the counter and review state alone.
        let retitled = update_meeting(
            &ctx(&store),
            host.id,
            meeting.id,
            UpdateMeeting {
                title: Some("Renamed".into()),
                ..UpdateMeeting::default()
            },
        )
        .await
        .expect("update title");
        assert_eq!(retitled.total_review_requests, 2);
        assert_eq!(retitled.title, "Renamed");
    }

    #[test_log::test(tokio::test)]
    async fn second_accept_is_a_conflict() {
        let store = MemoryStore::new();
        let host = seed_user(&store, "host@example.com", vec![]).await;
        let guest = seed_user(&store, "guest@example.com", vec![]).await;

        let meeting = create_meeting(
            &ctx(&store),
            host.id,
            create_cmd(guest.id, "2025-06-01T10:00", "2025-06-01T11:00"),
        )
        .await
        .expect("create");

        let (_, outcome) = respond_to_invitation(
            &ctx(&store),
            guest.id,
            meeting.id,
            InvitationDecision::Accept,
        )
        .await
        .expect("first accept");
        assert_eq!(outcome, InvitationOutcome::Accepted);

        let second = respond_to_invitation(
            &ctx(&store),
            guest.id,
            meeting.id,
            InvitationDecision::Accept,
        )
        .await;
        assert!(matches!(second, Err(ServiceError::Conflict(_))));
    }

    #[test_log::test(tokio::test)]
    async fn only_the_guest_may_respond() {
        let store = MemoryStore::new();
        let host = seed_user(&store, "host@example.com", vec![]).await;
        let guest = seed_user(&store, "guest@example.com", vec![]).await;

        let meeting = create_meeting(
            &ctx(&store),
            host.id,
            create_cmd(guest.id, "2025-06-01T10:00", "2025-06-01T11:00"),
        )
        .await
        .expect("create");

        let as_host = respond_to_invitation(
            &ctx(&store),
            host.id,
            meeting.id,
            InvitationDecision::Accept,
        )
        .await;
        assert!(matches!(as_host, Err(ServiceError::Unauthorized(_))));
    }

    #[test_log::test(tokio::test)]
    async fn stale_accept_degrades_to_rejection() {
        let store = MemoryStore::new();
        let host_a = seed_user(&store, "hosta@example.com", vec![]).await;
        let host_b = seed_user(&store, "hostb@example.com", vec![]).await;
        let guest = seed_user(&store, "guest@example.com", vec![]).await;

        let first = create_meeting(
            &ctx(&store),
            host_a.id,
            create_cmd(guest.id, "2025-06-01T10:00", "2025-06-01T11:00"),
        )
        .await
        .expect("create first");

        let second = create_meeting(
            &ctx(&store),
            host_b.id,
            create_cmd(guest.id, "2025-06-01T10:30", "2025-06-01T11:30"),
        )
        .await
        .expect("create second while first is pending");

        respond_to_invitation(&ctx(&store), guest.id, first.id, InvitationDecision::Accept)
            .await
            .expect("accept first");

        // The second invitation's slot is now stale for the guest.
        let (meeting, outcome) = respond_to_invitation(
            &ctx(&store),
            guest.id,
            second.id,
            InvitationDecision::Accept,
        )
        .await
        .expect("respond to second");

        assert_eq!(
            outcome,
            InvitationOutcome::RejectedUnavailable {
                parties: UnavailableParties {
                    host: false,
                    guest: true
                }
            }
        );
        assert!(meeting.is_guest_reviewed);
        assert!(!meeting.is_guest_accepted);
        assert_eq!(meeting.status(), MeetingStatus::Rejected);
    }

    #[test_log::test(tokio::test)]
    async fn cancellation_freezes_the_meeting() {
        let store = MemoryStore::new();
        let host = seed_user(&store, "host@example.com", vec![]).await;
        let guest = seed_user(&store, "guest@example.com", vec![]).await;

        let meeting = create_meeting(
            &ctx(&store),
            host.id,
            create_cmd(guest.id, "2025-06-01T10:00", "2025-06-01T11:00"),
        )
        .await
        .expect("create");

        // Guests may cancel too.
        cancel_meeting(&ctx(&store), guest.id, meeting.id)
            .await
            .expect("cancel");

        let update = update_meeting(
            &ctx(&store),
            host.id,
            meeting.id,
            UpdateMeeting {
                title: Some("Too late".into()),
                ..UpdateMeeting::default()
            },
        )
        .await;
        assert!(matches!(update, Err(ServiceError::Conflict(_))));

        let respond = respond_to_invitation(
            &ctx(&store),
            guest.id,
            meeting.id,
            InvitationDecision::Reject,
        )
        .await;
        assert!(matches!(respond, Err(ServiceError::Conflict(_))));

        let recancel = cancel_meeting(&ctx(&store), host.id, meeting.id).await;
        assert!(matches!(recancel, Err(ServiceError::Conflict(_))));
    }

    #[test_log::test(tokio::test)]
    async fn deletion_is_host_only_and_hides_the_meeting() {
        let store = MemoryStore::new();
        let host = seed_user(&store, "host@example.com", vec![]).await;
        let guest = seed_user(&store, "guest@example.com", vec![]).await;

        let meeting = create_meeting(
            &ctx(&store),
            host.id,
            create_cmd(guest.id, "2025-06-01T10:00", "2025-06-01T11:00"),
        )
        .await
        .expect("create");

        let by_guest = delete_meeting(&ctx(&store), guest.id, meeting.id).await;
        assert!(matches!(by_guest, Err(ServiceError::Unauthorized(_))));

        delete_meeting(&ctx(&store), host.id, meeting.id)
            .await
            .expect("host delete");

        let fetched = get_meeting(&ctx(&store), meeting.id).await;
        assert!(matches!(fetched, Err(ServiceError::NotFound(_))));

        let listed = list_meetings(&ctx(&store), guest.id).await.expect("list");
        assert!(listed.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn outsiders_cannot_update_or_cancel() {
        let store = MemoryStore::new();
        let host = seed_user(&store, "host@example.com", vec![]).await;
        let guest = seed_user(&store, "guest@example.com", vec![]).await;
        let outsider = seed_user(&store, "outsider@example.com", vec![]).await;

        let meeting = create_meeting(
            &ctx(&store),
            host.id,
            create_cmd(guest.id, "2025-06-01T10:00", "2025-06-01T11:00"),
        )
        .await
        .expect("create");

        let update = update_meeting(
            &ctx(&store),
            outsider.id,
            meeting.id,
            UpdateMeeting {
                title: Some("Hijacked".into()),
                ..UpdateMeeting::default()
            },
        )
        .await;
        assert!(matches!(update, Err(ServiceError::Unauthorized(_))));

        let cancel = cancel_meeting(&ctx(&store), outsider.id, meeting.id).await;
        assert!(matches!(cancel, Err(ServiceError::Unauthorized(_))));
    }

    #[test_log::test(tokio::test)]
    async fn listing_keeps_cancelled_and_rejected_meetings() {
        let store = MemoryStore::new();
        let host = seed_user(&store, "host@example.com", vec![]).await;
        let guest = seed_user(&store, "guest@example.com", vec![]).await;

        let kept = create_meeting(
            &ctx(&store),
            host.id,
            create_cmd(guest.id, "2025-06-01T10:00", "2025-06-01T11:00"),
        )
        .await
        .expect("create");
        cancel_meeting(&ctx(&store), host.id, kept.id)
            .await
            .expect("cancel");

        let rejected = create_meeting(
            &ctx(&store),
            host.id,
            create_cmd(guest.id, "2025-06-02T10:00", "2025-06-02T11:00"),
        )
        .await
        .expect("create");
        respond_to_invitation(&ctx(&store), guest.id, rejected.id, InvitationDecision::Reject)
            .await
            .expect("reject");

        let listed = list_meetings(&ctx(&store), host.id).await.expect("list");
        assert_eq!(listed.len(), 2);
    }

    #[test_log::test(tokio::test)]
    async fn concurrent_edits_hit_the_version_guard() {
        let store = MemoryStore::new();
        let host = seed_user(&store, "host@example.com", vec![]).await;
        let guest = seed_user(&store, "guest@example.com", vec![]).await;

        let meeting = create_meeting(
            &ctx(&store),
            host.id,
            create_cmd(guest.id, "2025-06-01T10:00", "2025-06-01T11:00"),
        )
        .await
        .expect("create");

        // Simulate a second writer that loaded the same version and saved
        // first.
        let mut racing_copy = meeting.clone();
        racing_copy.touch(guest.id, Utc::now());
        store.save_meeting(racing_copy).await.expect("racing save");

        let mut stale_copy = meeting;
        stale_copy.touch(host.id, Utc::now());
        let result = store.save_meeting(stale_copy).await;
        assert!(matches!(result, Err(DbError::VersionConflict { .. })));
    }
}
