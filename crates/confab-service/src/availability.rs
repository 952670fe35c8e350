//! Availability checking: decides whether a candidate slot is legal for a
//! user given their confirmed meetings and recurring blocked hours.

use confab_core::slot::TimeSlot;
use confab_core::types::MeetingId;
use confab_db::model::user::User;
use confab_db::store::MeetingStore;

use crate::context::Context;
use crate::error::{ServiceError, ServiceResult, UnavailableParties};

/// ## Summary
/// Whether the candidate slot is free for the user.
///
/// Only confirmed meetings reserve slots; a pending-review meeting never
/// blocks a candidate. `exclude` removes the meeting being edited from its
/// own conflict scan.
///
/// ## Errors
/// Returns an error if the confirmed-meeting scan fails.
#[tracing::instrument(skip(ctx, user), fields(user_id = %user.id))]
pub async fn slot_is_free(
    ctx: &Context<'_>,
    user: &User,
    candidate: TimeSlot,
    exclude: Option<MeetingId>,
) -> ServiceResult<bool> {
    let confirmed = ctx
        .run(ctx.store.confirmed_meetings_for_user(user.id))
        .await?;

    let meeting_conflict = confirmed
        .iter()
        .filter(|meeting| exclude != Some(meeting.id))
        .any(|meeting| meeting.time.overlaps(&candidate));

    if meeting_conflict {
        tracing::debug!("Candidate slot conflicts with a confirmed meeting");
        return Ok(false);
    }

    let blocked = user.blocked_slots.iter().any(|slot| slot.blocks(&candidate));
    if blocked {
        tracing::debug!("Candidate slot falls into blocked off-hours");
    }

    Ok(!blocked)
}

/// ## Summary
/// Runs the availability check independently for host and guest and
/// reports which parties are unavailable.
///
/// ## Errors
/// Returns an error if either party's scan fails.
pub async fn check_parties(
    ctx: &Context<'_>,
    host: &User,
    guest: &User,
    candidate: TimeSlot,
    exclude: Option<MeetingId>,
) -> ServiceResult<UnavailableParties> {
    let host_free = slot_is_free(ctx, host, candidate, exclude).await?;
    let guest_free = slot_is_free(ctx, guest, candidate, exclude).await?;

    Ok(UnavailableParties {
        host: !host_free,
        guest: !guest_free,
    })
}

/// ## Summary
/// Fails with [`ServiceError::SlotUnavailable`] naming the blocked parties
/// unless both host and guest are free for the candidate slot.
///
/// ## Errors
/// `SlotUnavailable` when either party is blocked; store errors otherwise.
pub async fn require_both_available(
    ctx: &Context<'_>,
    host: &User,
    guest: &User,
    candidate: TimeSlot,
    exclude: Option<MeetingId>,
) -> ServiceResult<()> {
    let parties = check_parties(ctx, host, guest, candidate, exclude).await?;
    if parties.any() {
        tracing::debug!(%parties, "Slot unavailable");
        return Err(ServiceError::SlotUnavailable(parties));
    }
    Ok(())
}
