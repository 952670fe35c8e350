use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use confab_core::slot::TimeSlot;
use confab_core::types::{MeetingId, UserId};

/// Three-valued invitation status plus the cancelled override, as rendered
/// by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

/// A proposed or confirmed one-on-one meeting between a host and a guest.
///
/// The guest-review fields form the invitation state machine: a meeting is
/// created pending review, the guest accepts or rejects, and any time
/// change resets the review and bumps `total_review_requests`. Cancellation
/// freezes the record; soft deletion removes it from every query.
#[expect(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    pub id: MeetingId,
    pub host: UserId,
    pub guest: UserId,
    pub title: String,
    pub agenda: String,
    pub time: TimeSlot,

    pub is_review_request_sent: bool,
    pub review_request_sent_at: Option<DateTime<Utc>>,
    /// Counts how many times the guest's review was (re-)requested; only
    /// ever increases.
    pub total_review_requests: i64,

    pub is_guest_reviewed: bool,
    pub guest_reviewed_at: Option<DateTime<Utc>>,
    pub is_guest_accepted: bool,
    pub guest_accepted_at: Option<DateTime<Utc>>,
    pub guest_rejected_at: Option<DateTime<Utc>>,

    pub is_cancelled: bool,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<UserId>,

    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<UserId>,

    pub created_at: DateTime<Utc>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub last_updated_by: Option<UserId>,

    /// Optimistic concurrency token; bumped by the store on every save.
    pub version: i64,
}

impl Meeting {
    /// Builds a freshly proposed meeting with the first review request
    /// already issued. The store assigns the first version on insert.
    #[must_use]
    pub fn propose(
        host: UserId,
        guest: UserId,
        title: String,
        agenda: String,
        time: TimeSlot,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MeetingId::new(),
            host,
            guest,
            title,
            agenda,
            time,
            is_review_request_sent: true,
            review_request_sent_at: Some(now),
            total_review_requests: 1,
            is_guest_reviewed: false,
            guest_reviewed_at: None,
            is_guest_accepted: false,
            guest_accepted_at: None,
            guest_rejected_at: None,
            is_cancelled: false,
            cancelled_at: None,
            cancelled_by: None,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
            created_at: now,
            last_updated_at: None,
            last_updated_by: None,
            version: 0,
        }
    }

    /// Whether the given user is a party to this meeting.
    #[must_use]
    pub fn involves(&self, user: UserId) -> bool {
        self.host == user || self.guest == user
    }

    /// A confirmed meeting reserves its slot: reviewed, accepted, and
    /// neither cancelled nor deleted.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.is_guest_reviewed && self.is_guest_accepted && !self.is_cancelled && !self.is_deleted
    }

    #[must_use]
    pub fn status(&self) -> MeetingStatus {
        if self.is_cancelled {
            MeetingStatus::Cancelled
        } else if !self.is_guest_reviewed {
            MeetingStatus::Pending
        } else if self.is_guest_accepted {
            MeetingStatus::Accepted
        } else {
            MeetingStatus::Rejected
        }
    }

    /// Moves the meeting to a new slot, invalidating any previous guest
    /// review and issuing a fresh review request.
    pub fn reschedule(&mut self, time: TimeSlot, now: DateTime<Utc>) {
        self.time = time;
        self.is_guest_accepted = false;
        self.guest_accepted_at = None;
        self.is_guest_reviewed = false;
        self.guest_reviewed_at = None;
        self.is_review_request_sent = true;
        self.review_request_sent_at = Some(now);
        self.total_review_requests += 1;
    }

    pub fn accept(&mut self, now: DateTime<Utc>) {
        self.is_guest_accepted = true;
        self.guest_accepted_at = Some(now);
        self.is_guest_reviewed = true;
        self.guest_reviewed_at = Some(now);
    }

    pub fn reject(&mut self, now: DateTime<Utc>) {
        self.is_guest_accepted = false;
        self.guest_rejected_at = Some(now);
        self.is_guest_reviewed = true;
        self.guest_reviewed_at = Some(now);
    }

    pub fn cancel(&mut self, by: UserId, now: DateTime<Utc>) {
        self.is_cancelled = true;
        self.cancelled_at = Some(now);
        self.cancelled_by = Some(by);
    }

    pub fn soft_delete(&mut self, by: UserId, now: DateTime<Utc>) {
        self.is_deleted = true;
        self.deleted_at = Some(now);
        self.deleted_by = Some(by);
    }

    pub fn touch(&mut self, by: UserId, now: DateTime<Utc>) {
        self.last_updated_at = Some(now);
        self.last_updated_by = Some(by);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confab_core::slot::parse_wall_clock;

    fn sample_meeting() -> Meeting {
        let time = TimeSlot::new(
            parse_wall_clock("2025-06-01T10:00").expect("valid"),
            parse_wall_clock("2025-06-01T11:00").expect("valid"),
        )
        .expect("valid slot");

        Meeting::propose(
            UserId::new(),
            UserId::new(),
            "Standup".into(),
            "Weekly sync".into(),
            time,
            Utc::now(),
        )
    }

    #[test]
    fn proposed_meeting_is_pending_with_one_review_request() {
        let meeting = sample_meeting();
        assert!(meeting.is_review_request_sent);
        assert_eq!(meeting.total_review_requests, 1);
        assert_eq!(meeting.status(), MeetingStatus::Pending);
        assert!(!meeting.is_confirmed());
    }

    #[test]
    fn reschedule_resets_review_and_bumps_counter() {
        let mut meeting = sample_meeting();
        meeting.accept(Utc::now());
        assert_eq!(meeting.status(), MeetingStatus::Accepted);
        assert!(meeting.is_confirmed());

        let new_time = TimeSlot::new(
            parse_wall_clock("2025-06-01T14:00").expect("valid"),
            parse_wall_clock("2025-06-01T15:00").expect("valid"),
        )
        .expect("valid slot");

        meeting.reschedule(new_time, Utc::now());
        assert_eq!(meeting.status(), MeetingStatus::Pending);
        assert!(!meeting.is_guest_accepted);
        assert!(!meeting.is_guest_reviewed);
        assert_eq!(meeting.total_review_requests, 2);
    }

    #[test]
    fn cancelled_status_wins_over_acceptance() {
        let mut meeting = sample_meeting();
        meeting.accept(Utc::now());
        meeting.cancel(meeting.host, Utc::now());
        assert_eq!(meeting.status(), MeetingStatus::Cancelled);
        assert!(!meeting.is_confirmed());
    }

    #[test]
    fn rejected_status_requires_review_without_acceptance() {
        let mut meeting = sample_meeting();
        meeting.reject(Utc::now());
        assert_eq!(meeting.status(), MeetingStatus::Rejected);
        assert!(meeting.is_guest_reviewed);
        assert!(!meeting.is_guest_accepted);
    }
}
