//! Persistence contracts for the scheduling domain.
//!
//! Commands follow a load / mutate / save shape. Every record carries an
//! optimistic `version` token; `save_*` rejects a stale token with
//! [`DbError::VersionConflict`](crate::error::DbError::VersionConflict),
//! which closes the gap between an availability check and the write that
//! depends on it.

use futures::future::BoxFuture;

use confab_core::types::{MeetingId, UserId};

use crate::error::DbResult;
use crate::model::meeting::Meeting;
use crate::model::session::Session;
use crate::model::user::User;

pub mod memory;

pub trait UserStore: Send + Sync {
    /// Looks up a user by id, excluding soft-deleted accounts.
    fn find_user(&self, id: UserId) -> BoxFuture<'_, DbResult<Option<User>>>;

    /// Looks up a user by email, excluding soft-deleted accounts.
    /// Deactivated accounts are returned so callers can distinguish them.
    fn find_user_by_email<'a>(&'a self, email: &'a str)
    -> BoxFuture<'a, DbResult<Option<User>>>;

    /// All active, non-deleted users.
    fn list_users(&self) -> BoxFuture<'_, DbResult<Vec<User>>>;

    /// Inserts a freshly built user record and assigns its first version.
    /// The email must be unique among non-deleted accounts; the store
    /// rejects a duplicate with
    /// [`DbError::EmailTaken`](crate::error::DbError::EmailTaken).
    fn insert_user(&self, user: User) -> BoxFuture<'_, DbResult<User>>;

    /// Persists a mutated user record; the record's `version` must match
    /// the stored one.
    fn save_user(&self, user: User) -> BoxFuture<'_, DbResult<User>>;
}

pub trait MeetingStore: Send + Sync {
    /// Looks up a meeting by id, excluding soft-deleted records.
    fn find_meeting(&self, id: MeetingId) -> BoxFuture<'_, DbResult<Option<Meeting>>>;

    /// All non-deleted meetings where the user is host or guest,
    /// regardless of cancellation or review state.
    fn meetings_for_user(&self, user: UserId) -> BoxFuture<'_, DbResult<Vec<Meeting>>>;

    /// Non-deleted, non-cancelled meetings the guest has reviewed and
    /// accepted, where the user is host or guest. Only these reserve time
    /// slots.
    fn confirmed_meetings_for_user(&self, user: UserId)
    -> BoxFuture<'_, DbResult<Vec<Meeting>>>;

    /// Inserts a freshly proposed meeting and assigns its first version.
    fn insert_meeting(&self, meeting: Meeting) -> BoxFuture<'_, DbResult<Meeting>>;

    /// Persists a mutated meeting record; the record's `version` must
    /// match the stored one.
    fn save_meeting(&self, meeting: Meeting) -> BoxFuture<'_, DbResult<Meeting>>;
}

pub trait SessionStore: Send + Sync {
    fn insert_session(&self, session: Session) -> BoxFuture<'_, DbResult<Session>>;

    fn find_session<'a>(&'a self, token: &'a str)
    -> BoxFuture<'a, DbResult<Option<Session>>>;

    /// Removes a session; removing an unknown token is a no-op.
    fn remove_session<'a>(&'a self, token: &'a str) -> BoxFuture<'a, DbResult<()>>;
}

/// Umbrella contract the service layer depends on.
pub trait Store: UserStore + MeetingStore + SessionStore {}

impl<T: UserStore + MeetingStore + SessionStore> Store for T {}
