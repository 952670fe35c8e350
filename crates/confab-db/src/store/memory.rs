//! Arena-style in-memory store.
//!
//! All state lives in `RwLock`-guarded maps; there is no cross-request
//! shared mutable state anywhere else in the system. Saves enforce the
//! optimistic version token so concurrent commands against the same record
//! fail fast instead of losing updates.

use std::collections::HashMap;

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use confab_core::error::CoreError;
use confab_core::types::{MeetingId, UserId};

use crate::error::{DbError, DbResult};
use crate::model::meeting::Meeting;
use crate::model::session::Session;
use crate::model::user::User;
use crate::store::{MeetingStore, SessionStore, UserStore};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    meetings: RwLock<HashMap<MeetingId, Meeting>>,
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_version(expected: i64, actual: i64) -> DbResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(DbError::VersionConflict { expected, actual })
    }
}

impl UserStore for MemoryStore {
    fn find_user(&self, id: UserId) -> BoxFuture<'_, DbResult<Option<User>>> {
        Box::pin(async move {
            let users = self.users.read().await;
            Ok(users.get(&id).filter(|u| !u.is_deleted).cloned())
        })
    }

    fn find_user_by_email<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, DbResult<Option<User>>> {
        Box::pin(async move {
            let users = self.users.read().await;
            Ok(users
                .values()
                .find(|u| !u.is_deleted && u.email.eq_ignore_ascii_case(email))
                .cloned())
        })
    }

    fn list_users(&self) -> BoxFuture<'_, DbResult<Vec<User>>> {
        Box::pin(async move {
            let users = self.users.read().await;
            let mut out: Vec<User> = users.values().filter(|u| u.is_usable()).cloned().collect();
            out.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            Ok(out)
        })
    }

    fn insert_user(&self, mut user: User) -> BoxFuture<'_, DbResult<User>> {
        Box::pin(async move {
            let mut users = self.users.write().await;
            if users.contains_key(&user.id) {
                return Err(CoreError::InvariantViolation("duplicate user id on insert").into());
            }
            // Uniqueness must hold under the same write lock as the insert;
            // a check in the service layer alone would race.
            if users
                .values()
                .any(|u| !u.is_deleted && u.email.eq_ignore_ascii_case(&user.email))
            {
                return Err(DbError::EmailTaken(user.email));
            }
            user.version = 1;
            users.insert(user.id, user.clone());
            tracing::trace!(user_id = %user.id, "User record inserted");
            Ok(user)
        })
    }

    fn save_user(&self, mut user: User) -> BoxFuture<'_, DbResult<User>> {
        Box::pin(async move {
            let mut users = self.users.write().await;
            let current = users
                .get(&user.id)
                .ok_or_else(|| DbError::RecordNotFound(format!("user {}", user.id)))?;
            check_version(user.version, current.version)?;
            user.version += 1;
            users.insert(user.id, user.clone());
            tracing::trace!(user_id = %user.id, version = user.version, "User record saved");
            Ok(user)
        })
    }
}

impl MeetingStore for MemoryStore {
    fn find_meeting(&self, id: MeetingId) -> BoxFuture<'_, DbResult<Option<Meeting>>> {
        Box::pin(async move {
            let meetings = self.meetings.read().await;
            Ok(meetings.get(&id).filter(|m| !m.is_deleted).cloned())
        })
    }

    fn meetings_for_user(&self, user: UserId) -> BoxFuture<'_, DbResult<Vec<Meeting>>> {
        Box::pin(async move {
            let meetings = self.meetings.read().await;
            let mut out: Vec<Meeting> = meetings
                .values()
                .filter(|m| !m.is_deleted && m.involves(user))
                .cloned()
                .collect();
            out.sort_by(|a, b| a.time.start.cmp(&b.time.start));
            Ok(out)
        })
    }

    fn confirmed_meetings_for_user(
        &self,
        user: UserId,
    ) -> BoxFuture<'_, DbResult<Vec<Meeting>>> {
        Box::pin(async move {
            let meetings = self.meetings.read().await;
            Ok(meetings
                .values()
                .filter(|m| m.is_confirmed() && m.involves(user))
                .cloned()
                .collect())
        })
    }

    fn insert_meeting(&self, mut meeting: Meeting) -> BoxFuture<'_, DbResult<Meeting>> {
        Box::pin(async move {
            let mut meetings = self.meetings.write().await;
            if meetings.contains_key(&meeting.id) {
                return Err(
                    CoreError::InvariantViolation("duplicate meeting id on insert").into()
                );
            }
            meeting.version = 1;
            meetings.insert(meeting.id, meeting.clone());
            tracing::trace!(meeting_id = %meeting.id, "Meeting record inserted");
            Ok(meeting)
        })
    }

    fn save_meeting(&self, mut meeting: Meeting) -> BoxFuture<'_, DbResult<Meeting>> {
        Box::pin(async move {
            let mut meetings = self.meetings.write().await;
            let current = meetings
                .get(&meeting.id)
                .ok_or_else(|| DbError::RecordNotFound(format!("meeting {}", meeting.id)))?;
            check_version(meeting.version, current.version)?;
            meeting.version += 1;
            meetings.insert(meeting.id, meeting.clone());
            tracing::trace!(
                meeting_id = %meeting.id,
                version = meeting.version,
                "Meeting record saved"
            );
            Ok(meeting)
        })
    }
}

impl SessionStore for MemoryStore {
    fn insert_session(&self, session: Session) -> BoxFuture<'_, DbResult<Session>> {
        Box::pin(async move {
            let mut sessions = self.sessions.write().await;
            sessions.insert(session.token.clone(), session.clone());
            Ok(session)
        })
    }

    fn find_session<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, DbResult<Option<Session>>> {
        Box::pin(async move {
            let sessions = self.sessions.read().await;
            Ok(sessions.get(token).cloned())
        })
    }

    fn remove_session<'a>(&'a self, token: &'a str) -> BoxFuture<'a, DbResult<()>> {
        Box::pin(async move {
            let mut sessions = self.sessions.write().await;
            sessions.remove(token);
            Ok(())
        })
    }
}
