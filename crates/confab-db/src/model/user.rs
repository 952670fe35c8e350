use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use confab_core::slot::DailySlot;
use confab_core::types::UserId;

/// Recovery question/answer pair used for password reset.
///
/// The answer is compared case-insensitively and never serialized to
/// callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordRecovery {
    pub question: String,
    #[serde(skip_serializing)]
    pub answer: String,
}

/// A registered account.
///
/// `blocked_slots` are the user's recurring daily off-hours; they carry no
/// date component and are re-evaluated against the calendar dates of each
/// candidate meeting at check time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Argon2id hash; the plaintext credential is never stored or compared.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub recovery: PasswordRecovery,
    pub blocked_slots: Vec<DailySlot>,
    pub active: bool,
    pub deactivated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub total_logins: i64,
    /// Optimistic concurrency token; bumped by the store on every save.
    pub version: i64,
}

impl User {
    /// Builds a fresh account record. The store assigns the first version
    /// on insert.
    #[must_use]
    pub fn register(
        name: String,
        email: String,
        password_hash: String,
        recovery: PasswordRecovery,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            name,
            email,
            password_hash,
            recovery,
            blocked_slots: Vec::new(),
            active: true,
            deactivated_at: None,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            last_updated_at: None,
            last_login: None,
            total_logins: 0,
            version: 0,
        }
    }

    /// Whether this account may authenticate and appear in lookups.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.active && !self.is_deleted
    }

    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login = Some(now);
        self.total_logins += 1;
    }

    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.active = false;
        self.deactivated_at = Some(now);
    }

    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        self.is_deleted = true;
        self.deleted_at = Some(now);
    }
}
