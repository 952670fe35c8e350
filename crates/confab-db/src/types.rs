use crate::model::user::User;

/// Principal resolved by the auth middleware and stored in the request
/// depot for downstream handlers.
#[derive(Debug, Clone)]
pub enum AuthedUser {
    User(User),
    Public,
}

impl AuthedUser {
    /// The resolved user, if the request carried a valid identity token.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::User(user) => Some(user),
            Self::Public => None,
        }
    }
}
