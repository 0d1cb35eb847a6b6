//! Acting identities.

use serde::{Deserialize, Serialize};

/// The identity a lifecycle operation runs as.
///
/// An identity derived from a shared team token rather than an individual
/// account is exempt from individual quota accounting: the user-quota
/// reservation step neither charges nor releases anything for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable identifier used as the quota-ledger key for this user.
    pub id: String,

    /// Email address, recorded in reservation results and resolved back to
    /// the user through the directory during compensation.
    pub email: String,

    /// True when this identity was derived from a shared team token.
    pub from_token: bool,
}

impl User {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            from_token: false,
        }
    }

    /// Identity backed by a shared team credential.
    pub fn from_team_token(email: impl Into<String>) -> Self {
        let email = email.into();
        Self {
            id: email.clone(),
            email,
            from_token: true,
        }
    }
}
