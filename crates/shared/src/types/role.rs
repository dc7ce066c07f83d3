//! User roles for the admin portal.
//!
//! Roles arrive as free strings inside JWT claims issued by the portal;
//! this enum is the typed view the review engine gates on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A role held by an authenticated portal user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrative access, including evidence upload.
    Admin,
    /// May upload audit evidence and attach reviewer notes.
    CashupReviewer,
    /// Owns and submits daily cash-ups.
    Cashier,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::CashupReviewer => "cashup_reviewer",
            Self::Cashier => "cashier",
        }
    }

    /// Parses a role from a string. Unknown roles map to `None` so that
    /// unrelated portal roles (hr, assets, ...) are simply ignored.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "cashup_reviewer" => Some(Self::CashupReviewer),
            "cashier" => Some(Self::Cashier),
            _ => None,
        }
    }

    /// Returns true if the role may attach audit evidence.
    #[must_use]
    pub fn can_upload_evidence(&self) -> bool {
        matches!(self, Self::Admin | Self::CashupReviewer)
    }

    /// Returns true if the role may append reviewer notes.
    #[must_use]
    pub fn can_review(&self) -> bool {
        matches!(self, Self::CashupReviewer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
