//! Account roles

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role carried by an identity and embedded in access tokens.
///
/// `Guest` never exists in storage. It marks the anonymous identity produced
/// by optional session resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    User,
    Editor,
    Admin,
    Guest,
}

impl Role {
    /// Storage / wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Editor => "Editor",
            Self::Admin => "Admin",
            Self::Guest => "Guest",
        }
    }

    /// Admin holds every permission implicitly
    #[inline]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    #[inline]
    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(Self::User),
            "Editor" => Ok(Self::Editor),
            "Admin" => Ok(Self::Admin),
            "Guest" => Ok(Self::Guest),
            other => Err(format!("unknown role: {other}")),
        }
    }
}
