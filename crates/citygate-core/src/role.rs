//! # Role Enumeration
//!
//! The closed set of authorization levels a caller can hold. Any role string
//! outside this set is a verification failure, never a crash.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Roles on the CityGate platform.
///
/// Serialized in `SCREAMING_SNAKE_CASE` to match the role claim the token
/// issuer embeds in credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Platform administration — full access.
    Admin,
    /// City operations center staff.
    Operator,
    /// Field responder (emergency services).
    Responder,
    /// Registered resident.
    Citizen,
}

/// Error returned when a role string is not in the closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);

impl Role {
    /// Return the string representation of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Operator => "OPERATOR",
            Self::Responder => "RESPONDER",
            Self::Citizen => "CITIZEN",
        }
    }

    /// Every role in the enumeration, in privilege order.
    pub const fn all() -> [Role; 4] {
        [Role::Admin, Role::Operator, Role::Responder, Role::Citizen]
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "OPERATOR" => Ok(Self::Operator),
            "RESPONDER" => Ok(Self::Responder),
            "CITIZEN" => Ok(Self::Citizen),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}
