//! Capability checks shared by the catalog and order operations.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(DomainError::Internal(format!("unknown role '{other}'"))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub user_id: Uuid,
    pub role: Role,
}

impl Requester {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

pub fn require_admin(requester: &Requester) -> Result<(), DomainError> {
    if requester.is_admin() {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

/// Admins may act on any resource; everyone else only on what they own.
pub fn require_owner_or_admin(requester: &Requester, owner_id: Uuid) -> Result<(), DomainError> {
    if requester.is_admin() || requester.user_id == owner_id {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}
