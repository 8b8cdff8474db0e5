//! RBAC roles.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use kaziflow_core::DomainError;

/// Role granted to an actor within its tenant.
///
/// The role set is closed: dashboards and guards branch on these three
/// variants, and the backend stores them as the snake_case strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    HrAdmin,
    Manager,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::HrAdmin => "hr_admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }

    /// Whether this role may review and transition communications.
    pub fn can_review_communications(&self) -> bool {
        matches!(self, Role::HrAdmin | Role::Manager)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hr_admin" => Ok(Role::HrAdmin),
            "manager" => Ok(Role::Manager),
            "employee" => Ok(Role::Employee),
            other => Err(DomainError::validation(format!("unknown role '{other}'"))),
        }
    }
}
