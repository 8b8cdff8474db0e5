//! Wire row types shared by both backend implementations.
//!
//! Field names follow the hosted schema (`full_name`, `company_id`,
//! `pin_hash`, ...); rows round-trip through JSON unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kaziflow_auth::{Actor, CommunicationChannel, PinCredential, Role, Tenant};
use kaziflow_core::{
    ActorId, CommunicationId, CompanyCode, EmailAddress, PhoneNumber, TenantId,
};

use crate::error::BackendError;

/// Identity confirmed by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthIdentity {
    pub id: ActorId,
    pub email: Option<String>,
}

/// Kind of employee communication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationType {
    LeaveRequest,
    Complaint,
    Query,
    Notice,
    PaymentAdvance,
}

/// Lifecycle status of a communication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

/// A stored communication row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Communication {
    pub id: CommunicationId,
    pub employee_id: ActorId,
    pub channel: CommunicationChannel,
    #[serde(rename = "type")]
    pub kind: CommunicationType,
    pub content: String,
    pub status: CommunicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a communication about to be inserted.
///
/// `status`, `id` and timestamps are assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCommunication {
    pub employee_id: ActorId,
    pub channel: CommunicationChannel,
    #[serde(rename = "type")]
    pub kind: CommunicationType,
    pub content: String,
}

/// Partial profile update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<PhoneNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication_channels: Option<Vec<CommunicationChannel>>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.phone_number.is_none()
            && self.department.is_none()
            && self.communication_channels.is_none()
    }
}

/// Arguments of the `register_company_and_admin` security-definer procedure.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationRequest {
    pub company_name: String,
    pub company_code: CompanyCode,
    pub full_name: String,
    pub email: EmailAddress,
    /// Empty for the initial admin; employees get theirs during onboarding.
    pub phone_number: String,
    pub password: String,
}

impl core::fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("company_name", &self.company_name)
            .field("company_code", &self.company_code)
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("phone_number", &self.phone_number)
            .field("password", &"****")
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Raw rows as the relational store returns them
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct CompanyRow {
    pub id: TenantId,
    pub name: String,
    pub code: CompanyCode,
    pub email_domain: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PinRow {
    pub id: Uuid,
    pub profile_id: ActorId,
    pub pin_hash: String,
    #[serde(default)]
    pub pin_set: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A profile row with its `companies` and `employee_pins` joins embedded.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    pub id: ActorId,
    pub company_id: TenantId,
    pub role: Role,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub communication_channels: Vec<CommunicationChannel>,
    pub department: Option<String>,
    pub companies: Option<CompanyRow>,
    pub employee_pins: Option<PinRow>,
}

impl ProfileRow {
    /// Assemble the domain actor from the joined row.
    pub fn into_actor(self) -> Result<Actor, BackendError> {
        let company = self.companies.ok_or_else(|| {
            BackendError::Parse(format!("profile {} is missing its company join", self.id))
        })?;

        let channels = if self.communication_channels.is_empty() {
            // Rows predating channel selection default to email.
            vec![CommunicationChannel::Email]
        } else {
            self.communication_channels
        };

        let actor = Actor {
            id: self.id,
            full_name: self.full_name.unwrap_or_default(),
            role: self.role,
            tenant: Tenant {
                id: company.id,
                name: company.name,
                code: company.code,
                email_domain: company.email_domain,
                created_at: company.created_at,
            },
            // Stored contact fields are advisory; unparseable values are
            // dropped rather than blocking sign-in.
            email: self.email.as_deref().and_then(|e| EmailAddress::parse(e).ok()),
            phone_number: self
                .phone_number
                .as_deref()
                .and_then(|p| PhoneNumber::parse(p).ok()),
            department: self.department,
            channels,
            pin_set: self.employee_pins.as_ref().is_some_and(|p| p.pin_set),
        };
        actor
            .validate()
            .map_err(|e| BackendError::Parse(e.to_string()))?;
        Ok(actor)
    }

    pub fn pin_credential(&self) -> Option<PinCredential> {
        self.employee_pins.as_ref().map(|row| PinCredential {
            actor_id: row.profile_id,
            pin_hash: row.pin_hash.clone(),
            pin_set: row.pin_set,
        })
    }
}
