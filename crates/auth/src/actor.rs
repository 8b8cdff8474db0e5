//! Actor: the authenticated principal of a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kaziflow_core::{
    ActorId, CompanyCode, DomainError, DomainResult, EmailAddress, PhoneNumber, TenantId,
};

use crate::{CommunicationChannel, Role};

/// An isolated customer organization (company).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub code: CompanyCode,
    /// Domain used to synthesize internal login identifiers for PIN sessions.
    pub email_domain: String,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    /// Internal login identifier used to piggyback PIN auth onto password
    /// session issuance: `{phone}@temp.<email_domain>`.
    ///
    /// The auth provider has no native phone+PIN session type, so employee
    /// identities are provisioned under this synthetic address. It never
    /// receives mail.
    pub fn pin_login_identifier(&self, phone: &PhoneNumber) -> String {
        format!("{}@temp.{}", phone.as_str(), self.email_domain)
    }
}

/// The authenticated principal held by the session store.
///
/// An actor always belongs to exactly one tenant; the tenant record is
/// embedded rather than referenced so observers never need a second lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub full_name: String,
    pub role: Role,
    pub tenant: Tenant,
    pub email: Option<EmailAddress>,
    pub phone_number: Option<PhoneNumber>,
    pub department: Option<String>,
    pub channels: Vec<CommunicationChannel>,
    /// Whether a PIN credential has been established (distinct from whether
    /// the credential row exists at all).
    pub pin_set: bool,
}

impl Actor {
    /// Validate the channel-set invariant: non-empty, no duplicates.
    pub fn validate(&self) -> DomainResult<()> {
        if self.channels.is_empty() {
            return Err(DomainError::validation(
                "actor must have at least one communication channel",
            ));
        }
        let mut seen = self.channels.clone();
        seen.sort_by_key(|c| c.as_str());
        seen.dedup();
        if seen.len() != self.channels.len() {
            return Err(DomainError::validation(
                "actor communication channels must be distinct",
            ));
        }
        Ok(())
    }
}
