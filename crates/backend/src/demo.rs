//! `DemoBackend` — fully local, deterministic substitute for the hosted
//! backend.
//!
//! Owns the seeded demo dataset. Reads serve the fixed seed; writes mutate an
//! in-memory copy and return rows shaped exactly like the real backend's
//! (fresh identifiers, current timestamps), so callers never branch on
//! demo-vs-real. The dataset lives only as long as the process and is
//! reseeded every time demo mode is (re-)entered.

use chrono::{Duration, Utc};
use serde_json::json;
use tokio::sync::Mutex;
use uuid::Uuid;

use kaziflow_auth::{
    Actor, CommunicationChannel, PinCredential, Role, Tenant, hash_pin,
};
use kaziflow_core::{ActorId, CommunicationId, CompanyCode, PhoneNumber, Pin, TenantId};

use crate::error::BackendError;
use crate::records::{
    AuthIdentity, Communication, CommunicationStatus, CommunicationType, NewCommunication,
    ProfileChanges, RegistrationRequest,
};
use crate::Backend;

const DEMO_TENANT_UUID: Uuid = Uuid::from_u128(0x00d3_a0de_0000_7000_8000_0000_0000_0001);
const DEMO_ACTOR_UUID: Uuid = Uuid::from_u128(0x00d3_a0de_0000_7000_8000_0000_0000_0002);

/// PIN accepted by the seeded demo actor.
pub const DEMO_PIN: &str = "1234";

/// Phone number of the seeded demo actor.
pub const DEMO_PHONE: &str = "+255700000001";

/// The fixed seeded tenant.
pub fn demo_tenant() -> Tenant {
    Tenant {
        id: TenantId::from_uuid(DEMO_TENANT_UUID),
        name: "Demo Company Inc.".to_string(),
        code: CompanyCode::parse("demo-co").expect("seed company code is valid"),
        email_domain: "demo-co.example".to_string(),
        created_at: Utc::now() - Duration::days(90),
    }
}

/// The fixed seeded HR-admin actor.
pub fn demo_actor() -> Actor {
    Actor {
        id: ActorId::from_uuid(DEMO_ACTOR_UUID),
        full_name: "Demo HR Admin".to_string(),
        role: Role::HrAdmin,
        tenant: demo_tenant(),
        email: None,
        phone_number: PhoneNumber::parse(DEMO_PHONE).ok(),
        department: None,
        channels: vec![CommunicationChannel::Email, CommunicationChannel::Whatsapp],
        pin_set: true,
    }
}

fn sample_communications(employee_id: ActorId) -> Vec<Communication> {
    let now = Utc::now();
    vec![
        Communication {
            id: CommunicationId::new(),
            employee_id,
            channel: CommunicationChannel::Whatsapp,
            kind: CommunicationType::LeaveRequest,
            content: json!({
                "start_date": now + Duration::days(7),
                "end_date": now + Duration::days(10),
                "reason": "vacation",
            })
            .to_string(),
            status: CommunicationStatus::Pending,
            created_at: now,
            updated_at: now,
        },
        Communication {
            id: CommunicationId::new(),
            employee_id,
            channel: CommunicationChannel::Whatsapp,
            kind: CommunicationType::PaymentAdvance,
            content: json!({ "amount": "5000", "reason": "Medical expenses" }).to_string(),
            status: CommunicationStatus::Approved,
            created_at: now - Duration::days(5),
            updated_at: now - Duration::days(3),
        },
        Communication {
            id: CommunicationId::new(),
            employee_id,
            channel: CommunicationChannel::Whatsapp,
            kind: CommunicationType::Complaint,
            content: "The air conditioning in the east wing has been broken for two weeks."
                .to_string(),
            status: CommunicationStatus::Completed,
            created_at: now - Duration::days(20),
            updated_at: now - Duration::days(15),
        },
    ]
}

struct DemoData {
    actor: Actor,
    credential: PinCredential,
    communications: Vec<Communication>,
}

impl DemoData {
    fn seed() -> Self {
        let actor = demo_actor();
        let pin_hash = Pin::parse(DEMO_PIN)
            .ok()
            .and_then(|pin| hash_pin(&pin).ok())
            .unwrap_or_default();
        Self {
            credential: PinCredential {
                actor_id: actor.id,
                pin_hash,
                pin_set: true,
            },
            communications: sample_communications(actor.id),
            actor,
        }
    }
}

/// In-memory implementation of [`Backend`].
pub struct DemoBackend {
    data: Mutex<DemoData>,
}

impl DemoBackend {
    /// A freshly seeded demo backend.
    pub fn seeded() -> Self {
        Self {
            data: Mutex::new(DemoData::seed()),
        }
    }
}

impl Default for DemoBackend {
    fn default() -> Self {
        Self::seeded()
    }
}

#[async_trait::async_trait]
impl Backend for DemoBackend {
    async fn current_actor(&self) -> Result<Option<Actor>, BackendError> {
        let data = self.data.lock().await;
        Ok(Some(data.actor.clone()))
    }

    async fn sign_in_with_password(
        &self,
        login: &str,
        _password: &str,
    ) -> Result<AuthIdentity, BackendError> {
        // The demo accepts whatever the visitor types.
        let data = self.data.lock().await;
        tracing::debug!(login, "demo session established");
        Ok(AuthIdentity {
            id: data.actor.id,
            email: data.actor.email.as_ref().map(|e| e.as_str().to_string()),
        })
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        Ok(())
    }

    async fn find_profile_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<Actor>, BackendError> {
        let data = self.data.lock().await;
        if data.actor.phone_number.as_ref() == Some(phone) {
            Ok(Some(data.actor.clone()))
        } else {
            Ok(None)
        }
    }

    async fn pin_credential(
        &self,
        actor_id: ActorId,
    ) -> Result<Option<PinCredential>, BackendError> {
        let data = self.data.lock().await;
        if data.credential.actor_id == actor_id {
            Ok(Some(data.credential.clone()))
        } else {
            Ok(None)
        }
    }

    async fn upsert_pin(&self, actor_id: ActorId, pin_hash: &str) -> Result<(), BackendError> {
        let mut data = self.data.lock().await;
        if data.actor.id != actor_id {
            return Err(BackendError::NotFound);
        }
        data.credential = PinCredential {
            actor_id,
            pin_hash: pin_hash.to_string(),
            pin_set: true,
        };
        data.actor.pin_set = true;
        Ok(())
    }

    async fn update_profile(
        &self,
        actor_id: ActorId,
        changes: &ProfileChanges,
    ) -> Result<(), BackendError> {
        let mut data = self.data.lock().await;
        if data.actor.id != actor_id {
            return Err(BackendError::NotFound);
        }
        if let Some(full_name) = &changes.full_name {
            data.actor.full_name = full_name.clone();
        }
        if let Some(phone) = &changes.phone_number {
            data.actor.phone_number = Some(phone.clone());
        }
        if let Some(department) = &changes.department {
            data.actor.department = Some(department.clone());
        }
        if let Some(channels) = &changes.communication_channels {
            data.actor.channels = channels.clone();
        }
        Ok(())
    }

    async fn list_communications(&self) -> Result<Vec<Communication>, BackendError> {
        let data = self.data.lock().await;
        let mut items = data.communications.clone();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn insert_communication(
        &self,
        new: &NewCommunication,
    ) -> Result<Communication, BackendError> {
        let mut data = self.data.lock().await;
        let now = Utc::now();
        let comm = Communication {
            id: CommunicationId::new(),
            employee_id: new.employee_id,
            channel: new.channel,
            kind: new.kind,
            content: new.content.clone(),
            status: CommunicationStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        data.communications.insert(0, comm.clone());
        Ok(comm)
    }

    async fn update_communication_status(
        &self,
        id: CommunicationId,
        status: CommunicationStatus,
    ) -> Result<Communication, BackendError> {
        let mut data = self.data.lock().await;
        let comm = data
            .communications
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(BackendError::NotFound)?;
        comm.status = status;
        comm.updated_at = Utc::now();
        Ok(comm.clone())
    }

    async fn register_company_and_admin(
        &self,
        request: &RegistrationRequest,
    ) -> Result<serde_json::Value, BackendError> {
        let mut data = self.data.lock().await;
        let tenant = Tenant {
            id: TenantId::new(),
            name: request.company_name.clone(),
            code: request.company_code.clone(),
            email_domain: format!("{}.example", request.company_code),
            created_at: Utc::now(),
        };
        let admin = Actor {
            id: ActorId::new(),
            full_name: request.full_name.clone(),
            role: Role::HrAdmin,
            tenant,
            email: Some(request.email.clone()),
            phone_number: None,
            department: None,
            channels: vec![CommunicationChannel::Email],
            pin_set: false,
        };
        let receipt = json!({
            "company_id": admin.tenant.id,
            "profile_id": admin.id,
        });
        data.actor = admin;
        data.communications = sample_communications(data.actor.id);
        data.credential = PinCredential {
            actor_id: data.actor.id,
            pin_hash: String::new(),
            pin_set: false,
        };
        Ok(receipt)
    }
}
