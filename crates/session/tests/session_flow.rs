//! End-to-end tests for the session and communications stores, driven
//! against a scriptable stub backend plus the built-in demo backend.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use kaziflow_auth::{Actor, CommunicationChannel, PinCredential, Role, Tenant, hash_pin};
use kaziflow_backend::{
    AuthIdentity, Backend, BackendError, Communication, CommunicationStatus, CommunicationType,
    DEMO_MODE_FLAG, FlagStore, MemoryFlagStore, NewCommunication, ProfileChanges,
    RegistrationRequest,
};
use kaziflow_core::{ActorId, CommunicationId, CompanyCode, DialCode, PhoneNumber, Pin, TenantId};
use kaziflow_session::{CommunicationsService, CompanyRegistration, SessionError, SessionService};

// ─────────────────────────────────────────────────────────────────────────────
// Stub backend
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct StubBackend {
    /// login identifier → (password, actor id)
    accounts: Mutex<HashMap<String, (String, ActorId)>>,
    profiles: Mutex<Vec<Actor>>,
    pins: Mutex<HashMap<ActorId, PinCredential>>,
    /// The "bearer token": survives across services sharing this stub.
    session: Mutex<Option<ActorId>>,
    company_codes: Mutex<HashSet<String>>,
    /// Error injected into the next backend call, whatever it is.
    fail_next: Mutex<Option<BackendError>>,
    calls: AtomicUsize,
}

impl StubBackend {
    fn gate(&self) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail_next_with(&self, err: BackendError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    fn add_account(&self, login: &str, password: &str, actor_id: ActorId) {
        self.accounts
            .lock()
            .unwrap()
            .insert(login.to_string(), (password.to_string(), actor_id));
    }

    fn add_profile(&self, actor: Actor) {
        self.profiles.lock().unwrap().push(actor);
    }

    fn set_pin(&self, actor_id: ActorId, pin: &str, pin_set: bool) {
        let pin_hash = hash_pin(&Pin::parse(pin).unwrap()).unwrap();
        self.pins.lock().unwrap().insert(
            actor_id,
            PinCredential {
                actor_id,
                pin_hash,
                pin_set,
            },
        );
    }

    fn profile_by_id(&self, id: ActorId) -> Option<Actor> {
        self.profiles
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }
}

#[async_trait::async_trait]
impl Backend for StubBackend {
    async fn current_actor(&self) -> Result<Option<Actor>, BackendError> {
        self.gate()?;
        let session = *self.session.lock().unwrap();
        Ok(session.and_then(|id| self.profile_by_id(id)))
    }

    async fn sign_in_with_password(
        &self,
        login: &str,
        password: &str,
    ) -> Result<AuthIdentity, BackendError> {
        self.gate()?;
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(login) {
            Some((stored, actor_id)) if stored == password => {
                *self.session.lock().unwrap() = Some(*actor_id);
                Ok(AuthIdentity {
                    id: *actor_id,
                    email: Some(login.to_string()),
                })
            }
            _ => Err(BackendError::InvalidCredentials),
        }
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.gate()?;
        *self.session.lock().unwrap() = None;
        Ok(())
    }

    async fn find_profile_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<Actor>, BackendError> {
        self.gate()?;
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.phone_number.as_ref() == Some(phone))
            .cloned())
    }

    async fn pin_credential(
        &self,
        actor_id: ActorId,
    ) -> Result<Option<PinCredential>, BackendError> {
        self.gate()?;
        Ok(self.pins.lock().unwrap().get(&actor_id).cloned())
    }

    async fn upsert_pin(&self, actor_id: ActorId, pin_hash: &str) -> Result<(), BackendError> {
        self.gate()?;
        self.pins.lock().unwrap().insert(
            actor_id,
            PinCredential {
                actor_id,
                pin_hash: pin_hash.to_string(),
                pin_set: true,
            },
        );
        if let Some(actor) = self
            .profiles
            .lock()
            .unwrap()
            .iter_mut()
            .find(|a| a.id == actor_id)
        {
            actor.pin_set = true;
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        actor_id: ActorId,
        changes: &ProfileChanges,
    ) -> Result<(), BackendError> {
        self.gate()?;
        let mut profiles = self.profiles.lock().unwrap();
        let actor = profiles
            .iter_mut()
            .find(|a| a.id == actor_id)
            .ok_or(BackendError::NotFound)?;
        if let Some(full_name) = &changes.full_name {
            actor.full_name = full_name.clone();
        }
        if let Some(phone) = &changes.phone_number {
            actor.phone_number = Some(phone.clone());
        }
        if let Some(department) = &changes.department {
            actor.department = Some(department.clone());
        }
        if let Some(channels) = &changes.communication_channels {
            actor.channels = channels.clone();
        }
        Ok(())
    }

    async fn list_communications(&self) -> Result<Vec<Communication>, BackendError> {
        self.gate()?;
        Ok(Vec::new())
    }

    async fn insert_communication(
        &self,
        new: &NewCommunication,
    ) -> Result<Communication, BackendError> {
        self.gate()?;
        let now = Utc::now();
        Ok(Communication {
            id: CommunicationId::new(),
            employee_id: new.employee_id,
            channel: new.channel,
            kind: new.kind,
            content: new.content.clone(),
            status: CommunicationStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update_communication_status(
        &self,
        _id: CommunicationId,
        _status: CommunicationStatus,
    ) -> Result<Communication, BackendError> {
        self.gate()?;
        Err(BackendError::NotFound)
    }

    async fn register_company_and_admin(
        &self,
        request: &RegistrationRequest,
    ) -> Result<serde_json::Value, BackendError> {
        self.gate()?;
        {
            let mut codes = self.company_codes.lock().unwrap();
            if !codes.insert(request.company_code.as_str().to_string()) {
                return Err(BackendError::api(
                    409,
                    "duplicate key value violates unique constraint \"companies_code_key\"",
                ));
            }
        }
        if self
            .accounts
            .lock()
            .unwrap()
            .contains_key(request.email.as_str())
        {
            return Err(BackendError::api(422, "User already registered"));
        }

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
        self.add_account(request.email.as_str(), &request.password, admin.id);
        let receipt = serde_json::json!({
            "company_id": admin.tenant.id,
            "profile_id": admin.id,
        });
        self.add_profile(admin);
        Ok(receipt)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────────────

fn acme() -> Tenant {
    Tenant {
        id: TenantId::new(),
        name: "Acme Inc.".to_string(),
        code: CompanyCode::parse("acme-inc").unwrap(),
        email_domain: "acme-inc.example".to_string(),
        created_at: Utc::now(),
    }
}

fn employee(tenant: Tenant, phone: &str) -> Actor {
    Actor {
        id: ActorId::new(),
        full_name: "Asha Mwangi".to_string(),
        role: Role::Employee,
        tenant,
        email: None,
        phone_number: Some(PhoneNumber::parse(phone).unwrap()),
        department: Some("Operations".to_string()),
        channels: vec![CommunicationChannel::Whatsapp],
        pin_set: false,
    }
}

fn setup() -> (Arc<StubBackend>, Arc<MemoryFlagStore>, Arc<SessionService>) {
    kaziflow_observability::init();
    let stub = Arc::new(StubBackend::default());
    let flags = Arc::new(MemoryFlagStore::default());
    let service = Arc::new(SessionService::new(stub.clone(), flags.clone()));
    (stub, flags, service)
}

fn dial_tz() -> DialCode {
    DialCode::parse("+255").unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Session store
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fresh_initialize_with_no_flag_and_no_token_is_empty() {
    let (_stub, _flags, service) = setup();
    assert!(service.state().is_loading);

    service.initialize().await;

    let state = service.state();
    assert!(state.actor.is_none());
    assert!(!state.is_loading);
    assert!(!state.demo_mode);
    assert!(state.last_error.is_none());
}

#[tokio::test]
async fn password_sign_in_survives_a_simulated_restart() {
    let (stub, _flags, service) = setup();
    let admin = {
        let mut a = employee(acme(), "+255712000001");
        a.role = Role::HrAdmin;
        a
    };
    stub.add_account("jane@acme-inc.example", "secret-password", admin.id);
    stub.add_profile(admin.clone());

    service
        .sign_in("jane@acme-inc.example", "secret-password")
        .await
        .unwrap();
    let first = service.state().actor.unwrap();

    // Same backend (same token), new service instance: a restart.
    let restarted = SessionService::new(stub.clone(), Arc::new(MemoryFlagStore::default()));
    restarted.initialize().await;
    let second = restarted.state().actor.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.role, second.role);
}

#[tokio::test]
async fn sign_in_with_wrong_password_records_and_rethrows() {
    let (stub, _flags, service) = setup();
    let actor = employee(acme(), "+255712000002");
    stub.add_account("jane@acme-inc.example", "secret-password", actor.id);
    stub.add_profile(actor);

    let err = service
        .sign_in("jane@acme-inc.example", "wrong")
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::InvalidCredentials);

    let state = service.state();
    assert_eq!(state.last_error, Some(SessionError::InvalidCredentials));
    assert!(state.actor.is_none());
    assert!(!state.is_loading);
}

#[tokio::test]
async fn malformed_email_fails_locally_without_any_network_call() {
    let (stub, _flags, service) = setup();
    let err = service.sign_in("not-an-email", "whatever").await.unwrap_err();
    assert!(matches!(err, SessionError::Validation(_)));
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn pin_sign_in_without_credential_row_fails_pin_not_set() {
    let (stub, _flags, service) = setup();
    stub.add_profile(employee(acme(), "+255712345678"));

    let err = service
        .sign_in_with_pin(&dial_tz(), "0712345678", "1234")
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::PinNotSet);
}

#[tokio::test]
async fn pin_sign_in_with_unset_credential_also_fails_pin_not_set() {
    let (stub, _flags, service) = setup();
    let actor = employee(acme(), "+255712345678");
    stub.set_pin(actor.id, "1234", false);
    stub.add_profile(actor);

    let err = service
        .sign_in_with_pin(&dial_tz(), "0712345678", "1234")
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::PinNotSet);
}

#[tokio::test]
async fn wrong_pin_fails_invalid_pin_regardless_of_prefix_similarity() {
    let (stub, _flags, service) = setup();
    let actor = employee(acme(), "+255712345678");
    stub.set_pin(actor.id, "1234", true);
    stub.add_profile(actor);

    for wrong in ["123", "12345", "4321", "1235"] {
        let err = service
            .sign_in_with_pin(&dial_tz(), "0712345678", wrong)
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::InvalidPin, "pin {wrong:?}");
    }
}

#[tokio::test]
async fn pin_sign_in_for_unknown_phone_fails_profile_not_found() {
    let (_stub, _flags, service) = setup();
    let err = service
        .sign_in_with_pin(&dial_tz(), "0799999999", "1234")
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::ProfileNotFound);
}

#[tokio::test]
async fn correct_pin_establishes_a_session_via_the_synthesized_login() {
    let (stub, _flags, service) = setup();
    let actor = employee(acme(), "+255712345678");
    stub.set_pin(actor.id, "1234", true);
    // The provisioned internal identity the PIN path piggybacks on.
    stub.add_account("+255712345678@temp.acme-inc.example", "1234", actor.id);
    stub.add_profile(actor.clone());

    service
        .sign_in_with_pin(&dial_tz(), "0712 345 678", "1234")
        .await
        .unwrap();

    let state = service.state();
    assert_eq!(state.actor.as_ref().map(|a| a.id), Some(actor.id));
    assert!(!state.is_loading);
}

#[tokio::test]
async fn setup_pin_then_sign_in_round_trips() {
    let (stub, _flags, service) = setup();
    let actor = employee(acme(), "+255712345678");
    stub.add_account("+255712345678@temp.acme-inc.example", "2468", actor.id);
    stub.add_profile(actor.clone());

    service
        .setup_pin(&dial_tz(), "0712345678", "2468")
        .await
        .unwrap();
    service
        .sign_in_with_pin(&dial_tz(), "0712345678", "2468")
        .await
        .unwrap();
    assert_eq!(service.state().actor.map(|a| a.id), Some(actor.id));
}

#[tokio::test]
async fn setup_pin_for_unknown_phone_fails_profile_not_found() {
    let (_stub, _flags, service) = setup();
    let err = service
        .setup_pin(&dial_tz(), "0799999999", "2468")
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::ProfileNotFound);
}

#[tokio::test]
async fn lookup_phone_reports_registration_and_pin_status() {
    let (stub, _flags, service) = setup();
    let with_pin = employee(acme(), "+255712345678");
    stub.set_pin(with_pin.id, "1234", true);
    stub.add_profile(with_pin.clone());
    let without_pin = employee(acme(), "+255712345679");
    stub.add_profile(without_pin.clone());

    let looked_up = service.lookup_phone(&dial_tz(), "0712345678").await.unwrap();
    assert_eq!(looked_up.actor_id, with_pin.id);
    assert!(looked_up.pin_set);

    let looked_up = service.lookup_phone(&dial_tz(), "0712345679").await.unwrap();
    assert_eq!(looked_up.actor_id, without_pin.id);
    assert!(!looked_up.pin_set);

    let err = service
        .lookup_phone(&dial_tz(), "0700000000")
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::ProfileNotFound);
}

#[tokio::test]
async fn loading_flag_is_false_immediately_after_a_failed_operation() {
    let (stub, _flags, service) = setup();
    stub.fail_next_with(BackendError::api(500, "internal error"));

    let err = service
        .sign_in("jane@acme-inc.example", "secret-password")
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Backend(_)));

    let state = service.state();
    assert!(!state.is_loading);
    assert!(state.last_error.is_some());
}

#[tokio::test]
async fn update_profile_requires_an_active_actor() {
    let (_stub, _flags, service) = setup();
    service.initialize().await;

    let err = service
        .update_profile(ProfileChanges {
            full_name: Some("New Name".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::NotAuthenticated);
}

#[tokio::test]
async fn update_profile_fully_reloads_the_actor() {
    let (stub, _flags, service) = setup();
    let actor = employee(acme(), "+255712000003");
    stub.add_account("asha@acme-inc.example", "secret-password", actor.id);
    stub.add_profile(actor);

    service
        .sign_in("asha@acme-inc.example", "secret-password")
        .await
        .unwrap();
    service
        .update_profile(ProfileChanges {
            full_name: Some("Asha M. Mwangi".to_string()),
            department: Some("Finance".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let refreshed = service.state().actor.unwrap();
    assert_eq!(refreshed.full_name, "Asha M. Mwangi");
    assert_eq!(refreshed.department.as_deref(), Some("Finance"));
}

#[tokio::test]
async fn signing_out_twice_is_idempotent() {
    let (stub, _flags, service) = setup();
    let actor = employee(acme(), "+255712000004");
    stub.add_account("asha@acme-inc.example", "secret-password", actor.id);
    stub.add_profile(actor);

    service
        .sign_in("asha@acme-inc.example", "secret-password")
        .await
        .unwrap();
    service.sign_out().await.unwrap();
    let state = service.state();
    assert!(state.actor.is_none());
    assert!(!state.is_loading);

    // Second sign-out while already signed out.
    service.sign_out().await.unwrap();
    let state = service.state();
    assert!(state.actor.is_none());
    assert!(!state.is_loading);
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration workflow
// ─────────────────────────────────────────────────────────────────────────────

fn registration(code: &str, password: &str) -> CompanyRegistration {
    CompanyRegistration {
        company_name: "Acme Inc.".to_string(),
        company_code: code.to_string(),
        admin_full_name: "Jane Doe".to_string(),
        admin_email: "jane@acme-inc.example".to_string(),
        admin_password: password.to_string(),
    }
}

#[tokio::test]
async fn registration_with_invalid_code_fails_locally_with_zero_network_calls() {
    let (stub, _flags, service) = setup();

    for bad in ["acme inc", "acme@inc"] {
        let err = service
            .register_company(registration(bad, "secret-password"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)), "{bad:?}");
    }
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn registration_password_length_boundary_is_six() {
    let (stub, _flags, service) = setup();

    let err = service
        .register_company(registration("acme-inc", "12345"))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Validation(_)));
    assert_eq!(stub.calls(), 0);

    // Six characters passes local validation and reaches the backend.
    service
        .register_company(registration("acme-inc", "123456"))
        .await
        .unwrap();
    assert!(stub.calls() > 0);
}

#[tokio::test]
async fn successful_registration_establishes_an_admin_session() {
    let (_stub, _flags, service) = setup();

    service
        .register_company(registration("acme-inc", "secret-password"))
        .await
        .unwrap();

    let state = service.state();
    let actor = state.actor.unwrap();
    assert_eq!(actor.role, Role::HrAdmin);
    assert_eq!(actor.tenant.code.as_str(), "acme-inc");
    assert_eq!(actor.full_name, "Jane Doe");
    assert!(!state.is_loading);
}

#[tokio::test]
async fn duplicate_company_code_is_classified() {
    let (_stub, _flags, service) = setup();
    service
        .register_company(registration("acme-inc", "secret-password"))
        .await
        .unwrap();

    let mut second = registration("acme-inc", "secret-password");
    second.admin_email = "other@acme-inc.example".to_string();
    let err = service.register_company(second).await.unwrap_err();
    assert_eq!(err, SessionError::DuplicateCompanyCode);
    assert_eq!(
        service.state().last_error,
        Some(SessionError::DuplicateCompanyCode)
    );
    assert!(!service.state().is_loading);
}

#[tokio::test]
async fn already_registered_email_is_classified() {
    let (stub, _flags, service) = setup();
    stub.add_account("jane@acme-inc.example", "something-else", ActorId::new());

    let err = service
        .register_company(registration("other-co", "secret-password"))
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::EmailAlreadyRegistered);
}

// ─────────────────────────────────────────────────────────────────────────────
// Demo mode
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn durable_flag_initializes_demo_mode_without_backend_calls() {
    let (stub, flags, service) = setup();
    flags.set(DEMO_MODE_FLAG, true);

    service.initialize().await;

    let state = service.state();
    assert!(state.demo_mode);
    assert!(!state.is_loading);
    let actor = state.actor.unwrap();
    assert_eq!(actor.role, Role::HrAdmin);
    assert_eq!(actor.tenant.code.as_str(), "demo-co");
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn demo_round_trip_create_and_read_communications() {
    let (_stub, flags, service) = setup();
    flags.set(DEMO_MODE_FLAG, true);
    service.initialize().await;
    let actor_id = service.state().actor.unwrap().id;

    let comms = CommunicationsService::new(service.clone());
    let seeded = comms.fetch().await.unwrap();
    assert!(!seeded.is_empty());

    let before = Utc::now();
    let created = comms
        .create(NewCommunication {
            employee_id: actor_id,
            channel: CommunicationChannel::Whatsapp,
            kind: CommunicationType::LeaveRequest,
            content: "{\"reason\":\"vacation\"}".to_string(),
        })
        .await
        .unwrap();
    let after = Utc::now();

    assert_eq!(created.status, CommunicationStatus::Pending);
    assert!(created.created_at >= before && created.created_at <= after);
    assert!(created.updated_at >= before && created.updated_at <= after);
    assert!(!seeded.iter().any(|c| c.id == created.id));

    let listed = comms.fetch().await.unwrap();
    assert!(listed.iter().any(|c| c.id == created.id));
}

#[tokio::test]
async fn row_level_security_failure_silently_degrades_to_demo_mode() {
    let (stub, flags, service) = setup();
    service.initialize().await;
    let comms = CommunicationsService::new(service.clone());

    stub.fail_next_with(BackendError::api(
        403,
        "new row violates row-level security policy for table \"communications\"",
    ));

    // The triggering caller gets the seeded demo result, not an error.
    let items = comms.fetch().await.unwrap();
    assert!(!items.is_empty());

    let state = service.state();
    assert!(state.demo_mode);
    assert!(state.actor.is_some());
    // Reactive entry is process-lifetime only; the durable flag stays unset.
    assert!(!flags.get(DEMO_MODE_FLAG));
}

#[tokio::test]
async fn network_failure_during_sign_in_degrades_to_demo_mode() {
    let (stub, _flags, service) = setup();
    stub.fail_next_with(BackendError::Network("connection refused".to_string()));

    service
        .sign_in("jane@acme-inc.example", "secret-password")
        .await
        .unwrap();

    let state = service.state();
    assert!(state.demo_mode);
    assert_eq!(
        state.actor.map(|a| a.full_name),
        Some("Demo HR Admin".to_string())
    );
}

#[tokio::test]
async fn reactive_switch_is_idempotent() {
    let (stub, _flags, service) = setup();
    stub.fail_next_with(BackendError::Network("connection refused".to_string()));
    service.initialize().await;
    assert!(service.state().demo_mode);
    let first_actor = service.state().actor.unwrap();

    // Another environmental failure path while already in demo mode must not
    // reseed or flap.
    let comms = CommunicationsService::new(service.clone());
    comms.fetch().await.unwrap();
    assert!(service.state().demo_mode);
    assert_eq!(service.state().actor.unwrap().id, first_actor.id);
}

#[tokio::test]
async fn demo_status_update_preserves_created_at_and_touches_updated_at() {
    let (_stub, flags, service) = setup();
    flags.set(DEMO_MODE_FLAG, true);
    service.initialize().await;

    let comms = CommunicationsService::new(service.clone());
    let seeded = comms.fetch().await.unwrap();
    let pending = seeded
        .iter()
        .find(|c| c.status == CommunicationStatus::Pending)
        .unwrap();

    let updated = comms
        .update_status(pending.id, CommunicationStatus::Approved)
        .await
        .unwrap();
    assert_eq!(updated.status, CommunicationStatus::Approved);
    assert_eq!(updated.created_at, pending.created_at);
    assert!(updated.updated_at >= pending.updated_at);
}

#[tokio::test]
async fn employees_may_not_update_communication_status() {
    let (stub, _flags, service) = setup();
    let actor = employee(acme(), "+255712000005");
    stub.add_account("asha@acme-inc.example", "secret-password", actor.id);
    stub.add_profile(actor);
    service
        .sign_in("asha@acme-inc.example", "secret-password")
        .await
        .unwrap();

    let comms = CommunicationsService::new(service.clone());
    let err = comms
        .update_status(CommunicationId::new(), CommunicationStatus::Approved)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Forbidden(_)));
}

#[tokio::test]
async fn demo_sign_out_clears_the_flag_and_touches_no_backend() {
    let (stub, flags, service) = setup();
    flags.set(DEMO_MODE_FLAG, true);
    service.initialize().await;
    assert!(service.state().demo_mode);

    service.sign_out().await.unwrap();

    let state = service.state();
    assert!(state.actor.is_none());
    assert!(!state.demo_mode);
    assert!(!state.is_loading);
    assert!(!flags.get(DEMO_MODE_FLAG));
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn after_demo_sign_out_the_real_backend_is_active_again() {
    let (stub, flags, service) = setup();
    flags.set(DEMO_MODE_FLAG, true);
    service.initialize().await;
    service.sign_out().await.unwrap();

    let actor = employee(acme(), "+255712000007");
    stub.add_account("asha@acme-inc.example", "secret-password", actor.id);
    stub.add_profile(actor.clone());

    service
        .sign_in("asha@acme-inc.example", "secret-password")
        .await
        .unwrap();
    let state = service.state();
    assert!(!state.demo_mode);
    assert_eq!(state.actor.map(|a| a.id), Some(actor.id));
}

#[tokio::test]
async fn explicit_demo_opt_in_persists_the_flag() {
    let (_stub, flags, service) = setup();
    service.initialize().await;
    assert!(!service.state().demo_mode);

    service.enable_demo_mode();

    assert!(service.state().demo_mode);
    assert!(flags.get(DEMO_MODE_FLAG));
    assert!(service.state().actor.is_some());
}
