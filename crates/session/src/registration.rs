//! Company registration workflow.
//!
//! A compound operation: local validation, then one atomic server-side
//! procedure creating tenant and admin together, then a password sign-in to
//! establish the session (the creation call does not itself yield one).

use kaziflow_backend::{BackendError, RegistrationRequest};
use kaziflow_core::{CompanyCode, EmailAddress};

use crate::error::SessionError;
use crate::fallback::DemoEntry;
use crate::service::{SessionService, or_demo};
use crate::state::{LoadingGuard, write_lock};

const MIN_ADMIN_PASSWORD_LEN: usize = 6;

/// Input of [`SessionService::register_company`].
#[derive(Debug, Clone)]
pub struct CompanyRegistration {
    pub company_name: String,
    pub company_code: String,
    pub admin_full_name: String,
    pub admin_email: String,
    pub admin_password: String,
}

impl CompanyRegistration {
    /// Local pre-checks; nothing here touches the network.
    fn validate(&self) -> Result<(CompanyCode, EmailAddress), SessionError> {
        let code = CompanyCode::parse(&self.company_code)?;
        let email = EmailAddress::parse(&self.admin_email)?;
        if self.company_name.trim().is_empty() {
            return Err(SessionError::Validation(
                "company name must not be empty".to_string(),
            ));
        }
        if self.admin_password.len() < MIN_ADMIN_PASSWORD_LEN {
            return Err(SessionError::Validation(format!(
                "admin password must be at least {MIN_ADMIN_PASSWORD_LEN} characters"
            )));
        }
        Ok((code, email))
    }
}

/// Distill a registration failure into the documented classification.
fn classify(err: BackendError) -> SessionError {
    if err.is_duplicate_key() {
        SessionError::DuplicateCompanyCode
    } else if err.is_already_registered() {
        SessionError::EmailAlreadyRegistered
    } else {
        SessionError::RegistrationFailed(err.to_string())
    }
}

impl SessionService {
    /// Register a new tenant with its admin identity and sign the admin in.
    pub async fn register_company(
        &self,
        registration: CompanyRegistration,
    ) -> Result<(), SessionError> {
        let (code, email) = registration.validate()?;

        let _op = self.op_guard().await;
        let _loading = LoadingGuard::begin(self.state_cell());
        let mut backend = self.active_backend();

        let request = RegistrationRequest {
            company_name: registration.company_name.trim().to_string(),
            company_code: code,
            full_name: registration.admin_full_name,
            email: email.clone(),
            phone_number: String::new(),
            password: registration.admin_password.clone(),
        };

        let receipt = or_demo!(
            self,
            backend,
            backend.register_company_and_admin(&request).await,
            classify
        );
        tracing::info!(company = %request.company_code, ?receipt, "company registered");

        // The procedure created the identity but no session; sign in with
        // the fresh credentials.
        if let Err(err) = backend
            .sign_in_with_password(email.as_str(), &registration.admin_password)
            .await
        {
            return Err(self.record(SessionError::RegistrationFailed(err.to_string())));
        }

        let actor = or_demo!(
            self,
            backend,
            backend.current_actor().await,
            |err: BackendError| SessionError::RegistrationFailed(err.to_string())
        );
        let Some(actor) = actor else {
            return Err(self.record(SessionError::RegistrationFailed(
                "profile missing after registration".to_string(),
            )));
        };

        write_lock(self.state_cell()).actor = Some(actor);
        Ok(())
    }
}
