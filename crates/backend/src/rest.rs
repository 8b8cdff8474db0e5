//! `RestBackend` — JSON/HTTP client for the hosted backend.
//!
//! Speaks the hosted service's two surfaces: the auth endpoints
//! (`/auth/v1/*`, bearer-token sessions) and the row endpoints
//! (`/rest/v1/<table>` with equality filters, embedded joins and
//! inserted/updated-row returns), plus the registration remote procedure.

use std::sync::RwLock;

use serde::Deserialize;
use serde_json::json;

use kaziflow_auth::{Actor, PinCredential};
use kaziflow_core::{ActorId, CommunicationId, PhoneNumber};

use crate::error::BackendError;
use crate::records::{
    AuthIdentity, Communication, CommunicationStatus, NewCommunication, PinRow, ProfileChanges,
    ProfileRow, RegistrationRequest,
};
use crate::Backend;

const PROFILE_SELECT: &str = "*,companies(*),employee_pins(*)";

/// Connection settings for the hosted backend.
#[derive(Debug, Clone)]
pub struct RestBackendConfig {
    pub base_url: String,
    /// Publishable API key sent with every request; individual sessions
    /// upgrade it with a bearer token.
    pub anon_key: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
}

impl RestBackendConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("KAZIFLOW_API_URL")
            .map_err(|_| ConfigError::MissingVar("KAZIFLOW_API_URL"))?;
        let anon_key = std::env::var("KAZIFLOW_ANON_KEY")
            .map_err(|_| ConfigError::MissingVar("KAZIFLOW_ANON_KEY"))?;
        Ok(Self { base_url, anon_key })
    }
}

#[derive(Debug, Clone)]
struct BearerSession {
    access_token: String,
    user_id: ActorId,
}

/// HTTP implementation of [`Backend`].
pub struct RestBackend {
    http: reqwest::Client,
    config: RestBackendConfig,
    session: RwLock<Option<BearerSession>>,
}

#[derive(Debug, Deserialize)]
struct AuthUserRow {
    id: ActorId,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUserRow,
}

impl RestBackend {
    pub fn new(config: RestBackendConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            session: RwLock::new(None),
        }
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base(), path)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base(), table)
    }

    fn bearer(&self) -> Option<BearerSession> {
        self.session.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn store_session(&self, session: Option<BearerSession>) {
        *self.session.write().unwrap_or_else(|e| e.into_inner()) = session;
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let req = req.header("apikey", &self.config.anon_key);
        match self.bearer() {
            Some(session) => req.bearer_auth(session.access_token),
            None => req.bearer_auth(&self.config.anon_key),
        }
    }

    async fn execute(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let resp = req
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(BackendError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn into_json<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, BackendError> {
        resp.json::<T>()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }

    async fn profile_rows(&self, filter: (&str, String)) -> Result<Vec<ProfileRow>, BackendError> {
        let req = self
            .authed(self.http.get(self.rest_url("profiles")))
            .query(&[("select", PROFILE_SELECT), (filter.0, filter.1.as_str())]);
        let resp = self.execute(req).await?;
        Self::into_json(resp).await
    }
}

#[async_trait::async_trait]
impl Backend for RestBackend {
    async fn current_actor(&self) -> Result<Option<Actor>, BackendError> {
        let Some(session) = self.bearer() else {
            return Ok(None);
        };

        // Validate the token against the auth provider before trusting the
        // cached user id.
        let req = self.authed(self.http.get(self.auth_url("user")));
        let user: AuthUserRow = match self.execute(req).await {
            Ok(resp) => Self::into_json(resp).await?,
            Err(BackendError::Api { status: 401, .. }) => {
                self.store_session(None);
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        debug_assert_eq!(user.id, session.user_id);

        let rows = self
            .profile_rows(("id", format!("eq.{}", user.id)))
            .await?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_actor()?)),
            None => Ok(None),
        }
    }

    async fn sign_in_with_password(
        &self,
        login: &str,
        password: &str,
    ) -> Result<AuthIdentity, BackendError> {
        let req = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.config.anon_key)
            .json(&json!({ "email": login, "password": password }));

        let token: TokenResponse = match self.execute(req).await {
            Ok(resp) => Self::into_json(resp).await?,
            Err(BackendError::Api { status: 400 | 401, .. }) => {
                return Err(BackendError::InvalidCredentials);
            }
            Err(err) => return Err(err),
        };

        let identity = AuthIdentity {
            id: token.user.id,
            email: token.user.email,
        };
        self.store_session(Some(BearerSession {
            access_token: token.access_token,
            user_id: token.user.id,
        }));
        tracing::debug!(actor_id = %identity.id, "password session established");
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        if self.bearer().is_none() {
            return Ok(());
        }
        let req = self.authed(self.http.post(self.auth_url("logout")));
        let result = self.execute(req).await;
        // The local token is dropped even if the revocation call failed;
        // holding on to it would keep a session the user asked to end.
        self.store_session(None);
        result.map(|_| ())
    }

    async fn find_profile_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<Actor>, BackendError> {
        let rows = self
            .profile_rows(("phone_number", format!("eq.{}", phone.as_str())))
            .await?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_actor()?)),
            None => Ok(None),
        }
    }

    async fn pin_credential(
        &self,
        actor_id: ActorId,
    ) -> Result<Option<PinCredential>, BackendError> {
        let filter = format!("eq.{actor_id}");
        let req = self
            .authed(self.http.get(self.rest_url("employee_pins")))
            .query(&[("select", "*"), ("profile_id", filter.as_str())]);
        let resp = self.execute(req).await?;
        let rows: Vec<PinRow> = Self::into_json(resp).await?;
        Ok(rows.into_iter().next().map(|row| PinCredential {
            actor_id: row.profile_id,
            pin_hash: row.pin_hash,
            pin_set: row.pin_set,
        }))
    }

    async fn upsert_pin(&self, actor_id: ActorId, pin_hash: &str) -> Result<(), BackendError> {
        let req = self
            .authed(self.http.post(self.rest_url("employee_pins")))
            .query(&[("on_conflict", "profile_id")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(&json!({
                "profile_id": actor_id,
                "pin_hash": pin_hash,
                "pin_set": true,
            }));
        self.execute(req).await.map(|_| ())
    }

    async fn update_profile(
        &self,
        actor_id: ActorId,
        changes: &ProfileChanges,
    ) -> Result<(), BackendError> {
        let req = self
            .authed(self.http.patch(self.rest_url("profiles")))
            .query(&[("id", format!("eq.{actor_id}"))])
            .header("Prefer", "return=representation")
            .json(changes);
        let resp = self.execute(req).await?;
        let rows: Vec<serde_json::Value> = Self::into_json(resp).await?;
        if rows.is_empty() {
            return Err(BackendError::NotFound);
        }
        Ok(())
    }

    async fn list_communications(&self) -> Result<Vec<Communication>, BackendError> {
        let req = self
            .authed(self.http.get(self.rest_url("communications")))
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let resp = self.execute(req).await?;
        Self::into_json(resp).await
    }

    async fn insert_communication(
        &self,
        new: &NewCommunication,
    ) -> Result<Communication, BackendError> {
        let mut body = serde_json::to_value(new).map_err(|e| BackendError::Parse(e.to_string()))?;
        body["status"] = json!("pending");

        let req = self
            .authed(self.http.post(self.rest_url("communications")))
            .header("Prefer", "return=representation")
            .json(&json!([body]));
        let resp = self.execute(req).await?;
        let rows: Vec<Communication> = Self::into_json(resp).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::Parse("insert returned no row".to_string()))
    }

    async fn update_communication_status(
        &self,
        id: CommunicationId,
        status: CommunicationStatus,
    ) -> Result<Communication, BackendError> {
        let req = self
            .authed(self.http.patch(self.rest_url("communications")))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&json!({ "status": status }));
        let resp = self.execute(req).await?;
        let rows: Vec<Communication> = Self::into_json(resp).await?;
        rows.into_iter().next().ok_or(BackendError::NotFound)
    }

    async fn register_company_and_admin(
        &self,
        request: &RegistrationRequest,
    ) -> Result<serde_json::Value, BackendError> {
        let req = self
            .authed(
                self.http
                    .post(self.rest_url("rpc/register_company_and_admin")),
            )
            .json(request);
        let resp = self.execute(req).await?;
        Self::into_json(resp).await
    }
}
