use crate::domain::appointment::{Appointment, NewAppointment};
use crate::domain::auth::{AuthUser, Credentials, Session, SignUpDetails};
use crate::domain::ports::{AppointmentStore, AuthProvider, ProfileStore};
use crate::domain::profile::{ProfilePatch, UserProfile};
use crate::domain::wallet::Balance;
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

const PROFILES_TABLE: &str = "profiles";
const APPOINTMENTS_TABLE: &str = "appointments";

/// Client for a hosted Supabase project: GoTrue for auth, PostgREST for rows.
///
/// `Clone` shares the HTTP connection pool and the signed-in session.
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
    session: Arc<RwLock<Option<Session>>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    user: Option<AuthUser>,
}

/// GoTrue has used both shapes over time; accept either.
#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    error_code: Option<String>,
    error: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
}

impl AuthErrorBody {
    fn is_unconfirmed_email(&self) -> bool {
        self.error_code.as_deref() == Some("email_not_confirmed")
            || self
                .text()
                .to_lowercase()
                .contains("email not confirmed")
    }

    fn text(&self) -> String {
        self.msg
            .clone()
            .or_else(|| self.error_description.clone())
            .or_else(|| self.message.clone())
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

impl SupabaseClient {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            session: Arc::new(RwLock::new(None)),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Attaches the project key and the caller's bearer token.
    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let session = self.session.read().await;
        let token = session
            .as_ref()
            .map(|s| s.access_token.as_str())
            .unwrap_or(self.anon_key.as_str());
        request.header("apikey", &self.anon_key).bearer_auth(token)
    }

    async fn rows<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Vec<T>> {
        let response = self.authorize(request).await.send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn auth_call(&self, request: RequestBuilder) -> Result<TokenResponse> {
        let response = request.header("apikey", &self.anon_key).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let body: AuthErrorBody = response.json().await.unwrap_or_default();
        if body.is_unconfirmed_email() {
            return Err(MarketError::EmailNotConfirmed);
        }
        if status.is_client_error() {
            return Err(MarketError::AuthError(body.text()));
        }
        Err(MarketError::BackendError {
            status: status.as_u16(),
            message: body.text(),
        })
    }

    async fn remember(&self, session: Session) -> Session {
        let mut current = self.session.write().await;
        *current = Some(session.clone());
        session
    }
}

/// Turns a non-2xx PostgREST response into a `BackendError`.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(MarketError::BackendError {
        status: status.as_u16(),
        message,
    })
}

fn first_row<T>(rows: Vec<T>, what: impl FnOnce() -> MarketError) -> Result<T> {
    rows.into_iter().next().ok_or_else(what)
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

fn participant_filter(user_id: &str) -> String {
    format!("(studentId.eq.{user_id},tutorId.eq.{user_id})")
}

fn into_session(token: TokenResponse) -> Option<Session> {
    match (token.access_token, token.user) {
        (Some(access_token), Some(user)) => Some(Session { access_token, user }),
        _ => None,
    }
}

#[async_trait]
impl ProfileStore for SupabaseClient {
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let request = self
            .http
            .get(self.rest_url(PROFILES_TABLE))
            .query(&[("select", "*".to_string()), ("id", eq(user_id))]);
        let rows: Vec<UserProfile> = self.rows(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, profile: UserProfile) -> Result<()> {
        let request = self
            .http
            .post(self.rest_url(PROFILES_TABLE))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[&profile]);
        let response = self.authorize(request).await.send().await?;
        check_status(response).await?;
        debug!(user_id = %profile.id, "Upserted profile row");
        Ok(())
    }

    async fn update(&self, user_id: &str, patch: ProfilePatch) -> Result<UserProfile> {
        let request = self
            .http
            .patch(self.rest_url(PROFILES_TABLE))
            .query(&[("id", eq(user_id))])
            .header("Prefer", "return=representation")
            .json(&patch);
        let rows = self.rows(request).await?;
        first_row(rows, || MarketError::NotFound(format!("Profile {user_id}")))
    }

    async fn update_wallet(
        &self,
        user_id: &str,
        expected: Balance,
        new: Balance,
    ) -> Result<UserProfile> {
        let request = self
            .http
            .patch(self.rest_url(PROFILES_TABLE))
            .query(&[
                ("id", eq(user_id)),
                ("walletBalance", eq(&expected.to_string())),
            ])
            .header("Prefer", "return=representation")
            .json(&ProfilePatch {
                wallet_balance: Some(new),
                ..ProfilePatch::default()
            });
        let rows = self.rows(request).await?;
        first_row(rows, || {
            MarketError::Conflict(format!(
                "Wallet of {user_id} no longer holds {expected}"
            ))
        })
    }
}

#[async_trait]
impl AppointmentStore for SupabaseClient {
    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment> {
        let request = self
            .http
            .post(self.rest_url(APPOINTMENTS_TABLE))
            .header("Prefer", "return=representation")
            .json(&[&appointment]);
        let rows = self.rows(request).await?;
        first_row(rows, || MarketError::BackendError {
            status: 201,
            message: "Insert returned no appointment".to_string(),
        })
    }

    async fn for_participant(&self, user_id: &str) -> Result<Vec<Appointment>> {
        let request = self.http.get(self.rest_url(APPOINTMENTS_TABLE)).query(&[
            ("select", "*".to_string()),
            ("or", participant_filter(user_id)),
            ("order", "date.asc".to_string()),
        ]);
        self.rows(request).await
    }
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn current_session(&self) -> Result<Option<Session>> {
        Ok(self.session.read().await.clone())
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session> {
        let request = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(credentials);
        let token = self.auth_call(request).await?;
        let session = into_session(token)
            .ok_or_else(|| MarketError::AuthError("No session in sign-in response".to_string()))?;
        debug!(user_id = %session.user.id, "Signed in");
        Ok(self.remember(session).await)
    }

    async fn sign_up(&self, details: &SignUpDetails) -> Result<Option<Session>> {
        let metadata = details.metadata();
        let request = self.http.post(self.auth_url("signup")).json(&json!({
            "email": details.credentials.email,
            "password": details.credentials.password,
            "data": metadata,
        }));
        let token = self.auth_call(request).await?;
        match into_session(token) {
            Some(session) => Ok(Some(self.remember(session).await)),
            None => {
                info!(email = %details.credentials.email, "Sign-up awaits email confirmation");
                Ok(None)
            }
        }
    }

    async fn sign_out(&self) -> Result<()> {
        let token = self.session.write().await.take();
        if let Some(session) = token {
            let request = self
                .http
                .post(self.auth_url("logout"))
                .header("apikey", &self.anon_key)
                .bearer_auth(&session.access_token);
            check_status(request.send().await?).await?;
        }
        Ok(())
    }
}
