use super::appointment::{Appointment, NewAppointment};
use super::auth::{Credentials, Session, SignUpDetails};
use super::profile::{ProfilePatch, UserProfile};
use super::wallet::Balance;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>>;
    /// Inserts the profile, replacing any row with the same id.
    async fn insert(&self, profile: UserProfile) -> Result<()>;
    async fn update(&self, user_id: &str, patch: ProfilePatch) -> Result<UserProfile>;
    /// Sets the wallet to `new` only if it still holds `expected`.
    ///
    /// Returns `MarketError::Conflict` when the stored balance has moved.
    async fn update_wallet(
        &self,
        user_id: &str,
        expected: Balance,
        new: Balance,
    ) -> Result<UserProfile>;
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment>;
    /// Appointments where the user is the student or the tutor, by date ascending.
    async fn for_participant(&self, user_id: &str) -> Result<Vec<Appointment>>;
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_session(&self) -> Result<Option<Session>>;
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session>;
    /// Returns `None` when the account must confirm its email first.
    async fn sign_up(&self, details: &SignUpDetails) -> Result<Option<Session>>;
    async fn sign_out(&self) -> Result<()>;
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Asks for a JSON document shaped by `schema` and returns the raw text.
    async fn generate_json(&self, prompt: &str, schema: &serde_json::Value) -> Result<String>;
}

/// Flat key/value persistence for the no-backend variant.
#[async_trait]
pub trait StateBackend: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn save(&self, key: &str, value: Vec<u8>) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Stores are shared between services, so they are reference counted.
pub type ProfileStoreRef = Arc<dyn ProfileStore>;
pub type AppointmentStoreRef = Arc<dyn AppointmentStore>;
pub type AuthProviderRef = Arc<dyn AuthProvider>;
pub type TextGeneratorBox = Box<dyn TextGenerator>;
pub type StateBackendBox = Box<dyn StateBackend>;
