use crate::domain::appointment::{Appointment, NewAppointment};
use crate::domain::auth::{AuthUser, Credentials, Session, SignUpDetails, UserMetadata};
use crate::domain::ports::{
    AppointmentStore, AuthProvider, ProfileStore, StateBackend, StateBackendBox,
};
use crate::domain::profile::{ProfilePatch, UserProfile};
use crate::domain::wallet::Balance;
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

pub const KEY_AUTHENTICATED: &str = "tutorhub_auth";
pub const KEY_CURRENT_USER: &str = "tutorhub_user";
pub const KEY_APPOINTMENTS: &str = "tutorhub_appointments";

/// Token handed out for local sessions; there is no server to verify it.
const LOCAL_ACCESS_TOKEN: &str = "local";

#[derive(Debug, Default)]
struct LocalState {
    authenticated: bool,
    current_user: Option<UserProfile>,
    appointments: Vec<Appointment>,
}

/// The no-backend variant: one account per device, kept in three entries.
///
/// The entries are read once when the store is opened and rewritten whenever
/// they change. Last write wins; there is no versioning. Mutations are
/// serialized through one lock, which also makes the wallet compare-and-set
/// atomic within the process. A change reaches memory only after the backend
/// has accepted it, so a failed write leaves the store as it was.
#[derive(Clone)]
pub struct LocalStateStore {
    backend: Arc<dyn StateBackend>,
    state: Arc<RwLock<LocalState>>,
}

impl LocalStateStore {
    pub async fn open(backend: StateBackendBox) -> Result<Self> {
        let backend: Arc<dyn StateBackend> = Arc::from(backend);
        let authenticated = read_entry::<bool>(&*backend, KEY_AUTHENTICATED)
            .await?
            .unwrap_or(false);
        let current_user = read_entry::<UserProfile>(&*backend, KEY_CURRENT_USER).await?;
        let appointments = read_entry::<Vec<Appointment>>(&*backend, KEY_APPOINTMENTS)
            .await?
            .unwrap_or_default();

        debug!(
            authenticated,
            has_user = current_user.is_some(),
            appointments = appointments.len(),
            "Loaded local state"
        );

        Ok(Self {
            backend,
            state: Arc::new(RwLock::new(LocalState {
                authenticated,
                current_user,
                appointments,
            })),
        })
    }

    async fn write_entry<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.backend.save(key, serde_json::to_vec(value)?).await
    }
}

async fn read_entry<T: DeserializeOwned>(
    backend: &dyn StateBackend,
    key: &str,
) -> Result<Option<T>> {
    match backend.load(key).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

fn session_for(profile: &UserProfile) -> Session {
    Session {
        access_token: LOCAL_ACCESS_TOKEN.to_string(),
        user: AuthUser {
            id: profile.id.clone(),
            email: profile.email.clone(),
            user_metadata: UserMetadata {
                full_name: Some(profile.name.clone()),
                role: Some(profile.role),
                specialty: profile.specialty.clone(),
            },
        },
    }
}

fn current<'a>(state: &'a LocalState, user_id: &str) -> Result<&'a UserProfile> {
    state
        .current_user
        .as_ref()
        .filter(|profile| profile.id == user_id)
        .ok_or_else(|| MarketError::NotFound(format!("Profile {user_id}")))
}

#[async_trait]
impl ProfileStore for LocalStateStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let state = self.state.read().await;
        Ok(state
            .current_user
            .as_ref()
            .filter(|profile| profile.id == user_id)
            .cloned())
    }

    async fn insert(&self, profile: UserProfile) -> Result<()> {
        let mut state = self.state.write().await;
        self.write_entry(KEY_CURRENT_USER, &profile).await?;
        state.current_user = Some(profile);
        Ok(())
    }

    async fn update(&self, user_id: &str, patch: ProfilePatch) -> Result<UserProfile> {
        let mut state = self.state.write().await;
        let mut updated = current(&state, user_id)?.clone();
        updated.apply(&patch);
        self.write_entry(KEY_CURRENT_USER, &updated).await?;
        state.current_user = Some(updated.clone());
        Ok(updated)
    }

    async fn update_wallet(
        &self,
        user_id: &str,
        expected: Balance,
        new: Balance,
    ) -> Result<UserProfile> {
        let mut state = self.state.write().await;
        let mut updated = current(&state, user_id)?.clone();
        if updated.wallet_balance != expected {
            return Err(MarketError::Conflict(format!(
                "Wallet of {user_id} holds {}, expected {expected}",
                updated.wallet_balance
            )));
        }
        updated.wallet_balance = new;
        self.write_entry(KEY_CURRENT_USER, &updated).await?;
        state.current_user = Some(updated.clone());
        Ok(updated)
    }
}

#[async_trait]
impl AppointmentStore for LocalStateStore {
    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment> {
        let mut state = self.state.write().await;
        let stored = appointment.with_id(Uuid::new_v4().to_string());
        let mut appointments = state.appointments.clone();
        appointments.push(stored.clone());
        self.write_entry(KEY_APPOINTMENTS, &appointments).await?;
        state.appointments = appointments;
        Ok(stored)
    }

    async fn for_participant(&self, user_id: &str) -> Result<Vec<Appointment>> {
        let state = self.state.read().await;
        let mut appointments: Vec<Appointment> = state
            .appointments
            .iter()
            .filter(|a| a.involves(user_id))
            .cloned()
            .collect();
        appointments.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(appointments)
    }
}

#[async_trait]
impl AuthProvider for LocalStateStore {
    async fn current_session(&self) -> Result<Option<Session>> {
        let state = self.state.read().await;
        if !state.authenticated {
            return Ok(None);
        }
        Ok(state.current_user.as_ref().map(session_for))
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session> {
        let mut state = self.state.write().await;
        let session = state
            .current_user
            .as_ref()
            .filter(|profile| profile.email.eq_ignore_ascii_case(&credentials.email))
            .map(session_for)
            .ok_or_else(|| {
                MarketError::AuthError(format!("No local account for {}", credentials.email))
            })?;
        self.write_entry(KEY_AUTHENTICATED, &true).await?;
        state.authenticated = true;
        Ok(session)
    }

    async fn sign_up(&self, details: &SignUpDetails) -> Result<Option<Session>> {
        if !details.credentials.email.contains('@') {
            return Err(MarketError::ValidationError(format!(
                "Invalid email address: {}",
                details.credentials.email
            )));
        }

        let mut state = self.state.write().await;
        // A device holds a single account; registering replaces it.
        self.backend.remove(KEY_CURRENT_USER).await?;
        state.current_user = None;
        self.write_entry(KEY_AUTHENTICATED, &true).await?;
        state.authenticated = true;

        Ok(Some(Session {
            access_token: LOCAL_ACCESS_TOKEN.to_string(),
            user: AuthUser {
                id: Uuid::new_v4().simple().to_string(),
                email: details.credentials.email.clone(),
                user_metadata: details.metadata(),
            },
        }))
    }

    async fn sign_out(&self) -> Result<()> {
        let mut state = self.state.write().await;
        self.write_entry(KEY_AUTHENTICATED, &false).await?;
        state.authenticated = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::appointment::{AppointmentStatus, AppointmentType};
    use crate::domain::profile::UserRole;
    use crate::domain::wallet::Amount;
    use crate::infrastructure::in_memory::InMemoryBackend;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn profile(id: &str) -> UserProfile {
        UserProfile {
            id: id.to_string(),
            name: "Yasser".to_string(),
            email: "yasser@example.com".to_string(),
            role: UserRole::Student,
            avatar: String::new(),
            wallet_balance: Balance::new(dec!(300)),
            bio: None,
            specialty: None,
            hourly_rate: None,
            subjects: None,
        }
    }

    fn booking(student: &str, tutor: &str, date: &str) -> NewAppointment {
        NewAppointment {
            tutor_id: tutor.to_string(),
            tutor_name: "Tutor".to_string(),
            student_id: student.to_string(),
            student_name: "Student".to_string(),
            date: date.to_string(),
            time: "16:00".to_string(),
            status: AppointmentStatus::Upcoming,
            kind: AppointmentType::Regular,
            price: Amount::new(dec!(50)).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_state_is_reloaded_from_backend() {
        let backend = InMemoryBackend::new();
        let store = LocalStateStore::open(Box::new(backend.clone())).await.unwrap();
        ProfileStore::insert(&store, profile("u1")).await.unwrap();
        AppointmentStore::insert(&store, booking("u1", "1", "Monday"))
            .await
            .unwrap();
        store
            .sign_in(&Credentials {
                email: "YASSER@example.com".to_string(),
                password: String::new(),
            })
            .await
            .unwrap();

        let reopened = LocalStateStore::open(Box::new(backend)).await.unwrap();
        let session = reopened.current_session().await.unwrap().unwrap();
        assert_eq!(session.user.id, "u1");
        assert_eq!(reopened.for_participant("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_wallet_compare_and_set() {
        let store = LocalStateStore::open(Box::new(InMemoryBackend::new()))
            .await
            .unwrap();
        ProfileStore::insert(&store, profile("u1")).await.unwrap();

        let updated = store
            .update_wallet("u1", Balance::new(dec!(300)), Balance::new(dec!(250)))
            .await
            .unwrap();
        assert_eq!(updated.wallet_balance, Balance::new(dec!(250)));

        let stale = store
            .update_wallet("u1", Balance::new(dec!(300)), Balance::new(dec!(250)))
            .await;
        assert!(matches!(stale, Err(MarketError::Conflict(_))));

        let missing = store
            .update_wallet("u2", Balance::ZERO, Balance::ZERO)
            .await;
        assert!(matches!(missing, Err(MarketError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_for_participant_filters_and_orders_by_date() {
        let store = LocalStateStore::open(Box::new(InMemoryBackend::new()))
            .await
            .unwrap();
        AppointmentStore::insert(&store, booking("s1", "t1", "2024-06-03"))
            .await
            .unwrap();
        AppointmentStore::insert(&store, booking("s2", "t2", "2024-06-01"))
            .await
            .unwrap();
        AppointmentStore::insert(&store, booking("s2", "s1", "2024-06-02"))
            .await
            .unwrap();

        let dates: Vec<String> = store
            .for_participant("s1")
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.date)
            .collect();
        assert_eq!(dates, vec!["2024-06-02", "2024-06-03"]);
    }

    #[tokio::test]
    async fn test_sign_out_clears_session_only() {
        let store = LocalStateStore::open(Box::new(InMemoryBackend::new()))
            .await
            .unwrap();
        ProfileStore::insert(&store, profile("u1")).await.unwrap();
        store
            .sign_in(&Credentials {
                email: "yasser@example.com".to_string(),
                password: String::new(),
            })
            .await
            .unwrap();

        store.sign_out().await.unwrap();
        assert!(store.current_session().await.unwrap().is_none());
        assert!(ProfileStore::get(&store, "u1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sign_in_unknown_email() {
        let store = LocalStateStore::open(Box::new(InMemoryBackend::new()))
            .await
            .unwrap();
        let result = store
            .sign_in(&Credentials {
                email: "nobody@example.com".to_string(),
                password: String::new(),
            })
            .await;
        assert!(matches!(result, Err(MarketError::AuthError(_))));
    }

    /// Delegates to memory but refuses writes while `failing` is set.
    #[derive(Clone, Default)]
    struct FlakyBackend {
        inner: InMemoryBackend,
        failing: Arc<AtomicBool>,
    }

    impl FlakyBackend {
        fn check(&self) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(std::io::Error::other("disk full").into());
            }
            Ok(())
        }
    }

    #[async_trait]
    impl StateBackend for FlakyBackend {
        async fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
            self.inner.load(key).await
        }

        async fn save(&self, key: &str, value: Vec<u8>) -> Result<()> {
            self.check()?;
            self.inner.save(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<()> {
            self.check()?;
            self.inner.remove(key).await
        }
    }

    #[tokio::test]
    async fn test_failed_write_leaves_state_unchanged() {
        let backend = FlakyBackend::default();
        let store = LocalStateStore::open(Box::new(backend.clone())).await.unwrap();
        ProfileStore::insert(&store, profile("u1")).await.unwrap();
        store
            .sign_in(&Credentials {
                email: "yasser@example.com".to_string(),
                password: String::new(),
            })
            .await
            .unwrap();
        backend.failing.store(true, Ordering::SeqCst);

        let debit = store
            .update_wallet("u1", Balance::new(dec!(300)), Balance::new(dec!(250)))
            .await;
        assert!(matches!(debit, Err(MarketError::IoError(_))));

        let rename = ProfilePatch {
            name: Some("Someone Else".to_string()),
            ..ProfilePatch::default()
        };
        assert!(store.update("u1", rename).await.is_err());

        let booked = AppointmentStore::insert(&store, booking("u1", "1", "Monday")).await;
        assert!(booked.is_err());
        assert!(store.sign_out().await.is_err());

        let stored = ProfileStore::get(&store, "u1").await.unwrap().unwrap();
        assert_eq!(stored.wallet_balance, Balance::new(dec!(300)));
        assert_eq!(stored.name, "Yasser");
        assert!(store.for_participant("u1").await.unwrap().is_empty());
        assert!(store.current_session().await.unwrap().is_some());

        // Once writes succeed again the stale expectation still holds.
        backend.failing.store(false, Ordering::SeqCst);
        let debited = store
            .update_wallet("u1", Balance::new(dec!(300)), Balance::new(dec!(250)))
            .await
            .unwrap();
        assert_eq!(debited.wallet_balance, Balance::new(dec!(250)));
    }
}
