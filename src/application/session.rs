use crate::domain::appointment::Appointment;
use crate::domain::auth::{AuthUser, Credentials, Session, SignUpDetails};
use crate::domain::ports::{AppointmentStoreRef, AuthProviderRef, ProfileStoreRef};
use crate::domain::profile::{ProfilePatch, UserProfile, UserRole};
use crate::domain::wallet::{Amount, Balance};
use crate::error::{MarketError, Result};
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Credit a freshly created student profile starts with.
pub const DEFAULT_STARTING_BALANCE: u32 = 300;
/// Hourly rate a freshly created tutor profile starts with.
pub const DEFAULT_TUTOR_RATE: u32 = 30;
/// Bio a freshly created tutor profile starts with ("new tutor on the platform").
pub const DEFAULT_TUTOR_BIO: &str = "معلم جديد في المنصة";

/// Everything the front end holds for a signed-in user.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub session: Session,
    pub user: UserProfile,
    pub appointments: Vec<Appointment>,
}

pub struct SessionService {
    auth: AuthProviderRef,
    profiles: ProfileStoreRef,
    appointments: AppointmentStoreRef,
    starting_balance: Balance,
    credentials: Option<Credentials>,
}

impl SessionService {
    pub fn new(
        auth: AuthProviderRef,
        profiles: ProfileStoreRef,
        appointments: AppointmentStoreRef,
    ) -> Self {
        Self {
            auth,
            profiles,
            appointments,
            starting_balance: Balance::new(Decimal::from(DEFAULT_STARTING_BALANCE)),
            credentials: None,
        }
    }

    pub fn with_starting_balance(mut self, balance: Balance) -> Self {
        self.starting_balance = balance;
        self
    }

    /// Credentials used by `restore` when there is no live session.
    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Picks up the existing session, signing in with the configured
    /// credentials if there is none. `None` means the user must sign in.
    pub async fn restore(&self) -> Result<Option<AppState>> {
        let session = match self.auth.current_session().await? {
            Some(session) => session,
            None => match &self.credentials {
                Some(credentials) => self.auth.sign_in(credentials).await?,
                None => return Ok(None),
            },
        };
        self.load(session).await.map(Some)
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> Result<AppState> {
        let session = self.auth.sign_in(credentials).await?;
        info!(user_id = %session.user.id, "Signed in");
        self.load(session).await
    }

    /// Registers a new account. `None` means the email must be confirmed first.
    pub async fn sign_up(&self, details: &SignUpDetails) -> Result<Option<AppState>> {
        if details.full_name.trim().is_empty() {
            return Err(MarketError::ValidationError(
                "Name must not be empty".to_string(),
            ));
        }
        match self.auth.sign_up(details).await? {
            Some(session) => {
                info!(user_id = %session.user.id, role = %details.role, "Signed up");
                self.load(session).await.map(Some)
            }
            None => Ok(None),
        }
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.auth.sign_out().await?;
        info!("Signed out");
        Ok(())
    }

    async fn load(&self, session: Session) -> Result<AppState> {
        let user = self.load_profile(&session.user).await?;
        let appointments = self.load_appointments(&user.id).await?;
        Ok(AppState {
            session,
            user,
            appointments,
        })
    }

    /// Returns the stored profile, creating it on first sign-in.
    pub async fn load_profile(&self, auth_user: &AuthUser) -> Result<UserProfile> {
        if let Some(profile) = self.profiles.get(&auth_user.id).await? {
            debug!(user_id = %profile.id, "Loaded profile");
            return Ok(profile);
        }

        let profile = self.new_profile(auth_user);
        self.profiles.insert(profile.clone()).await?;
        info!(user_id = %profile.id, role = %profile.role, "Created profile");
        Ok(profile)
    }

    fn new_profile(&self, auth_user: &AuthUser) -> UserProfile {
        let role = auth_user.user_metadata.role.unwrap_or_default();
        let is_tutor = role == UserRole::Tutor;
        UserProfile {
            id: auth_user.id.clone(),
            name: auth_user.display_name(),
            email: auth_user.email.clone(),
            role,
            avatar: format!(
                "https://api.dicebear.com/7.x/avataaars/svg?seed={}",
                auth_user.id
            ),
            wallet_balance: self.starting_balance,
            bio: is_tutor.then(|| DEFAULT_TUTOR_BIO.to_string()),
            specialty: auth_user
                .user_metadata
                .specialty
                .clone()
                .filter(|_| is_tutor),
            hourly_rate: is_tutor.then(|| Amount::from(DEFAULT_TUTOR_RATE)),
            subjects: None,
        }
    }

    pub async fn load_appointments(&self, user_id: &str) -> Result<Vec<Appointment>> {
        self.appointments.for_participant(user_id).await
    }

    /// Switches between the student and tutor views of the same account.
    pub async fn toggle_role(&self, user: &UserProfile) -> Result<UserProfile> {
        let role = user.role.toggled();
        let updated = self
            .profiles
            .update(&user.id, ProfilePatch::role(role))
            .await?;
        info!(user_id = %user.id, %role, "Role switched");
        Ok(updated)
    }

    pub async fn update_profile(
        &self,
        user: &UserProfile,
        patch: ProfilePatch,
    ) -> Result<UserProfile> {
        patch.validate()?;
        if patch.wallet_balance.is_some() {
            return Err(MarketError::ValidationError(
                "The wallet cannot be edited from the profile".to_string(),
            ));
        }
        if patch.is_empty() {
            return Ok(user.clone());
        }
        let updated = self.profiles.update(&user.id, patch).await?;
        info!(user_id = %user.id, "Profile updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::booking::BookingService;
    use crate::domain::auth::UserMetadata;
    use crate::domain::catalog::Catalog;
    use crate::infrastructure::in_memory::InMemoryBackend;
    use crate::infrastructure::local_state::LocalStateStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    async fn service() -> (SessionService, LocalStateStore) {
        let store = LocalStateStore::open(Box::new(InMemoryBackend::new()))
            .await
            .unwrap();
        let service = SessionService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        );
        (service, store)
    }

    fn details(role: UserRole) -> SignUpDetails {
        SignUpDetails {
            credentials: Credentials {
                email: "sara@example.com".to_string(),
                password: "secret".to_string(),
            },
            full_name: "Sara Mahmoud".to_string(),
            role,
            specialty: Some("اللغة الإنجليزية".to_string()),
        }
    }

    #[tokio::test]
    async fn test_sign_up_creates_profile_with_starting_balance() {
        let (service, _) = service().await;
        let state = service
            .sign_up(&details(UserRole::Student))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(state.user.name, "Sara Mahmoud");
        assert_eq!(state.user.role, UserRole::Student);
        assert_eq!(state.user.wallet_balance, Balance::new(dec!(300)));
        assert!(state.user.avatar.ends_with(&state.user.id));
        assert!(state.user.hourly_rate.is_none());
        assert!(state.user.specialty.is_none());
        assert!(state.user.bio.is_none());
        assert!(state.appointments.is_empty());
    }

    #[tokio::test]
    async fn test_tutor_sign_up_gets_tutor_defaults() {
        let (service, _) = service().await;
        let state = service
            .sign_up(&details(UserRole::Tutor))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state.user.hourly_rate, Some(Amount::from(30u32)));
        assert_eq!(state.user.specialty.as_deref(), Some("اللغة الإنجليزية"));
        assert_eq!(state.user.bio.as_deref(), Some(DEFAULT_TUTOR_BIO));
    }

    #[tokio::test]
    async fn test_restore_after_sign_up() {
        let (service, _) = service().await;
        let signed_up = service
            .sign_up(&details(UserRole::Student))
            .await
            .unwrap()
            .unwrap();

        let restored = service.restore().await.unwrap().unwrap();
        assert_eq!(restored.user, signed_up.user);

        service.sign_out().await.unwrap();
        assert!(service.restore().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_signs_in_with_configured_credentials() {
        let (service, _) = service().await;
        service.sign_up(&details(UserRole::Student)).await.unwrap();
        service.sign_out().await.unwrap();

        let service = service.with_credentials(Some(details(UserRole::Student).credentials));
        let restored = service.restore().await.unwrap().unwrap();
        assert_eq!(restored.user.email, "sara@example.com");
    }

    #[tokio::test]
    async fn test_load_profile_uses_email_when_name_missing() {
        let (service, _) = service().await;
        let user = AuthUser {
            id: "abc".to_string(),
            email: "khaled@example.com".to_string(),
            user_metadata: UserMetadata::default(),
        };
        let profile = service.load_profile(&user).await.unwrap();
        assert_eq!(profile.name, "khaled");
        assert_eq!(profile.role, UserRole::Student);

        // Second load returns the stored row instead of a fresh one.
        let again = service.load_profile(&user).await.unwrap();
        assert_eq!(again, profile);
    }

    #[tokio::test]
    async fn test_custom_starting_balance() {
        let (service, _) = service().await;
        let service = service.with_starting_balance(Balance::new(dec!(20)));
        let state = service
            .sign_up(&details(UserRole::Student))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state.user.wallet_balance, Balance::new(dec!(20)));
    }

    #[tokio::test]
    async fn test_toggle_role_twice_restores_role() {
        let (service, _) = service().await;
        let state = service
            .sign_up(&details(UserRole::Student))
            .await
            .unwrap()
            .unwrap();

        let tutor = service.toggle_role(&state.user).await.unwrap();
        assert_eq!(tutor.role, UserRole::Tutor);
        let student = service.toggle_role(&tutor).await.unwrap();
        assert_eq!(student.role, UserRole::Student);
        assert_eq!(student.wallet_balance, state.user.wallet_balance);
    }

    #[tokio::test]
    async fn test_update_profile() {
        let (service, _) = service().await;
        let state = service
            .sign_up(&details(UserRole::Tutor))
            .await
            .unwrap()
            .unwrap();

        let patch = ProfilePatch {
            specialty: Some("IELTS".to_string()),
            hourly_rate: Some(Amount::new(dec!(45)).unwrap()),
            ..ProfilePatch::default()
        };
        let updated = service.update_profile(&state.user, patch).await.unwrap();
        assert_eq!(updated.specialty.as_deref(), Some("IELTS"));
        assert_eq!(updated.hourly_rate, Some(Amount::new(dec!(45)).unwrap()));

        let wallet_edit = ProfilePatch {
            wallet_balance: Some(Balance::new(dec!(1000000))),
            ..ProfilePatch::default()
        };
        assert!(matches!(
            service.update_profile(&updated, wallet_edit).await,
            Err(MarketError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_booked_sessions_reload_with_profile() {
        let (service, store) = service().await;
        let state = service
            .sign_up(&details(UserRole::Student))
            .await
            .unwrap()
            .unwrap();
        let booking = BookingService::new(Arc::new(store.clone()), Arc::new(store.clone()));
        let catalog = Catalog::builtin();
        booking
            .confirm_booking(
                &state.user,
                &state.appointments,
                catalog.find("3").unwrap(),
                "السبت",
                "05:00 مساءً",
            )
            .await
            .unwrap();

        let restored = service.restore().await.unwrap().unwrap();
        assert_eq!(restored.appointments.len(), 1);
        assert_eq!(restored.user.wallet_balance, Balance::new(dec!(240)));
    }
}
