use super::profile::UserRole;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// What a new account is registered with.
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpDetails {
    pub credentials: Credentials,
    pub full_name: String,
    pub role: UserRole,
    /// Only recorded for tutors.
    pub specialty: Option<String>,
}

impl SignUpDetails {
    /// What the auth provider keeps alongside the account.
    pub fn metadata(&self) -> UserMetadata {
        UserMetadata {
            full_name: Some(self.full_name.clone()),
            role: Some(self.role),
            specialty: match self.role {
                UserRole::Tutor => self.specialty.clone(),
                UserRole::Student => None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
}

/// The identity the auth collaborator vouches for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

impl AuthUser {
    /// The display name to use when no profile exists yet.
    pub fn display_name(&self) -> String {
        match &self.user_metadata.full_name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => self
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: AuthUser,
}
