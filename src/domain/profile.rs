use super::tutor::Subject;
use super::wallet::{Amount, Balance};
use crate::error::{MarketError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Student,
    Tutor,
}

impl UserRole {
    /// The other role. Applying it twice yields the original role.
    pub fn toggled(self) -> Self {
        match self {
            UserRole::Student => UserRole::Tutor,
            UserRole::Tutor => UserRole::Student,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Student => write!(f, "student"),
            UserRole::Tutor => write!(f, "tutor"),
        }
    }
}

impl FromStr for UserRole {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(UserRole::Student),
            "tutor" => Ok(UserRole::Tutor),
            other => Err(MarketError::ValidationError(format!(
                "Unknown role: {other}"
            ))),
        }
    }
}

/// A signed-in user as stored in the `profiles` table.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub avatar: String,
    /// Only meaningful for students.
    #[serde(default)]
    pub wallet_balance: Balance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<Subject>>,
}

impl UserProfile {
    pub fn is_tutor(&self) -> bool {
        self.role == UserRole::Tutor
    }

    /// Applies every field set in `patch` to this profile.
    pub fn apply(&mut self, patch: &ProfilePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(avatar) = &patch.avatar {
            self.avatar = avatar.clone();
        }
        if let Some(balance) = patch.wallet_balance {
            self.wallet_balance = balance;
        }
        if let Some(bio) = &patch.bio {
            self.bio = Some(bio.clone());
        }
        if let Some(specialty) = &patch.specialty {
            self.specialty = Some(specialty.clone());
        }
        if let Some(rate) = patch.hourly_rate {
            self.hourly_rate = Some(rate);
        }
        if let Some(subjects) = &patch.subjects {
            self.subjects = Some(subjects.clone());
        }
    }
}

/// A partial update of a profile row. Unset fields are left untouched.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_balance: Option<Balance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<Subject>>,
}

impl ProfilePatch {
    pub fn role(role: UserRole) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Rejects edits a profile form would not accept.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err(MarketError::ValidationError(
                "Name must not be empty".to_string(),
            ));
        }
        if let Some(email) = &self.email
            && !email.contains('@')
        {
            return Err(MarketError::ValidationError(format!(
                "Invalid email address: {email}"
            )));
        }
        Ok(())
    }
}
