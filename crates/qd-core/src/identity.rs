use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::UserProfile;
use crate::enums::Role;

/// Identity reported by the auth provider. Carries no role: roles live in the
/// profile document and are looked up separately.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthIdentity {
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// The signed-in user as the rest of the application sees it: the auth
/// identity merged with whatever the profile lookup returned.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub category_interest: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

impl SessionUser {
    /// Build from an identity whose profile could not be read. Role defaults
    /// to `end_user`; the name falls back to the display name, then to the
    /// local part of the email.
    #[must_use]
    pub fn without_profile(identity: &AuthIdentity) -> Self {
        Self {
            uid: identity.uid.clone(),
            name: fallback_name(identity),
            email: identity.email.clone(),
            role: Role::default(),
            category_interest: None,
            language: None,
            profile_image: None,
        }
    }

    /// Build from an identity and its profile document.
    #[must_use]
    pub fn from_profile(identity: &AuthIdentity, profile: UserProfile) -> Self {
        let name = if profile.name.trim().is_empty() {
            fallback_name(identity)
        } else {
            profile.name
        };
        Self {
            uid: identity.uid.clone(),
            name,
            email: identity.email.clone(),
            role: profile.role,
            category_interest: profile.category_interest,
            language: profile.language,
            profile_image: profile.profile_image,
        }
    }
}

fn fallback_name(identity: &AuthIdentity) -> String {
    identity
        .display_name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| {
            identity
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string()
        })
}
