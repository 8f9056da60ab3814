use crate::error::IdentityError;
use async_trait::async_trait;
use dashmap::DashMap;

/// The names shown for a chat user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    pub display_name: String,
    pub real_name: String,
}

/// Resolves chat user ids into profiles.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    async fn resolve_profile(&self, user: &str) -> Result<Profile, IdentityError>;
}

/// Profiles announced by connected clients.
#[derive(Default)]
pub struct ProfileDirectory {
    profiles: DashMap<String, Profile>,
}

impl ProfileDirectory {
    /// Records the profile of a user, replacing any earlier one.
    pub fn register(&self, user: &str, display_name: &str, real_name: &str) -> Result<(), IdentityError> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(IdentityError::BlankName(user.to_string()));
        }
        let real_name = match real_name.trim() {
            "" => display_name,
            name => name,
        };
        self.profiles.insert(
            user.to_string(),
            Profile {
                display_name: display_name.to_string(),
                real_name: real_name.to_string(),
            },
        );
        Ok(())
    }
}

#[async_trait]
impl IdentityLookup for ProfileDirectory {
    async fn resolve_profile(&self, user: &str) -> Result<Profile, IdentityError> {
        self.profiles
            .get(user)
            .map(|p| p.clone())
            .ok_or_else(|| IdentityError::UnknownUser(user.to_string()))
    }
}
