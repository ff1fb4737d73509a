use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::UserId;

/// Avatar sizes the host renders, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarSize {
    Small,
    Medium,
    Large,
}

impl AvatarSize {
    pub const ALL: [AvatarSize; 3] = [Self::Small, Self::Medium, Self::Large];

    pub fn pixels(&self) -> u32 {
        match self {
            Self::Small => 24,
            Self::Medium => 48,
            Self::Large => 96,
        }
    }
}

/// An entry of the host's user directory. Never created or edited here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub link: String,
    /// Avatar URLs keyed by pixel size (`"24"`, `"48"`, `"96"`).
    #[serde(default)]
    pub avatar_urls: BTreeMap<String, String>,
}

impl User {
    pub fn avatar(&self, size: AvatarSize) -> Option<&str> {
        self.avatar_urls
            .get(&size.pixels().to_string())
            .map(String::as_str)
            .filter(|url| !url.is_empty())
    }
}

/// A user as shown next to a project, todo or message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub id: UserId,
    pub name: String,
    pub avatar: Option<String>,
}

impl Member {
    pub fn from_user(user: &User, size: AvatarSize) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            avatar: user.avatar(size).map(str::to_string),
        }
    }
}
