//! Order-related shared types

use serde::{Deserialize, Serialize};

/// Role of an authenticated actor
///
/// `System` never comes from the identity provider; it is used by the
/// timeout resolver and auto-completion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Client,
    Provider,
    System,
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActorRole::Client => write!(f, "client"),
            ActorRole::Provider => write!(f, "provider"),
            ActorRole::System => write!(f, "system"),
        }
    }
}

/// The current actor: identity id plus role
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: ActorRole,
}

impl Actor {
    pub const SYSTEM_ID: &'static str = "system";

    pub fn client(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: ActorRole::Client,
        }
    }

    pub fn provider(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: ActorRole::Provider,
        }
    }

    /// Actor used for resolver-driven transitions
    pub fn system() -> Self {
        Self {
            id: Self::SYSTEM_ID.to_string(),
            role: ActorRole::System,
        }
    }

    pub fn is_system(&self) -> bool {
        self.role == ActorRole::System
    }
}

/// Who closed a completed order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompletedBy {
    /// The provider marked the appointment as done
    Master,
    /// Kept for records imported from earlier clients; not produced by the engine
    Client,
    /// The resolver closed it after the appointment time plus grace
    Auto,
}
