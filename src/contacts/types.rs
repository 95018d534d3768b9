use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Contact status in its canonical domain form. The persistence layer keeps
/// the capitalized spelling (`Lead`/`Prospect`/`Client`); everything above
/// the storage boundary uses lower-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    Lead,
    Prospect,
    Client,
}

impl ContactStatus {
    /// Case-insensitive parse of the stored spelling.
    pub fn from_stored(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "lead" => Some(Self::Lead),
            "prospect" => Some(Self::Prospect),
            "client" => Some(Self::Client),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Prospect => "prospect",
            Self::Client => "client",
        }
    }
}

impl std::fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for ContactStatus {
    fn default() -> Self {
        Self::Lead
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    OutboundCall,
    InboundCall,
    InboundEmail,
}

impl InteractionKind {
    pub fn from_stored(value: &str) -> Option<Self> {
        match value {
            "outbound_call" => Some(Self::OutboundCall),
            "inbound_call" => Some(Self::InboundCall),
            "inbound_email" => Some(Self::InboundEmail),
            _ => None,
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Self::OutboundCall | Self::InboundCall)
    }
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutboundCall => write!(f, "outbound_call"),
            Self::InboundCall => write!(f, "inbound_call"),
            Self::InboundEmail => write!(f, "inbound_email"),
        }
    }
}

/// One logged touch-point with a contact. `duration` is only meaningful for
/// call-type interactions and is expressed in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Acquisition metadata attached by the intake flows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funnel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default)]
    pub vip: bool,
}

/// Derived view over the interaction log. `last_interaction` is always the
/// head of `history` when the log is non-empty and `null` otherwise; it is
/// never stored independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notifications {
    #[serde(rename = "lastInteraction")]
    pub last_interaction: Option<Interaction>,
    pub history: Vec<Interaction>,
}

/// The contact shape the application logic and UI operate on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub company: String,
    pub status: ContactStatus,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: Uuid,
    #[serde(rename = "dateJoined")]
    pub date_joined: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub notifications: Notifications,
}

/// The contact record as read from persistent storage. `type` stands in for
/// `company`, `comments` for `notes`, and the interaction log is a flat
/// most-recent-first sequence. `status` keeps the capitalized spelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredContact {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub contact_type: Option<String>,
    pub status: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The write shape handed to the persistence layer. Interactions are
/// persisted through a separate collaborator, so the field does not exist
/// here. `phone` is always present; absent phones become empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredContactWrite {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "type")]
    pub contact_type: String,
    pub status: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContactRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: Option<ContactStatus>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
    pub provider: Option<Provider>,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactListQuery {
    pub search: Option<String>,
    pub status: Option<ContactStatus>,
    pub tag: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<i32>,
    pub per_page: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactListResponse {
    pub contacts: Vec<Contact>,
    pub total_count: i64,
    pub page: i32,
    pub per_page: i32,
    pub total_pages: i32,
}
