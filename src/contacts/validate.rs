use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).expect("Invalid email regex")
});

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://[a-zA-Z0-9][-a-zA-Z0-9]*(\.[a-zA-Z0-9][-a-zA-Z0-9]*)+(/[-a-zA-Z0-9()@:%_\+.~#?&/=]*)?$"
    ).expect("Invalid URL regex")
});

const RECOGNIZED_STATUSES: [&str; 3] = ["Lead", "Prospect", "Client"];
const RECOGNIZED_INTERACTION_KINDS: [&str; 3] =
    ["outbound_call", "inbound_call", "inbound_email"];

/// Fields a client may never set through a profile update. Their presence in
/// a payload is not an error; the service strips them before merging.
pub const EXCLUDED_FIELDS: [&str; 3] = ["id", "created_at", "updated_at"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NotAnObject,
    Required(String),
    InvalidType { field: String, expected: &'static str },
    InvalidEmail(String),
    InvalidUrl { field: String, value: String },
    InvalidStatus(String),
    InvalidInteractionKind(String),
    EmptyValue(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "Payload must be a JSON object"),
            Self::Required(field) => write!(f, "Field '{field}' is required"),
            Self::InvalidType { field, expected } => {
                write!(f, "Field '{field}' must be {expected}")
            }
            Self::InvalidEmail(email) => write!(f, "Invalid email address: {email}"),
            Self::InvalidUrl { field, value } => {
                write!(f, "Field '{field}' is not a valid URL: {value}")
            }
            Self::InvalidStatus(value) => write!(f, "Invalid contact status: '{value}'"),
            Self::InvalidInteractionKind(value) => {
                write!(f, "Invalid interaction type: '{value}'")
            }
            Self::EmptyValue(field) => write!(f, "Field '{field}' must not be empty"),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Default)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn to_error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}

/// Gate for partial profile updates: `true` when every present field
/// satisfies its constraint. The payload is untrusted JSON; conversion into
/// the typed domain shape happens only after this returns `true`.
///
/// Unknown keys are ignored, including the excluded system fields
/// (`id`/`created_at`/`updated_at`), which the caller strips before merging.
pub fn validate(candidate: &Value) -> bool {
    let result = check_profile_update(candidate);
    if !result.is_valid() {
        log::debug!(
            "Profile update rejected: {}",
            result.to_error_messages().join("; ")
        );
    }
    result.is_valid()
}

/// Field-by-field check producing structured diagnostics. The error list is
/// an internal diagnostic surface; only the boolean from [`validate`] is
/// contractual.
pub fn check_profile_update(candidate: &Value) -> ValidationResult {
    let mut result = ValidationResult::new();

    let Some(obj) = candidate.as_object() else {
        result.add_error(ValidationError::NotAnObject);
        return result;
    };

    if let Some(value) = obj.get("name") {
        check_non_empty_string(value, "name", &mut result);
    }
    if let Some(value) = obj.get("email") {
        check_email(value, &mut result);
    }
    if let Some(value) = obj.get("phone") {
        check_string(value, "phone", &mut result);
    }
    if let Some(value) = obj.get("status") {
        check_status(value, &mut result);
    }
    if let Some(value) = obj.get("company") {
        check_company(value, &mut result);
    }
    if let Some(value) = obj.get("tags") {
        check_string_array(value, "tags", &mut result);
    }
    if let Some(value) = obj.get("notes") {
        check_string(value, "notes", &mut result);
    }
    if let Some(value) = obj.get("score") {
        check_number(value, "score", &mut result);
    }
    if let Some(value) = obj.get("user_id") {
        check_string(value, "user_id", &mut result);
    }
    if let Some(value) = obj.get("dateJoined") {
        check_string(value, "dateJoined", &mut result);
    }
    if let Some(value) = obj.get("provider") {
        check_provider(value, &mut result);
    }
    if let Some(value) = obj.get("notifications") {
        check_notifications(value, &mut result);
    }

    result
}

fn check_string(value: &Value, field: &str, result: &mut ValidationResult) {
    if !value.is_string() {
        result.add_error(ValidationError::InvalidType {
            field: field.to_string(),
            expected: "a string",
        });
    }
}

fn check_non_empty_string(value: &Value, field: &str, result: &mut ValidationResult) {
    match value.as_str() {
        Some(s) if !s.trim().is_empty() => {}
        Some(_) => result.add_error(ValidationError::EmptyValue(field.to_string())),
        None => result.add_error(ValidationError::InvalidType {
            field: field.to_string(),
            expected: "a string",
        }),
    }
}

fn check_number(value: &Value, field: &str, result: &mut ValidationResult) {
    if !value.is_number() {
        result.add_error(ValidationError::InvalidType {
            field: field.to_string(),
            expected: "a number",
        });
    }
}

fn check_email(value: &Value, result: &mut ValidationResult) {
    match value.as_str() {
        Some(email) if email.len() <= 254 && EMAIL_REGEX.is_match(email) => {}
        Some(email) => result.add_error(ValidationError::InvalidEmail(email.to_string())),
        None => result.add_error(ValidationError::InvalidType {
            field: "email".to_string(),
            expected: "a string",
        }),
    }
}

fn check_url(value: &Value, field: &str, result: &mut ValidationResult) {
    match value.as_str() {
        Some(url) if url.len() <= 2048 && URL_REGEX.is_match(url) => {}
        Some(url) => result.add_error(ValidationError::InvalidUrl {
            field: field.to_string(),
            value: url.to_string(),
        }),
        None => result.add_error(ValidationError::InvalidType {
            field: field.to_string(),
            expected: "a string",
        }),
    }
}

fn check_status(value: &Value, result: &mut ValidationResult) {
    match value.as_str() {
        Some(status) if RECOGNIZED_STATUSES.contains(&status) => {}
        Some(status) => result.add_error(ValidationError::InvalidStatus(status.to_string())),
        None => result.add_error(ValidationError::InvalidType {
            field: "status".to_string(),
            expected: "a string",
        }),
    }
}

fn check_company(value: &Value, result: &mut ValidationResult) {
    let Some(company) = value.as_object() else {
        result.add_error(ValidationError::InvalidType {
            field: "company".to_string(),
            expected: "an object",
        });
        return;
    };
    if let Some(name) = company.get("name") {
        check_string(name, "company.name", result);
    }
    if let Some(website) = company.get("website") {
        check_url(website, "company.website", result);
    }
}

fn check_string_array(value: &Value, field: &str, result: &mut ValidationResult) {
    match value.as_array() {
        Some(items) => {
            for (idx, item) in items.iter().enumerate() {
                if !item.is_string() {
                    result.add_error(ValidationError::InvalidType {
                        field: format!("{field}[{idx}]"),
                        expected: "a string",
                    });
                }
            }
        }
        None => result.add_error(ValidationError::InvalidType {
            field: field.to_string(),
            expected: "an array of strings",
        }),
    }
}

fn check_provider(value: &Value, result: &mut ValidationResult) {
    let Some(provider) = value.as_object() else {
        result.add_error(ValidationError::InvalidType {
            field: "provider".to_string(),
            expected: "an object",
        });
        return;
    };
    if let Some(site) = provider.get("site") {
        check_url(site, "provider.site", result);
    }
    if let Some(funnel) = provider.get("funnel") {
        check_string(funnel, "provider.funnel", result);
    }
    if let Some(channel) = provider.get("channel") {
        check_string(channel, "provider.channel", result);
    }
    if let Some(vip) = provider.get("vip") {
        if !vip.is_boolean() {
            result.add_error(ValidationError::InvalidType {
                field: "provider.vip".to_string(),
                expected: "a boolean",
            });
        }
    }
}

fn check_notifications(value: &Value, result: &mut ValidationResult) {
    let Some(notifications) = value.as_object() else {
        result.add_error(ValidationError::InvalidType {
            field: "notifications".to_string(),
            expected: "an object",
        });
        return;
    };
    if let Some(last) = notifications.get("lastInteraction") {
        if !last.is_null() {
            check_interaction(last, "notifications.lastInteraction", result);
        }
    }
    if let Some(history) = notifications.get("history") {
        match history.as_array() {
            Some(items) => {
                for (idx, item) in items.iter().enumerate() {
                    check_interaction(
                        item,
                        &format!("notifications.history[{idx}]"),
                        result,
                    );
                }
            }
            None => result.add_error(ValidationError::InvalidType {
                field: "notifications.history".to_string(),
                expected: "an array",
            }),
        }
    }
}

fn check_interaction(value: &Value, field: &str, result: &mut ValidationResult) {
    let Some(interaction) = value.as_object() else {
        result.add_error(ValidationError::InvalidType {
            field: field.to_string(),
            expected: "an object",
        });
        return;
    };
    check_interaction_kind(interaction, field, result);
    match interaction.get("date") {
        Some(date) => check_string(date, &format!("{field}.date"), result),
        None => result.add_error(ValidationError::Required(format!("{field}.date"))),
    }
    if let Some(duration) = interaction.get("duration") {
        check_number(duration, &format!("{field}.duration"), result);
    }
    if let Some(score) = interaction.get("score") {
        check_number(score, &format!("{field}.score"), result);
    }
}

fn check_interaction_kind(
    interaction: &Map<String, Value>,
    field: &str,
    result: &mut ValidationResult,
) {
    match interaction.get("type") {
        Some(kind) => match kind.as_str() {
            Some(k) if RECOGNIZED_INTERACTION_KINDS.contains(&k) => {}
            Some(k) => {
                result.add_error(ValidationError::InvalidInteractionKind(k.to_string()))
            }
            None => result.add_error(ValidationError::InvalidType {
                field: format!("{field}.type"),
                expected: "a string",
            }),
        },
        None => result.add_error(ValidationError::Required(format!("{field}.type"))),
    }
}
