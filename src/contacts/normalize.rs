use super::types::{Contact, ContactStatus, Notifications, StoredContact, StoredContactWrite};
use thiserror::Error;

/// Raised when a stored record carries a status outside the three recognized
/// values. Storage constraints are supposed to make this unreachable; a hit
/// means the row was written around the application and we refuse to guess.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("Unrecognized contact status: '{0}'")]
    UnknownStatus(String),
}

/// Converts a stored record into the domain shape.
///
/// - `notifications.last_interaction` is the head of the interaction log,
///   `None` when the log is empty. `history` is the full log.
/// - `type` becomes `company` (empty string when absent), `comments` becomes
///   `notes`, an absent `phone` stays absent rather than becoming `""`.
/// - `updated_at` defaults to `created_at` for records never updated.
///
/// Presence of `id`/`name`/`email` is a storage-layer guarantee and is not
/// re-checked here.
pub fn to_domain(stored: StoredContact) -> Result<Contact, NormalizeError> {
    let status = ContactStatus::from_stored(&stored.status)
        .ok_or_else(|| NormalizeError::UnknownStatus(stored.status.clone()))?;

    let last_interaction = stored.interactions.first().cloned();
    let updated_at = stored.updated_at.unwrap_or(stored.created_at);

    Ok(Contact {
        id: Some(stored.id),
        name: stored.name,
        email: stored.email,
        phone: stored.phone,
        company: stored.contact_type.unwrap_or_default(),
        status,
        tags: stored.tags,
        notes: stored.comments,
        created_at: stored.created_at,
        updated_at,
        user_id: stored.user_id,
        date_joined: stored.created_at,
        provider: stored.provider,
        score: stored.score,
        notifications: Notifications {
            last_interaction,
            history: stored.interactions,
        },
    })
}

/// Converts a domain contact back into the write shape. Infallible: the
/// inverse of `to_domain` for every shared field, with `status` casing
/// re-derived mechanically. The interaction log is persisted through a
/// separate collaborator and is structurally absent from the result.
pub fn to_storage(contact: Contact) -> StoredContactWrite {
    StoredContactWrite {
        id: contact.id,
        user_id: contact.user_id,
        name: contact.name,
        email: contact.email,
        phone: contact.phone.unwrap_or_default(),
        contact_type: contact.company,
        status: capitalize_status(contact.status.as_str()),
        tags: contact.tags,
        comments: contact.notes,
        score: contact.score,
        provider: contact.provider,
        created_at: contact.created_at,
        updated_at: contact.updated_at,
    }
}

/// First letter upper-cased, remainder lower-cased. A mechanical transform
/// rather than a lookup table: malformed input produces a malformed but
/// deterministic result. Membership policing is the validator's job.
pub fn capitalize_status(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::types::{Interaction, InteractionKind, Provider};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn sample_interaction(kind: InteractionKind, day: u32) -> Interaction {
        Interaction {
            kind,
            date: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
            duration: kind.is_call().then_some(180),
            score: Some(0.8),
        }
    }

    fn sample_stored() -> StoredContact {
        StoredContact {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Maria Souza".to_string(),
            email: "maria@acme.com".to_string(),
            phone: Some("+5511999990000".to_string()),
            contact_type: Some("Acme Corp".to_string()),
            status: "Prospect".to_string(),
            tags: vec!["vip".to_string(), "q2".to_string()],
            comments: Some("Met at the trade fair".to_string()),
            score: Some(72.5),
            provider: Some(Provider {
                site: Some("https://acme.com".to_string()),
                funnel: Some("inbound".to_string()),
                channel: Some("voice".to_string()),
                vip: true,
            }),
            interactions: vec![
                sample_interaction(InteractionKind::OutboundCall, 9),
                sample_interaction(InteractionKind::InboundEmail, 2),
            ],
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap(),
            updated_at: Some(Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_round_trip_preserves_shared_fields() {
        let stored = sample_stored();
        let expected = stored.clone();
        let written = to_storage(to_domain(stored).unwrap());

        assert_eq!(written.id, Some(expected.id));
        assert_eq!(written.user_id, expected.user_id);
        assert_eq!(written.name, expected.name);
        assert_eq!(written.email, expected.email);
        assert_eq!(written.phone, expected.phone.unwrap());
        assert_eq!(written.contact_type, expected.contact_type.unwrap());
        assert_eq!(written.status, expected.status);
        assert_eq!(written.tags, expected.tags);
        assert_eq!(written.comments, expected.comments);
        assert_eq!(written.score, expected.score);
        assert_eq!(written.provider, expected.provider);
        assert_eq!(written.created_at, expected.created_at);
        assert_eq!(written.updated_at, expected.updated_at.unwrap());
    }

    #[test]
    fn test_status_case_normalization() {
        let mut stored = sample_stored();
        stored.status = "CLIENT".to_string();
        let contact = to_domain(stored).unwrap();
        assert_eq!(contact.status, ContactStatus::Client);
        assert_eq!(contact.status.to_string(), "client");

        let written = to_storage(contact);
        assert_eq!(written.status, "Client");
    }

    #[test]
    fn test_unknown_status_fails_fast() {
        let mut stored = sample_stored();
        stored.status = "archived".to_string();
        assert_eq!(
            to_domain(stored),
            Err(NormalizeError::UnknownStatus("archived".to_string()))
        );

        let mut empty = sample_stored();
        empty.status = String::new();
        assert!(to_domain(empty).is_err());
    }

    #[test]
    fn test_last_interaction_is_derived_head() {
        let stored = sample_stored();
        let first = stored.interactions[0].clone();
        let all = stored.interactions.clone();

        let contact = to_domain(stored).unwrap();
        assert_eq!(contact.notifications.last_interaction, Some(first));
        assert_eq!(contact.notifications.history, all);
    }

    #[test]
    fn test_empty_interaction_log() {
        let mut stored = sample_stored();
        stored.interactions.clear();
        let contact = to_domain(stored).unwrap();
        assert_eq!(contact.notifications.last_interaction, None);
        assert!(contact.notifications.history.is_empty());
    }

    #[test]
    fn test_missing_phone_maps_both_ways() {
        let mut stored = sample_stored();
        stored.phone = None;
        let contact = to_domain(stored).unwrap();
        assert_eq!(contact.phone, None);

        let written = to_storage(contact);
        assert_eq!(written.phone, "");
    }

    #[test]
    fn test_missing_type_and_comments() {
        let mut stored = sample_stored();
        stored.contact_type = None;
        stored.comments = None;
        let contact = to_domain(stored).unwrap();
        assert_eq!(contact.company, "");
        assert_eq!(contact.notes, None);
    }

    #[test]
    fn test_updated_at_defaults_to_created_at() {
        let mut stored = sample_stored();
        stored.updated_at = None;
        let created = stored.created_at;
        let contact = to_domain(stored).unwrap();
        assert_eq!(contact.updated_at, created);
        assert_eq!(contact.date_joined, created);
    }

    #[test]
    fn test_capitalize_status_is_mechanical() {
        assert_eq!(capitalize_status("lead"), "Lead");
        assert_eq!(capitalize_status("PROSPECT"), "Prospect");
        assert_eq!(capitalize_status("cLiEnT"), "Client");
        assert_eq!(capitalize_status("banana"), "Banana");
        assert_eq!(capitalize_status(""), "");
    }
}
