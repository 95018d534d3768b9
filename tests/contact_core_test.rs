use crmserver::contacts::{
    capitalize_status, to_domain, to_storage, validate, ContactStatus, StoredContact,
};
use serde_json::json;

fn stored_fixture() -> serde_json::Value {
    json!({
        "id": "550e8400-e29b-41d4-a716-446655440000",
        "user_id": "550e8400-e29b-41d4-a716-446655440001",
        "name": "Joana Lima",
        "email": "joana@orbit.dev",
        "phone": "+5511988887777",
        "type": "Orbit Labs",
        "status": "Client",
        "tags": ["enterprise"],
        "comments": "Renewal due in Q3",
        "score": 64.0,
        "interactions": [
            {"type": "inbound_call", "date": "2024-04-20T15:00:00Z", "duration": 240},
            {"type": "inbound_email", "date": "2024-04-01T09:00:00Z"}
        ],
        "created_at": "2024-02-01T10:00:00Z",
        "updated_at": "2024-04-20T15:05:00Z"
    })
}

#[test]
fn stored_record_normalizes_to_domain_wire_shape() {
    let stored: StoredContact = serde_json::from_value(stored_fixture()).unwrap();
    let contact = to_domain(stored).unwrap();

    assert_eq!(contact.status, ContactStatus::Client);
    assert_eq!(contact.company, "Orbit Labs");
    assert_eq!(contact.notes.as_deref(), Some("Renewal due in Q3"));

    let wire = serde_json::to_value(&contact).unwrap();
    assert_eq!(wire["status"], "client");
    assert_eq!(wire["dateJoined"], wire["created_at"]);
    assert_eq!(
        wire["notifications"]["lastInteraction"]["type"],
        "inbound_call"
    );
    assert_eq!(wire["notifications"]["history"].as_array().unwrap().len(), 2);
    // The stored aliases must not leak into the domain shape.
    assert!(wire.get("type").is_none());
    assert!(wire.get("comments").is_none());
    assert!(wire.get("interactions").is_none());
}

#[test]
fn write_shape_omits_interactions_and_recapitalizes_status() {
    let stored: StoredContact = serde_json::from_value(stored_fixture()).unwrap();
    let write = to_storage(to_domain(stored).unwrap());

    assert_eq!(write.status, "Client");
    let wire = serde_json::to_value(&write).unwrap();
    assert!(wire.get("interactions").is_none());
    assert_eq!(wire["type"], "Orbit Labs");
    assert_eq!(wire["comments"], "Renewal due in Q3");
}

#[test]
fn round_trip_through_json_preserves_shared_fields() {
    let original = stored_fixture();
    let stored: StoredContact = serde_json::from_value(original.clone()).unwrap();
    let write = to_storage(to_domain(stored).unwrap());
    let wire = serde_json::to_value(&write).unwrap();

    for field in [
        "id", "user_id", "name", "email", "phone", "type", "status", "tags", "comments",
        "score", "created_at", "updated_at",
    ] {
        assert_eq!(wire[field], original[field], "field '{field}' did not survive");
    }
}

#[test]
fn validator_gates_partial_updates() {
    assert!(validate(&json!({"email": "a@b.com"})));
    assert!(!validate(&json!({"email": "not-an-email"})));
    assert!(!validate(&json!({"status": "unknown"})));
    assert!(validate(&json!({
        "id": "x",
        "created_at": "2024-01-01",
        "email": "a@b.com"
    })));
}

#[test]
fn validator_accepts_full_profile_payload() {
    assert!(validate(&json!({
        "name": "Joana Lima",
        "email": "joana@orbit.dev",
        "phone": "+5511988887777",
        "status": "Client",
        "company": {"name": "Orbit Labs", "website": "https://orbit.dev"},
        "tags": ["enterprise"],
        "notes": "Renewal due in Q3",
        "score": 64.0,
        "provider": {"site": "https://orbit.dev", "funnel": "outbound", "vip": false},
        "notifications": {
            "lastInteraction": {"type": "inbound_call", "date": "2024-04-20T15:00:00Z", "duration": 240},
            "history": [
                {"type": "inbound_call", "date": "2024-04-20T15:00:00Z", "duration": 240},
                {"type": "inbound_email", "date": "2024-04-01T09:00:00Z"}
            ]
        }
    })));
}

#[test]
fn status_capitalization_is_a_mechanical_transform() {
    assert_eq!(capitalize_status("client"), "Client");
    assert_eq!(capitalize_status("LEAD"), "Lead");
    assert_eq!(capitalize_status("weird"), "Weird");
}
