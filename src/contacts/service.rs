use super::error::ContactsError;
use super::normalize::{to_domain, to_storage};
use super::types::*;
use super::validate::{check_profile_update, EXCLUDED_FIELDS};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Nullable, Text, Timestamptz, Uuid as DieselUuid};
use log::{error, info};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

#[derive(QueryableByName)]
struct ContactRow {
    #[diesel(sql_type = DieselUuid)]
    id: Uuid,
    #[diesel(sql_type = DieselUuid)]
    user_id: Uuid,
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Text)]
    email: String,
    #[diesel(sql_type = Nullable<Text>)]
    phone: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    contact_type: Option<String>,
    #[diesel(sql_type = Text)]
    status: String,
    #[diesel(sql_type = Nullable<Text>)]
    tags: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    comments: Option<String>,
    #[diesel(sql_type = Nullable<Double>)]
    score: Option<f64>,
    #[diesel(sql_type = Nullable<Text>)]
    provider: Option<String>,
    #[diesel(sql_type = Timestamptz)]
    created_at: DateTime<Utc>,
    #[diesel(sql_type = Nullable<Timestamptz>)]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(QueryableByName)]
struct InteractionRow {
    #[diesel(sql_type = Text)]
    kind: String,
    #[diesel(sql_type = Timestamptz)]
    occurred_at: DateTime<Utc>,
    #[diesel(sql_type = Nullable<BigInt>)]
    duration: Option<i64>,
    #[diesel(sql_type = Nullable<Double>)]
    score: Option<f64>,
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

const CONTACT_COLUMNS: &str = "id, user_id, name, email, phone, type AS contact_type, status, \
     tags, comments, score, provider, created_at, updated_at";

pub struct ContactsService {
    pool: Arc<diesel::r2d2::Pool<diesel::r2d2::ConnectionManager<diesel::PgConnection>>>,
}

impl ContactsService {
    pub fn new(
        pool: Arc<diesel::r2d2::Pool<diesel::r2d2::ConnectionManager<diesel::PgConnection>>>,
    ) -> Self {
        Self { pool }
    }

    pub async fn create_contact(
        &self,
        user_id: Uuid,
        request: CreateContactRequest,
    ) -> Result<Contact, ContactsError> {
        let mut conn = self.pool.get().map_err(|e| {
            error!("Failed to get database connection: {e}");
            ContactsError::DatabaseConnection
        })?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        let contact = Contact {
            id: Some(id),
            name: request.name,
            email: request.email,
            phone: request.phone,
            company: request.company.unwrap_or_default(),
            status: request.status.unwrap_or_default(),
            tags: request.tags.unwrap_or_default(),
            notes: request.notes,
            created_at: now,
            updated_at: now,
            user_id,
            date_joined: now,
            provider: request.provider,
            score: request.score,
            notifications: Notifications {
                last_interaction: None,
                history: Vec::new(),
            },
        };
        let write = to_storage(contact);
        let tags_json =
            serde_json::to_string(&write.tags).unwrap_or_else(|_| "[]".to_string());
        let provider_json = write
            .provider
            .as_ref()
            .and_then(|p| serde_json::to_string(p).ok());

        let sql = r#"
            INSERT INTO contacts (
                id, user_id, name, email, phone, type, status, tags, comments,
                score, provider, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW())
        "#;

        diesel::sql_query(sql)
            .bind::<DieselUuid, _>(id)
            .bind::<DieselUuid, _>(user_id)
            .bind::<Text, _>(&write.name)
            .bind::<Text, _>(&write.email)
            .bind::<Text, _>(&write.phone)
            .bind::<Text, _>(&write.contact_type)
            .bind::<Text, _>(&write.status)
            .bind::<Text, _>(&tags_json)
            .bind::<Nullable<Text>, _>(write.comments.as_deref())
            .bind::<Nullable<Double>, _>(write.score)
            .bind::<Nullable<Text>, _>(provider_json.as_deref())
            .execute(&mut conn)
            .map_err(|e| {
                error!("Failed to create contact: {e}");
                ContactsError::CreateFailed
            })?;

        self.get_contact(id).await
    }

    pub async fn get_contact(&self, contact_id: Uuid) -> Result<Contact, ContactsError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|_| ContactsError::DatabaseConnection)?;

        let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1");
        let rows: Vec<ContactRow> = diesel::sql_query(sql)
            .bind::<DieselUuid, _>(contact_id)
            .load(&mut conn)
            .map_err(|e| {
                error!("Failed to get contact: {e}");
                ContactsError::DatabaseConnection
            })?;

        let row = rows.into_iter().next().ok_or(ContactsError::NotFound)?;
        let interactions = self.fetch_interactions(&mut conn, contact_id)?;
        let stored = row_to_stored(row, interactions)?;
        Ok(to_domain(stored)?)
    }

    pub async fn list_contacts(
        &self,
        query: ContactListQuery,
    ) -> Result<ContactListResponse, ContactsError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|_| ContactsError::DatabaseConnection)?;

        let (page, per_page, offset) = page_window(query.page, query.per_page);

        let mut where_clauses: Vec<String> = Vec::new();
        let mut param_count = 0;

        if query.search.is_some() {
            param_count += 1;
            where_clauses.push(format!(
                "(name ILIKE '%' || ${param_count} || '%' OR email ILIKE '%' || ${param_count} || '%' OR type ILIKE '%' || ${param_count} || '%')"
            ));
        }

        if query.status.is_some() {
            param_count += 1;
            where_clauses.push(format!("status = ${param_count}"));
        }

        if query.tag.is_some() {
            param_count += 1;
            where_clauses.push(format!("tags::jsonb ? ${param_count}"));
        }

        let where_clause = if where_clauses.is_empty() {
            "TRUE".to_string()
        } else {
            where_clauses.join(" AND ")
        };

        let sort_column = match query.sort_by.as_deref() {
            Some("name") => "name",
            Some("email") => "email",
            Some("status") => "status",
            Some("updated_at") => "updated_at",
            _ => "created_at",
        };

        let sort_order = match query.sort_order.as_deref() {
            Some("asc") => "ASC",
            _ => "DESC",
        };

        let count_sql = format!("SELECT COUNT(*) as count FROM contacts WHERE {where_clause}");
        let list_sql = format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE {where_clause} \
             ORDER BY {sort_column} {sort_order} LIMIT ${} OFFSET ${}",
            param_count + 1,
            param_count + 2
        );

        let mut count_query = diesel::sql_query(&count_sql).into_boxed();
        let mut list_query = diesel::sql_query(&list_sql).into_boxed();

        if let Some(ref search) = query.search {
            count_query = count_query.bind::<Text, _>(search);
            list_query = list_query.bind::<Text, _>(search);
        }

        if let Some(status) = query.status {
            let stored = super::normalize::capitalize_status(status.as_str());
            count_query = count_query.bind::<Text, _>(stored.clone());
            list_query = list_query.bind::<Text, _>(stored);
        }

        if let Some(ref tag) = query.tag {
            count_query = count_query.bind::<Text, _>(tag);
            list_query = list_query.bind::<Text, _>(tag);
        }

        list_query = list_query
            .bind::<diesel::sql_types::Integer, _>(per_page)
            .bind::<diesel::sql_types::Integer, _>(offset);

        let count_result: Vec<CountRow> = count_query.load(&mut conn).map_err(|e| {
            error!("Failed to count contacts: {e}");
            ContactsError::DatabaseConnection
        })?;
        let total_count = count_result.first().map(|r| r.count).unwrap_or(0);

        let rows: Vec<ContactRow> = list_query.load(&mut conn).map_err(|e| {
            error!("Failed to list contacts: {e}");
            ContactsError::DatabaseConnection
        })?;
        let mut contacts = Vec::with_capacity(rows.len());
        for row in rows {
            let interactions = self.fetch_interactions(&mut conn, row.id)?;
            let stored = row_to_stored(row, interactions)?;
            contacts.push(to_domain(stored)?);
        }

        let total_pages = ((total_count as f64) / (per_page as f64)).ceil() as i32;

        Ok(ContactListResponse {
            contacts,
            total_count,
            page,
            per_page,
            total_pages,
        })
    }

    /// Partial profile update. The payload is untrusted JSON: it first has to
    /// pass the validation gate, then the excluded system fields are stripped
    /// and the remaining fields are merged into the current domain contact
    /// before the storage shape is rewritten.
    pub async fn update_profile(
        &self,
        contact_id: Uuid,
        payload: Value,
    ) -> Result<Contact, ContactsError> {
        let result = check_profile_update(&payload);
        if !result.is_valid() {
            return Err(ContactsError::InvalidInput(
                result.to_error_messages().join("; "),
            ));
        }

        let mut payload = payload;
        let fields = payload
            .as_object_mut()
            .ok_or_else(|| ContactsError::InvalidInput("Payload must be an object".to_string()))?;
        for field in EXCLUDED_FIELDS {
            fields.remove(field);
        }

        let existing = self.get_contact(contact_id).await?;
        let merged = apply_profile_update(existing, fields);
        let write = to_storage(merged);

        let mut conn = self
            .pool
            .get()
            .map_err(|_| ContactsError::DatabaseConnection)?;

        let tags_json =
            serde_json::to_string(&write.tags).unwrap_or_else(|_| "[]".to_string());
        let provider_json = write
            .provider
            .as_ref()
            .and_then(|p| serde_json::to_string(p).ok());

        let sql = r#"
            UPDATE contacts SET
                name = $1, email = $2, phone = $3, type = $4, status = $5,
                tags = $6, comments = $7, score = $8, provider = $9,
                updated_at = NOW()
            WHERE id = $10
        "#;

        diesel::sql_query(sql)
            .bind::<Text, _>(&write.name)
            .bind::<Text, _>(&write.email)
            .bind::<Text, _>(&write.phone)
            .bind::<Text, _>(&write.contact_type)
            .bind::<Text, _>(&write.status)
            .bind::<Text, _>(&tags_json)
            .bind::<Nullable<Text>, _>(write.comments.as_deref())
            .bind::<Nullable<Double>, _>(write.score)
            .bind::<Nullable<Text>, _>(provider_json.as_deref())
            .bind::<DieselUuid, _>(contact_id)
            .execute(&mut conn)
            .map_err(|e| {
                error!("Failed to update contact: {e}");
                ContactsError::UpdateFailed
            })?;

        self.get_contact(contact_id).await
    }

    /// Appends one interaction to the contact's log. The log is the storage
    /// collaborator for everything `notifications` derives from.
    pub async fn add_interaction(
        &self,
        contact_id: Uuid,
        interaction: Interaction,
    ) -> Result<Contact, ContactsError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|_| ContactsError::DatabaseConnection)?;

        diesel::sql_query(
            r#"
            INSERT INTO contact_interactions (id, contact_id, kind, occurred_at, duration, score)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind::<DieselUuid, _>(Uuid::new_v4())
        .bind::<DieselUuid, _>(contact_id)
        .bind::<Text, _>(interaction.kind.to_string())
        .bind::<Timestamptz, _>(interaction.date)
        .bind::<Nullable<BigInt>, _>(interaction.duration)
        .bind::<Nullable<Double>, _>(interaction.score)
        .execute(&mut conn)
        .map_err(|e| {
            error!("Failed to log interaction: {e}");
            ContactsError::UpdateFailed
        })?;

        info!("Logged {} interaction for contact {contact_id}", interaction.kind);
        self.get_contact(contact_id).await
    }

    fn fetch_interactions(
        &self,
        conn: &mut diesel::PgConnection,
        contact_id: Uuid,
    ) -> Result<Vec<Interaction>, ContactsError> {
        let rows: Vec<InteractionRow> = diesel::sql_query(
            "SELECT kind, occurred_at, duration, score FROM contact_interactions \
             WHERE contact_id = $1 ORDER BY occurred_at DESC",
        )
        .bind::<DieselUuid, _>(contact_id)
        .load(conn)
        .map_err(|e| {
            error!("Failed to load interactions: {e}");
            ContactsError::DatabaseConnection
        })?;

        rows.into_iter()
            .map(|row| {
                let kind = InteractionKind::from_stored(&row.kind).ok_or_else(|| {
                    ContactsError::CorruptRecord(format!(
                        "Unrecognized interaction kind: '{}'",
                        row.kind
                    ))
                })?;
                Ok(Interaction {
                    kind,
                    date: row.occurred_at,
                    duration: row.duration,
                    score: row.score,
                })
            })
            .collect()
    }
}

/// Caps the page index so the OFFSET arithmetic stays inside `i32` even for
/// hostile query parameters.
const MAX_PAGE: i32 = 100_000;

fn page_window(page: Option<i32>, per_page: Option<i32>) -> (i32, i32, i32) {
    let page = page.unwrap_or(1).clamp(1, MAX_PAGE);
    let per_page = per_page.unwrap_or(25).clamp(1, 100);
    (page, per_page, (page - 1) * per_page)
}

fn row_to_stored(
    row: ContactRow,
    interactions: Vec<Interaction>,
) -> Result<StoredContact, ContactsError> {
    let tags: Vec<String> = match row.tags {
        Some(raw) => serde_json::from_str(&raw).map_err(|e| {
            ContactsError::CorruptRecord(format!("Malformed tags payload: {e}"))
        })?,
        None => Vec::new(),
    };
    let provider: Option<Provider> = match row.provider {
        Some(raw) => Some(serde_json::from_str(&raw).map_err(|e| {
            ContactsError::CorruptRecord(format!("Malformed provider payload: {e}"))
        })?),
        None => None,
    };

    Ok(StoredContact {
        id: row.id,
        user_id: row.user_id,
        name: row.name,
        email: row.email,
        phone: row.phone,
        contact_type: row.contact_type,
        status: row.status,
        tags,
        comments: row.comments,
        score: row.score,
        provider,
        interactions,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Merges validated update fields into the current domain contact. Only
/// fields that are part of the update contract are applied; `notifications`
/// is derived from the interaction log and `dateJoined`/`user_id` stay under
/// system control, so those are left untouched even when present.
fn apply_profile_update(mut contact: Contact, fields: &serde_json::Map<String, Value>) -> Contact {
    if let Some(name) = fields.get("name").and_then(Value::as_str) {
        contact.name = name.to_string();
    }
    if let Some(email) = fields.get("email").and_then(Value::as_str) {
        contact.email = email.to_string();
    }
    if let Some(phone) = fields.get("phone").and_then(Value::as_str) {
        contact.phone = Some(phone.to_string());
    }
    if let Some(status) = fields
        .get("status")
        .and_then(Value::as_str)
        .and_then(ContactStatus::from_stored)
    {
        contact.status = status;
    }
    if let Some(company) = fields.get("company").and_then(Value::as_object) {
        if let Some(name) = company.get("name").and_then(Value::as_str) {
            contact.company = name.to_string();
        }
    }
    if let Some(tags) = fields.get("tags").and_then(Value::as_array) {
        contact.tags = tags
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
    }
    if let Some(notes) = fields.get("notes").and_then(Value::as_str) {
        contact.notes = Some(notes.to_string());
    }
    if let Some(score) = fields.get("score").and_then(Value::as_f64) {
        contact.score = Some(score);
    }
    if let Some(provider) = fields.get("provider") {
        if let Ok(provider) = serde_json::from_value::<Provider>(provider.clone()) {
            contact.provider = Some(provider);
        }
    }
    contact
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample_contact() -> Contact {
        let created = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
        Contact {
            id: Some(Uuid::new_v4()),
            name: "Maria Souza".to_string(),
            email: "maria@acme.com".to_string(),
            phone: None,
            company: "Acme Corp".to_string(),
            status: ContactStatus::Lead,
            tags: vec!["vip".to_string()],
            notes: None,
            created_at: created,
            updated_at: created,
            user_id: Uuid::new_v4(),
            date_joined: created,
            provider: None,
            score: None,
            notifications: Notifications {
                last_interaction: None,
                history: Vec::new(),
            },
        }
    }

    #[test]
    fn test_apply_profile_update_merges_present_fields() {
        let contact = sample_contact();
        let payload = json!({
            "email": "maria@newco.com",
            "status": "Client",
            "company": {"name": "NewCo", "website": "https://newco.com"},
            "score": 91.0
        });
        let merged = apply_profile_update(contact, payload.as_object().unwrap());

        assert_eq!(merged.email, "maria@newco.com");
        assert_eq!(merged.status, ContactStatus::Client);
        assert_eq!(merged.company, "NewCo");
        assert_eq!(merged.score, Some(91.0));
        assert_eq!(merged.name, "Maria Souza");
    }

    #[test]
    fn test_apply_profile_update_leaves_system_fields() {
        let contact = sample_contact();
        let original_user = contact.user_id;
        let original_joined = contact.date_joined;
        let payload = json!({
            "user_id": "00000000-0000-0000-0000-000000000001",
            "dateJoined": "1999-01-01T00:00:00Z",
            "notifications": {"lastInteraction": null, "history": []}
        });
        let merged = apply_profile_update(contact, payload.as_object().unwrap());

        assert_eq!(merged.user_id, original_user);
        assert_eq!(merged.date_joined, original_joined);
        assert!(merged.notifications.history.is_empty());
    }

    #[test]
    fn test_apply_profile_update_sets_absent_phone() {
        let contact = sample_contact();
        let payload = json!({"phone": "+5511999990000"});
        let merged = apply_profile_update(contact, payload.as_object().unwrap());
        assert_eq!(merged.phone, Some("+5511999990000".to_string()));
    }

    fn sample_row(tags: Option<&str>, provider: Option<&str>) -> ContactRow {
        let created = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
        ContactRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Maria Souza".to_string(),
            email: "maria@acme.com".to_string(),
            phone: None,
            contact_type: Some("Acme Corp".to_string()),
            status: "Lead".to_string(),
            tags: tags.map(str::to_string),
            comments: None,
            score: None,
            provider: provider.map(str::to_string),
            created_at: created,
            updated_at: None,
        }
    }

    #[test]
    fn test_row_to_stored_decodes_tags_and_provider() {
        let row = sample_row(
            Some(r#"["vip","q2"]"#),
            Some(r#"{"site":"https://acme.com","vip":true}"#),
        );
        let stored = row_to_stored(row, Vec::new()).unwrap();
        assert_eq!(stored.tags, vec!["vip".to_string(), "q2".to_string()]);
        assert!(stored.provider.unwrap().vip);
    }

    #[test]
    fn test_row_to_stored_absent_tags_is_empty() {
        let stored = row_to_stored(sample_row(None, None), Vec::new()).unwrap();
        assert!(stored.tags.is_empty());
        assert!(stored.provider.is_none());
    }

    #[test]
    fn test_row_to_stored_rejects_malformed_tags() {
        let result = row_to_stored(sample_row(Some("not json"), None), Vec::new());
        assert!(matches!(result, Err(ContactsError::CorruptRecord(_))));
    }

    #[test]
    fn test_row_to_stored_rejects_malformed_provider() {
        let result = row_to_stored(sample_row(None, Some("{broken")), Vec::new());
        assert!(matches!(result, Err(ContactsError::CorruptRecord(_))));
    }

    #[test]
    fn test_page_window_defaults_and_clamps() {
        assert_eq!(page_window(None, None), (1, 25, 0));
        assert_eq!(page_window(Some(3), Some(10)), (3, 10, 20));
        assert_eq!(page_window(Some(0), Some(0)), (1, 1, 0));
        assert_eq!(page_window(Some(-5), Some(500)), (1, 100, 0));
    }

    #[test]
    fn test_page_window_survives_hostile_page_numbers() {
        let (page, per_page, offset) = page_window(Some(i32::MAX), Some(100));
        assert_eq!(page, MAX_PAGE);
        assert_eq!(offset, (MAX_PAGE - 1) * per_page);
        assert!(offset > 0);

        let (page, _, offset) = page_window(Some(i32::MIN), Some(25));
        assert_eq!(page, 1);
        assert_eq!(offset, 0);
    }
}
