use super::error::ContactsError;
use super::service::ContactsService;
use super::types::*;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::shared::state::AppState;

pub fn contacts_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_contacts_handler))
        .route("/", post(create_contact_handler))
        .route("/:id", get(get_contact_handler))
        .route("/:id", put(update_contact_handler))
        .route("/:id/interactions", post(add_interaction_handler))
        .with_state(state)
}

pub async fn list_contacts_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ContactListQuery>,
) -> Result<Json<ContactListResponse>, ContactsError> {
    let service = ContactsService::new(Arc::new(state.conn.clone()));
    let response = service.list_contacts(query).await?;
    Ok(Json(response))
}

pub async fn create_contact_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateContactRequest>,
) -> Result<Json<Contact>, ContactsError> {
    // Owner identity belongs to the auth collaborator; until that layer is
    // wired in, creations land on the nil owner.
    let user_id = Uuid::nil();
    let service = ContactsService::new(Arc::new(state.conn.clone()));
    let contact = service.create_contact(user_id, request).await?;
    Ok(Json(contact))
}

pub async fn get_contact_handler(
    State(state): State<Arc<AppState>>,
    Path(contact_id): Path<Uuid>,
) -> Result<Json<Contact>, ContactsError> {
    let service = ContactsService::new(Arc::new(state.conn.clone()));
    let contact = service.get_contact(contact_id).await?;
    Ok(Json(contact))
}

pub async fn update_contact_handler(
    State(state): State<Arc<AppState>>,
    Path(contact_id): Path<Uuid>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<Contact>, ContactsError> {
    let service = ContactsService::new(Arc::new(state.conn.clone()));
    let contact = service.update_profile(contact_id, payload).await?;
    Ok(Json(contact))
}

pub async fn add_interaction_handler(
    State(state): State<Arc<AppState>>,
    Path(contact_id): Path<Uuid>,
    Json(interaction): Json<Interaction>,
) -> Result<Json<Contact>, ContactsError> {
    let service = ContactsService::new(Arc::new(state.conn.clone()));
    let contact = service.add_interaction(contact_id, interaction).await?;
    Ok(Json(contact))
}
