//! Contact form handler

use axum::{extract::{rejection::FormRejection, State}, Form, Json};
use validator::Validate;

use crate::{AppState, AppResult};
use crate::models::{Contact, CreateContact, ContactResponse};

/// Store a contact message
pub async fn submit(
    State(state): State<AppState>,
    body: Result<Form<CreateContact>, FormRejection>,
) -> AppResult<Json<ContactResponse>> {
    let Form(req) = body?;
    req.validate()?;

    let contact = Contact::create(&state.pool, req).await?;

    tracing::info!(contact_id = contact.id, "Contact message received: {}", contact.subject);

    Ok(Json(ContactResponse {
        id: contact.id,
        received: true,
    }))
}
