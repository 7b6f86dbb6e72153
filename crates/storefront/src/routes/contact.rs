//! Contact form relay.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::backend::EmailMessage;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::AppJson;
use crate::state::AppState;

/// Contact form submission. Every field is required.
#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Contact form response body.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub message: &'static str,
}

fn required(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|v| !v.is_empty())
}

/// Forward a contact form submission to the shop inbox.
#[instrument(skip(state, request))]
pub async fn send(
    State(state): State<AppState>,
    AppJson(request): AppJson<ContactRequest>,
) -> Result<Json<ContactResponse>> {
    let (Some(name), Some(email), Some(message)) = (
        required(request.name.as_deref()),
        required(request.email.as_deref()),
        required(request.message.as_deref()),
    ) else {
        return Err(AppError::BadRequest(
            "Name, email, and message are required".to_string(),
        ));
    };

    let mail = EmailMessage::contact_form(
        &state.config().contact_recipient,
        name,
        email,
        message,
    );
    state.backend().send_email(&mail).await?;

    add_breadcrumb("contact", "Sent contact form", None);
    Ok(Json(ContactResponse {
        message: "Email sent successfully",
    }))
}
