//! Catalog types returned by the commerce backend.

use serde::{Deserialize, Serialize};
use soar_core::{Price, ProductId};

/// Product image with display priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub image_url: String,
    /// Lower values display first.
    #[serde(default)]
    pub image_priority: Option<i32>,
    #[serde(default)]
    pub alt_text: Option<String>,
}

/// Product record from `GET /api/v1/products`.
///
/// The backend names the display field `name`; older records use `title`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
    /// Missing means active.
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Product {
    /// Whether the product is listed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active.unwrap_or(true)
    }
}

/// Top-level category with its subcategories, derived from the product list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// URL path segment (e.g., "art-antiques").
    pub slug: String,
    /// Distinct, sorted.
    pub subcategories: Vec<String>,
}

/// Email submitted to `POST /api/v1/send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    pub html_body: String,
}

impl EmailMessage {
    /// Contact-form notification addressed to the shop inbox.
    ///
    /// Visitor input is escaped in `html_body`, and the subject is kept to a
    /// single line.
    #[must_use]
    pub fn contact_form(recipient: &str, name: &str, email: &str, message: &str) -> Self {
        let subject_name = name.split_whitespace().collect::<Vec<_>>().join(" ");
        Self {
            to: vec![recipient.to_string()],
            subject: format!("New Contact Form Submission from {subject_name}"),
            body: format!("Name: {name}\nEmail: {email}\nMessage: {message}"),
            html_body: format!(
                "<h2>New Contact Form Submission</h2>\
                 <p><strong>Name:</strong> {}</p>\
                 <p><strong>Email:</strong> {}</p>\
                 <p><strong>Message:</strong></p><p>{}</p>",
                escape_html(name),
                escape_html(email),
                escape_html(message),
            ),
        }
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
