//! Database models - entity structs and their insert-shapes.
//!
//! Every insert-shape omits the server-controlled fields (id, timestamps) and
//! derives its validation rules, so a request either becomes a typed value or
//! fails naming the offending field(s).
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9(][0-9 ()\-]{5,18}$").unwrap());

// Resource types map to the fixed icon/download handling on the front end.
pub const RESOURCE_TYPES: &[&str] = &["pdf", "tool", "checklist", "report"];

pub const BOOKING_TYPE_DISCOVERY_CALL: &str = "discovery_call";
pub const BOOKING_TYPE_INVESTMENT: &str = "investment";
pub const BOOKING_TYPES: &[&str] = &[BOOKING_TYPE_DISCOVERY_CALL, BOOKING_TYPE_INVESTMENT];

pub const BOOKING_STATUS_PENDING: &str = "pending";
pub const BOOKING_STATUSES: &[&str] = &["pending", "contacted", "completed", "cancelled"];

pub const PAYMENT_STATUS_PENDING: &str = "pending";
pub const PAYMENT_STATUSES: &[&str] = &["pending", "completed", "failed"];

pub const NOTIFICATION_TYPE_CONTACT: &str = "contact";
pub const NOTIFICATION_TYPE_BOOKING: &str = "booking";
pub const NOTIFICATION_TYPE_PAYMENT: &str = "payment";
pub const NOTIFICATION_TYPE_RESOURCE_DOWNLOAD: &str = "resource_download";

/// Account record. Not exercised by any public route; kept for the
/// persistence contract (unique username/email).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

/// Counseling package surfaced on the pricing page.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: String,
    pub name: String,
    /// Whole currency units, no minor-unit scaling.
    pub price: i32,
    pub target_audience: String,
    pub description: String,
    /// Ordered list of selling points.
    pub features: Vec<String>,
    pub is_popular: bool,
}

/// Blog post, authored manually or via the content-generation client.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    /// Long-form body; paragraphs separated by a blank line.
    pub content: String,
    pub category: String,
    pub image_url: String,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBlogPost {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 500))]
    pub excerpt: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(url)]
    pub image_url: String,
}

/// Downloadable-asset metadata.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub download_url: Option<String>,
    pub icon_name: String,
}

/// Write-once lead record from the contact form.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub service_interest: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewContactSubmission {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(regex(path = *PHONE_REGEX))]
    pub phone: String,
    #[validate(length(min = 1, max = 100))]
    pub service_interest: String,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

/// Payment record; `status` is moved by the provider callback.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub package_id: String,
    pub customer_email: String,
    pub customer_name: String,
    pub amount: i32,
    pub payment_intent_id: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    #[validate(length(min = 1))]
    pub package_id: String,
    #[validate(email)]
    pub customer_email: String,
    #[validate(length(min = 1, max = 200))]
    pub customer_name: String,
    #[validate(range(min = 0))]
    pub amount: i32,
    pub payment_intent_id: Option<String>,
}

/// Lead-capture record gating a resource download. `resource_title` is a
/// deliberate denormalized copy so renaming the resource later does not
/// rewrite download history.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDownload {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub current_stage: String,
    pub resource_id: String,
    pub resource_title: String,
    pub downloaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewResourceDownload {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(regex(path = *PHONE_REGEX))]
    pub mobile: String,
    #[validate(length(min = 1, max = 100))]
    pub current_stage: String,
}

/// Booking, the only entity with a status lifecycle. `status` and
/// `payment_status` move independently; no transition table is enforced.
/// `package_name` is a deliberate denormalized copy (see ResourceDownload).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub full_name: String,
    pub mobile: String,
    pub current_stage: String,
    pub package_id: String,
    pub package_name: String,
    pub booking_type: String,
    pub status: String,
    pub amount: i32,
    pub payment_status: String,
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(regex(path = *PHONE_REGEX))]
    pub mobile: String,
    #[validate(length(min = 1, max = 100))]
    pub current_stage: String,
    #[validate(length(min = 1))]
    pub package_id: String,
    pub booking_type: String,
    #[validate(range(min = 0))]
    pub amount: i32,
    pub notes: Option<String>,
}

/// Outbound-message record feeding the admin inbox.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub recipient: String,
    pub subject: String,
    pub text_content: String,
    pub html_content: String,
    /// Free-form side-channel data keyed by notification type.
    pub metadata: serde_json::Value,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    #[serde(rename = "type")]
    pub notification_type: String,
    pub recipient: String,
    pub subject: String,
    pub text_content: String,
    pub html_content: String,
    pub metadata: serde_json::Value,
}

pub fn is_valid_resource_type(value: &str) -> bool {
    RESOURCE_TYPES.contains(&value)
}

pub fn is_valid_booking_type(value: &str) -> bool {
    BOOKING_TYPES.contains(&value)
}

pub fn is_valid_booking_status(value: &str) -> bool {
    BOOKING_STATUSES.contains(&value)
}

pub fn is_valid_payment_status(value: &str) -> bool {
    PAYMENT_STATUSES.contains(&value)
}
