//! Notification synthesis for the lead-capture and payment write paths.
//!
//! Each builder turns a freshly persisted row into a `NewNotification` for
//! the admin inbox / mail dispatch. Writes are best-effort: a failed insert
//! is logged and never fails the request that triggered it.

use serde_json::json;
use sqlx::PgPool;

use crate::config;
use crate::db::models::{
    Booking, ContactSubmission, NewNotification, Notification, Payment, ResourceDownload,
    NOTIFICATION_TYPE_BOOKING, NOTIFICATION_TYPE_CONTACT, NOTIFICATION_TYPE_PAYMENT,
    NOTIFICATION_TYPE_RESOURCE_DOWNLOAD,
};

pub fn contact_received(submission: &ContactSubmission) -> NewNotification {
    let name = format!("{} {}", submission.first_name, submission.last_name);
    NewNotification {
        notification_type: NOTIFICATION_TYPE_CONTACT.to_string(),
        recipient: config::get().notify_recipient.clone(),
        subject: format!("New contact enquiry from {name}"),
        text_content: format!(
            "{name} ({}, {}) asked about {}:\n\n{}",
            submission.email, submission.phone, submission.service_interest, submission.message
        ),
        html_content: format!(
            "<p><strong>{name}</strong> ({}, {}) asked about <em>{}</em>:</p><p>{}</p>",
            submission.email, submission.phone, submission.service_interest, submission.message
        ),
        metadata: json!({
            "contactSubmissionId": submission.id,
            "email": submission.email,
            "serviceInterest": submission.service_interest,
        }),
    }
}

pub fn booking_received(booking: &Booking) -> NewNotification {
    NewNotification {
        notification_type: NOTIFICATION_TYPE_BOOKING.to_string(),
        recipient: config::get().notify_recipient.clone(),
        subject: format!(
            "New {} booking from {}",
            booking.booking_type.replace('_', " "),
            booking.full_name
        ),
        text_content: format!(
            "{} ({}) booked \"{}\" ({}). Stage: {}. Amount: {}.",
            booking.full_name,
            booking.mobile,
            booking.package_name,
            booking.booking_type,
            booking.current_stage,
            booking.amount
        ),
        html_content: format!(
            "<p><strong>{}</strong> ({}) booked <em>{}</em> ({}).</p><p>Stage: {}. Amount: {}.</p>",
            booking.full_name,
            booking.mobile,
            booking.package_name,
            booking.booking_type,
            booking.current_stage,
            booking.amount
        ),
        metadata: json!({
            "bookingId": booking.id,
            "packageId": booking.package_id,
            "bookingType": booking.booking_type,
            "amount": booking.amount,
        }),
    }
}

pub fn payment_recorded(payment: &Payment) -> NewNotification {
    NewNotification {
        notification_type: NOTIFICATION_TYPE_PAYMENT.to_string(),
        recipient: config::get().notify_recipient.clone(),
        subject: format!(
            "Payment {} for {} ({})",
            payment.status, payment.customer_name, payment.amount
        ),
        text_content: format!(
            "Payment of {} by {} ({}) is {}.",
            payment.amount, payment.customer_name, payment.customer_email, payment.status
        ),
        html_content: format!(
            "<p>Payment of <strong>{}</strong> by {} ({}) is <em>{}</em>.</p>",
            payment.amount, payment.customer_name, payment.customer_email, payment.status
        ),
        metadata: json!({
            "paymentId": payment.id,
            "packageId": payment.package_id,
            "paymentIntentId": payment.payment_intent_id,
            "status": payment.status,
        }),
    }
}

pub fn resource_downloaded(download: &ResourceDownload) -> NewNotification {
    NewNotification {
        notification_type: NOTIFICATION_TYPE_RESOURCE_DOWNLOAD.to_string(),
        recipient: config::get().notify_recipient.clone(),
        subject: format!(
            "\"{}\" downloaded by {}",
            download.resource_title, download.full_name
        ),
        text_content: format!(
            "{} ({}, {}) downloaded \"{}\". Stage: {}.",
            download.full_name,
            download.email,
            download.mobile,
            download.resource_title,
            download.current_stage
        ),
        html_content: format!(
            "<p><strong>{}</strong> ({}, {}) downloaded <em>{}</em>.</p><p>Stage: {}.</p>",
            download.full_name,
            download.email,
            download.mobile,
            download.resource_title,
            download.current_stage
        ),
        metadata: json!({
            "resourceDownloadId": download.id,
            "resourceId": download.resource_id,
            "email": download.email,
        }),
    }
}

/// Persist a notification row, logging (not propagating) failures so the
/// triggering write still succeeds.
pub async fn record(pool: &PgPool, notification: NewNotification) {
    let result = sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (notification_type, recipient, subject, text_content, html_content, metadata)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, notification_type, recipient, subject, text_content, html_content,
                  metadata, is_read, created_at
        "#,
    )
    .bind(&notification.notification_type)
    .bind(&notification.recipient)
    .bind(&notification.subject)
    .bind(&notification.text_content)
    .bind(&notification.html_content)
    .bind(&notification.metadata)
    .fetch_one(pool)
    .await;

    match result {
        Ok(row) => tracing::debug!(
            notification_id = %row.id,
            notification_type = %row.notification_type,
            "notification recorded"
        ),
        Err(e) => tracing::warn!(
            notification_type = %notification.notification_type,
            error = %e,
            "failed to record notification"
        ),
    }
}
