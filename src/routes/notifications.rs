/**
 * Notification Routes
 * Admin inbox: list and mark-read
 */
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::db::models::Notification;
use crate::routes::{error_response, require_pool};

/// Query parameters for GET /api/notifications
#[derive(Debug, Deserialize)]
pub struct NotificationListQuery {
    /// When true, only unread notifications are returned.
    #[serde(default)]
    pub unread: bool,
}

const NOTIFICATION_COLUMNS: &str = "id, notification_type, recipient, subject, text_content, \
     html_content, metadata, is_read, created_at";

/// GET /api/notifications - List notifications, newest first
pub async fn list_notifications(
    Query(query): Query<NotificationListQuery>,
) -> impl IntoResponse {
    let pool = match require_pool() {
        Ok(p) => p,
        Err(err) => return err.into_response(),
    };

    let sql = if query.unread {
        format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE is_read = false \
             ORDER BY created_at DESC, id ASC"
        )
    } else {
        format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             ORDER BY created_at DESC, id ASC"
        )
    };

    match sqlx::query_as::<_, Notification>(&sql)
        .fetch_all(pool.as_ref())
        .await
    {
        Ok(notifications) => (StatusCode::OK, Json(notifications)).into_response(),
        Err(e) => {
            tracing::error!("Database error listing notifications: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list notifications",
                None,
            )
            .into_response()
        }
    }
}

/// PATCH /api/notifications/{id}/read - Mark one notification read
pub async fn mark_notification_read(Path(id): Path<String>) -> impl IntoResponse {
    let pool = match require_pool() {
        Ok(p) => p,
        Err(err) => return err.into_response(),
    };

    match sqlx::query_as::<_, Notification>(&format!(
        r#"
        UPDATE notifications
        SET is_read = true
        WHERE id = $1
        RETURNING {NOTIFICATION_COLUMNS}
        "#
    ))
    .bind(&id)
    .fetch_optional(pool.as_ref())
    .await
    {
        Ok(Some(notification)) => (StatusCode::OK, Json(notification)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Not found", None).into_response(),
        Err(e) => {
            tracing::error!("Database error marking notification read: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update notification",
                None,
            )
            .into_response()
        }
    }
}
