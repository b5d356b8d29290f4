/**
 * Booking Routes
 * Lead-capture bookings plus administrative status/payment updates
 */
use axum::{extract::Path, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;

use crate::db::{
    self,
    models::{
        is_valid_booking_status, is_valid_booking_type, is_valid_payment_status, Booking,
        NewBooking, Package,
    },
};
use crate::notify;
use crate::routes::{error_response, insert_failure, require_pool, validate_payload};

/// Request body for PATCH /api/bookings/{id}. Status values are checked
/// against the allowed sets; transitions between them are deliberately
/// unconstrained (current behavior, not a guarantee).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub notes: Option<String>,
}

const BOOKING_COLUMNS: &str = "id, full_name, mobile, current_stage, package_id, package_name, \
     booking_type, status, amount, payment_status, order_id, payment_id, notes, \
     created_at, updated_at";

/// POST /api/bookings - Create a booking.
///
/// The package name is copied onto the booking so later renames do not
/// rewrite history; the lookup doubles as the reference check.
pub async fn create_booking(Json(payload): Json<NewBooking>) -> impl IntoResponse {
    if let Err(err) = validate_payload(&payload) {
        return err.into_response();
    }
    if !is_valid_booking_type(&payload.booking_type) {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Validation failed",
            Some("Invalid field(s): bookingType".to_string()),
        )
        .into_response();
    }

    let pool = match require_pool() {
        Ok(p) => p,
        Err(err) => return err.into_response(),
    };

    let package = match sqlx::query_as::<_, Package>(
        r#"
        SELECT id, name, price, target_audience, description, features, is_popular
        FROM packages
        WHERE id = $1
        "#,
    )
    .bind(&payload.package_id)
    .fetch_optional(pool.as_ref())
    .await
    {
        Ok(Some(package)) => package,
        Ok(None) => {
            return error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Unknown packageId reference",
                None,
            )
            .into_response();
        }
        Err(e) => {
            tracing::error!("Database error fetching package: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create booking",
                None,
            )
            .into_response();
        }
    };

    match sqlx::query_as::<_, Booking>(&format!(
        r#"
        INSERT INTO bookings (full_name, mobile, current_stage, package_id, package_name, booking_type, amount, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {BOOKING_COLUMNS}
        "#
    ))
    .bind(&payload.full_name)
    .bind(&payload.mobile)
    .bind(&payload.current_stage)
    .bind(&package.id)
    .bind(&package.name)
    .bind(&payload.booking_type)
    .bind(payload.amount)
    .bind(&payload.notes)
    .fetch_one(pool.as_ref())
    .await
    {
        Ok(booking) => {
            notify::record(pool.as_ref(), notify::booking_received(&booking)).await;
            (StatusCode::CREATED, Json(booking)).into_response()
        }
        Err(e) => insert_failure("create booking", db::classify_insert_error(e)).into_response(),
    }
}

/// GET /api/bookings/{id} - Get a single booking
pub async fn get_booking(Path(id): Path<String>) -> impl IntoResponse {
    let pool = match require_pool() {
        Ok(p) => p,
        Err(err) => return err.into_response(),
    };

    match sqlx::query_as::<_, Booking>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
    ))
    .bind(&id)
    .fetch_optional(pool.as_ref())
    .await
    {
        Ok(Some(booking)) => (StatusCode::OK, Json(booking)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Not found", None).into_response(),
        Err(e) => {
            tracing::error!("Database error fetching booking: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch booking",
                None,
            )
            .into_response()
        }
    }
}

/// PATCH /api/bookings/{id} - Update status / payment fields.
/// Absent fields keep their stored values.
pub async fn update_booking(
    Path(id): Path<String>,
    Json(payload): Json<UpdateBookingRequest>,
) -> impl IntoResponse {
    if let Some(status) = payload.status.as_deref() {
        if !is_valid_booking_status(status) {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Validation failed",
                Some("Invalid field(s): status".to_string()),
            )
            .into_response();
        }
    }
    if let Some(payment_status) = payload.payment_status.as_deref() {
        if !is_valid_payment_status(payment_status) {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Validation failed",
                Some("Invalid field(s): paymentStatus".to_string()),
            )
            .into_response();
        }
    }

    let pool = match require_pool() {
        Ok(p) => p,
        Err(err) => return err.into_response(),
    };

    let existing = match sqlx::query_as::<_, Booking>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
    ))
    .bind(&id)
    .fetch_optional(pool.as_ref())
    .await
    {
        Ok(Some(booking)) => booking,
        Ok(None) => {
            return error_response(StatusCode::NOT_FOUND, "Not found", None).into_response();
        }
        Err(e) => {
            tracing::error!("Database error fetching booking: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update booking",
                None,
            )
            .into_response();
        }
    };

    let status = payload.status.unwrap_or(existing.status);
    let payment_status = payload.payment_status.unwrap_or(existing.payment_status);
    let order_id = payload.order_id.or(existing.order_id);
    let payment_id = payload.payment_id.or(existing.payment_id);
    let notes = payload.notes.or(existing.notes);

    match sqlx::query_as::<_, Booking>(&format!(
        r#"
        UPDATE bookings
        SET status = $1, payment_status = $2, order_id = $3, payment_id = $4, notes = $5,
            updated_at = now()
        WHERE id = $6
        RETURNING {BOOKING_COLUMNS}
        "#
    ))
    .bind(&status)
    .bind(&payment_status)
    .bind(&order_id)
    .bind(&payment_id)
    .bind(&notes)
    .bind(&id)
    .fetch_one(pool.as_ref())
    .await
    {
        Ok(booking) => (StatusCode::OK, Json(booking)).into_response(),
        Err(e) => {
            tracing::error!("Database error updating booking: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update booking",
                None,
            )
            .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::{get, post};
    use axum::Router;
    use serde_json::json;
    use tower::ServiceExt;

    fn test_router() -> Router {
        Router::new()
            .route("/api/bookings", post(create_booking))
            .route(
                "/api/bookings/{id}",
                get(get_booking).patch(update_booking),
            )
    }

    async fn send_json(
        app: Router,
        method: &str,
        uri: &str,
        json: &serde_json::Value,
    ) -> (StatusCode, axum::body::Bytes) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(json).unwrap()))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    fn booking_payload() -> serde_json::Value {
        json!({
            "fullName": "Arjun Mehta",
            "mobile": "+91 90000 00001",
            "currentStage": "Mid-career",
            "packageId": "pkg-1",
            "bookingType": "discovery_call",
            "amount": 0
        })
    }

    #[tokio::test]
    async fn test_create_booking_unknown_type_returns_bad_request() {
        let mut payload = booking_payload();
        payload["bookingType"] = json!("walk_in");
        let (status, bytes) = send_json(test_router(), "POST", "/api/bookings", &payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("bookingType"));
    }

    #[tokio::test]
    async fn test_create_booking_valid_without_pool_returns_unavailable() {
        let (status, _) =
            send_json(test_router(), "POST", "/api/bookings", &booking_payload()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_update_booking_rejects_unknown_status() {
        let (status, bytes) = send_json(
            test_router(),
            "PATCH",
            "/api/bookings/bk-1",
            &json!({"status": "archived"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("status"));
    }

    #[tokio::test]
    async fn test_update_booking_rejects_unknown_payment_status() {
        let (status, bytes) = send_json(
            test_router(),
            "PATCH",
            "/api/bookings/bk-1",
            &json!({"paymentStatus": "refunded"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("paymentStatus"));
    }

    #[tokio::test]
    async fn test_update_booking_any_allowed_status_passes_validation() {
        // Transitions are unconstrained; each allowed value validates and then
        // hits the missing-pool 503, not a 400.
        for status_value in ["pending", "contacted", "completed", "cancelled"] {
            let (status, _) = send_json(
                test_router(),
                "PATCH",
                "/api/bookings/bk-1",
                &json!({"status": status_value}),
            )
            .await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{status_value}");
        }
    }
}
