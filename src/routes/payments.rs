/**
 * Payment Routes
 * Payment records plus the provider callback that moves their status
 */
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;

use crate::db::{
    self,
    models::{is_valid_payment_status, NewPayment, Payment, PAYMENT_STATUS_PENDING},
};
use crate::notify;
use crate::routes::{error_response, insert_failure, require_pool, validate_payload};

/// Provider callback body. The provider eventually reports
/// completed/failed for a previously recorded intent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWebhookRequest {
    pub payment_intent_id: String,
    pub status: String,
}

const PAYMENT_COLUMNS: &str =
    "id, package_id, customer_email, customer_name, amount, payment_intent_id, status, created_at";

/// POST /api/payments - Record a payment in `pending` state
pub async fn create_payment(Json(payload): Json<NewPayment>) -> impl IntoResponse {
    if let Err(err) = validate_payload(&payload) {
        return err.into_response();
    }

    let pool = match require_pool() {
        Ok(p) => p,
        Err(err) => return err.into_response(),
    };

    match sqlx::query_as::<_, Payment>(&format!(
        r#"
        INSERT INTO payments (package_id, customer_email, customer_name, amount, payment_intent_id, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {PAYMENT_COLUMNS}
        "#
    ))
    .bind(&payload.package_id)
    .bind(&payload.customer_email)
    .bind(&payload.customer_name)
    .bind(payload.amount)
    .bind(&payload.payment_intent_id)
    .bind(PAYMENT_STATUS_PENDING)
    .fetch_one(pool.as_ref())
    .await
    {
        Ok(payment) => {
            notify::record(pool.as_ref(), notify::payment_recorded(&payment)).await;
            (StatusCode::CREATED, Json(payment)).into_response()
        }
        Err(e) => insert_failure("create payment", db::classify_insert_error(e)).into_response(),
    }
}

/// POST /api/payments/webhook - Provider callback.
/// Updates the matching payment row; unknown intents are a 404 and write
/// nothing.
pub async fn payment_webhook(Json(payload): Json<PaymentWebhookRequest>) -> impl IntoResponse {
    if payload.payment_intent_id.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Validation failed",
            Some("Invalid field(s): paymentIntentId".to_string()),
        )
        .into_response();
    }
    if !is_valid_payment_status(&payload.status) || payload.status == PAYMENT_STATUS_PENDING {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Validation failed",
            Some("Invalid field(s): status".to_string()),
        )
        .into_response();
    }

    let pool = match require_pool() {
        Ok(p) => p,
        Err(err) => return err.into_response(),
    };

    match sqlx::query_as::<_, Payment>(&format!(
        r#"
        UPDATE payments
        SET status = $1
        WHERE payment_intent_id = $2
        RETURNING {PAYMENT_COLUMNS}
        "#
    ))
    .bind(&payload.status)
    .bind(&payload.payment_intent_id)
    .fetch_optional(pool.as_ref())
    .await
    {
        Ok(Some(payment)) => {
            tracing::info!(
                payment_id = %payment.id,
                status = %payment.status,
                "payment status updated by provider callback"
            );
            notify::record(pool.as_ref(), notify::payment_recorded(&payment)).await;
            (StatusCode::OK, Json(payment)).into_response()
        }
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Unknown paymentIntentId", None)
            .into_response(),
        Err(e) => {
            tracing::error!("Database error applying payment callback: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update payment",
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
    use axum::routing::post;
    use axum::Router;
    use serde_json::json;
    use tower::ServiceExt;

    fn test_router() -> Router {
        Router::new()
            .route("/api/payments", post(create_payment))
            .route("/api/payments/webhook", post(payment_webhook))
    }

    async fn post_json(
        app: Router,
        uri: &str,
        json: &serde_json::Value,
    ) -> (StatusCode, axum::body::Bytes) {
        let req = Request::post(uri)
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

    #[tokio::test]
    async fn test_create_payment_invalid_email_returns_bad_request() {
        let (status, bytes) = post_json(
            test_router(),
            "/api/payments",
            &json!({
                "packageId": "pkg-1",
                "customerEmail": "broken",
                "customerName": "Arjun Mehta",
                "amount": 9999
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("customerEmail"));
    }

    #[tokio::test]
    async fn test_webhook_rejects_pending_status() {
        let (status, bytes) = post_json(
            test_router(),
            "/api/payments/webhook",
            &json!({"paymentIntentId": "pi_123", "status": "pending"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("status"));
    }

    #[tokio::test]
    async fn test_webhook_rejects_blank_intent() {
        let (status, bytes) = post_json(
            test_router(),
            "/api/payments/webhook",
            &json!({"paymentIntentId": " ", "status": "completed"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("paymentIntentId"));
    }

    #[tokio::test]
    async fn test_webhook_valid_without_pool_returns_unavailable() {
        let (status, _) = post_json(
            test_router(),
            "/api/payments/webhook",
            &json!({"paymentIntentId": "pi_123", "status": "failed"}),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
