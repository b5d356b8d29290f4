/**
 * Contact Routes
 * Write-once lead records from the contact form
 */
use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::db::{self, models::ContactSubmission, models::NewContactSubmission};
use crate::notify;
use crate::routes::{insert_failure, require_pool, validate_payload};

/// POST /api/contact - Create a contact submission
pub async fn create_contact_submission(
    Json(payload): Json<NewContactSubmission>,
) -> impl IntoResponse {
    if let Err(err) = validate_payload(&payload) {
        return err.into_response();
    }

    let pool = match require_pool() {
        Ok(p) => p,
        Err(err) => return err.into_response(),
    };

    match sqlx::query_as::<_, ContactSubmission>(
        r#"
        INSERT INTO contact_submissions (first_name, last_name, email, phone, service_interest, message)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, first_name, last_name, email, phone, service_interest, message, created_at
        "#,
    )
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.service_interest)
    .bind(&payload.message)
    .fetch_one(pool.as_ref())
    .await
    {
        Ok(submission) => {
            notify::record(pool.as_ref(), notify::contact_received(&submission)).await;
            (StatusCode::CREATED, Json(submission)).into_response()
        }
        Err(e) => {
            insert_failure("create contact submission", db::classify_insert_error(e))
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
        Router::new().route("/api/contact", post(create_contact_submission))
    }

    async fn post_json(
        app: Router,
        json: &serde_json::Value,
    ) -> (StatusCode, axum::body::Bytes) {
        let req = Request::post("/api/contact")
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
    async fn test_contact_missing_fields_names_them() {
        let (status, bytes) = post_json(
            test_router(),
            &json!({
                "firstName": "Priya",
                "lastName": "",
                "email": "priya@example.com",
                "phone": "not a phone",
                "serviceInterest": "Career Switch",
                "message": "Hello"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("lastName"));
        assert!(body.contains("phone"));
    }

    #[tokio::test]
    async fn test_contact_valid_without_pool_returns_unavailable() {
        let (status, _) = post_json(
            test_router(),
            &json!({
                "firstName": "Priya",
                "lastName": "Sharma",
                "email": "priya@example.com",
                "phone": "+91 98765 43210",
                "serviceInterest": "Career Switch",
                "message": "Looking for guidance."
            }),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
