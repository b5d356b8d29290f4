/**
 * Resource Routes
 * Downloadable-asset metadata plus the lead-gated download write
 */
use axum::{extract::Path, http::StatusCode, response::IntoResponse, Json};

use crate::db::{self, models::Resource, models::ResourceDownload};
use crate::notify;
use crate::routes::{error_response, require_pool, validate_payload};

/// GET /api/resources - List resources, alphabetical (stable order)
pub async fn list_resources() -> impl IntoResponse {
    let pool = match require_pool() {
        Ok(p) => p,
        Err(err) => return err.into_response(),
    };

    match sqlx::query_as::<_, Resource>(
        r#"
        SELECT id, title, description, resource_type, download_url, icon_name
        FROM resources
        ORDER BY title ASC, id ASC
        "#,
    )
    .fetch_all(pool.as_ref())
    .await
    {
        Ok(resources) => (StatusCode::OK, Json(resources)).into_response(),
        Err(e) => {
            tracing::error!("Database error listing resources: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list resources",
                None,
            )
            .into_response()
        }
    }
}

/// GET /api/resources/{id}/downloads - List the leads captured for one
/// resource, newest first
pub async fn list_resource_downloads(Path(resource_id): Path<String>) -> impl IntoResponse {
    let pool = match require_pool() {
        Ok(p) => p,
        Err(err) => return err.into_response(),
    };

    match sqlx::query_as::<_, ResourceDownload>(
        r#"
        SELECT id, full_name, email, mobile, current_stage, resource_id, resource_title, downloaded_at
        FROM resource_downloads
        WHERE resource_id = $1
        ORDER BY downloaded_at DESC, id ASC
        "#,
    )
    .bind(&resource_id)
    .fetch_all(pool.as_ref())
    .await
    {
        Ok(downloads) => (StatusCode::OK, Json(downloads)).into_response(),
        Err(e) => {
            tracing::error!("Database error listing resource downloads: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list downloads",
                None,
            )
            .into_response()
        }
    }
}

/// POST /api/resources/{id}/download - Record the lead gating a download.
///
/// The resource title is copied onto the download row so later renames do
/// not rewrite history; the lookup doubles as the reference check.
pub async fn create_resource_download(
    Path(resource_id): Path<String>,
    Json(payload): Json<db::models::NewResourceDownload>,
) -> impl IntoResponse {
    if let Err(err) = validate_payload(&payload) {
        return err.into_response();
    }

    let pool = match require_pool() {
        Ok(p) => p,
        Err(err) => return err.into_response(),
    };

    let resource = match sqlx::query_as::<_, Resource>(
        r#"
        SELECT id, title, description, resource_type, download_url, icon_name
        FROM resources
        WHERE id = $1
        "#,
    )
    .bind(&resource_id)
    .fetch_optional(pool.as_ref())
    .await
    {
        Ok(Some(resource)) => resource,
        Ok(None) => {
            return error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Unknown resourceId reference",
                None,
            )
            .into_response();
        }
        Err(e) => {
            tracing::error!("Database error fetching resource: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to record download",
                None,
            )
            .into_response();
        }
    };

    match sqlx::query_as::<_, ResourceDownload>(
        r#"
        INSERT INTO resource_downloads (full_name, email, mobile, current_stage, resource_id, resource_title)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, full_name, email, mobile, current_stage, resource_id, resource_title, downloaded_at
        "#,
    )
    .bind(&payload.full_name)
    .bind(&payload.email)
    .bind(&payload.mobile)
    .bind(&payload.current_stage)
    .bind(&resource.id)
    .bind(&resource.title)
    .fetch_one(pool.as_ref())
    .await
    {
        Ok(download) => {
            notify::record(pool.as_ref(), notify::resource_downloaded(&download)).await;
            (StatusCode::CREATED, Json(download)).into_response()
        }
        Err(e) => crate::routes::insert_failure(
            "record download",
            db::classify_insert_error(e),
        )
        .into_response(),
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
            .route("/api/resources", get(list_resources))
            .route(
                "/api/resources/{id}/download",
                post(create_resource_download),
            )
            .route("/api/resources/{id}/downloads", get(list_resource_downloads))
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
    async fn test_list_resources_without_pool_returns_unavailable() {
        let req = Request::get("/api/resources").body(Body::empty()).unwrap();
        let res = test_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_list_downloads_without_pool_returns_unavailable() {
        let req = Request::get("/api/resources/res-1/downloads")
            .body(Body::empty())
            .unwrap();
        let res = test_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_download_with_invalid_lead_returns_bad_request() {
        let (status, bytes) = post_json(
            test_router(),
            "/api/resources/res-1/download",
            &json!({
                "fullName": "",
                "email": "not-an-email",
                "mobile": "12",
                "currentStage": "Student"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("fullName"));
        assert!(body.contains("email"));
        assert!(body.contains("mobile"));
    }

    #[tokio::test]
    async fn test_download_valid_lead_without_pool_returns_unavailable() {
        let (status, _) = post_json(
            test_router(),
            "/api/resources/res-1/download",
            &json!({
                "fullName": "Priya Sharma",
                "email": "priya@example.com",
                "mobile": "+91 98765 43210",
                "currentStage": "Mid-career"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
