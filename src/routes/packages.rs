/**
 * Package Routes
 * Read-only endpoints for the counseling packages shown on the pricing page
 */
use axum::{extract::Path, http::StatusCode, response::IntoResponse, Json};

use crate::db::models::Package;
use crate::routes::{error_response, require_pool};

/// GET /api/packages - List packages, cheapest first (stable order)
pub async fn list_packages() -> impl IntoResponse {
    let pool = match require_pool() {
        Ok(p) => p,
        Err(err) => return err.into_response(),
    };

    match sqlx::query_as::<_, Package>(
        r#"
        SELECT id, name, price, target_audience, description, features, is_popular
        FROM packages
        ORDER BY price ASC, id ASC
        "#,
    )
    .fetch_all(pool.as_ref())
    .await
    {
        Ok(packages) => (StatusCode::OK, Json(packages)).into_response(),
        Err(e) => {
            tracing::error!("Database error listing packages: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list packages",
                None,
            )
            .into_response()
        }
    }
}

/// GET /api/packages/{id} - Get a single package
pub async fn get_package(Path(id): Path<String>) -> impl IntoResponse {
    let pool = match require_pool() {
        Ok(p) => p,
        Err(err) => return err.into_response(),
    };

    match sqlx::query_as::<_, Package>(
        r#"
        SELECT id, name, price, target_audience, description, features, is_popular
        FROM packages
        WHERE id = $1
        "#,
    )
    .bind(&id)
    .fetch_optional(pool.as_ref())
    .await
    {
        Ok(Some(package)) => (StatusCode::OK, Json(package)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Not found", None).into_response(),
        Err(e) => {
            tracing::error!("Database error fetching package: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch package",
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
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn test_router() -> Router {
        Router::new()
            .route("/api/packages", get(list_packages))
            .route("/api/packages/{id}", get(get_package))
    }

    #[tokio::test]
    async fn test_list_packages_without_pool_returns_unavailable() {
        let req = Request::get("/api/packages").body(Body::empty()).unwrap();
        let res = test_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_get_package_without_pool_returns_unavailable() {
        let req = Request::get("/api/packages/pkg-1")
            .body(Body::empty())
            .unwrap();
        let res = test_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
