/**
 * Blog Routes
 * Read endpoints, manual authoring, and the content-generation endpoints
 */
use axum::{extract::Path, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::ai::{AiError, CompletionClient, GenerateBlogPostRequest};
use crate::config;
use crate::db::{self, models::BlogPost, models::NewBlogPost};
use crate::routes::{error_response, insert_failure, require_pool, validate_payload};

/// Request body for POST /api/blog/improve
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImproveContentRequest {
    pub content: String,
    pub instructions: String,
}

/// Response for POST /api/blog/improve
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImproveContentResponse {
    pub content: String,
}

const BLOG_COLUMNS: &str = "id, title, excerpt, content, category, image_url, published_at";

/// GET /api/blog - List posts, newest first (stable order)
pub async fn list_posts() -> impl IntoResponse {
    let pool = match require_pool() {
        Ok(p) => p,
        Err(err) => return err.into_response(),
    };

    match sqlx::query_as::<_, BlogPost>(&format!(
        "SELECT {BLOG_COLUMNS} FROM blog_posts ORDER BY published_at DESC, id ASC"
    ))
    .fetch_all(pool.as_ref())
    .await
    {
        Ok(posts) => (StatusCode::OK, Json(posts)).into_response(),
        Err(e) => {
            tracing::error!("Database error listing blog posts: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list posts",
                None,
            )
            .into_response()
        }
    }
}

/// GET /api/blog/{id} - Get a single post
pub async fn get_post(Path(id): Path<String>) -> impl IntoResponse {
    let pool = match require_pool() {
        Ok(p) => p,
        Err(err) => return err.into_response(),
    };

    match sqlx::query_as::<_, BlogPost>(&format!(
        "SELECT {BLOG_COLUMNS} FROM blog_posts WHERE id = $1"
    ))
    .bind(&id)
    .fetch_optional(pool.as_ref())
    .await
    {
        Ok(Some(post)) => (StatusCode::OK, Json(post)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Not found", None).into_response(),
        Err(e) => {
            tracing::error!("Database error fetching blog post: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch post",
                None,
            )
            .into_response()
        }
    }
}

/// POST /api/blog - Manual authoring. Content is embedded as raw markup on
/// the client, so it is sanitized before storage.
pub async fn create_post(Json(payload): Json<NewBlogPost>) -> impl IntoResponse {
    if let Err(err) = validate_payload(&payload) {
        return err.into_response();
    }

    let pool = match require_pool() {
        Ok(p) => p,
        Err(err) => return err.into_response(),
    };

    let content = ammonia::clean(&payload.content);
    let excerpt = ammonia::clean(&payload.excerpt);

    match sqlx::query_as::<_, BlogPost>(&format!(
        r#"
        INSERT INTO blog_posts (title, excerpt, content, category, image_url)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {BLOG_COLUMNS}
        "#
    ))
    .bind(&payload.title)
    .bind(&excerpt)
    .bind(&content)
    .bind(&payload.category)
    .bind(&payload.image_url)
    .fetch_one(pool.as_ref())
    .await
    {
        Ok(post) => (StatusCode::CREATED, Json(post)).into_response(),
        Err(e) => insert_failure("create post", db::classify_insert_error(e)).into_response(),
    }
}

/// POST /api/blog/generate - Draft a post via the completion service.
/// The draft is returned without being persisted; publishing goes through
/// POST /api/blog.
pub async fn generate_post(Json(payload): Json<GenerateBlogPostRequest>) -> impl IntoResponse {
    if payload.topic.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Validation failed",
            Some("Invalid field(s): topic".to_string()),
        )
        .into_response();
    }

    let ai = &config::get().ai;
    if !ai.is_configured() {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Content generation not configured",
            None,
        )
        .into_response();
    }

    match CompletionClient::new(ai).generate_blog_post(&payload).await {
        Ok(draft) => (StatusCode::OK, Json(draft)).into_response(),
        Err(e) => generation_failure(e).into_response(),
    }
}

/// POST /api/blog/improve - Revise existing content per an instruction
pub async fn improve_post(Json(payload): Json<ImproveContentRequest>) -> impl IntoResponse {
    if payload.content.trim().is_empty() || payload.instructions.trim().is_empty() {
        let mut fields = Vec::new();
        if payload.content.trim().is_empty() {
            fields.push("content");
        }
        if payload.instructions.trim().is_empty() {
            fields.push("instructions");
        }
        return error_response(
            StatusCode::BAD_REQUEST,
            "Validation failed",
            Some(format!("Invalid field(s): {}", fields.join(", "))),
        )
        .into_response();
    }

    let ai = &config::get().ai;
    if !ai.is_configured() {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Content generation not configured",
            None,
        )
        .into_response();
    }

    match CompletionClient::new(ai)
        .improve_blog_content(&payload.content, &payload.instructions)
        .await
    {
        Ok(content) => {
            (StatusCode::OK, Json(ImproveContentResponse { content })).into_response()
        }
        Err(e) => generation_failure(e).into_response(),
    }
}

/// Upstream failures surface as 502 wrapping the reason; nothing internal
/// beyond the generation error itself is leaked.
fn generation_failure(err: AiError) -> crate::routes::ApiError {
    tracing::error!("Content generation failed: {}", err);
    error_response(
        StatusCode::BAD_GATEWAY,
        "Content generation failed",
        Some(err.to_string()),
    )
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
            .route("/api/blog", get(list_posts).post(create_post))
            .route("/api/blog/generate", post(generate_post))
            .route("/api/blog/improve", post(improve_post))
            .route("/api/blog/{id}", get(get_post))
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
    async fn test_list_posts_without_pool_returns_unavailable() {
        let req = Request::get("/api/blog").body(Body::empty()).unwrap();
        let res = test_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_create_post_invalid_image_url_returns_bad_request() {
        let (status, bytes) = post_json(
            test_router(),
            "/api/blog",
            &json!({
                "title": "Five interview mistakes",
                "excerpt": "And how to avoid them.",
                "content": "Paragraph one.\n\nParagraph two.",
                "category": "Interviews",
                "imageUrl": "not a url"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("imageUrl"));
    }

    #[tokio::test]
    async fn test_generate_empty_topic_returns_bad_request() {
        let (status, bytes) =
            post_json(test_router(), "/api/blog/generate", &json!({"topic": "  "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("topic"));
    }

    #[tokio::test]
    async fn test_improve_empty_instructions_returns_bad_request() {
        let (status, bytes) = post_json(
            test_router(),
            "/api/blog/improve",
            &json!({"content": "existing", "instructions": ""}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("instructions"));
    }
}
