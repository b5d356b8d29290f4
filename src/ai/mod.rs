//! Content-generation client.
//!
//! Wraps a hosted chat-completion endpoint: builds a prompt from a blog
//! request, asks for a JSON-object response, and refuses drafts that are
//! missing required fields. One blocking outbound call per invocation, no
//! retry policy; callers wanting resilience add it themselves.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::AiConfig;

/// Category applied when neither the request nor the service names one.
pub const DEFAULT_CATEGORY: &str = "Career Advice";

/// Image applied when the service does not suggest one.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1454165804606-c3d57bc86b40?w=1200&q=80";

const DEFAULT_TONE: &str = "professional";

const GENERATE_SYSTEM_PROMPT: &str = "You are a senior career counselor writing for a \
professional career-advice blog. Respond with a single JSON object containing the keys \
\"title\", \"excerpt\", \"content\", and optionally \"category\" and \"imageUrl\". \
\"content\" must be plain text with paragraphs separated by blank lines.";

const IMPROVE_SYSTEM_PROMPT: &str = "You are an editor for a professional career-advice \
blog. Revise the article the user provides according to their instructions and reply \
with the revised article text only, no commentary.";

#[derive(Debug, Error)]
pub enum AiError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("completion service returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("completion service returned an empty response")]
    Empty,
    #[error("completion response was not a JSON object: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("completion response missing required field(s): {0}")]
    MissingFields(String),
}

/// Requested article length, mapped to an approximate word target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentLength {
    Short,
    Medium,
    Long,
}

impl ContentLength {
    fn word_target(self) -> u32 {
        match self {
            ContentLength::Short => 600,
            ContentLength::Medium => 1000,
            ContentLength::Long => 1600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBlogPostRequest {
    pub topic: String,
    pub keywords: Option<Vec<String>>,
    pub tone: Option<String>,
    pub length: Option<ContentLength>,
    pub category: Option<String>,
}

/// A draft in BlogPost shape, minus the server-generated fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedBlogPost {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub image_url: String,
}

pub struct CompletionClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl CompletionClient {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    /// Draft a blog post for the requested topic. The draft is returned to
    /// the caller unpersisted; output is untrusted free text.
    pub async fn generate_blog_post(
        &self,
        request: &GenerateBlogPostRequest,
    ) -> Result<GeneratedBlogPost, AiError> {
        let prompt = build_generate_prompt(request);
        let raw = self
            .complete(GENERATE_SYSTEM_PROMPT, &prompt, true)
            .await?;
        if raw.is_empty() {
            return Err(AiError::Empty);
        }

        let draft: Value = serde_json::from_str(&raw)?;

        let mut missing = Vec::new();
        for field in ["title", "excerpt", "content"] {
            if field_str(&draft, field).is_none() {
                missing.push(field);
            }
        }
        if !missing.is_empty() {
            return Err(AiError::MissingFields(missing.join(", ")));
        }

        let category = field_str(&draft, "category")
            .map(str::to_string)
            .or_else(|| request.category.clone())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        let image_url = field_str(&draft, "imageUrl")
            .unwrap_or(PLACEHOLDER_IMAGE_URL)
            .to_string();

        Ok(GeneratedBlogPost {
            title: field_str(&draft, "title").unwrap_or_default().to_string(),
            excerpt: field_str(&draft, "excerpt").unwrap_or_default().to_string(),
            content: field_str(&draft, "content").unwrap_or_default().to_string(),
            category,
            image_url,
        })
    }

    /// Revise existing content per a free-text instruction. An empty reply
    /// from the service returns the original content unchanged.
    pub async fn improve_blog_content(
        &self,
        content: &str,
        instructions: &str,
    ) -> Result<String, AiError> {
        let prompt = build_improve_prompt(content, instructions);
        let revised = self
            .complete(IMPROVE_SYSTEM_PROMPT, &prompt, false)
            .await?;
        if revised.is_empty() {
            Ok(content.to_string())
        } else {
            Ok(revised)
        }
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        json_mode: bool,
    ) -> Result<String, AiError> {
        let mut body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt}
            ],
            "temperature": 0.7
        });
        if json_mode {
            body["response_format"] = json!({"type": "json_object"});
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AiError::Status(status));
        }

        let result: Value = response.json().await?;
        let content = result["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .trim()
            .to_string();

        Ok(content)
    }
}

fn field_str<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value[field].as_str().map(str::trim).filter(|s| !s.is_empty())
}

fn build_generate_prompt(request: &GenerateBlogPostRequest) -> String {
    let tone = request.tone.as_deref().unwrap_or(DEFAULT_TONE);
    let words = request.length.unwrap_or(ContentLength::Medium).word_target();
    let category = request.category.as_deref().unwrap_or(DEFAULT_CATEGORY);

    let mut prompt = format!(
        "Write a blog post about \"{}\" for the \"{}\" category. \
         Use a {} tone and aim for roughly {} words.",
        request.topic, category, tone, words
    );

    if let Some(keywords) = request
        .keywords
        .as_ref()
        .filter(|keywords| !keywords.is_empty())
    {
        prompt.push_str(&format!(
            " Work in these keywords naturally: {}.",
            keywords.join(", ")
        ));
    }

    prompt
}

fn build_improve_prompt(content: &str, instructions: &str) -> String {
    format!(
        "Instructions: {instructions}\n\nArticle to revise:\n\n{content}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> CompletionClient {
        CompletionClient::new(&AiConfig {
            api_key: "test-key".to_string(),
            base_url: base_url.to_string(),
            model: "gpt-4o-mini".to_string(),
        })
    }

    fn topic_request(topic: &str) -> GenerateBlogPostRequest {
        GenerateBlogPostRequest {
            topic: topic.to_string(),
            keywords: None,
            tone: None,
            length: None,
            category: None,
        }
    }

    fn completion_body(content: &str) -> String {
        serde_json::to_string(&json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        }))
        .unwrap()
    }

    #[test]
    fn test_generate_prompt_embeds_request_fields() {
        let request = GenerateBlogPostRequest {
            topic: "Remote work trends".to_string(),
            keywords: Some(vec!["hybrid".to_string(), "async".to_string()]),
            tone: Some("conversational".to_string()),
            length: Some(ContentLength::Long),
            category: Some("Future of Work".to_string()),
        };
        let prompt = build_generate_prompt(&request);
        assert!(prompt.contains("Remote work trends"));
        assert!(prompt.contains("Future of Work"));
        assert!(prompt.contains("conversational"));
        assert!(prompt.contains("1600"));
        assert!(prompt.contains("hybrid, async"));
    }

    #[test]
    fn test_generate_prompt_defaults() {
        let prompt = build_generate_prompt(&topic_request("Negotiating offers"));
        assert!(prompt.contains(DEFAULT_CATEGORY));
        assert!(prompt.contains(DEFAULT_TONE));
        assert!(prompt.contains("1000"));
        assert!(!prompt.contains("keywords"));
    }

    #[test]
    fn test_improve_prompt_carries_both_parts() {
        let prompt = build_improve_prompt("Old article.", "Make it shorter");
        assert!(prompt.contains("Old article."));
        assert!(prompt.contains("Make it shorter"));
    }

    #[tokio::test]
    async fn test_generate_fills_default_category_and_placeholder_image() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(r#"{"title":"T","excerpt":"E","content":"C"}"#))
            .create_async()
            .await;

        let client = test_client(&server.url());
        let draft = client
            .generate_blog_post(&topic_request("Remote work trends"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(draft.title, "T");
        assert_eq!(draft.excerpt, "E");
        assert_eq!(draft.content, "C");
        assert_eq!(draft.category, DEFAULT_CATEGORY);
        assert_eq!(draft.image_url, PLACEHOLDER_IMAGE_URL);
    }

    #[tokio::test]
    async fn test_generate_prefers_response_then_request_category() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(
                r#"{"title":"T","excerpt":"E","content":"C","category":"Interviews","imageUrl":"https://img.example/x.jpg"}"#,
            ))
            .create_async()
            .await;

        let mut request = topic_request("Mock interviews");
        request.category = Some("Ignored".to_string());
        let draft = test_client(&server.url())
            .generate_blog_post(&request)
            .await
            .unwrap();

        assert_eq!(draft.category, "Interviews");
        assert_eq!(draft.image_url, "https://img.example/x.jpg");
    }

    #[tokio::test]
    async fn test_generate_missing_content_fails_naming_field() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(r#"{"title":"T","excerpt":"E"}"#))
            .create_async()
            .await;

        let result = test_client(&server.url())
            .generate_blog_post(&topic_request("Remote work trends"))
            .await;

        match result {
            Err(AiError::MissingFields(fields)) => assert_eq!(fields, "content"),
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_upstream_error_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let result = test_client(&server.url())
            .generate_blog_post(&topic_request("Remote work trends"))
            .await;

        assert!(matches!(result, Err(AiError::Status(_))));
    }

    #[tokio::test]
    async fn test_improve_empty_response_returns_original() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(""))
            .create_async()
            .await;

        let revised = test_client(&server.url())
            .improve_blog_content("existing", "tighten it")
            .await
            .unwrap();

        assert_eq!(revised, "existing");
    }

    #[tokio::test]
    async fn test_improve_returns_revised_content() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("NEW"))
            .create_async()
            .await;

        let revised = test_client(&server.url())
            .improve_blog_content("existing", "tighten it")
            .await
            .unwrap();

        assert_eq!(revised, "NEW");
    }
}
