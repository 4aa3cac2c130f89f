use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

// 1. ImageStorage Contract
/// ImageStorage
///
/// Defines the abstract contract for all interactions with the hosted image
/// service. This trait allows us to swap the concrete implementation (the real
/// HTTP client in production, the in-memory Mock during testing) without
/// affecting the calling handlers.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Uploads image bytes to the hosted service and returns the public URL
    /// under which the image is served. The URL is what gets persisted on the
    /// post row.
    ///
    /// # Arguments
    /// * `filename`: Client-provided name, used for the form part (sanitized first).
    /// * `content_type`: The MIME type (e.g., "image/png").
    /// * `bytes`: The raw image payload.
    async fn upload_image(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, String>;

    /// Best-effort removal of a previously uploaded image, keyed by its public
    /// URL. Failures are logged and swallowed: a dangling hosted image is
    /// preferable to failing the user's request over cleanup.
    async fn delete_image(&self, url: &str);
}

// 2. The Real Implementation (Hosted Image API)
/// HostedImageClient
///
/// The concrete implementation talking to the remote image host over HTTPS.
/// Uploads go out as a multipart form (`api_key` + `file` parts); the service
/// answers with JSON carrying the CDN URL in `secure_url`.
#[derive(Clone)]
pub struct HostedImageClient {
    http: reqwest::Client,
    upload_url: String,
    api_key: String,
}

/// Wire shape of the image host's upload response. Extra fields are ignored.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl HostedImageClient {
    /// new
    ///
    /// Constructs the client from the configured endpoint and API key.
    pub fn new(upload_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            upload_url: upload_url.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl ImageStorage for HostedImageClient {
    async fn upload_image(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, String> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(sanitize_filename(filename))
            .mime_str(content_type)
            .map_err(|e| format!("invalid content type: {}", e))?;

        let form = reqwest::multipart::Form::new()
            .text("api_key", self.api_key.clone())
            .part("file", part);

        let response = self
            .http
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("upload request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("image host returned {}", response.status()));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| format!("unreadable image host response: {}", e))?;

        Ok(body.secure_url)
    }

    async fn delete_image(&self, url: &str) {
        let result = self
            .http
            .delete(&self.upload_url)
            .query(&[("api_key", self.api_key.as_str()), ("url", url)])
            .send()
            .await;

        match result {
            Ok(response) if !response.status().is_success() => {
                warn!(url, status = %response.status(), "image delete rejected");
            }
            Err(e) => {
                warn!(url, error = %e, "image delete failed");
            }
            _ => {}
        }
    }
}

/// sanitize_filename
///
/// Utility function to prevent path traversal in the client-supplied filename
/// by keeping only the final path segment and dropping directory navigation
/// components (e.g., `..`, `.`).
fn sanitize_filename(name: &str) -> String {
    let candidate = name
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .next_back()
        .unwrap_or_default();

    if candidate.is_empty() {
        "upload".to_string()
    } else {
        candidate.to_string()
    }
}

// 3. The Mock Implementation (For Unit Tests)
/// MockImageStorage
///
/// A mock implementation of `ImageStorage` used exclusively for unit and
/// integration testing. This allows us to test the image-bearing post
/// handlers without a network connection to the image host, isolating the
/// test boundary.
#[derive(Clone)]
pub struct MockImageStorage {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
}

impl MockImageStorage {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

impl Default for MockImageStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageStorage for MockImageStorage {
    async fn upload_image(
        &self,
        filename: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<String, String> {
        if self.should_fail {
            return Err("Mock Image Error: Simulation requested".to_string());
        }

        // Returns a deterministic, local-style URL for mock assertions.
        Ok(format!(
            "http://localhost:9000/mock-images/{}?signature=fake",
            sanitize_filename(filename)
        ))
    }

    async fn delete_image(&self, _url: &str) {
        // No-op in mock environment.
    }
}

/// StorageState
///
/// The concrete type used to share the image service access across the application state.
pub type StorageState = Arc<dyn ImageStorage>;
