//! Client for the remote sheet service.
//!
//! ## Protocol
//!
//! ```text
//! GET  <base>/get?l=<id>      -> 200, body: serialized sheet
//! POST <base>/store           multipart: framesheet_content, fps_speed
//!                             -> 200, body: new sheet id
//! ```

use crate::storage::BoxFuture;
use thiserror::Error;

/// Service used when no other base URL is configured.
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:3030";

/// Multipart field holding the serialized sheet.
pub const CONTENT_FIELD: &str = "framesheet_content";

/// Multipart field holding the animation speed.
pub const FPS_FIELD: &str = "fps_speed";

/// Remote service errors.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unexpected HTTP status {0}")]
    Status(u16),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => ServiceError::Status(status.as_u16()),
            None => ServiceError::Network(e.to_string()),
        }
    }
}

/// Remote load/store of serialized sheets.
pub trait SheetService {
    /// Fetch the serialized sheet stored under `id`.
    fn load(&self, id: &str) -> BoxFuture<'_, ServiceResult<String>>;

    /// Store a serialized sheet, returning its new id.
    fn store(&self, content: &str, fps: &str) -> BoxFuture<'_, ServiceResult<String>>;
}

/// [`SheetService`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSheetService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSheetService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl Default for HttpSheetService {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_URL)
    }
}

impl SheetService for HttpSheetService {
    fn load(&self, id: &str) -> BoxFuture<'_, ServiceResult<String>> {
        let url = url::Url::parse_with_params(&self.endpoint("get"), &[("l", id)])
            .map_err(|e| ServiceError::InvalidUrl(e.to_string()));
        Box::pin(async move {
            let response = self.client.get(url?).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ServiceError::Status(status.as_u16()));
            }
            Ok(response.text().await?)
        })
    }

    fn store(&self, content: &str, fps: &str) -> BoxFuture<'_, ServiceResult<String>> {
        let form = reqwest::multipart::Form::new()
            .text(CONTENT_FIELD, content.to_string())
            .text(FPS_FIELD, fps.to_string());
        let request = self.client.post(self.endpoint("store")).multipart(form);
        Box::pin(async move {
            let response = request.send().await?;
            let status = response.status();
            if status != reqwest::StatusCode::OK {
                return Err(ServiceError::Status(status.as_u16()));
            }
            let id = response.text().await?.trim().to_string();
            if id.is_empty() {
                return Err(ServiceError::InvalidResponse("empty sheet id".to_string()));
            }
            Ok(id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let service = HttpSheetService::new("http://example.com/api/");
        assert_eq!(service.base_url(), "http://example.com/api");
        assert_eq!(service.endpoint("get"), "http://example.com/api/get");
        assert_eq!(service.endpoint("store"), "http://example.com/api/store");
    }

    #[test]
    fn test_default_service_url() {
        assert_eq!(HttpSheetService::default().base_url(), DEFAULT_SERVICE_URL);
    }
}
