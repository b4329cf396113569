//! Pixsheet Sheet Service
//!
//! Stores serialized sheets uploaded by the editor and serves them back by id.
//!
//! ## Endpoints
//!
//! - `GET /get?l=<id>`: the stored sheet as plain text
//! - `POST /store`: multipart form with `framesheet_content` and an optional
//!   `fps_speed`; answers with the new id as plain text
//! - `GET /health`

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use dashmap::DashMap;
use pixsheet_core::config::DEFAULT_FPS;
use pixsheet_core::service::{CONTENT_FIELD, FPS_FIELD};
use pixsheet_core::{EventBus, FrameSheet};
use serde::Deserialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Default listen address.
pub const DEFAULT_ADDR: &str = "0.0.0.0:3030";

/// Environment variable overriding the listen address.
pub const ADDR_ENV: &str = "PIXSHEET_ADDR";

/// Largest accepted upload, in bytes. Serialized frames are verbose, so this
/// is well above axum's default.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// A sheet kept by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSheet {
    pub content: String,
    pub fps: u32,
}

/// In-memory sheet store with sequential ids starting at 1.
#[derive(Debug)]
pub struct SheetStore {
    sheets: DashMap<u64, StoredSheet>,
    next_id: AtomicU64,
}

impl Default for SheetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetStore {
    pub fn new() -> Self {
        Self {
            sheets: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn insert(&self, sheet: StoredSheet) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.sheets.insert(id, sheet);
        id
    }

    pub fn get(&self, id: u64) -> Option<StoredSheet> {
        self.sheets.get(&id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// Request errors, answered as plain text.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        warn!("{}: {}", status, self);
        (status, self.to_string()).into_response()
    }
}

/// Build the service router.
pub fn router(store: Arc<SheetStore>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/get", get(get_sheet))
        .route("/store", post(store_sheet))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

/// Index page
async fn index() -> &'static str {
    "Pixsheet sheet service - GET /get?l=<id>, POST /store"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
struct GetParams {
    l: Option<String>,
}

async fn get_sheet(
    State(store): State<Arc<SheetStore>>,
    Query(params): Query<GetParams>,
) -> Result<String, ApiError> {
    let raw = params
        .l
        .filter(|l| !l.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing sheet id".into()))?;
    let id: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::NotFound(format!("no sheet {}", raw)))?;
    let sheet = store
        .get(id)
        .ok_or_else(|| ApiError::NotFound(format!("no sheet {}", id)))?;
    info!("Serving sheet {}", id);
    Ok(sheet.content)
}

async fn store_sheet(
    State(store): State<Arc<SheetStore>>,
    mut multipart: Multipart,
) -> Result<String, ApiError> {
    let mut content = None;
    let mut fps = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::BadRequest(err.to_string()))?
    {
        let name = field.name().map(str::to_string);
        let text = field
            .text()
            .await
            .map_err(|err| ApiError::BadRequest(err.to_string()))?;
        match name.as_deref() {
            Some(CONTENT_FIELD) => content = Some(text),
            Some(FPS_FIELD) => fps = Some(text),
            _ => {}
        }
    }

    let content = content.ok_or_else(|| ApiError::BadRequest(format!("missing {}", CONTENT_FIELD)))?;
    validate_sheet(&content)?;
    let fps = parse_fps(fps.as_deref())?;

    let id = store.insert(StoredSheet { content, fps });
    info!("Stored sheet {} ({} fps)", id, fps);
    Ok(id.to_string())
}

fn validate_sheet(content: &str) -> Result<(), ApiError> {
    let mut sheet = FrameSheet::new(0, 0, EventBus::new());
    sheet
        .deserialize(content)
        .map_err(|e| ApiError::BadRequest(format!("invalid sheet: {}", e)))
}

fn parse_fps(raw: Option<&str>) -> Result<u32, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_FPS);
    };
    match raw.parse::<u32>() {
        Ok(fps) if fps > 0 => Ok(fps),
        _ => Err(ApiError::BadRequest(format!("invalid {}: {}", FPS_FIELD, raw))),
    }
}
