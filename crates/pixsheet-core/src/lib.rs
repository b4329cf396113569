//! Pixsheet Core Library
//!
//! Platform-agnostic model and services for the Pixsheet sprite editor.

pub mod config;
pub mod drawing_loop;
pub mod events;
pub mod frame;
pub mod framesheet;
pub mod history;
pub mod location;
pub mod notification;
pub mod palette;
pub mod selection;
pub mod service;
pub mod storage;
pub mod tools;
pub mod viewport;

pub use config::EditorConfig;
pub use drawing_loop::DrawingLoop;
pub use events::{AppEvent, EventBus, EventReceiver};
pub use frame::{Color, Frame};
pub use framesheet::{FrameSheet, FrameSheetError};
pub use history::HistoryManager;
pub use notification::NotificationService;
pub use palette::Palette;
pub use selection::{PixelRect, SelectionManager};
pub use service::{HttpSheetService, ServiceError, ServiceResult, SheetService};
pub use tools::{ToolKind, ToolSelector};
pub use viewport::{fit_drawing_dpi, ViewportMetrics};
