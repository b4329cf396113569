//! Local backup of the sheet being edited.
//!
//! Every edit marks the sheet dirty; a snapshot is written at most once per
//! interval. On startup the editor can offer to restore that snapshot; backups
//! are held back until that prompt is answered.

use crate::events::{AppEvent, EventBus, EventReceiver};
use crate::framesheet::FrameSheet;
use crate::storage::{BoxFuture, Storage, StorageResult};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Default minimum delay between two backups, in milliseconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_MS: u64 = 1000;

/// Key of the backed up sheet.
pub const SNAPSHOT_KEY: &str = "pixsheet.snapshot";

/// Content of the restore prompt notification.
pub const RESTORE_NOTIFICATION: &str = "A previous session was found. Restore it?";

/// Backs up the sheet to a storage backend and restores it on demand.
pub struct LocalStorageService<S: Storage + 'static> {
    storage: Arc<S>,
    events: EventBus,
    receiver: EventReceiver,
    interval: Duration,
    last_save: Option<Instant>,
    dirty: bool,
    prompt_pending: Rc<Cell<bool>>,
}

impl<S: Storage + 'static> LocalStorageService<S> {
    /// Create a new service with the given storage backend.
    pub fn new(storage: Arc<S>, events: &EventBus) -> Self {
        Self {
            storage,
            events: events.clone(),
            receiver: events.subscribe(),
            interval: Duration::from_millis(DEFAULT_AUTOSAVE_INTERVAL_MS),
            last_save: None,
            dirty: false,
            prompt_pending: Rc::new(Cell::new(false)),
        }
    }

    /// Start from a clean state; earlier events are dropped.
    pub fn init(&mut self) {
        self.receiver.poll_events();
        self.dirty = false;
        self.last_save = None;
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// True while the restore prompt is offered and unanswered.
    pub fn is_prompt_pending(&self) -> bool {
        self.prompt_pending.get()
    }

    /// The restore prompt was answered; backups resume.
    pub fn resolve_prompt(&mut self) {
        self.prompt_pending.set(false);
    }

    /// Check if enough time has passed for a backup.
    pub fn should_save(&self) -> bool {
        if !self.dirty || self.prompt_pending.get() {
            return false;
        }
        match self.last_save {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Consume pending events and, when a backup is due, return the task
    /// writing it. The sheet is serialized immediately.
    pub fn poll(&mut self, sheet: &FrameSheet) -> Option<BoxFuture<'static, ()>> {
        let updated = self
            .receiver
            .poll_events()
            .iter()
            .any(|e| matches!(e, AppEvent::FrameSheetUpdated));
        if updated {
            self.mark_dirty();
        }
        if !self.should_save() {
            return None;
        }

        let content = sheet.serialize();
        self.dirty = false;
        self.last_save = Some(Instant::now());

        let storage = self.storage.clone();
        Some(Box::pin(async move {
            if let Err(e) = storage.save(SNAPSHOT_KEY, &content).await {
                log::warn!("Failed to back up sheet: {}", e);
            }
        }))
    }

    /// Force a backup now.
    pub async fn save(&mut self, sheet: &FrameSheet) -> StorageResult<()> {
        self.storage.save(SNAPSHOT_KEY, &sheet.serialize()).await?;
        self.last_save = Some(Instant::now());
        self.dirty = false;
        Ok(())
    }

    /// Task that publishes the restore prompt if a backup exists.
    ///
    /// Backups are suspended from this call until [`resolve_prompt`] or
    /// [`discard`], or until the task finds no backup.
    ///
    /// [`resolve_prompt`]: LocalStorageService::resolve_prompt
    /// [`discard`]: LocalStorageService::discard
    pub fn display_restore_notification(&mut self) -> BoxFuture<'static, bool> {
        let storage = self.storage.clone();
        let events = self.events.clone();
        let pending = self.prompt_pending.clone();
        pending.set(true);
        Box::pin(async move {
            let shown = match storage.exists(SNAPSHOT_KEY).await {
                Ok(true) => {
                    events.publish(AppEvent::ShowNotification {
                        content: RESTORE_NOTIFICATION.to_string(),
                    });
                    true
                }
                Ok(false) => false,
                Err(e) => {
                    log::warn!("Failed to look up backup: {}", e);
                    false
                }
            };
            if !shown {
                pending.set(false);
            }
            shown
        })
    }

    /// Task that reads the backed up content.
    pub fn load_backup(&self) -> BoxFuture<'static, StorageResult<String>> {
        let storage = self.storage.clone();
        Box::pin(async move { storage.load(SNAPSHOT_KEY).await })
    }

    /// Load the backup into the sheet.
    pub async fn restore(&self, sheet: &mut FrameSheet) -> StorageResult<()> {
        let content = self.load_backup().await?;
        sheet
            .deserialize(&content)
            .map_err(|e| crate::storage::StorageError::Serialization(e.to_string()))
    }

    /// Task that deletes the backup. Answers the restore prompt.
    pub fn discard(&mut self) -> BoxFuture<'static, StorageResult<()>> {
        self.resolve_prompt();
        let storage = self.storage.clone();
        Box::pin(async move { storage.delete(SNAPSHOT_KEY).await })
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// Create a platform-appropriate storage backend.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::FileStorage>> {
    Ok(Arc::new(crate::storage::FileStorage::default_location()?))
}

#[cfg(target_arch = "wasm32")]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::LocalStorage>> {
    Ok(Arc::new(crate::storage::LocalStorage::new()))
}

/// Convenience type alias for platform-specific storage.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStorage = crate::storage::FileStorage;

#[cfg(target_arch = "wasm32")]
pub type PlatformStorage = crate::storage::LocalStorage;
