//! Editor session: builds the model and controllers in order and routes
//! input, ticks and service results between them.

use crate::shortcuts::{Action, KeyManager};
use pixsheet_core::location::{framesheet_id_from_url, url_for_stored_sheet};
use pixsheet_core::storage::{BoxFuture, LocalStorageService, Storage, StorageResult};
use pixsheet_core::{
    AppEvent, EditorConfig, EventBus, FrameSheet, FrameSheetError, HistoryManager,
    NotificationService, Palette, SelectionManager, ServiceResult, SheetService, ToolKind,
    ToolSelector, ViewportMetrics, fit_drawing_dpi,
};
use pixsheet_render::{
    AnimatedPreviewController, DrawingController, PreviewFilmController, RenderController,
    RenderResult, Surface, ToolContext, export_current_frame_png, export_sheet_png,
};
use std::sync::Arc;
use std::time::Duration;

/// Targets of the three canvases.
pub struct EditorSurfaces {
    pub drawing: Box<dyn Surface>,
    pub animation: Box<dyn Surface>,
    pub film: Box<dyn Surface>,
}

/// Notification shown while a sheet is fetched from the service.
pub fn loading_message(id: &str) -> String {
    format!("Loading animation with id : [{}]", id)
}

pub struct Editor<S: Storage + 'static> {
    config: EditorConfig,
    events: EventBus,
    metrics: ViewportMetrics,
    sheet: FrameSheet,
    drawing: DrawingController,
    animation: AnimatedPreviewController,
    film: PreviewFilmController,
    selection: SelectionManager,
    history: HistoryManager,
    keys: KeyManager,
    notifications: NotificationService,
    local_storage: LocalStorageService<S>,
    tools: ToolSelector,
    palette: Palette,
    initialized: bool,
}

impl<S: Storage + 'static> Editor<S> {
    pub fn new(
        config: EditorConfig,
        metrics: &ViewportMetrics,
        surfaces: EditorSurfaces,
        storage: Arc<S>,
    ) -> Self {
        let events = EventBus::new();
        let dpi = fit_drawing_dpi(metrics, config.frame_width, config.frame_height);
        log::info!(
            "Drawing scale {} for {}x{} frames",
            dpi,
            config.frame_width,
            config.frame_height
        );

        let mut sheet = FrameSheet::new(config.frame_width, config.frame_height, events.clone());
        sheet.add_empty_frame();

        let drawing = DrawingController::new(&sheet, surfaces.drawing, dpi, &events);
        let mut animation = AnimatedPreviewController::new(
            surfaces.animation,
            config.preview_animation_dpi,
            config.default_fps,
            &events,
        );
        let mut film = PreviewFilmController::new(surfaces.film, config.preview_tile_dpi, &events);

        // Learns the initial frame from the event below
        let selection = SelectionManager::new(&events);
        sheet.set_current_frame_index(0);

        animation.init(&sheet);
        film.init(&sheet);

        let mut history = HistoryManager::new(&events);
        history.init(&sheet);

        let keys = KeyManager::new();

        let notifications = NotificationService::new(&events);
        let mut local_storage = LocalStorageService::new(storage, &events);
        local_storage.set_interval(Duration::from_millis(config.autosave_interval_ms));
        local_storage.init();

        let tools = ToolSelector::new(events.clone());
        let palette = Palette::new(events.clone());

        Self {
            config,
            events,
            metrics: *metrics,
            sheet,
            drawing,
            animation,
            film,
            selection,
            history,
            keys,
            notifications,
            local_storage,
            tools,
            palette,
            initialized: false,
        }
    }

    /// Start initialization for the page at `href`.
    ///
    /// With a sheet id in the URL the loading notification is shown and the id
    /// returned; the caller fetches it and hands the result to
    /// [`Editor::complete_remote_load`]. Without one, initialization finishes
    /// immediately and `None` is returned; the caller may then offer the
    /// restore prompt.
    pub fn begin_init(&mut self, href: &str) -> Option<String> {
        match framesheet_id_from_url(href) {
            Some(id) => {
                log::info!("Loading sheet {} from the service", id);
                self.events.publish(AppEvent::ShowNotification {
                    content: loading_message(&id),
                });
                Some(id)
            }
            None => {
                self.finish_init();
                None
            }
        }
    }

    /// Apply a remote load result. Failures fall back to the empty sheet.
    pub fn complete_remote_load(&mut self, result: ServiceResult<String>) {
        match result {
            Ok(body) => match self.sheet.deserialize(&body) {
                Ok(()) => {
                    self.refit();
                }
                Err(e) => log::error!("Failed to read loaded sheet: {}", e),
            },
            Err(e) => log::warn!("Failed to load sheet: {}", e),
        }
        self.events.publish(AppEvent::HideNotification);
        self.finish_init();
    }

    /// Fetch sheet `id` and complete initialization with the result.
    pub async fn load_framesheet_from_service<T: SheetService + ?Sized>(&mut self, service: &T, id: &str) {
        let result = service.load(id).await;
        self.complete_remote_load(result);
    }

    /// Initialize the tool selector and palette. Runs once.
    pub fn finish_init(&mut self) {
        if self.initialized {
            return;
        }
        self.tools.init();
        self.palette.init(&self.sheet);
        self.initialized = true;
        log::info!("Editor ready");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Task publishing the restore prompt when a backup exists. Backups stay
    /// suspended until the prompt is answered.
    pub fn offer_restore(&mut self) -> BoxFuture<'static, bool> {
        self.local_storage.display_restore_notification()
    }

    /// Task reading the backup; pass its result to [`Editor::apply_backup`].
    pub fn load_backup(&self) -> BoxFuture<'static, StorageResult<String>> {
        self.local_storage.load_backup()
    }

    /// Load a backup into the sheet and dismiss the prompt.
    pub fn apply_backup(&mut self, result: StorageResult<String>) -> bool {
        self.events.publish(AppEvent::HideNotification);
        self.local_storage.resolve_prompt();
        let restored = match result {
            Ok(content) => match self.sheet.deserialize(&content) {
                Ok(()) => {
                    self.refit();
                    true
                }
                Err(e) => {
                    log::error!("Failed to read backup: {}", e);
                    false
                }
            },
            Err(e) => {
                log::warn!("Failed to load backup: {}", e);
                false
            }
        };
        self.sync();
        restored
    }

    /// Dismiss the prompt and return the task deleting the backup.
    pub fn discard_backup(&mut self) -> BoxFuture<'static, StorageResult<()>> {
        self.events.publish(AppEvent::HideNotification);
        self.local_storage.discard()
    }

    /// Process pending events. Returns the backup task when one is due.
    pub fn update(&mut self) -> Option<BoxFuture<'static, ()>> {
        self.sync();
        self.notifications.poll();
        self.drawing.update_overlay(&self.sheet, &self.selection);
        self.local_storage.poll(&self.sheet)
    }

    fn sync(&mut self) {
        self.selection.poll();
        self.history.poll(&self.sheet);
        self.palette.poll(&self.sheet);
    }

    /// Render the drawing canvas, animated preview and filmstrip, in that order.
    pub fn render(&mut self, delta_ms: f64) -> RenderResult<()> {
        self.drawing.render(delta_ms, &self.sheet)?;
        self.animation.render(delta_ms, &self.sheet)?;
        self.film.render(delta_ms, &self.sheet)
    }

    /// Recompute the drawing scale for new viewport measurements.
    pub fn on_resize(&mut self, metrics: &ViewportMetrics) -> u32 {
        self.metrics = *metrics;
        self.refit()
    }

    /// Fit the drawing scale to the last measured viewport and the current
    /// sheet size, which changes when a sheet is loaded or restored.
    fn refit(&mut self) -> u32 {
        let dpi = fit_drawing_dpi(&self.metrics, self.sheet.width(), self.sheet.height());
        self.drawing.update_dpi(dpi);
        self.drawing.dpi()
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.selection.poll();
        let ctx = ToolContext {
            tool: self.tools.current(),
            sheet: &mut self.sheet,
            palette: &mut self.palette,
            selection: &mut self.selection,
        };
        self.drawing.pointer_down(x, y, ctx);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        let ctx = ToolContext {
            tool: self.tools.current(),
            sheet: &mut self.sheet,
            palette: &mut self.palette,
            selection: &mut self.selection,
        };
        self.drawing.pointer_move(x, y, ctx);
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) {
        let ctx = ToolContext {
            tool: self.tools.current(),
            sheet: &mut self.sheet,
            palette: &mut self.palette,
            selection: &mut self.selection,
        };
        self.drawing.pointer_up(x, y, ctx);
        self.sync();
    }

    /// Select the thumbnail under filmstrip position `y`.
    pub fn select_frame_at(&mut self, y: f64) -> Option<usize> {
        let index = self.film.frame_at(y)?;
        self.select_frame(index);
        Some(index)
    }

    pub fn select_tool(&mut self, tool: ToolKind) {
        self.tools.select_tool(tool);
    }

    pub fn current_tool(&self) -> ToolKind {
        self.tools.current()
    }

    pub fn add_frame(&mut self) {
        self.sheet.add_empty_frame();
        self.sheet.set_current_frame_index(self.sheet.frame_count() - 1);
        self.sheet.mark_updated();
        self.sync();
    }

    pub fn duplicate_current_frame(&mut self) -> Result<(), FrameSheetError> {
        let index = self.sheet.current_frame_index();
        self.sheet.duplicate_frame(index)?;
        self.sheet.set_current_frame_index(index + 1);
        self.sheet.mark_updated();
        self.sync();
        Ok(())
    }

    pub fn remove_current_frame(&mut self) -> Result<(), FrameSheetError> {
        self.sheet.remove_frame(self.sheet.current_frame_index())?;
        self.sheet.mark_updated();
        self.sync();
        Ok(())
    }

    pub fn move_frame(&mut self, from: usize, to: usize) -> Result<(), FrameSheetError> {
        self.sheet.move_frame(from, to)?;
        self.sheet.set_current_frame_index(to);
        self.sheet.mark_updated();
        self.sync();
        Ok(())
    }

    pub fn select_frame(&mut self, index: usize) {
        self.sheet.set_current_frame_index(index);
        self.sync();
    }

    pub fn previous_frame(&mut self) {
        let index = self.sheet.current_frame_index();
        self.select_frame(index.saturating_sub(1));
    }

    pub fn next_frame(&mut self) {
        let index = self.sheet.current_frame_index();
        self.select_frame(index + 1);
    }

    pub fn undo(&mut self) -> bool {
        self.sync();
        let done = self.history.undo(&mut self.sheet);
        self.sync();
        done
    }

    pub fn redo(&mut self) -> bool {
        self.sync();
        let done = self.history.redo(&mut self.sheet);
        self.sync();
        done
    }

    pub fn copy(&mut self) -> bool {
        self.selection.poll();
        self.selection.copy(&self.sheet)
    }

    pub fn cut(&mut self) -> bool {
        self.selection.poll();
        let done = self.selection.cut(&mut self.sheet);
        self.sync();
        done
    }

    pub fn paste(&mut self) -> bool {
        self.selection.poll();
        let done = self.selection.paste(&mut self.sheet);
        self.sync();
        done
    }

    /// Resolve and apply a key press. Returns the action bound to the key;
    /// [`Action::Store`] is left to the caller.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool) -> Option<Action> {
        let action = self.keys.resolve(key, ctrl, shift)?;
        self.handle_action(action);
        Some(action)
    }

    /// Apply an action. Returns false if the editor cannot perform it alone.
    pub fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::Undo => {
                self.undo();
            }
            Action::Redo => {
                self.redo();
            }
            Action::Copy => {
                self.copy();
            }
            Action::Cut => {
                self.cut();
            }
            Action::Paste => {
                self.paste();
            }
            Action::SelectTool(tool) => self.select_tool(tool),
            Action::AddFrame => self.add_frame(),
            Action::DuplicateFrame => {
                if let Err(e) = self.duplicate_current_frame() {
                    log::warn!("Cannot duplicate frame: {}", e);
                }
            }
            Action::RemoveFrame => {
                if let Err(e) = self.remove_current_frame() {
                    log::warn!("Cannot remove frame: {}", e);
                }
            }
            Action::PreviousFrame => self.previous_frame(),
            Action::NextFrame => self.next_frame(),
            Action::Store => return false,
        }
        true
    }

    /// Serialized sheet and fps value to upload.
    pub fn store_request(&self) -> (String, String) {
        (self.sheet.serialize(), self.animation.fps().to_string())
    }

    /// Upload the sheet. Returns the page URL to navigate to on success.
    pub async fn store_sheet<T: SheetService + ?Sized>(&self, service: &T, href: &str) -> Option<String> {
        let (content, fps) = self.store_request();
        let result = service.store(&content, &fps).await;
        Self::complete_store(result, href)
    }

    /// Page URL embedding the stored sheet id, or `None` if the store failed.
    pub fn complete_store(result: ServiceResult<String>, href: &str) -> Option<String> {
        match result {
            Ok(id) => {
                log::info!("Sheet stored as {}", id);
                let url = url_for_stored_sheet(href, &id);
                if url.is_none() {
                    log::warn!("Cannot build a sheet URL from {}", href);
                }
                url
            }
            Err(e) => {
                log::warn!("Failed to store sheet: {}", e);
                None
            }
        }
    }

    pub fn export_frame_png(&self, scale: u32) -> RenderResult<Vec<u8>> {
        export_current_frame_png(&self.sheet, scale)
    }

    pub fn export_sheet_png(&self, scale: u32) -> RenderResult<Vec<u8>> {
        export_sheet_png(&self.sheet, scale)
    }

    pub fn fps(&self) -> u32 {
        self.animation.fps()
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.animation.set_fps(fps);
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn sheet(&self) -> &FrameSheet {
        &self.sheet
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut Palette {
        &mut self.palette
    }

    pub fn drawing_dpi(&self) -> u32 {
        self.drawing.dpi()
    }

    /// Content of the visible notification.
    pub fn notification(&self) -> Option<&str> {
        self.notifications.current()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixsheet_core::storage::{MemoryStorage, SNAPSHOT_KEY};
    use pixsheet_core::{Color, EventReceiver, ServiceError};
    use pixsheet_render::{MemorySurface, PixelBuffer};
    use std::cell::RefCell;
    use std::future::Future;
    use std::rc::Rc;

    fn block_on<F: Future>(f: F) -> F::Output {
        use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

        fn dummy_raw_waker() -> RawWaker {
            fn no_op(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                dummy_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
            RawWaker::new(std::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
        let mut cx = Context::from_waker(&waker);
        let mut f = std::pin::pin!(f);

        loop {
            if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
                return result;
            }
        }
    }

    /// Service answering with canned results and recording uploads.
    struct FakeService {
        load: Result<String, u16>,
        store: Result<String, u16>,
        loaded: RefCell<Vec<String>>,
        stored: RefCell<Vec<(String, String)>>,
    }

    impl FakeService {
        fn new(load: Result<String, u16>, store: Result<String, u16>) -> Self {
            Self {
                load,
                store,
                loaded: RefCell::new(Vec::new()),
                stored: RefCell::new(Vec::new()),
            }
        }
    }

    impl SheetService for FakeService {
        fn load(&self, id: &str) -> BoxFuture<'_, ServiceResult<String>> {
            self.loaded.borrow_mut().push(id.to_string());
            let result = self.load.clone().map_err(ServiceError::Status);
            Box::pin(async move { result })
        }

        fn store(&self, content: &str, fps: &str) -> BoxFuture<'_, ServiceResult<String>> {
            self.stored
                .borrow_mut()
                .push((content.to_string(), fps.to_string()));
            let result = self.store.clone().map_err(ServiceError::Status);
            Box::pin(async move { result })
        }
    }

    fn config() -> EditorConfig {
        EditorConfig {
            frame_width: 8,
            frame_height: 8,
            autosave_interval_ms: 0,
            ..EditorConfig::default()
        }
    }

    fn editor_with(storage: Arc<MemoryStorage>) -> (Editor<MemoryStorage>, MemorySurface) {
        let drawing = MemorySurface::new();
        let surfaces = EditorSurfaces {
            drawing: Box::new(drawing.clone()),
            animation: Box::new(MemorySurface::new()),
            film: Box::new(MemorySurface::new()),
        };
        let metrics = ViewportMetrics::new(400.0, 400.0, 0.0, 0.0);
        (Editor::new(config(), &metrics, surfaces, storage), drawing)
    }

    /// Surface appending its tag to a shared log on every present.
    struct RecordingSurface {
        tag: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Surface for RecordingSurface {
        fn present(&mut self, _image: &PixelBuffer) -> RenderResult<()> {
            self.log.borrow_mut().push(self.tag);
            Ok(())
        }
    }

    fn seed_backup(storage: &MemoryStorage, frames: usize) {
        let mut backup = FrameSheet::new(8, 8, EventBus::new());
        for _ in 0..frames {
            backup.add_empty_frame();
        }
        block_on(storage.save(SNAPSHOT_KEY, &backup.serialize())).unwrap();
    }

    fn editor() -> Editor<MemoryStorage> {
        editor_with(Arc::new(MemoryStorage::new())).0
    }

    fn position(events: &[AppEvent], pred: impl Fn(&AppEvent) -> bool) -> Option<usize> {
        events.iter().position(pred)
    }

    fn drain(receiver: &mut EventReceiver) -> Vec<AppEvent> {
        receiver.poll_events()
    }

    #[test]
    fn test_drawing_scale_from_viewport() {
        let editor = editor();
        assert_eq!(editor.drawing_dpi(), 50);
    }

    #[test]
    fn test_selection_sees_initial_frame() {
        let mut editor = editor();
        editor.update();
        assert_eq!(editor.selection().current_frame(), Some(0));
    }

    #[test]
    fn test_init_without_id_finishes_immediately() {
        let mut editor = editor();
        let mut receiver = editor.events().subscribe();
        assert_eq!(editor.begin_init("http://localhost/editor/"), None);
        assert!(editor.is_initialized());
        let events = drain(&mut receiver);
        assert!(events.contains(&AppEvent::ToolSelected(ToolKind::Pen)));
        assert!(!events.iter().any(|e| matches!(e, AppEvent::ShowNotification { .. })));
    }

    #[test]
    fn test_init_with_id_shows_loading_notification() {
        let mut editor = editor();
        assert_eq!(
            editor.begin_init("http://localhost/editor/?frameId=42"),
            Some("42".to_string())
        );
        assert!(!editor.is_initialized());
        editor.update();
        assert_eq!(editor.notification(), Some("Loading animation with id : [42]"));
    }

    #[test]
    fn test_remote_load_hides_notification_before_finishing() {
        let mut source = FrameSheet::new(8, 8, EventBus::new());
        source.add_empty_frame();
        source.add_empty_frame();
        source.frame_mut(1).unwrap().set_pixel(2, 3, Color::rgb(255, 0, 0));
        let body = source.serialize();
        let service = FakeService::new(Ok(body.clone()), Err(500));

        let mut editor = editor();
        let mut receiver = editor.events().subscribe();
        let id = editor.begin_init("http://localhost/?frameId=42").unwrap();
        block_on(editor.load_framesheet_from_service(&service, &id));

        assert_eq!(*service.loaded.borrow(), vec!["42".to_string()]);
        assert_eq!(editor.sheet().serialize(), body);
        assert_eq!(editor.sheet().frame_count(), 2);
        assert!(editor.is_initialized());

        let events = drain(&mut receiver);
        let hide = position(&events, |e| *e == AppEvent::HideNotification).unwrap();
        let ready = position(&events, |e| matches!(e, AppEvent::ToolSelected(_))).unwrap();
        assert!(hide < ready);

        editor.update();
        assert_eq!(editor.notification(), None);
    }

    #[test]
    fn test_remote_load_failure_falls_back() {
        let service = FakeService::new(Err(404), Err(500));
        let mut editor = editor();
        let id = editor.begin_init("http://localhost/?frameId=7").unwrap();
        block_on(editor.load_framesheet_from_service(&service, &id));

        assert!(editor.is_initialized());
        assert_eq!(editor.sheet().frame_count(), 1);
        assert!(editor.sheet().frames()[0].is_empty());
        editor.update();
        assert_eq!(editor.notification(), None);
    }

    #[test]
    fn test_unreadable_body_keeps_empty_sheet() {
        let service = FakeService::new(Ok("not a sheet".to_string()), Err(500));
        let mut editor = editor();
        block_on(editor.load_framesheet_from_service(&service, "3"));
        assert!(editor.is_initialized());
        assert_eq!(editor.sheet().frame_count(), 1);
    }

    #[test]
    fn test_finish_init_is_idempotent() {
        let mut editor = editor();
        let mut receiver = editor.events().subscribe();
        editor.finish_init();
        editor.finish_init();
        let selected = drain(&mut receiver)
            .iter()
            .filter(|e| matches!(e, AppEvent::ToolSelected(_)))
            .count();
        assert_eq!(selected, 1);
    }

    #[test]
    fn test_store_rewrites_location() {
        let service = FakeService::new(Err(404), Ok("99".to_string()));
        let editor = editor();
        let url = block_on(editor.store_sheet(&service, "http://localhost/editor/?frameId=42"));
        assert_eq!(url.as_deref(), Some("http://localhost/editor/?frameId=99"));

        let stored = service.stored.borrow();
        assert_eq!(stored[0].0, editor.sheet().serialize());
        assert_eq!(stored[0].1, "12");
    }

    #[test]
    fn test_failed_store_keeps_location() {
        let service = FakeService::new(Err(404), Err(500));
        let editor = editor();
        assert_eq!(block_on(editor.store_sheet(&service, "http://localhost/")), None);
    }

    #[test]
    fn test_resize_updates_scale() {
        let mut editor = editor();
        assert_eq!(editor.on_resize(&ViewportMetrics::new(80.0, 400.0, 0.0, 0.0)), 10);
        assert_eq!(editor.on_resize(&ViewportMetrics::new(4.0, 4.0, 0.0, 0.0)), 1);
    }

    #[test]
    fn test_draw_undo_redo() {
        let mut editor = editor();
        editor.begin_init("http://localhost/");
        editor.pointer_down(60.0, 10.0);
        editor.pointer_up(60.0, 10.0);
        let pixel = |e: &Editor<MemoryStorage>| e.sheet().current_frame().and_then(|f| f.get_pixel(1, 0));
        assert_eq!(pixel(&editor), Some(Color::BLACK));
        assert!(editor.can_undo());

        assert!(editor.undo());
        assert_eq!(pixel(&editor), Some(Color::TRANSPARENT));
        assert!(editor.redo());
        assert_eq!(pixel(&editor), Some(Color::BLACK));
    }

    #[test]
    fn test_render_presents_drawing() {
        let (mut editor, drawing) = editor_with(Arc::new(MemoryStorage::new()));
        editor.update();
        editor.render(16.0).unwrap();
        let image = drawing.last().unwrap();
        assert_eq!((image.width(), image.height()), (400, 400));
    }

    #[test]
    fn test_render_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let surface = |tag| -> Box<dyn Surface> {
            Box::new(RecordingSurface {
                tag,
                log: log.clone(),
            })
        };
        let surfaces = EditorSurfaces {
            drawing: surface("drawing"),
            animation: surface("animation"),
            film: surface("film"),
        };
        let metrics = ViewportMetrics::new(400.0, 400.0, 0.0, 0.0);
        let mut editor = Editor::new(config(), &metrics, surfaces, Arc::new(MemoryStorage::new()));
        editor.update();
        editor.render(0.0).unwrap();
        assert_eq!(*log.borrow(), vec!["drawing", "animation", "film"]);
    }

    #[test]
    fn test_loaded_sheet_size_refits_scale() {
        let mut source = FrameSheet::new(2, 2, EventBus::new());
        source.add_empty_frame();
        let service = FakeService::new(Ok(source.serialize()), Err(500));

        let mut editor = editor();
        assert_eq!(editor.drawing_dpi(), 50);
        let id = editor.begin_init("http://localhost/?frameId=5").unwrap();
        block_on(editor.load_framesheet_from_service(&service, &id));
        assert_eq!((editor.sheet().width(), editor.sheet().height()), (2, 2));
        assert_eq!(editor.drawing_dpi(), 200);

        let metrics = ViewportMetrics::new(400.0, 400.0, 0.0, 0.0);
        assert_eq!(editor.on_resize(&metrics), 200);
    }

    #[test]
    fn test_restored_sheet_size_refits_scale() {
        let storage = Arc::new(MemoryStorage::new());
        let mut backup = FrameSheet::new(4, 4, EventBus::new());
        backup.add_empty_frame();
        block_on(storage.save(SNAPSHOT_KEY, &backup.serialize())).unwrap();

        let (mut editor, _) = editor_with(storage);
        editor.begin_init("http://localhost/");
        assert!(block_on(editor.offer_restore()));
        let content = block_on(editor.load_backup());
        assert!(editor.apply_backup(content));
        assert_eq!(editor.drawing_dpi(), 100);
    }

    #[test]
    fn test_frame_shortcuts() {
        let mut editor = editor();
        assert_eq!(editor.handle_key("n", false, false), Some(Action::AddFrame));
        assert_eq!(editor.sheet().frame_count(), 2);
        assert_eq!(editor.sheet().current_frame_index(), 1);

        editor.handle_key("ArrowUp", false, false);
        assert_eq!(editor.sheet().current_frame_index(), 0);
        editor.handle_key("d", false, false);
        assert_eq!(editor.sheet().frame_count(), 3);
        editor.handle_key("Delete", false, false);
        assert_eq!(editor.sheet().frame_count(), 2);

        editor.handle_key("e", false, false);
        assert_eq!(editor.current_tool(), ToolKind::Eraser);

        assert_eq!(editor.handle_key("s", true, false), Some(Action::Store));
        assert!(!editor.handle_action(Action::Store));
    }

    #[test]
    fn test_copy_paste_selection() {
        let mut editor = editor();
        editor.begin_init("http://localhost/");
        editor.pointer_down(10.0, 10.0);
        editor.pointer_up(10.0, 10.0);

        editor.select_tool(ToolKind::Select);
        editor.pointer_down(10.0, 10.0);
        editor.pointer_up(10.0, 10.0);
        assert!(editor.copy());

        editor.add_frame();
        assert!(editor.paste());
        let frame = editor.sheet().current_frame().unwrap();
        assert_eq!(frame.get_pixel(0, 0), Some(Color::BLACK));
    }

    #[test]
    fn test_autosave_after_edit() {
        let storage = Arc::new(MemoryStorage::new());
        let (mut editor, _) = editor_with(storage.clone());
        editor.begin_init("http://localhost/");
        assert!(editor.update().is_none());

        editor.pointer_down(10.0, 10.0);
        editor.pointer_up(10.0, 10.0);
        let task = editor.update().expect("backup due");
        block_on(task);
        let saved = block_on(storage.load(SNAPSHOT_KEY)).unwrap();
        assert_eq!(saved, editor.sheet().serialize());
    }

    #[test]
    fn test_restore_backup() {
        let storage = Arc::new(MemoryStorage::new());
        seed_backup(&storage, 2);

        let (mut editor, _) = editor_with(storage);
        assert_eq!(editor.begin_init("http://localhost/"), None);
        assert!(block_on(editor.offer_restore()));
        editor.update();
        assert!(editor.notification().is_some());

        let content = block_on(editor.load_backup());
        assert!(editor.apply_backup(content));
        assert_eq!(editor.sheet().frame_count(), 2);
        editor.update();
        assert_eq!(editor.notification(), None);
    }

    #[test]
    fn test_edits_during_restore_prompt_keep_backup() {
        let storage = Arc::new(MemoryStorage::new());
        seed_backup(&storage, 3);

        let (mut editor, _) = editor_with(storage.clone());
        editor.begin_init("http://localhost/");
        assert!(block_on(editor.offer_restore()));

        editor.pointer_down(10.0, 10.0);
        editor.pointer_up(10.0, 10.0);
        assert!(editor.update().is_none());

        let content = block_on(editor.load_backup());
        assert!(editor.apply_backup(content));
        assert_eq!(editor.sheet().frame_count(), 3);

        let task = editor.update().expect("backups resume once answered");
        block_on(task);
        let saved = block_on(storage.load(SNAPSHOT_KEY)).unwrap();
        assert_eq!(saved, editor.sheet().serialize());
    }

    #[test]
    fn test_discard_resumes_backups() {
        let storage = Arc::new(MemoryStorage::new());
        seed_backup(&storage, 3);

        let (mut editor, _) = editor_with(storage.clone());
        editor.begin_init("http://localhost/");
        assert!(block_on(editor.offer_restore()));
        editor.pointer_down(10.0, 10.0);
        editor.pointer_up(10.0, 10.0);
        assert!(editor.update().is_none());

        block_on(editor.discard_backup()).unwrap();
        let task = editor.update().expect("backup due");
        block_on(task);
        let saved = block_on(storage.load(SNAPSHOT_KEY)).unwrap();
        assert_eq!(saved, editor.sheet().serialize());
    }

    #[test]
    fn test_no_restore_prompt_without_backup() {
        let mut editor = editor();
        editor.begin_init("http://localhost/");
        assert!(!block_on(editor.offer_restore()));
        editor.pointer_down(10.0, 10.0);
        editor.pointer_up(10.0, 10.0);
        assert!(editor.update().is_some());
    }

    #[test]
    fn test_export_png() {
        let editor = editor();
        let bytes = editor.export_frame_png(1).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        assert!(editor.export_sheet_png(2).is_ok());
    }
}
