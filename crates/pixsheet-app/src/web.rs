//! WebAssembly entry point: DOM wiring, canvases, the animation loop and
//! service requests.

use crate::app::{Editor, EditorSurfaces};
use crate::shortcuts::{Action, KeyManager};
use gloo::events::EventListener;
use gloo::render::{AnimationFrame, request_animation_frame};
use pixsheet_core::location::service_url_from_url;
use pixsheet_core::storage::{PlatformStorage, RESTORE_NOTIFICATION, create_default_storage};
use pixsheet_core::{DrawingLoop, EditorConfig, HttpSheetService, SheetService, ViewportMetrics};
use pixsheet_render::{PixelBuffer, RenderError, RenderResult, Surface};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{
    CanvasRenderingContext2d, Document, Element, Event, HtmlCanvasElement, HtmlElement,
    HtmlInputElement, ImageData, KeyboardEvent, MouseEvent,
};

type WebEditor = Editor<PlatformStorage>;
type SharedEditor = Rc<RefCell<WebEditor>>;

const DRAWING_CONTAINER: &str = "drawing-canvas-container";
const PREVIEW_LIST: &str = "preview-list";
const ANIMATION_CONTAINER: &str = "preview-canvas-container";
const MAIN_PANEL: &str = ".main-panel";
const PREVIEW_PANEL: &str = ".preview-container";
const FPS_INPUT: &str = "preview-fps";
const NOTIFICATION: &str = "notification";

/// A `<canvas>` receiving rendered images.
struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    fn create_in(document: &Document, container: &Element) -> Result<Self, JsValue> {
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        container.append_child(&canvas)?;
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        context.set_image_smoothing_enabled(false);
        Ok(Self { canvas, context })
    }
}

impl Surface for CanvasSurface {
    fn present(&mut self, image: &PixelBuffer) -> RenderResult<()> {
        if self.canvas.width() != image.width() || self.canvas.height() != image.height() {
            self.canvas.set_width(image.width());
            self.canvas.set_height(image.height());
        }
        let data = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(image.data()),
            image.width(),
            image.height(),
        )
        .map_err(|e| RenderError::Surface(format!("{:?}", e)))?;
        self.context
            .put_image_data(&data, 0.0, 0.0)
            .map_err(|e| RenderError::Surface(format!("{:?}", e)))
    }
}

fn element_by_id(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{}", id)))
}

fn client_size(document: &Document, selector: &str) -> (f64, f64) {
    match document.query_selector(selector) {
        Ok(Some(element)) => (element.client_width() as f64, element.client_height() as f64),
        _ => {
            log::warn!("Missing {} element", selector);
            (0.0, 0.0)
        }
    }
}

fn measure_viewport(document: &Document) -> ViewportMetrics {
    let (main_width, main_height) = client_size(document, MAIN_PANEL);
    let (preview_width, preview_height) = client_size(document, PREVIEW_PANEL);
    ViewportMetrics::from_panels(main_width, main_height, preview_width, preview_height)
}

/// Configuration from the `data-config` attribute of `<body>`.
fn read_config(document: &Document, href: &str) -> EditorConfig {
    let config = document
        .body()
        .and_then(|body| body.get_attribute("data-config"))
        .map(|json| {
            EditorConfig::from_json(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid data-config: {}", e);
                EditorConfig::default()
            })
        })
        .unwrap_or_default();
    match service_url_from_url(href) {
        Some(url) => config.with_service_url(url),
        None => config,
    }
}

fn read_fps(document: &Document) -> Option<u32> {
    let input: HtmlInputElement = document.get_element_by_id(FPS_INPUT)?.dyn_into().ok()?;
    input.value().trim().parse().ok()
}

/// Mirror the editor notification into the notification element.
fn show_notification(document: &Document, content: Option<&str>) {
    let Some(element) = document
        .get_element_by_id(NOTIFICATION)
        .and_then(|e| e.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };
    element.set_text_content(content);
    let display = if content.is_some() { "block" } else { "none" };
    if let Err(e) = element.style().set_property("display", display) {
        log::warn!("Failed to toggle notification: {:?}", e);
    }
}

fn store(editor: &SharedEditor, service: &HttpSheetService, document: &Document) {
    if let Some(fps) = read_fps(document) {
        editor.borrow_mut().set_fps(fps);
    }
    let (content, fps) = editor.borrow().store_request();
    let service = service.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let result = service.store(&content, &fps).await;
        let Some(window) = web_sys::window() else {
            return;
        };
        let location = window.location();
        let Ok(href) = location.href() else {
            return;
        };
        if let Some(url) = WebEditor::complete_store(result, &href) {
            if let Err(e) = location.set_href(&url) {
                log::error!("Failed to navigate to {}: {:?}", url, e);
            }
        }
    });
}

fn restore_backup(editor: &SharedEditor) {
    let task = editor.borrow().load_backup();
    let editor = editor.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let result = task.await;
        editor.borrow_mut().apply_backup(result);
    });
}

fn discard_backup(editor: &SharedEditor) {
    let task = editor.borrow_mut().discard_backup();
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = task.await {
            log::warn!("Failed to discard backup: {}", e);
        }
    });
}

fn install_listeners(
    editor: &SharedEditor,
    service: &HttpSheetService,
    document: &Document,
    drawing: &HtmlCanvasElement,
    film: &HtmlCanvasElement,
) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let mut listeners = Vec::new();

    {
        let editor = editor.clone();
        let document = document.clone();
        listeners.push(EventListener::new(&window, "resize", move |_| {
            let dpi = editor.borrow_mut().on_resize(&measure_viewport(&document));
            log::debug!("Resized, drawing scale {}", dpi);
        }));
    }

    {
        let editor = editor.clone();
        listeners.push(EventListener::new(drawing, "mousedown", move |event: &Event| {
            if let Some(e) = event.dyn_ref::<MouseEvent>() {
                editor.borrow_mut().pointer_down(e.offset_x() as f64, e.offset_y() as f64);
            }
        }));
    }
    {
        let editor = editor.clone();
        listeners.push(EventListener::new(drawing, "mousemove", move |event: &Event| {
            if let Some(e) = event.dyn_ref::<MouseEvent>() {
                editor.borrow_mut().pointer_move(e.offset_x() as f64, e.offset_y() as f64);
            }
        }));
    }
    {
        let editor = editor.clone();
        let drawing = drawing.clone();
        listeners.push(EventListener::new(&window, "mouseup", move |event: &Event| {
            if let Some(e) = event.dyn_ref::<MouseEvent>() {
                let rect = drawing.get_bounding_client_rect();
                let x = e.client_x() as f64 - rect.left();
                let y = e.client_y() as f64 - rect.top();
                editor.borrow_mut().pointer_up(x, y);
            }
        }));
    }

    {
        let editor = editor.clone();
        listeners.push(EventListener::new(film, "click", move |event: &Event| {
            if let Some(e) = event.dyn_ref::<MouseEvent>() {
                editor.borrow_mut().select_frame_at(e.offset_y() as f64);
            }
        }));
    }

    if let Some(input) = document.get_element_by_id(FPS_INPUT) {
        let editor = editor.clone();
        let document = document.clone();
        listeners.push(EventListener::new(&input, "input", move |_| {
            if let Some(fps) = read_fps(&document) {
                editor.borrow_mut().set_fps(fps);
            }
        }));
    }

    if let Some(notification) = document.get_element_by_id(NOTIFICATION) {
        let editor = editor.clone();
        listeners.push(EventListener::new(&notification, "click", move |_| {
            let prompting = editor.borrow().notification() == Some(RESTORE_NOTIFICATION);
            if prompting {
                restore_backup(&editor);
            }
        }));
    }

    {
        let editor = editor.clone();
        let service = service.clone();
        let document_for_store = document.clone();
        listeners.push(EventListener::new(document, "keydown", move |event: &Event| {
            let Some(e) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let key = e.key();
            if key == "Escape" {
                let prompting = editor.borrow().notification() == Some(RESTORE_NOTIFICATION);
                if prompting {
                    discard_backup(&editor);
                }
                return;
            }
            let target_tag = e
                .target()
                .and_then(|target| target.dyn_into::<Element>().ok())
                .map(|element| element.tag_name());
            if !target_tag.as_deref().is_none_or(KeyManager::accepts_target) {
                return;
            }
            let ctrl = e.ctrl_key() || e.meta_key();
            let action = editor.borrow_mut().handle_key(&key, ctrl, e.shift_key());
            match action {
                Some(Action::Store) => {
                    e.prevent_default();
                    store(&editor, &service, &document_for_store);
                }
                Some(_) => e.prevent_default(),
                None => {}
            }
        }));
    }

    // Listeners live as long as the page
    for listener in listeners {
        listener.forget();
    }
    Ok(())
}

/// Drive the drawing loop from `requestAnimationFrame`.
fn start_animation_loop(drawing_loop: Rc<RefCell<DrawingLoop>>) {
    fn schedule(
        drawing_loop: Rc<RefCell<DrawingLoop>>,
        handle: Rc<RefCell<Option<AnimationFrame>>>,
    ) {
        let next = handle.clone();
        let frame = request_animation_frame(move |timestamp| {
            drawing_loop.borrow_mut().tick(timestamp);
            schedule(drawing_loop, next);
        });
        *handle.borrow_mut() = Some(frame);
    }

    drawing_loop.borrow_mut().start();
    schedule(drawing_loop, Rc::new(RefCell::new(None)));
}

fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let href = window.location().href()?;

    let config = read_config(&document, &href);
    let service = HttpSheetService::new(config.service_url.clone());
    log::info!("Sheet service at {}", service.base_url());

    let drawing = CanvasSurface::create_in(&document, &element_by_id(&document, DRAWING_CONTAINER)?)?;
    let animation =
        CanvasSurface::create_in(&document, &element_by_id(&document, ANIMATION_CONTAINER)?)?;
    let film = CanvasSurface::create_in(&document, &element_by_id(&document, PREVIEW_LIST)?)?;
    let (drawing_canvas, film_canvas) = (drawing.canvas.clone(), film.canvas.clone());

    let storage = create_default_storage().map_err(|e| JsValue::from_str(&e.to_string()))?;
    let surfaces = EditorSurfaces {
        drawing: Box::new(drawing),
        animation: Box::new(animation),
        film: Box::new(film),
    };
    let mut editor = Editor::new(config, &measure_viewport(&document), surfaces, storage);
    if let Some(fps) = read_fps(&document) {
        editor.set_fps(fps);
    }
    let pending_id = editor.begin_init(&href);
    let editor: SharedEditor = Rc::new(RefCell::new(editor));

    match pending_id {
        Some(id) => {
            let editor = editor.clone();
            let service = service.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = service.load(&id).await;
                editor.borrow_mut().complete_remote_load(result);
            });
        }
        None => {
            let prompt = editor.borrow_mut().offer_restore();
            wasm_bindgen_futures::spawn_local(async move {
                if prompt.await {
                    log::info!("Backup available");
                }
            });
        }
    }

    install_listeners(&editor, &service, &document, &drawing_canvas, &film_canvas)?;

    let mut drawing_loop = DrawingLoop::new();
    {
        let editor = editor.clone();
        let mut shown: Option<String> = None;
        drawing_loop.add_callback(move |delta| {
            let mut editor = editor.borrow_mut();
            if let Some(task) = editor.update() {
                wasm_bindgen_futures::spawn_local(task);
            }
            if let Err(e) = editor.render(delta) {
                log::error!("Render failed: {}", e);
            }
            let current = editor.notification().map(str::to_string);
            if shown != current {
                show_notification(&document, current.as_deref());
                shown = current;
            }
        });
    }
    start_animation_loop(Rc::new(RefCell::new(drawing_loop)));
    Ok(())
}

/// Initialize and run the WASM application.
#[wasm_bindgen(start)]
pub fn run_wasm() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }

    log::info!("Starting Pixsheet (WASM)");

    if let Err(e) = start() {
        log::error!("Failed to start editor: {:?}", e);
    }
}
