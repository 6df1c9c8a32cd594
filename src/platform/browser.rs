//! DOM lookups, each failing with an `anyhow` error instead of panicking

use anyhow::{Result, anyhow};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, Window};

pub const CANVAS_ID: &str = "canvas";

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| anyhow!("Window not found"))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| anyhow!("No Document found"))
}

pub fn canvas() -> Result<HtmlCanvasElement> {
    document()?
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| anyhow!("No canvas element with id '{}'", CANVAS_ID))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|element| anyhow!("Error converting {:?} to HtmlCanvasElement", element))
}

pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .map_err(|js| anyhow!("Error getting context: {:?}", js))?
        .ok_or_else(|| anyhow!("No 2d context found"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|element| anyhow!("Error converting {:?} to CanvasRenderingContext2d", element))
}

/// Element by id, if present
pub fn element(id: &str) -> Option<Element> {
    document().ok()?.get_element_by_id(id)
}

/// Set the text of `#id` if it exists
pub fn set_text(id: &str, text: &str) {
    if let Some(el) = element(id) {
        el.set_text_content(Some(text));
    }
}

/// Toggle the `hidden` class on `#id`
pub fn set_visible(id: &str, visible: bool) {
    if let Some(el) = element(id) {
        let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
    }
}

/// Client size of the canvas in CSS pixels
pub fn viewport_size(canvas: &HtmlCanvasElement) -> (f32, f32) {
    (canvas.client_width() as f32, canvas.client_height() as f32)
}
