//! Small DOM helpers shared by both controllers.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window, window};

use crate::error::GameError;

pub fn win() -> Result<Window, GameError> {
    window().ok_or_else(|| GameError::missing("window"))
}

pub fn document() -> Result<Document, GameError> {
    win()?.document().ok_or_else(|| GameError::missing("document"))
}

/// Typed lookup by id. `None` when absent or of another element type.
pub fn by_id<T: JsCast>(doc: &Document, id: &str) -> Option<T> {
    doc.get_element_by_id(id).and_then(|el| el.dyn_into::<T>().ok())
}

pub fn require_by_id<T: JsCast>(doc: &Document, id: &str) -> Result<T, GameError> {
    by_id(doc, id).ok_or_else(|| GameError::missing(&format!("#{id}")))
}

/// `div`/`span`/... with a class attribute already set.
pub fn create_with_class(doc: &Document, tag: &str, class: &str) -> Result<Element, GameError> {
    let el = doc.create_element(tag)?;
    if !class.is_empty() {
        el.set_class_name(class);
    }
    Ok(el)
}

pub fn set_style(el: &Element, property: &str, value: &str) {
    if let Some(html) = el.dyn_ref::<HtmlElement>() {
        let _ = html.style().set_property(property, value);
    }
}

/// Alert the player. Failing to alert is not worth more than a log line.
pub fn alert(message: &str) {
    if let Some(w) = window() {
        if let Err(err) = w.alert_with_message(message) {
            log::warn!("alert failed: {err:?}");
        }
    }
}

pub fn now_ms() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
