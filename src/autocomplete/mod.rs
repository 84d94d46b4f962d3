//! Guess autocomplete.
//!
//! Suggestions come from the guess input's `data-names` attribute, re-read on every
//! keystroke so the list the feed writes after each guess applies immediately.

pub mod suggest;

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, HtmlInputElement, KeyboardEvent, MouseEvent, Node,
    ScrollIntoViewOptions, ScrollLogicalPosition,
};

use crate::config::{SUGGESTIONS_ID, guess_input};
use crate::dom;
use crate::error::GameError;
use crate::feed::NAMES_ATTRIBUTE;
use suggest::{NavAction, NavKey, filter_names, navigate, parse_names};

pub const HIDDEN_CLASS: &str = "hidden";
pub const ACTIVE_CLASS: &str = "suggestion-active";
const ITEM_CLASS: &str = "suggestion px-4 py-2 cursor-pointer transition";
const INDEX_ATTRIBUTE: &str = "data-index";

thread_local! {
    static AUTOCOMPLETE: RefCell<Option<Autocomplete>> = const { RefCell::new(None) };
}

fn with_autocomplete(f: impl FnOnce(&mut Autocomplete)) {
    AUTOCOMPLETE.with(|cell| {
        if let Some(ac) = cell.borrow_mut().as_mut() {
            f(ac);
        }
    });
}

struct Autocomplete {
    doc: Document,
    input: HtmlInputElement,
    list: Element,
    shown: Vec<String>,
    highlight: Option<usize>,
}

impl Autocomplete {
    fn candidates(&self) -> Vec<String> {
        let raw = self.input.get_attribute(NAMES_ATTRIBUTE);
        parse_names(raw.as_deref()).unwrap_or_else(|err| {
            log::error!("autocomplete: invalid JSON in {NAMES_ATTRIBUTE}: {err}");
            Vec::new()
        })
    }

    fn is_open(&self) -> bool {
        !self.list.class_list().contains(HIDDEN_CLASS)
    }

    fn close(&mut self) {
        let _ = self.list.class_list().add_1(HIDDEN_CLASS);
        let _ = self.input.set_attribute("aria-expanded", "false");
        self.highlight = None;
    }

    /// Rebuild the list for the current query.
    fn paint(&mut self) -> Result<(), GameError> {
        let candidates = self.candidates();
        let query = self.input.value();
        self.shown = filter_names(&candidates, &query)
            .into_iter()
            .map(str::to_string)
            .collect();
        self.list.set_inner_html("");
        self.highlight = None;
        if self.shown.is_empty() {
            self.close();
            return Ok(());
        }
        for (i, name) in self.shown.iter().enumerate() {
            let li = dom::create_with_class(&self.doc, "li", ITEM_CLASS)?;
            li.set_text_content(Some(name));
            li.set_attribute("role", "option")?;
            li.set_attribute(INDEX_ATTRIBUTE, &i.to_string())?;
            self.list.append_child(&li)?;
        }
        self.list.class_list().remove_1(HIDDEN_CLASS)?;
        self.input.set_attribute("aria-expanded", "true")?;
        Ok(())
    }

    fn item(&self, index: usize) -> Option<Element> {
        self.list.children().item(index as u32)
    }

    fn set_highlight(&mut self, index: usize) {
        let items = self.list.children();
        for i in 0..items.length() {
            if let Some(item) = items.item(i) {
                let _ = item.class_list().remove_1(ACTIVE_CLASS);
            }
        }
        let Some(item) = self.item(index) else { return };
        let _ = item.class_list().add_1(ACTIVE_CLASS);
        let opts = ScrollIntoViewOptions::new();
        opts.set_block(ScrollLogicalPosition::Nearest);
        item.scroll_into_view_with_scroll_into_view_options(&opts);
        self.highlight = Some(index);
    }

    fn commit(&mut self, index: usize) {
        let Some(name) = self.shown.get(index).cloned() else { return };
        self.input.set_value(&name);
        self.close();
        let _ = self.input.focus();
    }

    fn on_key(&mut self, evt: &KeyboardEvent) {
        if !self.is_open() {
            return;
        }
        let action = navigate(self.highlight, self.shown.len(), NavKey::from_key(&evt.key()));
        if action.consumes_key() {
            evt.prevent_default();
        }
        match action {
            NavAction::Highlight(i) => self.set_highlight(i),
            NavAction::Commit(i) => self.commit(i),
            NavAction::Close => self.close(),
            NavAction::Ignore => {}
        }
    }

    /// Whether a click landed on the input or inside the list.
    fn owns(&self, target: Option<&Node>) -> bool {
        let Some(target) = target else { return false };
        let input: &Node = &self.input;
        self.list.contains(Some(target)) || target.is_same_node(Some(input))
    }
}

/// Index of the suggestion an event came from.
fn item_index(evt: &Event) -> Option<usize> {
    evt.target()?
        .dyn_into::<Element>()
        .ok()?
        .closest(&format!("[{INDEX_ATTRIBUTE}]"))
        .ok()??
        .get_attribute(INDEX_ATTRIBUTE)?
        .parse()
        .ok()
}

/// Wire the autocomplete to the guess input. Pages without the input are left alone.
pub fn start() -> Result<(), GameError> {
    if AUTOCOMPLETE.with(|cell| cell.borrow().is_some()) {
        log::warn!("autocomplete already started");
        return Ok(());
    }
    let doc = dom::document()?;
    let Some(input) = guess_input(&doc) else {
        log::debug!("no guess input; autocomplete disabled");
        return Ok(());
    };
    let list: Element = dom::require_by_id(&doc, SUGGESTIONS_ID)?;

    let ac = Autocomplete {
        doc: doc.clone(),
        input: input.clone(),
        list: list.clone(),
        shown: Vec::new(),
        highlight: None,
    };
    // Surface a broken payload once at load as well as on each keystroke.
    let _ = ac.candidates();
    AUTOCOMPLETE.with(|cell| *cell.borrow_mut() = Some(ac));

    {
        let closure = Closure::wrap(Box::new(move |_evt: Event| {
            with_autocomplete(|ac| {
                if let Err(err) = ac.paint() {
                    log::error!("autocomplete: could not render suggestions: {err}");
                }
            });
        }) as Box<dyn FnMut(_)>);
        input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let closure = Closure::wrap(Box::new(move |evt: KeyboardEvent| {
            with_autocomplete(|ac| ac.on_key(&evt));
        }) as Box<dyn FnMut(_)>);
        input.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let closure = Closure::wrap(Box::new(move |evt: MouseEvent| {
            if let Some(i) = item_index(&evt) {
                with_autocomplete(|ac| {
                    if ac.highlight != Some(i) {
                        ac.set_highlight(i);
                    }
                });
            }
        }) as Box<dyn FnMut(_)>);
        list.add_event_listener_with_callback("mouseover", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let closure = Closure::wrap(Box::new(move |evt: MouseEvent| {
            if let Some(i) = item_index(&evt) {
                with_autocomplete(|ac| ac.commit(i));
            }
        }) as Box<dyn FnMut(_)>);
        list.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let closure = Closure::wrap(Box::new(move |evt: MouseEvent| {
            let target = evt.target().and_then(|t| t.dyn_into::<Node>().ok());
            with_autocomplete(|ac| {
                if !ac.owns(target.as_ref()) {
                    ac.close();
                }
            });
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    log::info!("autocomplete started");
    Ok(())
}
