// DOM construction for one attempt row.

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Document, Element, Event, HtmlImageElement};

use super::layout::{FLIP_DURATION, RowLayout, reveal_schedule};
use crate::dom;
use crate::error::GameError;
use crate::model::{Attempt, FeedbackCell, IdentityDisplay};

pub const ROW_CLASS: &str = "attempt-row";
pub const SQUARE_CLASS: &str = "square";
pub const SHOW_CLASS: &str = "show";
pub const FLIP_CLASSES: [&str; 2] = ["animate__animated", "animate__flipInY"];

const IDENTITY_IMAGE_STYLE: &str =
    "width:2.2rem;height:2.2rem;object-fit:cover;border-radius:.35rem";

/// A rendered row plus the cells whose reveal the victory flow waits on.
pub struct RenderedRow {
    pub row: Element,
    pub layout: RowLayout,
    /// Last feedback square, if the attempt has any feedback.
    pub last_feedback_cell: Option<Element>,
    pub feedback_cells: usize,
}

/// Build the row for `attempt`. The caller decides where it goes in the feed.
pub fn build_row(
    doc: &Document,
    attempt: &Attempt,
    placeholder_image: &str,
) -> Result<RenderedRow, GameError> {
    let layout = RowLayout::for_columns(attempt.column_count());
    let row = dom::create_with_class(doc, "div", ROW_CLASS)?;
    dom::set_style(&row, "grid-template-columns", &layout.grid_template_columns());
    dom::set_style(&row, "gap", &layout.gap());

    let identity = identity_cell(doc, attempt, placeholder_image)?;
    row.append_child(&identity)?;
    let mut last_feedback_cell = None;
    for cell in &attempt.feedback {
        let square = feedback_cell(doc, cell)?;
        row.append_child(&square)?;
        last_feedback_cell = Some(square);
    }

    Ok(RenderedRow {
        row,
        layout,
        last_feedback_cell,
        feedback_cells: attempt.feedback.len(),
    })
}

/// Build the row for `attempt`, put it on top of `container` and reveal it.
pub fn prepend_row(
    doc: &Document,
    container: &Element,
    attempt: &Attempt,
    placeholder_image: &str,
    animate: bool,
) -> Result<RenderedRow, GameError> {
    let row = build_row(doc, attempt, placeholder_image)?;
    container.prepend_with_node_1(&row.row)?;
    reveal_cells(&row.row, animate)?;
    Ok(row)
}

/// Show every square of `row`, flipping them one after another when `animate`.
pub fn reveal_cells(row: &Element, animate: bool) -> Result<(), GameError> {
    let cells = row.query_selector_all(&format!(".{SQUARE_CLASS}"))?;
    let schedule = reveal_schedule(cells.length() as usize, animate);
    for (i, when) in schedule.into_iter().enumerate() {
        let Some(cell) = cells.get(i as u32).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        match when {
            None => {
                cell.class_list().add_1(SHOW_CLASS)?;
            }
            Some(delay) => {
                Timeout::new(delay, move || {
                    let classes = cell.class_list();
                    let _ = classes.add_3(SHOW_CLASS, FLIP_CLASSES[0], FLIP_CLASSES[1]);
                    dom::set_style(&cell, "--animate-duration", FLIP_DURATION);
                })
                .forget();
            }
        }
    }
    Ok(())
}

fn identity_cell(
    doc: &Document,
    attempt: &Attempt,
    placeholder_image: &str,
) -> Result<Element, GameError> {
    let cell = dom::create_with_class(doc, "div", &format!("{SQUARE_CLASS} square--static"))?;
    let content = dom::create_with_class(doc, "div", "square-content")?;
    match attempt.identity() {
        IdentityDisplay::Image(url) | IdentityDisplay::Icon(url) => {
            let img = identity_image(doc, &url, &attempt.name, placeholder_image)?;
            content.append_child(&img)?;
        }
        IdentityDisplay::NameOnly => {}
    }
    let name = dom::create_with_class(doc, "span", "champion-icon-name")?;
    name.set_text_content(Some(&attempt.name));
    content.append_child(&name)?;
    cell.append_child(&content)?;
    Ok(cell)
}

fn identity_image(
    doc: &Document,
    url: &str,
    alt: &str,
    placeholder_image: &str,
) -> Result<Element, GameError> {
    let img: HtmlImageElement = doc
        .create_element("img")?
        .dyn_into()
        .map_err(JsValue::from)?;
    img.set_alt(alt);
    img.set_attribute("style", IDENTITY_IMAGE_STYLE)?;

    // One swap to the placeholder; a broken placeholder must not loop.
    let target = img.clone();
    let placeholder = placeholder_image.to_string();
    let on_error = Closure::once_into_js(move |_evt: Event| {
        if !target.src().ends_with(&placeholder) {
            target.set_src(&placeholder);
        }
    });
    let opts = AddEventListenerOptions::new();
    opts.set_once(true);
    img.add_event_listener_with_callback_and_add_event_listener_options(
        "error",
        on_error.unchecked_ref(),
        &opts,
    )?;
    img.set_src(url);
    Ok(img.into())
}

fn feedback_cell(doc: &Document, cell: &FeedbackCell) -> Result<Element, GameError> {
    let square = dom::create_with_class(
        doc,
        "div",
        &format!("{SQUARE_CLASS} {}", cell.state().class_name()),
    )?;
    let content = dom::create_with_class(doc, "div", "square-content")?;
    content.set_text_content(Some(&cell.label()));
    square.append_child(&content)?;
    Ok(square)
}
