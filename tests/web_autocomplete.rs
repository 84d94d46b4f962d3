// Browser tests for the guess autocomplete.
#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{
    Element, Event, HtmlInputElement, KeyboardEvent, KeyboardEventInit, MouseEvent, MouseEventInit,
};

wasm_bindgen_test_configure!(run_in_browser);

const FIXTURE: &str = r#"
<div id="outside">elsewhere</div>
<input id="guess" name="guess" aria-expanded="false"
       data-names='["Ahri","Akali","Alistar","Lux","Shaco"]'>
<ul id="suggestions" class="hidden"></ul>
"#;

fn doc() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

fn input() -> HtmlInputElement {
    doc().get_element_by_id("guess").unwrap().dyn_into().unwrap()
}

fn list() -> Element {
    doc().get_element_by_id("suggestions").unwrap()
}

fn type_text(text: &str) {
    input().set_value(text);
    input().dispatch_event(&Event::new("input").unwrap()).unwrap();
}

fn press(key: &str) -> bool {
    let init = KeyboardEventInit::new();
    init.set_key(key);
    init.set_cancelable(true);
    let evt = KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap();
    input().dispatch_event(&evt).unwrap()
}

fn shown() -> Vec<String> {
    let items = list().children();
    (0..items.length())
        .filter_map(|i| items.item(i))
        .filter_map(|el| el.text_content())
        .collect()
}

fn active_index() -> Option<u32> {
    let items = list().children();
    (0..items.length()).find(|&i| {
        items
            .item(i)
            .map(|el| el.class_list().contains("suggestion-active"))
            .unwrap_or(false)
    })
}

fn is_open() -> bool {
    !list().class_list().contains("hidden")
}

#[wasm_bindgen_test]
fn filter_navigate_commit_and_dismiss() {
    doc().body().unwrap().set_inner_html(FIXTURE);
    guessdle_web::start_autocomplete().unwrap();

    type_text("A");
    assert!(is_open());
    assert_eq!(input().get_attribute("aria-expanded").as_deref(), Some("true"));
    assert_eq!(shown(), ["Ahri", "Akali", "Alistar", "Shaco"]);

    // Up from nothing wraps to the last, Down from the last wraps to the first.
    assert!(!press("ArrowUp"));
    assert_eq!(active_index(), Some(3));
    assert!(!press("ArrowDown"));
    assert_eq!(active_index(), Some(0));
    press("ArrowDown");
    assert!(!press("Tab"));
    assert_eq!(input().value(), "Akali");
    assert!(!is_open());
    assert_eq!(input().get_attribute("aria-expanded").as_deref(), Some("false"));

    // Enter without a highlight takes the first suggestion.
    type_text("li");
    assert_eq!(shown(), ["Akali", "Alistar"]);
    assert!(!press("Enter"));
    assert_eq!(input().value(), "Akali");

    // The list follows data-names rewritten between keystrokes.
    input()
        .set_attribute("data-names", r#"["Lux","Lulu"]"#)
        .unwrap();
    type_text("lu");
    assert_eq!(shown(), ["Lux", "Lulu"]);
    press("Escape");
    assert!(!is_open());
    assert_eq!(input().value(), "lu");

    // Empty query and unknown names close the list.
    type_text("");
    assert!(!is_open());
    type_text("zzz");
    assert!(!is_open());

    // Clicking elsewhere dismisses.
    type_text("l");
    assert!(is_open());
    let init = MouseEventInit::new();
    init.set_bubbles(true);
    let click = MouseEvent::new_with_mouse_event_init_dict("click", &init).unwrap();
    doc().get_element_by_id("outside").unwrap().dispatch_event(&click).unwrap();
    assert!(!is_open());

    // Malformed payload: no suggestions, no panic.
    input().set_attribute("data-names", "[broken").unwrap();
    type_text("a");
    assert!(shown().is_empty());
    assert!(!is_open());
}
