// Browser tests for the attempt feed. `window.fetch` and `window.alert` are stubbed so
// the whole guess → render → victory → challenge report path runs without a server.
#![cfg(target_arch = "wasm32")]

use gloo_timers::future::TimeoutFuture;
use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Element, HtmlElement, HtmlFormElement, HtmlInputElement};

wasm_bindgen_test_configure!(run_in_browser);

const FIXTURE: &str = r#"
<form id="guess-form" action="/games/lol/guess/" method="post">
  <input type="hidden" name="csrfmiddlewaretoken" value="tok-123">
  <input id="guess" name="guess" data-names='["Ahri","Lux","Zed"]'>
  <ul id="suggestions" class="hidden"></ul>
  <button type="submit">Adivinar</button>
</form>
<div id="emoji-hint"></div>
<div id="attempts-header" style="display:none"></div>
<div id="attempts-container"></div>
<div id="game-config" data-game-slug="lol" data-is-challenge="true"
     data-challenge-report-url="/games/challenge/7/"
     data-start-extra-url="/games/lol/extra/"></div>
<script type="application/json" id="initial-attempts">
  [{"name":"Ahri","feedback":[{"value":"Mage","correct":true}]}]
</script>
"#;

const STUBS: &str = r#"
window.__calls = [];
window.__alerts = [];
window.__responses = [];
window.alert = function (message) { window.__alerts.push(String(message)); };
window.fetch = function (req) {
  const next = window.__responses.shift() || { status: 500, body: "{}" };
  return req.text().then(function (body) {
    window.__calls.push({ url: req.url, body: body, csrf: req.headers.get("X-CSRFToken") || "" });
    return new Response(next.body, { status: next.status });
  });
};
"#;

#[derive(Debug, Deserialize)]
struct Call {
    url: String,
    body: String,
    csrf: String,
}

fn doc() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

fn install_page() {
    doc().body().unwrap().set_inner_html(FIXTURE);
    js_sys::Function::new_no_args(STUBS).call0(&wasm_bindgen::JsValue::NULL).unwrap();
}

fn queue_response(status: u16, body: &str) {
    let script = format!(
        "window.__responses.push({{ status: {status}, body: {} }});",
        serde_json::to_string(body).unwrap()
    );
    js_sys::Function::new_no_args(&script).call0(&wasm_bindgen::JsValue::NULL).unwrap();
}

fn read_json<T: for<'de> Deserialize<'de>>(global: &str) -> T {
    let value = js_sys::Function::new_no_args(&format!("return JSON.stringify(window.{global});"))
        .call0(&wasm_bindgen::JsValue::NULL)
        .unwrap();
    serde_json::from_str(&value.as_string().unwrap()).unwrap()
}

fn rows() -> Vec<Element> {
    let container = doc().get_element_by_id("attempts-container").unwrap();
    let children = container.children();
    (0..children.length()).filter_map(|i| children.item(i)).collect()
}

fn row_name(row: &Element) -> String {
    row.query_selector(".champion-icon-name")
        .unwrap()
        .unwrap()
        .text_content()
        .unwrap()
}

fn squares(row: &Element) -> Vec<Element> {
    let list = row.query_selector_all(".square").unwrap();
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|n| n.dyn_into::<Element>().ok())
        .collect()
}

fn form() -> HtmlFormElement {
    doc().get_element_by_id("guess-form").unwrap().dyn_into().unwrap()
}

fn guess_input() -> HtmlInputElement {
    doc().get_element_by_id("guess").unwrap().dyn_into().unwrap()
}

fn submit_guess(name: &str) {
    guess_input().set_value(name);
    form().request_submit().unwrap();
}

#[wasm_bindgen_test]
async fn history_live_guesses_and_victory() {
    install_page();
    guessdle_web::start_attempt_feed().unwrap();

    // History: one static row, classed good, header shown from it.
    let history = rows();
    assert_eq!(history.len(), 1);
    assert_eq!(row_name(&history[0]), "Ahri");
    assert_eq!(history[0].query_selector_all(".square-good").unwrap().length(), 1);
    assert_eq!(history[0].query_selector_all(".animate__animated").unwrap().length(), 0);
    assert!(squares(&history[0]).iter().all(|c| c.class_list().contains("show")));
    let header: HtmlElement = doc()
        .get_element_by_id("attempts-header")
        .unwrap()
        .dyn_into()
        .unwrap();
    assert_eq!(header.style().get_property_value("display").unwrap(), "grid");
    assert!(
        header
            .style()
            .get_property_value("grid-template-columns")
            .unwrap()
            .contains("repeat(2")
    );

    // Rejected guess: one request even when submitted twice, alert, feed untouched.
    queue_response(400, r#"{"error":"Intento inválido"}"#);
    submit_guess("Nope");
    form().request_submit().unwrap();
    TimeoutFuture::new(200).await;
    let calls: Vec<Call> = read_json("__calls");
    assert_eq!(calls.len(), 1);
    assert!(calls[0].url.ends_with("/games/lol/guess/"));
    assert_eq!(calls[0].csrf, "tok-123");
    let alerts: Vec<String> = read_json("__alerts");
    assert_eq!(alerts, ["Intento inválido"]);
    assert_eq!(rows().len(), 1);
    assert!(!guess_input().has_attribute("disabled"));

    // Accepted guess: new row on top, staggered flip, flags applied, form usable.
    queue_response(
        200,
        r#"{"won":false,"remaining_names":["Zed"],"emoji_hint":["🔥","🧙"],
            "attempt":{"name":"Lux","icon":null,"feedback":[
              {"value":"Mage","correct":false,"partial":true},
              {"value":"Support","arrow":"↑"},
              {"value":"Mid","superior":true}]}}"#,
    );
    submit_guess("Lux");
    TimeoutFuture::new(150).await;
    let current = rows();
    assert_eq!(current.len(), 2);
    assert_eq!(row_name(&current[0]), "Lux");
    assert_eq!(row_name(&current[1]), "Ahri");
    let cells = squares(&current[0]);
    assert_eq!(cells.len(), 4);
    assert!(cells[0].class_list().contains("animate__flipInY"));
    assert!(!cells[3].class_list().contains("animate__flipInY"));
    assert!(cells[1].class_list().contains("square-part"));
    assert!(cells[2].text_content().unwrap().contains("Support↑"));
    assert!(cells[3].class_list().contains("square-superior"));
    assert_eq!(guess_input().get_attribute("data-names").as_deref(), Some(r#"["Zed"]"#));
    assert_eq!(doc().get_element_by_id("emoji-hint").unwrap().children().length(), 2);
    assert_eq!(guess_input().value(), "");
    assert!(!guess_input().has_attribute("disabled"));
    // The caret is back in the guess input for the next try.
    assert_eq!(doc().active_element().map(|el| el.id()).as_deref(), Some("guess"));
    TimeoutFuture::new(1200).await;
    assert!(squares(&current[0]).iter().all(|c| c.class_list().contains("animate__flipInY")));
    assert!(
        header
            .style()
            .get_property_value("grid-template-columns")
            .unwrap()
            .contains("repeat(2")
    );

    // Winning guess: form locked, overlay after the reveal, one challenge report.
    queue_response(
        200,
        r#"{"won":true,"attempt":{"name":"Zed","feedback":[{"value":"Mid","correct":true}]}}"#,
    );
    queue_response(200, "");
    submit_guess("Zed");
    TimeoutFuture::new(2500).await;
    let overlay = doc().get_element_by_id("victory-overlay").expect("overlay shown");
    assert!(overlay.text_content().unwrap().contains("Zed"));
    assert!(doc().get_element_by_id("extra-play-form").is_some());
    assert!(guess_input().has_attribute("disabled"));
    let calls: Vec<Call> = read_json("__calls");
    let reports: Vec<&Call> = calls
        .iter()
        .filter(|c| c.url.ends_with("/games/challenge/7/"))
        .collect();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].body, "attempts=3");

    // Won is terminal: further submissions never reach the network.
    form().request_submit().unwrap();
    TimeoutFuture::new(100).await;
    let after: Vec<Call> = read_json("__calls");
    assert_eq!(after.len(), calls.len());
}
