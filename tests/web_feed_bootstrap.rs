// Browser tests for pages whose embedded data is broken or already finished.
#![cfg(target_arch = "wasm32")]

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlInputElement;

wasm_bindgen_test_configure!(run_in_browser);

const FIXTURE: &str = r#"
<form id="guess-form" action="/games/lol/guess/" method="post">
  <input type="hidden" name="csrfmiddlewaretoken" value="tok">
  <input id="guess" name="guess" data-names='["Ahri"]'>
  <ul id="suggestions" class="hidden"></ul>
  <button type="submit">Adivinar</button>
</form>
<div id="attempts-header" style="display:none"></div>
<div id="attempts-container"></div>
<div id="game-config" data-already-won="True" data-winner-name="Ahri"
     data-start-extra-url="/games/lol/extra/" data-max-extras-reached="true"></div>
<script type="application/json" id="initial-attempts">[{"name":"Ahri","feedback":[{"value":</script>
"#;

#[wasm_bindgen_test]
async fn broken_history_and_already_won_page() {
    let doc = web_sys::window().unwrap().document().unwrap();
    doc.body().unwrap().set_inner_html(FIXTURE);

    // Malformed history is logged, not thrown.
    guessdle_web::start_game_page().unwrap();
    let container = doc.get_element_by_id("attempts-container").unwrap();
    assert_eq!(container.children().length(), 0);
    let header = doc.get_element_by_id("attempts-header").unwrap();
    assert_eq!(header.get_attribute("style").as_deref(), Some("display:none"));

    // Already won: controls locked at once, overlay after a short delay.
    let input: HtmlInputElement = doc.get_element_by_id("guess").unwrap().dyn_into().unwrap();
    assert!(input.has_attribute("disabled"));
    assert!(doc.get_element_by_id("victory-overlay").is_none());
    TimeoutFuture::new(900).await;
    let overlay = doc.get_element_by_id("victory-overlay").expect("overlay shown");
    assert!(overlay.text_content().unwrap().contains("Ahri"));
    // Daily extra-play cap reached: notice instead of the wager form.
    assert!(doc.get_element_by_id("extra-play-form").is_none());
    assert!(overlay.query_selector(".extra-play-cap").unwrap().is_some());

    // Starting twice is harmless.
    guessdle_web::start_attempt_feed().unwrap();
    assert_eq!(doc.query_selector_all("#victory-overlay").unwrap().length(), 1);
}
