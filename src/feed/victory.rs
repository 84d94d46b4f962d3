//! Everything that happens once the game is won: waiting for the last flip, locking
//! the form, confetti, the overlay and the extra-play wager.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Function, Promise, Reflect};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, HtmlElement, HtmlFormElement, window,
};

use crate::config::{ExtraPlayAvailability, ExtraPlayOffer, PageConfig};
use crate::dom;
use crate::error::GameError;

pub const OVERLAY_ID: &str = "victory-overlay";
pub const KEYFRAMES_STYLE_ID: &str = "bounce-modal-style";
pub const EXTRA_PLAY_FORM_ID: &str = "extra-play-form";
pub const LOCKED_CLASSES: [&str; 2] = ["opacity-50", "cursor-not-allowed"];
/// Delay before the overlay when the page loads an already-won game.
pub const ALREADY_WON_DELAY_MS: u32 = 600;
const CONFETTI_MS: f64 = 3000.0;

const ANIMATION_TAG: &str = "animationend";
const TIMEOUT_TAG: &str = "timeout";

const KEYFRAMES: &str = "@keyframes bounceInCenter {
  0%   { opacity: 0; transform: scale(0.9) translateY(-30px); }
  60%  { opacity: 1; transform: scale(1.02) translateY(10px); }
  80%  { transform: scale(0.98) translateY(-4px); }
  100% { transform: scale(1) translateY(0); }
}";
const OVERLAY_STYLE: &str = "position:fixed;inset:0;display:flex;align-items:center;justify-content:center;background:rgba(0,0,0,.4);z-index:1000;";
const MODAL_STYLE: &str = "background:#fff;border-radius:1rem;padding:2rem 3rem;text-align:center;animation:bounceInCenter 0.7s ease forwards;max-width:90vw;";
const TITLE_STYLE: &str = "font-size:1.6rem;font-weight:700;margin-bottom:.5rem;color:#15803d";
const BUTTON_STYLE: &str = "display:inline-block;background:#15803d;color:#fff;padding:.6rem 1.5rem;border-radius:9999px;font-weight:600;text-decoration:none;border:0;cursor:pointer;margin:.5rem";

/// How the wait for the winning row's reveal ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// The last feedback cell fired `animationend`.
    AnimationEnded,
    /// The fallback delay elapsed first.
    TimedOut,
    /// Nothing to wait for; only the fallback delay was honoured.
    NoCells,
}

impl RevealOutcome {
    fn from_tag(tag: Option<String>, had_cell: bool) -> Self {
        match (tag.as_deref(), had_cell) {
            (_, false) => RevealOutcome::NoCells,
            (Some(ANIMATION_TAG), true) => RevealOutcome::AnimationEnded,
            _ => RevealOutcome::TimedOut,
        }
    }
}

/// Race the last cell's `animationend` against `fallback_ms`.
pub async fn wait_for_reveal(last_cell: Option<&Element>, fallback_ms: u32) -> RevealOutcome {
    let timeout = timeout_promise(fallback_ms);
    let race = match last_cell {
        Some(cell) => Promise::race(&Array::of2(&animation_end_promise(cell), &timeout)),
        None => timeout,
    };
    let tag = JsFuture::from(race).await.ok().and_then(|v| v.as_string());
    RevealOutcome::from_tag(tag, last_cell.is_some())
}

fn animation_end_promise(cell: &Element) -> Promise {
    Promise::new(&mut |resolve: Function, _reject| {
        let on_end = Closure::once_into_js(move |_evt: Event| {
            let _ = resolve.call1(&JsValue::NULL, &JsValue::from_str(ANIMATION_TAG));
        });
        let opts = AddEventListenerOptions::new();
        opts.set_once(true);
        if let Err(err) = cell.add_event_listener_with_callback_and_add_event_listener_options(
            "animationend",
            on_end.unchecked_ref(),
            &opts,
        ) {
            log::warn!("could not watch the reveal animation: {err:?}");
        }
    })
}

fn timeout_promise(ms: u32) -> Promise {
    Promise::new(&mut |resolve: Function, _reject| {
        let scheduled = window().map(|w| {
            w.set_timeout_with_callback_and_timeout_and_arguments_1(
                &resolve,
                ms.min(i32::MAX as u32) as i32,
                &JsValue::from_str(TIMEOUT_TAG),
            )
        });
        if !matches!(scheduled, Some(Ok(_))) {
            let _ = resolve.call1(&JsValue::NULL, &JsValue::from_str(TIMEOUT_TAG));
        }
    })
}

/// Enable or disable every control of `form`, visually and for pointer input.
pub fn set_form_locked(form: &HtmlFormElement, locked: bool) {
    let Ok(controls) = form.query_selector_all("input, button, select, textarea") else {
        return;
    };
    for i in 0..controls.length() {
        let Some(el) = controls.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        if locked {
            let _ = el.set_attribute("disabled", "");
            let _ = el.class_list().add_2(LOCKED_CLASSES[0], LOCKED_CLASSES[1]);
            dom::set_style(&el, "pointer-events", "none");
        } else {
            let _ = el.remove_attribute("disabled");
            let _ = el.class_list().remove_2(LOCKED_CLASSES[0], LOCKED_CLASSES[1]);
            if let Some(html) = el.dyn_ref::<HtmlElement>() {
                let _ = html.style().remove_property("pointer-events");
            }
        }
    }
}

/// Confetti, then the overlay. Safe to call more than once; the overlay is unique.
pub fn celebrate(config: &PageConfig, winner: Option<&str>) -> Result<(), GameError> {
    launch_confetti_sides();
    show_overlay(config, winner)
}

#[derive(Serialize)]
struct ConfettiBurst {
    #[serde(rename = "particleCount")]
    particle_count: u32,
    angle: u32,
    spread: u32,
    origin: ConfettiOrigin,
}

#[derive(Serialize)]
struct ConfettiOrigin {
    x: f32,
    y: f32,
}

fn side_bursts() -> [ConfettiBurst; 2] {
    [
        ConfettiBurst {
            particle_count: 12,
            angle: 60,
            spread: 55,
            origin: ConfettiOrigin { x: 0.0, y: 0.7 },
        },
        ConfettiBurst {
            particle_count: 12,
            angle: 120,
            spread: 55,
            origin: ConfettiOrigin { x: 1.0, y: 0.7 },
        },
    ]
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Fire side bursts every frame for a few seconds, if the page ships `confetti`.
fn launch_confetti_sides() {
    let Some(w) = window() else { return };
    let confetti = match Reflect::get(&w, &JsValue::from_str("confetti")) {
        Ok(f) if f.is_function() => f.unchecked_into::<Function>(),
        _ => {
            log::debug!("no confetti on this page");
            return;
        }
    };
    let bursts: Vec<JsValue> = side_bursts()
        .iter()
        .filter_map(|b| serde_json::to_string(b).ok())
        .filter_map(|json| js_sys::JSON::parse(&json).ok())
        .collect();

    let end = dom::now_ms() + CONFETTI_MS;
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        for burst in &bursts {
            let _ = confetti.call1(&JsValue::NULL, burst);
        }
        if ts >= end {
            // Drop the closure to end the loop.
            f.borrow_mut().take();
            return;
        }
        if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(cb) = g.borrow().as_ref() {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

fn ensure_keyframes(doc: &Document) -> Result<(), GameError> {
    if doc.get_element_by_id(KEYFRAMES_STYLE_ID).is_some() {
        return Ok(());
    }
    let style = doc.create_element("style")?;
    style.set_id(KEYFRAMES_STYLE_ID);
    style.set_text_content(Some(KEYFRAMES));
    if let Some(head) = doc.head() {
        head.append_child(&style)?;
    }
    Ok(())
}

fn show_overlay(config: &PageConfig, winner: Option<&str>) -> Result<(), GameError> {
    let doc = dom::document()?;
    if doc.get_element_by_id(OVERLAY_ID).is_some() {
        return Ok(());
    }
    ensure_keyframes(&doc)?;

    let overlay = doc.create_element("div")?;
    overlay.set_id(OVERLAY_ID);
    overlay.set_attribute("style", OVERLAY_STYLE)?;
    overlay.set_attribute("role", "dialog")?;
    overlay.set_attribute("aria-modal", "true")?;

    let modal = doc.create_element("div")?;
    modal.set_attribute("style", MODAL_STYLE)?;

    let title = doc.create_element("h2")?;
    title.set_attribute("style", TITLE_STYLE)?;
    title.set_text_content(Some("¡Correcto!"));
    modal.append_child(&title)?;

    if let Some(name) = winner {
        let line = dom::create_with_class(&doc, "p", "victory-name")?;
        line.set_attribute("style", "margin-bottom:1rem;font-size:1.1rem")?;
        line.set_text_content(Some(&format!("Era {name}")));
        modal.append_child(&line)?;
    }

    let back = doc.create_element("a")?;
    back.set_attribute("href", &config.dashboard_url)?;
    back.set_attribute("style", BUTTON_STYLE)?;
    back.set_text_content(Some("Volver al Dashboard"));
    modal.append_child(&back)?;

    append_extra_play(&doc, &modal, &config.extra_play, &config.csrf_token)?;

    overlay.append_child(&modal)?;
    doc.body()
        .ok_or_else(|| GameError::missing("body"))?
        .append_child(&overlay)?;
    log::info!("victory overlay shown");
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BetError {
    NotANumber,
    NotPositive,
}

impl BetError {
    pub fn message(&self) -> &'static str {
        match self {
            BetError::NotANumber => "La apuesta debe ser un número entero.",
            BetError::NotPositive => "La apuesta debe ser mayor que cero.",
        }
    }
}

/// Wager amounts are positive whole points.
pub fn parse_bet(raw: &str) -> Result<u32, BetError> {
    let raw = raw.trim();
    if let Some(rest) = raw.strip_prefix('-') {
        return match rest.parse::<u64>() {
            Ok(_) => Err(BetError::NotPositive),
            Err(_) => Err(BetError::NotANumber),
        };
    }
    match raw.parse::<u32>() {
        Ok(0) => Err(BetError::NotPositive),
        Ok(n) => Ok(n),
        Err(_) => Err(BetError::NotANumber),
    }
}

fn append_extra_play(
    doc: &Document,
    modal: &Element,
    offer: &ExtraPlayOffer,
    csrf: &str,
) -> Result<(), GameError> {
    let url = match offer.availability() {
        ExtraPlayAvailability::Unavailable => return Ok(()),
        ExtraPlayAvailability::CapReached => {
            let note = dom::create_with_class(doc, "p", "extra-play-cap")?;
            note.set_attribute("style", "margin-top:1rem;color:#6b7280;font-size:.9rem")?;
            note.set_text_content(Some("Ya has jugado el máximo de partidas extra hoy."));
            modal.append_child(&note)?;
            return Ok(());
        }
        ExtraPlayAvailability::Offer(url) => url,
    };

    let reveal = doc.create_element("button")?;
    reveal.set_attribute("type", "button")?;
    reveal.set_attribute("style", BUTTON_STYLE)?;
    reveal.set_text_content(Some("Jugar otra partida"));

    let form: HtmlFormElement = doc
        .create_element("form")?
        .dyn_into()
        .map_err(JsValue::from)?;
    form.set_id(EXTRA_PLAY_FORM_ID);
    form.set_method("post");
    form.set_action(&url);
    form.set_attribute("style", "display:none;margin-top:1rem")?;
    form.set_inner_html(&format!(
        r#"<input type="hidden" name="csrfmiddlewaretoken">
<label style="display:block;margin-bottom:.5rem">Apuesta (puntos)
  <input type="number" name="bet_amount" min="1" step="1" required style="width:6rem;margin-left:.5rem;border:1px solid #d1d5db;border-radius:.375rem;padding:.25rem .5rem">
</label>
<p class="extra-play-error" style="color:#b91c1c;font-size:.85rem;min-height:1rem"></p>
<button type="submit" style="{BUTTON_STYLE}">Apostar y jugar</button>"#
    ));
    if let Some(token) = form.query_selector("input[name=csrfmiddlewaretoken]")? {
        token.set_attribute("value", csrf)?;
    }

    {
        let form = form.clone();
        let reveal_btn = reveal.clone();
        let closure = Closure::wrap(Box::new(move |_evt: Event| {
            dom::set_style(&form, "display", "block");
            dom::set_style(&reveal_btn, "display", "none");
        }) as Box<dyn FnMut(_)>);
        reveal.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let form_ref = form.clone();
        let closure = Closure::wrap(Box::new(move |evt: Event| {
            let raw = form_ref
                .query_selector("input[name=bet_amount]")
                .ok()
                .flatten()
                .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
                .map(|input| input.value())
                .unwrap_or_default();
            let error_line = form_ref.query_selector(".extra-play-error").ok().flatten();
            match parse_bet(&raw) {
                Ok(bet) => log::info!("starting extra play with a bet of {bet}"),
                Err(err) => {
                    evt.prevent_default();
                    if let Some(line) = error_line {
                        line.set_text_content(Some(err.message()));
                    }
                }
            }
        }) as Box<dyn FnMut(_)>);
        form.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    modal.append_child(&reveal)?;
    modal.append_child(&form)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bets_must_be_positive_integers() {
        assert_eq!(parse_bet("25"), Ok(25));
        assert_eq!(parse_bet(" 3 "), Ok(3));
        assert_eq!(parse_bet("0"), Err(BetError::NotPositive));
        assert_eq!(parse_bet("-4"), Err(BetError::NotPositive));
        assert_eq!(parse_bet("2.5"), Err(BetError::NotANumber));
        assert_eq!(parse_bet(""), Err(BetError::NotANumber));
        assert_eq!(parse_bet("abc"), Err(BetError::NotANumber));
    }

    #[test]
    fn reveal_outcome_depends_on_who_won_the_race() {
        assert_eq!(
            RevealOutcome::from_tag(Some(ANIMATION_TAG.into()), true),
            RevealOutcome::AnimationEnded
        );
        assert_eq!(
            RevealOutcome::from_tag(Some(TIMEOUT_TAG.into()), true),
            RevealOutcome::TimedOut
        );
        assert_eq!(RevealOutcome::from_tag(None, true), RevealOutcome::TimedOut);
        assert_eq!(
            RevealOutcome::from_tag(Some(TIMEOUT_TAG.into()), false),
            RevealOutcome::NoCells
        );
    }

    #[test]
    fn confetti_bursts_come_from_both_sides() {
        let json = serde_json::to_string(&side_bursts()).unwrap();
        assert!(json.contains(r#""particleCount":12"#));
        assert!(json.contains(r#""origin":{"x":0.0,"y":0.7}"#));
        assert!(json.contains(r#""angle":120"#));
    }
}
