//! Attempt feed controller.
//!
//! Owns the visible list of attempts (newest on top), the column header, the guess
//! form and the client view of the session. History embedded in the page is drawn
//! statically on start; live guesses are posted in the background and flipped in
//! cell by cell. A winning answer locks the form for good and, once the last flip
//! has finished, brings up the victory overlay.

pub mod layout;
pub mod net;
pub mod render;
pub mod session;
pub mod victory;

use std::cell::RefCell;

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, HtmlFormElement};

use crate::config::{
    ATTEMPTS_CONTAINER_ID, ATTEMPTS_HEADER_ID, EMOJI_HINT_ID, GUESS_FORM_ID,
    INITIAL_ATTEMPTS_ID, PageConfig,
};
use crate::dom;
use crate::error::GameError;
use crate::model::{Attempt, GameSessionFlags, GuessResponse, history_in_play_order};
use layout::{FeedHeader, RowLayout, reveal_fallback_ms};
use net::{GuessSubmission, RetryPolicy};
use session::Session;

pub const NAMES_ATTRIBUTE: &str = "data-names";
pub const HINT_GLYPH_CLASS: &str = "emoji-hint-glyph";

thread_local! {
    static FEED: RefCell<Option<AttemptFeed>> = const { RefCell::new(None) };
}

fn with_feed<R>(f: impl FnOnce(&mut AttemptFeed) -> R) -> Option<R> {
    FEED.with(|cell| cell.borrow_mut().as_mut().map(f))
}

/// Runtime state of the feed on this page.
struct AttemptFeed {
    doc: Document,
    form: HtmlFormElement,
    container: Element,
    header_el: Option<Element>,
    header: FeedHeader,
    config: PageConfig,
    session: Session,
}

/// Everything the post-reveal celebration needs, detached from the feed borrow.
struct Victory {
    winner: String,
    last_cell: Option<Element>,
    fallback_ms: u32,
    attempts_played: usize,
}

impl AttemptFeed {
    fn new(
        doc: Document,
        form: HtmlFormElement,
        container: Element,
        header_el: Option<Element>,
        config: PageConfig,
    ) -> Self {
        let session = Session::new(config.already_won);
        Self {
            doc,
            form,
            container,
            header_el,
            header: FeedHeader::new(),
            config,
            session,
        }
    }

    /// Draw the embedded history, oldest first, without animation.
    fn bootstrap(&mut self) -> usize {
        let Some(script) = self.doc.get_element_by_id(INITIAL_ATTEMPTS_ID) else {
            return 0;
        };
        let raw = script.text_content().unwrap_or_default();
        let history = match history_in_play_order(&raw) {
            Ok(history) => history,
            Err(err) => {
                log::error!("embedded attempt history is not valid JSON: {err}");
                return 0;
            }
        };
        let mut rendered = 0;
        for attempt in &history {
            match self.render_attempt(attempt, false) {
                Ok(_) => rendered += 1,
                Err(err) => log::error!("could not render attempt {}: {err}", attempt.name),
            }
        }
        log::debug!("restored {rendered} attempts from history");
        rendered
    }

    /// Build, prepend and reveal one row.
    fn render_attempt(
        &mut self,
        attempt: &Attempt,
        animate: bool,
    ) -> Result<render::RenderedRow, GameError> {
        let row = render::prepend_row(
            &self.doc,
            &self.container,
            attempt,
            &self.config.placeholder_image,
            animate,
        )?;
        if let Some(layout) = self.header.observe_row(row.layout) {
            self.show_header(layout);
        }
        self.session.record_attempt();
        Ok(row)
    }

    fn show_header(&self, layout: RowLayout) {
        let Some(header) = &self.header_el else { return };
        dom::set_style(header, "display", "grid");
        dom::set_style(header, "grid-template-columns", &layout.grid_template_columns());
        dom::set_style(header, "gap", &layout.gap());
    }

    /// Claim the submission slot and snapshot the form; `None` when a guess is refused.
    fn begin_submit(&mut self) -> Option<GuessSubmission> {
        if !self.session.try_begin_submit() {
            log::debug!("guess ignored: game won or another guess pending");
            return None;
        }
        match GuessSubmission::capture(&self.form, &self.config.csrf_token) {
            Ok(submission) => {
                victory::set_form_locked(&self.form, true);
                Some(submission)
            }
            Err(err) => {
                log::error!("could not read the guess form: {err}");
                self.session.finish_submit();
                None
            }
        }
    }

    /// Release the submission slot. While still playing, the form comes back with
    /// the caret in the guess input.
    fn finish_submit(&mut self) {
        self.session.finish_submit();
        if self.session.controls_locked() {
            return;
        }
        victory::set_form_locked(&self.form, false);
        if let Some(input) = crate::config::guess_input(&self.doc) {
            if let Err(err) = input.focus() {
                log::debug!("could not focus the guess input: {err:?}");
            }
        }
    }

    /// Apply a successful answer. Returns the pending celebration for a winning guess.
    fn accept(&mut self, resp: &GuessResponse) -> Result<Option<Victory>, GameError> {
        self.form.reset();
        self.apply_flags(resp.flags());
        let row = self.render_attempt(&resp.attempt, true)?;
        if !(resp.won && self.session.record_win()) {
            return Ok(None);
        }
        log::info!("game won with {}", resp.attempt.name);
        Ok(Some(Victory {
            winner: resp.attempt.name.clone(),
            last_cell: row.last_feedback_cell,
            fallback_ms: reveal_fallback_ms(row.feedback_cells),
            attempts_played: self.session.attempts_played(),
        }))
    }

    /// Candidate names and hint glyphs replace the current ones right away.
    fn apply_flags(&self, flags: GameSessionFlags<'_>) {
        if let Some(names) = flags.remaining_names {
            self.replace_candidate_names(names);
        }
        if let Some(glyphs) = flags.emoji_hint {
            if let Err(err) = self.replace_emoji_hint(glyphs) {
                log::warn!("could not update the emoji hint: {err}");
            }
        }
    }

    fn replace_candidate_names(&self, names: &[String]) {
        let Some(input) = crate::config::guess_input(&self.doc) else {
            return;
        };
        match serde_json::to_string(names) {
            Ok(json) => {
                if let Err(err) = input.set_attribute(NAMES_ATTRIBUTE, &json) {
                    log::warn!("could not refresh candidate names: {err:?}");
                }
            }
            Err(err) => log::warn!("could not encode candidate names: {err}"),
        }
    }

    fn replace_emoji_hint(&self, glyphs: &[String]) -> Result<(), GameError> {
        let Some(hint) = self.doc.get_element_by_id(EMOJI_HINT_ID) else {
            return Ok(());
        };
        hint.set_text_content(None);
        for glyph in glyphs {
            let span = dom::create_with_class(&self.doc, "span", HINT_GLYPH_CLASS)?;
            span.set_text_content(Some(glyph));
            hint.append_child(&span)?;
        }
        Ok(())
    }
}

/// Wire the feed to the page. Called once from JS.
pub fn start() -> Result<(), GameError> {
    if FEED.with(|cell| cell.borrow().is_some()) {
        log::warn!("attempt feed already started");
        return Ok(());
    }
    let doc = dom::document()?;
    let form: HtmlFormElement = dom::require_by_id(&doc, GUESS_FORM_ID)?;
    let container: Element = dom::require_by_id(&doc, ATTEMPTS_CONTAINER_ID)?;
    let header_el = doc.get_element_by_id(ATTEMPTS_HEADER_ID);
    let config = PageConfig::from_document(&doc);

    let mut feed = AttemptFeed::new(doc, form.clone(), container, header_el, config.clone());
    feed.bootstrap();
    FEED.with(|cell| *cell.borrow_mut() = Some(feed));

    {
        let closure = Closure::wrap(Box::new(move |evt: Event| {
            evt.prevent_default();
            if let Some(submission) = with_feed(|feed| feed.begin_submit()).flatten() {
                spawn_local(run_submission(submission));
            }
        }) as Box<dyn FnMut(_)>);
        form.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    log::info!(
        "attempt feed started for {}",
        config.game_slug.as_deref().unwrap_or("unknown game")
    );
    if config.already_won {
        victory::set_form_locked(&form, true);
        spawn_local(async move {
            TimeoutFuture::new(victory::ALREADY_WON_DELAY_MS).await;
            if let Err(err) = victory::celebrate(&config, config.winner_name.as_deref()) {
                log::error!("could not show the victory overlay: {err}");
            }
        });
    }
    Ok(())
}

async fn run_submission(submission: GuessSubmission) {
    let outcome = net::post_guess(&submission).await;
    let accepted = match outcome {
        Ok(resp) => with_feed(|feed| feed.accept(&resp)).unwrap_or(Ok(None)),
        Err(err) => Err(err),
    };
    with_feed(|feed| feed.finish_submit());
    match accepted {
        Ok(Some(won)) => celebrate_after_reveal(won).await,
        Ok(None) => {}
        Err(err) => {
            log::warn!("guess failed: {err}");
            dom::alert(err.user_message());
        }
    }
}

async fn celebrate_after_reveal(won: Victory) {
    let outcome = victory::wait_for_reveal(won.last_cell.as_ref(), won.fallback_ms).await;
    log::debug!("winning row reveal finished: {outcome:?}");
    let Some(config) = with_feed(|feed| {
        victory::set_form_locked(&feed.form, true);
        feed.config.clone()
    }) else {
        return;
    };
    if let Err(err) = victory::celebrate(&config, Some(&won.winner)) {
        log::error!("could not show the victory overlay: {err}");
    }
    let Some(challenge) = config.challenge else {
        return;
    };
    let csrf = config.csrf_token;
    let attempts = won.attempts_played;
    spawn_local(async move {
        let policy = RetryPolicy::default();
        net::report_challenge(challenge.report_url, csrf, attempts, policy).await;
    });
}
