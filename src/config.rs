//! Page-embedded configuration.
//!
//! The server template carries everything the front-end needs: element ids are fixed,
//! per-game settings live as `data-*` attributes on `#game-config`. Reading is done
//! once when a controller starts; absent optional pieces simply switch the matching
//! feature off.

use web_sys::{Document, Element, HtmlInputElement};

use crate::dom;

pub const GUESS_FORM_ID: &str = "guess-form";
pub const ATTEMPTS_CONTAINER_ID: &str = "attempts-container";
pub const ATTEMPTS_HEADER_ID: &str = "attempts-header";
pub const INITIAL_ATTEMPTS_ID: &str = "initial-attempts";
pub const GUESS_INPUT_ID: &str = "guess";
pub const SUGGESTIONS_ID: &str = "suggestions";
pub const EMOJI_HINT_ID: &str = "emoji-hint";
pub const GAME_CONFIG_ID: &str = "game-config";
pub const CSRF_SELECTOR: &str = "[name=csrfmiddlewaretoken]";

pub const DEFAULT_DASHBOARD_URL: &str = "/accounts/";
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "/static/img/placeholder.png";

/// Whether (and where) the player may wager for an extra round after winning.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtraPlayOffer {
    pub start_extra_url: Option<String>,
    pub max_extras_reached: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtraPlayAvailability {
    Offer(String),
    CapReached,
    Unavailable,
}

impl ExtraPlayOffer {
    pub fn availability(&self) -> ExtraPlayAvailability {
        match (&self.start_extra_url, self.max_extras_reached) {
            (None, _) => ExtraPlayAvailability::Unavailable,
            (Some(_), true) => ExtraPlayAvailability::CapReached,
            (Some(url), false) => ExtraPlayAvailability::Offer(url.clone()),
        }
    }
}

/// Challenge mode: the attempt count is reported once the game is won.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChallengeConfig {
    pub report_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageConfig {
    pub csrf_token: String,
    pub game_slug: Option<String>,
    pub extra_play: ExtraPlayOffer,
    pub already_won: bool,
    pub winner_name: Option<String>,
    pub challenge: Option<ChallengeConfig>,
    pub dashboard_url: String,
    pub placeholder_image: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            csrf_token: String::new(),
            game_slug: None,
            extra_play: ExtraPlayOffer::default(),
            already_won: false,
            winner_name: None,
            challenge: None,
            dashboard_url: DEFAULT_DASHBOARD_URL.to_string(),
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
        }
    }
}

impl PageConfig {
    pub fn from_document(doc: &Document) -> Self {
        let csrf_token = doc
            .query_selector(CSRF_SELECTOR)
            .ok()
            .flatten()
            .and_then(|el| wasm_bindgen::JsCast::dyn_into::<HtmlInputElement>(el).ok())
            .map(|input| input.value())
            .unwrap_or_default();
        if csrf_token.is_empty() {
            log::warn!("no CSRF token on the page; requests will likely be rejected");
        }
        let attrs = doc.get_element_by_id(GAME_CONFIG_ID);
        Self::from_attributes(csrf_token, |name| {
            attrs.as_ref().and_then(|el: &Element| el.get_attribute(name))
        })
    }

    /// Build from an attribute lookup (`data-*` name → value).
    pub fn from_attributes<F>(csrf_token: String, attr: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |name: &str| {
            attr(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();
        let is_challenge = parse_flag(attr("data-is-challenge").as_deref());
        let challenge = match (is_challenge, text("data-challenge-report-url")) {
            (true, Some(report_url)) => Some(ChallengeConfig { report_url }),
            (true, None) => {
                log::warn!("challenge page without a report URL; results will not be reported");
                None
            }
            (false, _) => None,
        };
        Self {
            csrf_token,
            game_slug: text("data-game-slug"),
            extra_play: ExtraPlayOffer {
                start_extra_url: text("data-start-extra-url"),
                max_extras_reached: parse_flag(attr("data-max-extras-reached").as_deref()),
            },
            already_won: parse_flag(attr("data-already-won").as_deref()),
            winner_name: text("data-winner-name"),
            challenge,
            dashboard_url: text("data-dashboard-url").unwrap_or(defaults.dashboard_url),
            placeholder_image: text("data-placeholder-image")
                .unwrap_or(defaults.placeholder_image),
        }
    }
}

/// Template booleans arrive as `"true"`, `"True"`, `"1"`, ...
pub fn parse_flag(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("true" | "1" | "yes")
    )
}

/// Guess input whose `data-names` carries the candidate list.
pub fn guess_input(doc: &Document) -> Option<HtmlInputElement> {
    dom::by_id(doc, GUESS_INPUT_ID)
}
