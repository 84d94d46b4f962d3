//! Crate-wide error type.
//!
//! Everything that can go wrong on the page funnels into [`GameError`]. Exported
//! entry points hand it back to JS as a plain string `JsValue`.

use wasm_bindgen::JsValue;

/// Message shown when the server could not be reached or answered garbage.
pub const TRANSPORT_ALERT: &str = "No se pudo contactar con el servidor. Inténtalo de nuevo.";

/// Message shown when the answer arrived but the page could not draw it.
pub const PAGE_ALERT: &str = "No se pudo actualizar la página. Recárgala para ver tu intento.";

/// Fallback text when the server rejects a guess without an `error` field.
pub const GENERIC_SERVER_ERROR: &str = "Error";

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("missing page element `{0}`")]
    MissingElement(String),
    #[error("javascript error: {0}")]
    Js(String),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("server rejected the request ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("could not reach the server: {0}")]
    Transport(String),
}

impl GameError {
    pub fn missing(selector: &str) -> Self {
        GameError::MissingElement(selector.to_string())
    }

    /// Transport failure from a rejected JS promise.
    pub fn transport(err: JsValue) -> Self {
        GameError::Transport(describe_js(&err))
    }

    /// Text to put in front of the player, if this error is meant for them.
    pub fn user_message(&self) -> &str {
        match self {
            GameError::Server { message, .. } => message,
            GameError::Transport(_) | GameError::Json(_) => TRANSPORT_ALERT,
            GameError::Js(_) | GameError::MissingElement(_) => PAGE_ALERT,
        }
    }
}

impl From<JsValue> for GameError {
    fn from(err: JsValue) -> Self {
        GameError::Js(describe_js(&err))
    }
}

impl From<GameError> for JsValue {
    fn from(err: GameError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

fn describe_js(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
