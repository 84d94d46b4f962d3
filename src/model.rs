//! Wire data shared with the server: attempts, feedback cells and the guess
//! response. Everything here is plain data and can be exercised natively.

use serde::{Deserialize, Deserializer, Serialize};

/// One evaluated guess as the server serializes it.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Attempt {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub guess_image_url: Option<String>,
    #[serde(default)]
    pub feedback: Vec<FeedbackCell>,
}

/// Result of comparing one attribute of the guess with the target.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct FeedbackCell {
    #[serde(default, deserialize_with = "display_value")]
    pub value: String,
    #[serde(default)]
    pub arrow: Option<String>,
    #[serde(default)]
    pub correct: bool,
    #[serde(default)]
    pub partial: bool,
    #[serde(default)]
    pub superior: bool,
}

/// Visual state of a feedback cell. Maps onto the `square-*` CSS classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellState {
    Good,
    Part,
    Superior,
    Bad,
}

impl CellState {
    /// Priority is fixed: correct, then partial, then superior, else bad.
    pub fn from_flags(correct: bool, partial: bool, superior: bool) -> Self {
        if correct {
            CellState::Good
        } else if partial {
            CellState::Part
        } else if superior {
            CellState::Superior
        } else {
            CellState::Bad
        }
    }

    pub fn class_suffix(self) -> &'static str {
        match self {
            CellState::Good => "good",
            CellState::Part => "part",
            CellState::Superior => "superior",
            CellState::Bad => "bad",
        }
    }

    pub fn class_name(self) -> String {
        format!("square-{}", self.class_suffix())
    }
}

impl FeedbackCell {
    pub fn state(&self) -> CellState {
        CellState::from_flags(self.correct, self.partial, self.superior)
    }

    /// Value followed by the directional arrow, if any.
    pub fn label(&self) -> String {
        match self.arrow.as_deref() {
            Some(arrow) => format!("{}{}", self.value, arrow),
            None => self.value.clone(),
        }
    }
}

/// What the identity (first) cell of a row shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentityDisplay {
    Image(String),
    Icon(String),
    NameOnly,
}

impl IdentityDisplay {
    pub fn for_attempt(attempt: &Attempt) -> Self {
        if let Some(url) = non_blank(&attempt.guess_image_url) {
            IdentityDisplay::Image(url.to_string())
        } else if let Some(url) = non_blank(&attempt.icon) {
            IdentityDisplay::Icon(url.to_string())
        } else {
            IdentityDisplay::NameOnly
        }
    }
}

impl Attempt {
    pub fn identity(&self) -> IdentityDisplay {
        IdentityDisplay::for_attempt(self)
    }

    /// Identity cell plus one column per feedback cell.
    pub fn column_count(&self) -> usize {
        self.feedback.len() + 1
    }
}

/// Successful answer of the guess endpoint.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GuessResponse {
    pub attempt: Attempt,
    #[serde(default)]
    pub won: bool,
    #[serde(default)]
    pub remaining_names: Option<Vec<String>>,
    #[serde(default)]
    pub emoji_hint: Option<Vec<String>>,
}

impl GuessResponse {
    pub fn flags(&self) -> GameSessionFlags<'_> {
        GameSessionFlags {
            won: self.won,
            remaining_names: self.remaining_names.as_deref(),
            emoji_hint: self.emoji_hint.as_deref(),
        }
    }
}

/// Transient session signals carried by each guess response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameSessionFlags<'a> {
    pub won: bool,
    pub remaining_names: Option<&'a [String]>,
    pub emoji_hint: Option<&'a [String]>,
}

/// Body of a rejected request.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Parse the embedded history (newest first) into play order (oldest first).
pub fn history_in_play_order(raw: &str) -> Result<Vec<Attempt>, serde_json::Error> {
    let mut attempts: Vec<Attempt> = serde_json::from_str(raw)?;
    attempts.reverse();
    Ok(attempts)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// Attribute values come back as strings, numbers, lists or null.
fn display_value<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(render_value(&value))
}

fn render_value(value: &serde_json::Value) -> String {
    use serde_json::Value;
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render_value).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}
