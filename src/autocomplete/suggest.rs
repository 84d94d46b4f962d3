// Candidate filtering and keyboard navigation over the suggestion list.

/// Never show more than this many suggestions.
pub const MAX_SUGGESTIONS: usize = 15;

/// Parse the `data-names` payload. A missing attribute is an empty list.
pub fn parse_names(raw: Option<&str>) -> Result<Vec<String>, serde_json::Error> {
    match raw {
        None => Ok(Vec::new()),
        Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(raw),
    }
}

/// Case-insensitive substring match, capped, in the list's own order.
pub fn filter_names<'a>(names: &'a [String], query: &str) -> Vec<&'a str> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    names
        .iter()
        .filter(|name| name.to_lowercase().contains(&needle))
        .take(MAX_SUGGESTIONS)
        .map(String::as_str)
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavKey {
    Down,
    Up,
    Tab,
    Enter,
    Escape,
    Other,
}

impl NavKey {
    pub fn from_key(key: &str) -> Self {
        match key {
            "ArrowDown" => NavKey::Down,
            "ArrowUp" => NavKey::Up,
            "Tab" => NavKey::Tab,
            "Enter" => NavKey::Enter,
            "Escape" => NavKey::Escape,
            _ => NavKey::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavAction {
    /// Highlight the suggestion at this index.
    Highlight(usize),
    /// Put the suggestion at this index into the input and close the list.
    Commit(usize),
    Close,
    /// Let the browser handle the key.
    Ignore,
}

impl NavAction {
    /// Whether the key's default behaviour must be suppressed.
    pub fn consumes_key(self) -> bool {
        matches!(self, NavAction::Highlight(_) | NavAction::Commit(_))
    }
}

/// Decide what a key does while `len` suggestions are open.
pub fn navigate(highlight: Option<usize>, len: usize, key: NavKey) -> NavAction {
    if len == 0 {
        return match key {
            NavKey::Escape => NavAction::Close,
            _ => NavAction::Ignore,
        };
    }
    let highlight = highlight.filter(|&i| i < len);
    match key {
        NavKey::Down => NavAction::Highlight(match highlight {
            Some(i) => (i + 1) % len,
            None => 0,
        }),
        NavKey::Up => NavAction::Highlight(match highlight {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        }),
        NavKey::Tab => highlight.map_or(NavAction::Ignore, NavAction::Commit),
        NavKey::Enter => NavAction::Commit(highlight.unwrap_or(0)),
        NavKey::Escape => NavAction::Close,
        NavKey::Other => NavAction::Ignore,
    }
}
