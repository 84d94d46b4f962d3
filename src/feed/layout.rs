// Row geometry, header sync and reveal timing for the attempt feed.

/// Delay between two consecutive cell flips.
pub const CELL_STAGGER_MS: u32 = 350;
/// CSS duration of one flip (`--animate-duration`).
pub const FLIP_DURATION: &str = "0.9s";
pub const FLIP_DURATION_MS: u32 = 900;
/// Extra wait on top of the expected reveal before giving up on `animationend`.
pub const REVEAL_SLACK_MS: u32 = 600;
/// Wait used when the row has no feedback cells to animate.
pub const EMPTY_ROW_DELAY_MS: u32 = 400;

/// Column layout of one attempt row (and of the header once synced).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowLayout {
    pub columns: usize,
    pub gap_rem: f32,
}

impl RowLayout {
    pub fn for_columns(columns: usize) -> Self {
        Self {
            columns,
            gap_rem: gap_for_columns(columns),
        }
    }

    pub fn grid_template_columns(&self) -> String {
        format!("repeat({}, minmax(0,1fr))", self.columns)
    }

    pub fn gap(&self) -> String {
        format!("{}rem", self.gap_rem)
    }
}

/// Fewer attributes get roomier gaps; never grows with the column count.
pub fn gap_for_columns(columns: usize) -> f32 {
    match columns {
        0..=4 => 0.75,
        5..=7 => 0.5,
        8..=10 => 0.35,
        _ => 0.25,
    }
}

/// Header state owned by the feed controller. The header is revealed and laid out
/// from the first row ever rendered, and left alone afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeedHeader {
    layout: Option<RowLayout>,
}

impl FeedHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rendered row. Returns the layout to apply when this is the first one.
    pub fn observe_row(&mut self, row: RowLayout) -> Option<RowLayout> {
        if self.layout.is_some() {
            return None;
        }
        self.layout = Some(row);
        self.layout
    }
}

/// When each of `cells` squares is revealed. `None` means "right away, no flip".
pub fn reveal_schedule(cells: usize, animate: bool) -> Vec<Option<u32>> {
    (0..cells)
        .map(|i| animate.then(|| i as u32 * CELL_STAGGER_MS))
        .collect()
}

/// Upper bound for waiting on the last feedback square's `animationend`.
///
/// The identity square flips first, so the last of `feedback_cells` squares starts
/// at slot `feedback_cells` of the row's schedule.
pub fn reveal_fallback_ms(feedback_cells: usize) -> u32 {
    if feedback_cells == 0 {
        return EMPTY_ROW_DELAY_MS;
    }
    feedback_cells as u32 * CELL_STAGGER_MS + FLIP_DURATION_MS + REVEAL_SLACK_MS
}
