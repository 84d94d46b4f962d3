// Client-observed game session: Playing → Won, plus the in-flight submission guard.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    Playing,
    Won,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    phase: GamePhase,
    in_flight: bool,
    attempts_played: usize,
}

impl Session {
    pub fn new(already_won: bool) -> Self {
        Self {
            phase: if already_won { GamePhase::Won } else { GamePhase::Playing },
            in_flight: false,
            attempts_played: 0,
        }
    }

    pub fn is_won(&self) -> bool {
        self.phase == GamePhase::Won
    }

    pub fn attempts_played(&self) -> usize {
        self.attempts_played
    }

    /// Claim the single submission slot. Refused once won or while a guess is pending.
    pub fn try_begin_submit(&mut self) -> bool {
        if self.phase == GamePhase::Won || self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    pub fn finish_submit(&mut self) {
        self.in_flight = false;
    }

    pub fn record_attempt(&mut self) -> usize {
        self.attempts_played += 1;
        self.attempts_played
    }

    /// Playing → Won. Returns false when the game was already won.
    pub fn record_win(&mut self) -> bool {
        let transitioned = self.phase == GamePhase::Playing;
        self.phase = GamePhase::Won;
        transitioned
    }

    pub fn controls_locked(&self) -> bool {
        self.in_flight || self.phase == GamePhase::Won
    }
}
