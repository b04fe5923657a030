//! In-game time.

/// Minutes per in-game day.
pub const MINUTES_PER_DAY: u64 = 24 * 60;

/// In-game minutes elapsed since the session began.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameClock {
    minutes: u64,
}

impl GameClock {
    /// A clock at minute zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move forward. Returns the new total.
    pub fn advance(&mut self, minutes: u64) -> u64 {
        self.minutes = self.minutes.saturating_add(minutes);
        self.minutes
    }

    /// Total minutes elapsed.
    pub fn minutes(&self) -> u64 {
        self.minutes
    }

    /// Zero-based day number.
    pub fn day(&self) -> u64 {
        self.minutes / MINUTES_PER_DAY
    }

    /// `(hour, minute)` within the current day.
    pub fn time_of_day(&self) -> (u64, u64) {
        let in_day = self.minutes % MINUTES_PER_DAY;
        (in_day / 60, in_day % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates() {
        let mut clock = GameClock::new();
        clock.advance(90);
        assert_eq!(clock.advance(30), 120);
        assert_eq!(clock.time_of_day(), (2, 0));
    }

    #[test]
    fn day_rollover() {
        let mut clock = GameClock::new();
        clock.advance(MINUTES_PER_DAY + 75);
        assert_eq!(clock.day(), 1);
        assert_eq!(clock.time_of_day(), (1, 15));
    }
}
