//! Two-player chess clock with Fischer increment.
//!
//! The clock itself is passive: the session's repeating timer calls
//! [`ChessClock::tick`] with the side to move, and the commit protocol calls
//! [`ChessClock::apply_increment`] once the move is final.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::PieceColor;

/// Base time plus per-move increment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TimeControl {
    pub base_ms: u64,
    #[serde(default)]
    pub increment_ms: u64,
}

impl TimeControl {
    /// Longest base or increment a config may ask for: one day
    pub const MAX_MS: u64 = 24 * 60 * 60 * 1_000;

    pub fn new(base: Duration, increment: Duration) -> Self {
        Self {
            base_ms: base.as_millis() as u64,
            increment_ms: increment.as_millis() as u64,
        }
    }

    /// e.g. `TimeControl::minutes(3, 2)` for 3+2
    pub fn minutes(base_minutes: u64, increment_seconds: u64) -> Self {
        Self {
            base_ms: base_minutes * 60_000,
            increment_ms: increment_seconds * 1_000,
        }
    }
}

impl Default for TimeControl {
    fn default() -> Self {
        Self::minutes(10, 0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChessClock {
    control: TimeControl,
    white_ms: i64,
    black_ms: i64,
    active: PieceColor,
    running: bool,
}

impl ChessClock {
    pub fn new(control: TimeControl) -> Self {
        let base = millis(control.base_ms);
        Self {
            control,
            white_ms: base,
            black_ms: base,
            active: PieceColor::White,
            running: false,
        }
    }

    pub fn control(&self) -> TimeControl {
        self.control
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn active(&self) -> PieceColor {
        self.active
    }

    pub fn set_active(&mut self, color: PieceColor) {
        self.active = color;
    }

    /// Remaining time; negative once a flag has fallen
    pub fn remaining_ms(&self, color: PieceColor) -> i64 {
        match color {
            PieceColor::White => self.white_ms,
            PieceColor::Black => self.black_ms,
        }
    }

    fn remaining_mut(&mut self, color: PieceColor) -> &mut i64 {
        match color {
            PieceColor::White => &mut self.white_ms,
            PieceColor::Black => &mut self.black_ms,
        }
    }

    /// Returns true if the clock was stopped before
    pub fn start(&mut self) -> bool {
        !std::mem::replace(&mut self.running, true)
    }

    /// Returns true if the clock was running before
    pub fn pause(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    /// Pause and restore both sides to the base time, white to move
    pub fn reset(&mut self) {
        *self = Self::new(self.control);
    }

    /// Changing the time control always pauses and fully resets
    pub fn set_time_control(&mut self, control: TimeControl) {
        *self = Self::new(control);
    }

    /// Deduct one tick from `side`. Ignored while stopped.
    pub fn tick(&mut self, side: PieceColor, period: Duration) {
        if !self.running {
            return;
        }
        self.active = side;
        let spent = millis(u64::try_from(period.as_millis()).unwrap_or(u64::MAX));
        let remaining = self.remaining_mut(side);
        *remaining = remaining.saturating_sub(spent);
    }

    pub fn apply_increment(&mut self, color: PieceColor) {
        let increment = millis(self.control.increment_ms);
        if increment > 0 {
            let remaining = self.remaining_mut(color);
            *remaining = remaining.saturating_add(increment);
        }
    }

    /// Side whose time has run out, white checked first
    pub fn flagged(&self) -> Option<PieceColor> {
        [PieceColor::White, PieceColor::Black]
            .into_iter()
            .find(|&color| self.remaining_ms(color) <= 0)
    }
}

impl Default for ChessClock {
    fn default() -> Self {
        Self::new(TimeControl::default())
    }
}

/// Clock face text: `m:ss`, or `s.t` below ten seconds
pub fn format_clock(remaining_ms: i64) -> String {
    let ms = remaining_ms.max(0);
    if ms < 10_000 {
        format!("{}.{}", ms / 1000, (ms % 1000) / 100)
    } else {
        let total_seconds = ms / 1000;
        format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
    }
}

fn millis(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_huge_base_does_not_wrap() {
        let clock = ChessClock::new(TimeControl {
            base_ms: u64::MAX,
            increment_ms: u64::MAX,
        });
        assert_eq!(clock.remaining_ms(PieceColor::White), i64::MAX);
        assert_eq!(clock.flagged(), None);
    }

    const TICK: Duration = Duration::from_millis(100);

    #[test]
    fn test_default_is_ten_minutes_paused() {
        let clock = ChessClock::default();
        assert_eq!(clock.remaining_ms(PieceColor::White), 600_000);
        assert_eq!(clock.remaining_ms(PieceColor::Black), 600_000);
        assert_eq!(clock.active(), PieceColor::White);
        assert!(!clock.is_running());
    }

    #[test]
    fn test_start_and_pause_are_idempotent() {
        let mut clock = ChessClock::default();
        assert!(clock.start());
        assert!(!clock.start());
        assert!(clock.is_running());
        assert!(clock.pause());
        assert!(!clock.pause());
        assert!(!clock.is_running());
    }

    #[test]
    fn test_tick_only_deducts_side_to_move() {
        let mut clock = ChessClock::default();
        clock.tick(PieceColor::White, TICK);
        assert_eq!(clock.remaining_ms(PieceColor::White), 600_000);

        clock.start();
        clock.tick(PieceColor::Black, TICK);
        assert_eq!(clock.remaining_ms(PieceColor::Black), 599_900);
        assert_eq!(clock.remaining_ms(PieceColor::White), 600_000);
        assert_eq!(clock.active(), PieceColor::Black);
    }

    #[test]
    fn test_increment_applies_to_mover_only() {
        let mut clock = ChessClock::new(TimeControl::minutes(5, 5));
        clock.apply_increment(PieceColor::White);
        assert_eq!(clock.remaining_ms(PieceColor::White), 305_000);
        assert_eq!(clock.remaining_ms(PieceColor::Black), 300_000);
    }

    #[test]
    fn test_zero_increment_changes_nothing() {
        let mut clock = ChessClock::default();
        clock.apply_increment(PieceColor::Black);
        assert_eq!(clock.remaining_ms(PieceColor::Black), 600_000);
    }

    #[test]
    fn test_flag_fall() {
        let mut clock = ChessClock::new(TimeControl {
            base_ms: 50,
            increment_ms: 0,
        });
        clock.start();
        assert_eq!(clock.flagged(), None);
        clock.tick(PieceColor::White, TICK);
        assert_eq!(clock.remaining_ms(PieceColor::White), -50);
        assert_eq!(clock.flagged(), Some(PieceColor::White));
    }

    #[test]
    fn test_reset_and_time_control_change() {
        let mut clock = ChessClock::new(TimeControl::minutes(1, 0));
        clock.start();
        clock.tick(PieceColor::White, TICK);
        clock.set_active(PieceColor::Black);

        clock.reset();
        assert!(!clock.is_running());
        assert_eq!(clock.remaining_ms(PieceColor::White), 60_000);
        assert_eq!(clock.active(), PieceColor::White);

        clock.start();
        clock.set_time_control(TimeControl::minutes(3, 2));
        assert!(!clock.is_running());
        assert_eq!(clock.remaining_ms(PieceColor::Black), 180_000);
        assert_eq!(clock.control().increment_ms, 2_000);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(600_000), "10:00");
        assert_eq!(format_clock(61_500), "1:01");
        assert_eq!(format_clock(10_000), "0:10");
        assert_eq!(format_clock(9_950), "9.9");
        assert_eq!(format_clock(-300), "0.0");
    }
}
