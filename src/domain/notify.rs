//! Audio/haptic cues and the dispatcher that plays them.
//!
//! The controller only decides which cue fires; playing it is someone else's
//! problem. Playback errors stop at the dispatcher.

use std::time::Duration;

use tracing::{debug, info};

use crate::domain::MoveFlags;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    Move,
    Capture,
    Castle,
    Check,
    GameOver,
    Illegal,
}

impl Cue {
    /// Vibration pattern (on, off, on, ...) for devices with haptics
    pub fn haptic_pattern(self) -> &'static [Duration] {
        const SHORT: &[Duration] = &[Duration::from_millis(10)];
        const FIRM: &[Duration] = &[Duration::from_millis(25)];
        const DOUBLE: &[Duration] = &[
            Duration::from_millis(20),
            Duration::from_millis(40),
            Duration::from_millis(20),
        ];
        const LONG: &[Duration] = &[Duration::from_millis(120)];

        match self {
            Cue::Move | Cue::Castle => SHORT,
            Cue::Capture => FIRM,
            Cue::Check | Cue::Illegal => DOUBLE,
            Cue::GameOver => LONG,
        }
    }
}

/// The one cue a committed move earns.
///
/// Priority: checkmate (no cue here, the game-over sequence plays its own),
/// check, castle, capture, plain move.
pub fn commit_cue(flags: MoveFlags, gives_check: bool, gives_mate: bool) -> Option<Cue> {
    if gives_mate {
        None
    } else if gives_check {
        Some(Cue::Check)
    } else if flags.castle {
        Some(Cue::Castle)
    } else if flags.capture {
        Some(Cue::Capture)
    } else {
        Some(Cue::Move)
    }
}

/// Something that can make a cue audible or tangible
pub trait CuePlayer {
    fn play(&mut self, cue: Cue) -> anyhow::Result<()>;
}

/// Writes cues to the log; the default when no audio device is wired up
#[derive(Debug, Default)]
pub struct LogCuePlayer;

impl CuePlayer for LogCuePlayer {
    fn play(&mut self, cue: Cue) -> anyhow::Result<()> {
        info!(?cue, haptic = ?cue.haptic_pattern(), "cue");
        Ok(())
    }
}

/// Fire-and-forget delivery of cues to a player, with an optional fallback
pub struct NotificationDispatcher {
    primary: Box<dyn CuePlayer>,
    fallback: Option<Box<dyn CuePlayer>>,
}

impl NotificationDispatcher {
    pub fn new(primary: Box<dyn CuePlayer>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Box<dyn CuePlayer>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn dispatch(&mut self, cue: Cue) {
        let Err(err) = self.primary.play(cue) else {
            return;
        };
        debug!(?cue, %err, "cue playback failed");
        if let Some(fallback) = self.fallback.as_mut() {
            if let Err(err) = fallback.play(cue) {
                debug!(?cue, %err, "fallback cue playback failed");
            }
        }
    }

    pub fn dispatch_all(&mut self, cues: impl IntoIterator<Item = Cue>) {
        for cue in cues {
            self.dispatch(cue);
        }
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new(Box::new(LogCuePlayer))
    }
}
