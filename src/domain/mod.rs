//! Domain layer: chess types, rules, clock and input handling.
//! Nothing in here knows about GPUI.

mod board_layout;
mod chess;
mod clock;
mod game_over;
mod gesture;
mod history;
mod notify;
mod rules;
mod scheduler;

pub use board_layout::{BOARD_PADDING, BoardLayout, PIECE_SCALE, Point};
pub use chess::{
    Piece, PieceColor, PieceKind, kind_to_role, role_to_kind, shakmaty_to_piece, to_row_col,
    to_square,
};
pub use clock::{ChessClock, TimeControl, format_clock};
pub use game_over::{GameOverReason, GameOverRecord};
pub use gesture::{
    BoardProbe, CaptureGuard, CaptureRegistry, DragState, GestureEvent, GestureUnifier,
    InputDevice, RawInput,
};
pub use history::{MoveHistory, MovePair};
pub use notify::{Cue, CuePlayer, LogCuePlayer, NotificationDispatcher, commit_cue};
pub use rules::{
    AppliedMove, LegalTarget, MoveFlags, MoveRequest, RulesEngine, RulesError, STARTING_FEN,
    ShakmatyRules,
};
pub use scheduler::{Scheduler, TimerHandle};
