//! Read-only views of the session for the presentation layer.

use std::collections::HashSet;

use shakmaty::Square;

use crate::domain::{
    GameOverRecord, MovePair, Piece, PieceColor, PieceKind, Point, RulesEngine, format_clock,
    to_square,
};
use crate::models::session::{PromotionRequest, Session};

/// Clock face values for both sides
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClockDisplay {
    pub white_ms: i64,
    pub black_ms: i64,
    pub white_text: String,
    pub black_text: String,
    pub active: PieceColor,
    pub running: bool,
}

/// The piece being dragged and where it is
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragView {
    pub source: Square,
    pub piece: Option<Piece>,
    pub point: Point,
    pub hovered: Option<Square>,
}

/// Everything needed to draw one frame
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub pieces: Vec<(Square, Piece)>,
    pub turn: PieceColor,
    pub selection: Option<Square>,
    pub legal_targets: HashSet<Square>,
    pub capture_targets: HashSet<Square>,
    pub last_move: Option<(Square, Square)>,
    /// King of the side to move, when it is in check
    pub checked_king: Option<Square>,
    /// Bumped every time the check warning should pulse
    pub check_flashes: u32,
    /// Bumped every time a decisive result is celebrated
    pub celebrations: u32,
    pub clock: ClockDisplay,
    pub game_over: Option<GameOverRecord>,
    /// The game has ended, whether or not its record is showing
    pub finished: bool,
    /// A decisive result is being celebrated and its record is on the way
    pub reveal_pending: bool,
    pub promotion: Option<PromotionRequest>,
    pub drag: Option<DragView>,
    pub move_pairs: Vec<MovePair>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub flipped: bool,
    pub fen: String,
}

impl<R: RulesEngine> Session<R> {
    pub fn snapshot(&self) -> SessionSnapshot {
        let pieces: Vec<(Square, Piece)> = (0..8)
            .flat_map(|row| (0..8).map(move |col| to_square(row, col)))
            .filter_map(|square| self.rules.piece_at(square).map(|piece| (square, piece)))
            .collect();

        let turn = self.rules.turn_to_move();
        let checked_king = if self.rules.is_check() {
            pieces
                .iter()
                .find(|(_, piece)| piece.kind == PieceKind::King && piece.color == turn)
                .map(|(square, _)| *square)
        } else {
            None
        };

        let drag = self.gestures.drag_state().map(|state| DragView {
            source: state.source_square,
            piece: self.rules.piece_at(state.source_square),
            point: state.current_point,
            hovered: state.hovered_square,
        });

        let white_ms = self.clock.remaining_ms(PieceColor::White);
        let black_ms = self.clock.remaining_ms(PieceColor::Black);

        SessionSnapshot {
            pieces,
            turn,
            selection: self.selection,
            legal_targets: self.legal_targets.clone(),
            capture_targets: self.capture_targets.clone(),
            last_move: self.last_move,
            checked_king,
            check_flashes: self.check_flashes,
            celebrations: self.celebrations,
            clock: ClockDisplay {
                white_ms,
                black_ms,
                white_text: format_clock(white_ms),
                black_text: format_clock(black_ms),
                active: self.clock.active(),
                running: self.clock.is_running(),
            },
            game_over: self.game_over,
            finished: self.terminal.is_some(),
            reveal_pending: self.pending_reveal.is_some(),
            promotion: self.promotion,
            drag,
            move_pairs: self.history.move_pairs(self.first_move_number),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            flipped: self.layout.flipped,
            fen: self.rules.export_position(),
        }
    }
}
