//! Rules engine contract and its shakmaty-backed implementation.
//!
//! The session controller only ever talks to [`RulesEngine`]; it trusts the
//! engine's verdicts on legality, check and game termination and never touches
//! the position directly.

use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::{CastlingMode, Chess, EnPassantMode, File, Move, Position, Square};

use crate::domain::{Piece, PieceColor, PieceKind, kind_to_role, role_to_kind, shakmaty_to_piece};

/// Position shown by a fresh board
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Half-moves without capture or pawn move after which the game is drawn
const FIFTY_MOVE_HALFMOVES: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    #[error("invalid position {fen:?}: {reason}")]
    InvalidPosition { fen: String, reason: String },

    #[error("illegal move {from}{to}")]
    IllegalMove { from: Square, to: Square },

    #[error("promotion piece required for {from}{to}")]
    PromotionRequired { from: Square, to: Square },

    #[error("cannot read move notation {notation:?}")]
    BadNotation { notation: String },
}

/// Properties of a legal move that the controller cares about
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveFlags {
    pub capture: bool,
    pub castle: bool,
    pub en_passant: bool,
    pub promotion: bool,
}

impl MoveFlags {
    fn merge(self, other: MoveFlags) -> MoveFlags {
        MoveFlags {
            capture: self.capture || other.capture,
            castle: self.castle || other.castle,
            en_passant: self.en_passant || other.en_passant,
            promotion: self.promotion || other.promotion,
        }
    }
}

/// A destination reachable from some origin square
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegalTarget {
    pub to: Square,
    pub flags: MoveFlags,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl MoveRequest {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, kind: PieceKind) -> Self {
        self.promotion = Some(kind);
        self
    }
}

/// A move the engine accepted and played
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
    /// Side that made the move
    pub color: PieceColor,
    pub flags: MoveFlags,
    /// Standard algebraic notation, without check suffix
    pub san: String,
}

/// Query and mutation surface of a chess rules engine.
///
/// Every call is synchronous and either succeeds or reports failure; the
/// controller never overlaps calls.
pub trait RulesEngine {
    fn turn_to_move(&self) -> PieceColor;

    fn piece_at(&self, square: Square) -> Option<Piece>;

    /// Legal destinations from `from`, one entry per destination square
    fn legal_moves(&self, from: Square) -> Vec<LegalTarget>;

    fn apply_move(&mut self, request: MoveRequest) -> Result<AppliedMove, RulesError>;

    /// Play a move written in standard algebraic notation
    fn apply_notation(&mut self, notation: &str) -> Result<AppliedMove, RulesError>;

    fn undo_last_move(&mut self) -> Option<AppliedMove>;

    fn is_check(&self) -> bool;

    fn is_checkmate(&self) -> bool;

    fn is_stalemate(&self) -> bool;

    /// Draws other than stalemate
    fn is_draw(&self) -> bool;

    fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_stalemate() || self.is_draw()
    }

    fn load_position(&mut self, fen: &str) -> Result<(), RulesError>;

    fn export_position(&self) -> String;

    fn reset(&mut self);
}

/// [`RulesEngine`] over a shakmaty `Chess` position with an undo stack
#[derive(Clone, Debug)]
pub struct ShakmatyRules {
    position: Chess,
    undo_stack: Vec<(Chess, AppliedMove)>,
    /// Repetition keys of every position reached since the last load
    seen: Vec<String>,
}

impl ShakmatyRules {
    pub fn new() -> Self {
        let position = Chess::default();
        let seen = vec![repetition_key(&position)];
        Self {
            position,
            undo_stack: Vec::new(),
            seen,
        }
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    fn play_legal(&mut self, m: Move) -> Result<AppliedMove, RulesError> {
        let Some((from, to)) = endpoints(&m) else {
            return Err(RulesError::BadNotation {
                notation: format!("{m:?}"),
            });
        };

        let san = San::from_move(&self.position, m.clone()).to_string();
        let applied = AppliedMove {
            from,
            to,
            promotion: m.promotion().map(role_to_kind),
            color: self.position.turn().into(),
            flags: flags_of(&m),
            san,
        };

        let previous = self.position.clone();
        self.position = previous
            .clone()
            .play(m)
            .map_err(|_| RulesError::IllegalMove { from, to })?;
        self.undo_stack.push((previous, applied.clone()));
        self.seen.push(repetition_key(&self.position));

        Ok(applied)
    }

    fn is_threefold_repetition(&self) -> bool {
        let Some(current) = self.seen.last() else {
            return false;
        };
        self.seen.iter().filter(|key| *key == current).count() >= 3
    }
}

impl Default for ShakmatyRules {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesEngine for ShakmatyRules {
    fn turn_to_move(&self) -> PieceColor {
        self.position.turn().into()
    }

    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.board().piece_at(square).map(shakmaty_to_piece)
    }

    fn legal_moves(&self, from: Square) -> Vec<LegalTarget> {
        let mut targets: Vec<LegalTarget> = Vec::new();
        for m in &self.position.legal_moves() {
            let Some((move_from, move_to)) = endpoints(m) else {
                continue;
            };
            if move_from != from {
                continue;
            }
            let flags = flags_of(m);
            // Promotions show up once per piece; collapse them to one target
            match targets.iter_mut().find(|t| t.to == move_to) {
                Some(existing) => existing.flags = existing.flags.merge(flags),
                None => targets.push(LegalTarget { to: move_to, flags }),
            }
        }
        targets
    }

    fn apply_move(&mut self, request: MoveRequest) -> Result<AppliedMove, RulesError> {
        let MoveRequest {
            from,
            to,
            promotion,
        } = request;

        let candidates: Vec<Move> = self
            .position
            .legal_moves()
            .into_iter()
            .filter(|m| endpoints(m) == Some((from, to)))
            .collect();

        if candidates.is_empty() {
            return Err(RulesError::IllegalMove { from, to });
        }

        let chosen = if candidates.iter().any(|m| m.promotion().is_some()) {
            let kind = promotion.ok_or(RulesError::PromotionRequired { from, to })?;
            let role = kind_to_role(kind);
            candidates
                .into_iter()
                .find(|m| m.promotion() == Some(role))
                .ok_or(RulesError::IllegalMove { from, to })?
        } else {
            candidates
                .into_iter()
                .next()
                .ok_or(RulesError::IllegalMove { from, to })?
        };

        self.play_legal(chosen)
    }

    fn apply_notation(&mut self, notation: &str) -> Result<AppliedMove, RulesError> {
        let bad = || RulesError::BadNotation {
            notation: notation.to_string(),
        };
        let san: San = notation.parse().map_err(|_| bad())?;
        let m = san.to_move(&self.position).map_err(|_| bad())?;
        self.play_legal(m)
    }

    fn undo_last_move(&mut self) -> Option<AppliedMove> {
        let (previous, applied) = self.undo_stack.pop()?;
        self.position = previous;
        self.seen.pop();
        Some(applied)
    }

    fn is_check(&self) -> bool {
        self.position.is_check()
    }

    fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    fn is_draw(&self) -> bool {
        self.position.is_insufficient_material()
            || self.position.halfmoves() >= FIFTY_MOVE_HALFMOVES
            || self.is_threefold_repetition()
    }

    fn load_position(&mut self, fen: &str) -> Result<(), RulesError> {
        let invalid = |reason: String| RulesError::InvalidPosition {
            fen: fen.to_string(),
            reason,
        };
        let parsed: Fen = fen.trim().parse().map_err(|e| invalid(format!("{e}")))?;
        let position: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| invalid(format!("{e}")))?;

        self.seen = vec![repetition_key(&position)];
        self.position = position;
        self.undo_stack.clear();
        Ok(())
    }

    fn export_position(&self) -> String {
        fen_of(&self.position)
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Origin and destination as the user sees them.
///
/// Castling is entered by moving the king to its destination (g/c file), not
/// onto the rook.
fn endpoints(m: &Move) -> Option<(Square, Square)> {
    match m {
        Move::Normal { from, to, .. } => Some((*from, *to)),
        Move::EnPassant { from, to, .. } => Some((*from, *to)),
        Move::Castle { king, rook } => {
            let king_dest = if rook.file() == File::H {
                Square::from_coords(File::G, rook.rank())
            } else {
                Square::from_coords(File::C, rook.rank())
            };
            Some((*king, king_dest))
        }
        Move::Put { .. } => None,
    }
}

fn flags_of(m: &Move) -> MoveFlags {
    MoveFlags {
        capture: m.is_capture(),
        castle: matches!(m, Move::Castle { .. }),
        en_passant: matches!(m, Move::EnPassant { .. }),
        promotion: m.promotion().is_some(),
    }
}

fn fen_of(position: &Chess) -> String {
    Fen::from_position(position, EnPassantMode::Legal).to_string()
}

/// FEN without the move counters
fn repetition_key(position: &Chess) -> String {
    fen_of(position)
        .split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules_from(fen: &str) -> ShakmatyRules {
        let mut rules = ShakmatyRules::new();
        rules.load_position(fen).unwrap();
        rules
    }

    fn targets(rules: &ShakmatyRules, from: Square) -> Vec<Square> {
        rules.legal_moves(from).into_iter().map(|t| t.to).collect()
    }

    #[test]
    fn test_starting_position() {
        let rules = ShakmatyRules::new();
        assert_eq!(rules.export_position(), STARTING_FEN);
        assert_eq!(rules.turn_to_move(), PieceColor::White);
        assert_eq!(targets(&rules, Square::E2), vec![Square::E3, Square::E4]);
        assert!(targets(&rules, Square::E7).is_empty());
    }

    #[test]
    fn test_castle_target_is_king_destination() {
        let rules = rules_from("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let castles: Vec<_> = rules
            .legal_moves(Square::E1)
            .into_iter()
            .filter(|t| t.flags.castle)
            .map(|t| t.to)
            .collect();
        assert!(castles.contains(&Square::G1));
        assert!(castles.contains(&Square::C1));
        assert!(!castles.contains(&Square::H1));
    }

    #[test]
    fn test_promotions_collapse_to_one_target() {
        let rules = rules_from("8/P7/8/8/8/8/7k/4K3 w - - 0 1");
        let moves = rules.legal_moves(Square::A7);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].to, Square::A8);
        assert!(moves[0].flags.promotion);
    }

    #[test]
    fn test_promotion_requires_piece() {
        let mut rules = rules_from("8/P7/8/8/8/8/7k/4K3 w - - 0 1");
        let request = MoveRequest::new(Square::A7, Square::A8);
        assert_eq!(
            rules.apply_move(request),
            Err(RulesError::PromotionRequired {
                from: Square::A7,
                to: Square::A8
            })
        );

        let applied = rules
            .apply_move(request.with_promotion(PieceKind::Knight))
            .unwrap();
        assert_eq!(applied.promotion, Some(PieceKind::Knight));
        assert_eq!(
            rules.piece_at(Square::A8),
            Some(Piece {
                kind: PieceKind::Knight,
                color: PieceColor::White
            })
        );
    }

    #[test]
    fn test_apply_and_undo() {
        let mut rules = ShakmatyRules::new();
        let applied = rules
            .apply_move(MoveRequest::new(Square::E2, Square::E4))
            .unwrap();
        assert_eq!(applied.san, "e4");
        assert_eq!(applied.color, PieceColor::White);
        assert_eq!(rules.turn_to_move(), PieceColor::Black);

        let undone = rules.undo_last_move().unwrap();
        assert_eq!(undone, applied);
        assert_eq!(rules.export_position(), STARTING_FEN);
        assert!(rules.undo_last_move().is_none());
    }

    #[test]
    fn test_illegal_move_rejected() {
        let mut rules = ShakmatyRules::new();
        assert_eq!(
            rules.apply_move(MoveRequest::new(Square::E2, Square::E5)),
            Err(RulesError::IllegalMove {
                from: Square::E2,
                to: Square::E5
            })
        );
        assert_eq!(rules.export_position(), STARTING_FEN);
    }

    #[test]
    fn test_export_omits_unusable_en_passant_square() {
        let mut rules = ShakmatyRules::new();
        rules.apply_notation("e4").unwrap();
        assert_eq!(
            rules.export_position(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
    }

    #[test]
    fn test_apply_notation() {
        let mut rules = ShakmatyRules::new();
        let applied = rules.apply_notation("Nf3").unwrap();
        assert_eq!((applied.from, applied.to), (Square::G1, Square::F3));
        assert!(matches!(
            rules.apply_notation("Qxh7"),
            Err(RulesError::BadNotation { .. })
        ));
    }

    #[test]
    fn test_capture_flags() {
        let mut rules = ShakmatyRules::new();
        for san in ["e4", "d5"] {
            rules.apply_notation(san).unwrap();
        }
        let capture = rules
            .legal_moves(Square::E4)
            .into_iter()
            .find(|t| t.to == Square::D5)
            .unwrap();
        assert!(capture.flags.capture);
        assert!(!capture.flags.castle);
    }

    #[test]
    fn test_checkmate_detection() {
        let mut rules = ShakmatyRules::new();
        for san in ["f3", "e5", "g4", "Qh4"] {
            rules.apply_notation(san).unwrap();
        }
        assert!(rules.is_check());
        assert!(rules.is_checkmate());
        assert!(rules.is_game_over());
        assert!(!rules.is_stalemate());
    }

    #[test]
    fn test_stalemate_detection() {
        let rules = rules_from("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert!(rules.is_stalemate());
        assert!(!rules.is_checkmate());
    }

    #[test]
    fn test_insufficient_material_is_draw() {
        let rules = rules_from("8/8/8/8/8/8/k7/4K3 w - - 0 1");
        assert!(rules.is_draw());
        assert!(rules.is_game_over());
    }

    #[test]
    fn test_threefold_repetition_is_draw() {
        let mut rules = ShakmatyRules::new();
        for san in ["Nf3", "Nf6", "Ng1", "Ng8", "Nf3", "Nf6", "Ng1"] {
            rules.apply_notation(san).unwrap();
            assert!(!rules.is_draw());
        }
        rules.apply_notation("Ng8").unwrap();
        assert!(rules.is_draw());

        rules.undo_last_move().unwrap();
        assert!(!rules.is_draw());
    }

    #[test]
    fn test_invalid_load_keeps_position() {
        let mut rules = ShakmatyRules::new();
        rules.apply_notation("e4").unwrap();
        let before = rules.export_position();

        let err = rules.load_position("not a position").unwrap_err();
        assert!(matches!(err, RulesError::InvalidPosition { .. }));
        assert_eq!(rules.export_position(), before);
        assert!(rules.undo_last_move().is_some());
    }

    #[test]
    fn test_reset_clears_history() {
        let mut rules = ShakmatyRules::new();
        rules.apply_notation("d4").unwrap();
        rules.reset();
        assert_eq!(rules.export_position(), STARTING_FEN);
        assert!(rules.undo_last_move().is_none());
    }
}
