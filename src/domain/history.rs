//! Linear move history with a redo stack.

use crate::domain::{AppliedMove, PieceColor};

/// Committed moves plus the moves taken back by undo.
///
/// Index 0 of `played` is the first move of the game. The last entry of
/// `undone` is the next move redo will replay.
#[derive(Clone, Debug, Default)]
pub struct MoveHistory {
    played: Vec<AppliedMove>,
    undone: Vec<AppliedMove>,
}

impl MoveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A freshly played move invalidates everything that was undone
    pub fn record(&mut self, applied: AppliedMove) {
        self.undone.clear();
        self.played.push(applied);
    }

    /// Push a replayed move without touching the rest of the redo stack
    pub fn record_redo(&mut self, applied: AppliedMove) {
        self.played.push(applied);
    }

    /// Move the most recent move onto the redo stack
    pub fn undo(&mut self) -> Option<&AppliedMove> {
        let last = self.played.pop()?;
        self.undone.push(last);
        self.undone.last()
    }

    /// Take the next move to replay off the redo stack
    pub fn take_redo(&mut self) -> Option<AppliedMove> {
        self.undone.pop()
    }

    /// Put back a move whose replay failed
    pub fn restore_redo(&mut self, applied: AppliedMove) {
        self.undone.push(applied);
    }

    pub fn can_undo(&self) -> bool {
        !self.played.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    pub fn len(&self) -> usize {
        self.played.len()
    }

    pub fn is_empty(&self) -> bool {
        self.played.is_empty()
    }

    pub fn redo_len(&self) -> usize {
        self.undone.len()
    }

    pub fn last(&self) -> Option<&AppliedMove> {
        self.played.last()
    }

    pub fn moves(&self) -> &[AppliedMove] {
        &self.played
    }

    pub fn clear(&mut self) {
        self.played.clear();
        self.undone.clear();
    }

    /// Moves grouped as `(move number, white SAN, black SAN)` for display.
    ///
    /// A game loaded with black to move starts with an empty white slot.
    pub fn move_pairs(&self, first_move_number: usize) -> Vec<MovePair> {
        let mut pairs: Vec<MovePair> = Vec::new();
        for applied in &self.played {
            match applied.color {
                PieceColor::White => pairs.push(MovePair {
                    number: first_move_number + pairs.len(),
                    white: Some(applied.san.clone()),
                    black: None,
                }),
                PieceColor::Black => match pairs.last_mut() {
                    Some(pair) if pair.black.is_none() => pair.black = Some(applied.san.clone()),
                    _ => pairs.push(MovePair {
                        number: first_move_number + pairs.len(),
                        white: None,
                        black: Some(applied.san.clone()),
                    }),
                },
            }
        }
        pairs
    }
}

/// One numbered row of the move list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovePair {
    pub number: usize,
    pub white: Option<String>,
    pub black: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MoveFlags;
    use shakmaty::Square;

    fn mv(san: &str, color: PieceColor) -> AppliedMove {
        AppliedMove {
            from: Square::A1,
            to: Square::A2,
            promotion: None,
            color,
            flags: MoveFlags::default(),
            san: san.to_string(),
        }
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = MoveHistory::new();
        history.record(mv("e4", PieceColor::White));
        history.record(mv("e5", PieceColor::Black));
        history.undo();
        assert!(history.can_redo());

        history.record(mv("c5", PieceColor::Black));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_undo_is_lifo() {
        let mut history = MoveHistory::new();
        history.record(mv("e4", PieceColor::White));
        history.record(mv("e5", PieceColor::Black));

        assert_eq!(history.undo().map(|m| m.san.clone()), Some("e5".into()));
        assert_eq!(history.undo().map(|m| m.san.clone()), Some("e4".into()));
        assert!(history.undo().is_none());
        assert_eq!(history.redo_len(), 2);

        // Redo replays the most recently undone move first
        assert_eq!(history.take_redo().map(|m| m.san), Some("e4".into()));
    }

    #[test]
    fn test_record_redo_keeps_remaining_entries() {
        let mut history = MoveHistory::new();
        history.record(mv("e4", PieceColor::White));
        history.record(mv("e5", PieceColor::Black));
        history.undo();
        history.undo();

        let next = history.take_redo().unwrap();
        history.record_redo(next);
        assert_eq!(history.len(), 1);
        assert_eq!(history.redo_len(), 1);
    }

    #[test]
    fn test_move_pairs() {
        let mut history = MoveHistory::new();
        for (san, color) in [
            ("e4", PieceColor::White),
            ("e5", PieceColor::Black),
            ("Nf3", PieceColor::White),
        ] {
            history.record(mv(san, color));
        }
        assert_eq!(
            history.move_pairs(1),
            vec![
                MovePair {
                    number: 1,
                    white: Some("e4".into()),
                    black: Some("e5".into())
                },
                MovePair {
                    number: 2,
                    white: Some("Nf3".into()),
                    black: None
                },
            ]
        );
    }

    #[test]
    fn test_move_pairs_black_first() {
        let mut history = MoveHistory::new();
        history.record(mv("Qh4", PieceColor::Black));
        assert_eq!(
            history.move_pairs(2),
            vec![MovePair {
                number: 2,
                white: None,
                black: Some("Qh4".into())
            }]
        );
    }
}
