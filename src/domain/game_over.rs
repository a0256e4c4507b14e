//! Terminal game results.

use serde::{Deserialize, Serialize};

use crate::domain::PieceColor;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    Checkmate,
    Stalemate,
    /// Insufficient material, fifty-move rule, repetition
    Draw,
    /// Flag-fall
    Time,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverRecord {
    pub reason: GameOverReason,
    /// `None` for drawn games
    pub winner: Option<PieceColor>,
}

impl GameOverRecord {
    pub fn checkmate(winner: PieceColor) -> Self {
        Self {
            reason: GameOverReason::Checkmate,
            winner: Some(winner),
        }
    }

    pub fn on_time(winner: PieceColor) -> Self {
        Self {
            reason: GameOverReason::Time,
            winner: Some(winner),
        }
    }

    pub fn drawn(reason: GameOverReason) -> Self {
        Self {
            reason,
            winner: None,
        }
    }

    /// Checkmate and flag-fall get the celebration and a delayed reveal
    pub fn is_decisive(&self) -> bool {
        self.winner.is_some()
    }

    pub fn message(&self) -> &'static str {
        match (self.reason, self.winner) {
            (GameOverReason::Checkmate, Some(PieceColor::White)) => "White wins by checkmate!",
            (GameOverReason::Checkmate, Some(PieceColor::Black)) => "Black wins by checkmate!",
            (GameOverReason::Time, Some(PieceColor::White)) => "White wins on time!",
            (GameOverReason::Time, Some(PieceColor::Black)) => "Black wins on time!",
            (GameOverReason::Stalemate, _) => "Draw by stalemate",
            _ => "Draw",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            GameOverRecord::checkmate(PieceColor::Black).message(),
            "Black wins by checkmate!"
        );
        assert_eq!(
            GameOverRecord::on_time(PieceColor::White).message(),
            "White wins on time!"
        );
        assert_eq!(
            GameOverRecord::drawn(GameOverReason::Stalemate).message(),
            "Draw by stalemate"
        );
        assert_eq!(GameOverRecord::drawn(GameOverReason::Draw).message(), "Draw");
    }

    #[test]
    fn test_decisive() {
        assert!(GameOverRecord::on_time(PieceColor::Black).is_decisive());
        assert!(!GameOverRecord::drawn(GameOverReason::Draw).is_decisive());
    }
}
