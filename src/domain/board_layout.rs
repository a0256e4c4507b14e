//! Board layout calculations - handles sizing and coordinate transformations.

use shakmaty::Square;

use crate::domain::{to_row_col, to_square};

/// Gap between the panel edge and the board
pub const BOARD_PADDING: f32 = 20.0;
/// Piece size relative to square
pub const PIECE_SCALE: f32 = 0.98;
/// Squares never shrink below this
const MIN_SQUARE_SIZE: f32 = 30.0;

/// A location in panel coordinates (device-independent pixels)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Handles all layout calculations for the chess board
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardLayout {
    pub panel_width: f32,
    pub panel_height: f32,
    /// Black at the bottom
    pub flipped: bool,
}

impl BoardLayout {
    pub fn new(panel_width: f32, panel_height: f32) -> Self {
        Self {
            panel_width,
            panel_height,
            flipped: false,
        }
    }

    /// Calculate square size from measured panel dimensions
    pub fn square_size(&self) -> f32 {
        let available_width = self.panel_width - BOARD_PADDING * 2.0;
        let available_height = self.panel_height - BOARD_PADDING * 2.0;
        (available_width.min(available_height) / 8.0).max(MIN_SQUARE_SIZE)
    }

    /// Calculate piece size based on square size
    pub fn piece_size(&self) -> f32 {
        self.square_size() * PIECE_SCALE
    }

    /// Get the total size of the board (8 squares)
    pub fn board_total_size(&self) -> f32 {
        self.square_size() * 8.0
    }

    /// Square drawn at screen row/col, honouring orientation
    pub fn square_at_cell(&self, row: usize, col: usize) -> Square {
        if self.flipped {
            to_square(7 - row, 7 - col)
        } else {
            to_square(row, col)
        }
    }

    /// Screen row/col at which a square is drawn
    pub fn cell_of(&self, square: Square) -> (usize, usize) {
        let (row, col) = to_row_col(square);
        if self.flipped {
            (7 - row, 7 - col)
        } else {
            (row, col)
        }
    }

    /// Convert position relative to board panel to a square (if within board)
    pub fn square_at(&self, point: Point) -> Option<Square> {
        let board_x = point.x - BOARD_PADDING;
        let board_y = point.y - BOARD_PADDING;

        if board_x < 0.0 || board_y < 0.0 {
            return None;
        }

        let square_size = self.square_size();
        let col = (board_x / square_size) as usize;
        let row = (board_y / square_size) as usize;

        if row < 8 && col < 8 {
            Some(self.square_at_cell(row, col))
        } else {
            None
        }
    }

    /// Centre of a square in panel coordinates
    pub fn square_center(&self, square: Square) -> Point {
        let (row, col) = self.cell_of(square);
        let size = self.square_size();
        Point::new(
            BOARD_PADDING + col as f32 * size + size / 2.0,
            BOARD_PADDING + row as f32 * size + size / 2.0,
        )
    }
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self::new(450.0, 600.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_size_uses_smaller_dimension() {
        let layout = BoardLayout::new(520.0, 1000.0);
        assert_eq!(layout.square_size(), 60.0);
        assert_eq!(layout.board_total_size(), 480.0);
    }

    #[test]
    fn test_square_size_has_floor() {
        let layout = BoardLayout::new(100.0, 100.0);
        assert_eq!(layout.square_size(), 30.0);
    }

    #[test]
    fn test_square_at() {
        let layout = BoardLayout::new(520.0, 520.0);
        assert_eq!(layout.square_at(Point::new(25.0, 25.0)), Some(Square::A8));
        assert_eq!(layout.square_at(Point::new(290.0, 410.0)), Some(Square::E2));
        assert_eq!(layout.square_at(Point::new(10.0, 300.0)), None);
        assert_eq!(layout.square_at(Point::new(510.0, 300.0)), None);
    }

    #[test]
    fn test_flipped_orientation() {
        let mut layout = BoardLayout::new(520.0, 520.0);
        layout.flipped = true;
        assert_eq!(layout.square_at(Point::new(25.0, 25.0)), Some(Square::H1));
        assert_eq!(layout.cell_of(Square::A8), (7, 7));
    }

    #[test]
    fn test_square_center_round_trip() {
        let layout = BoardLayout::new(520.0, 520.0);
        for square in [Square::A1, Square::E4, Square::H8] {
            assert_eq!(layout.square_at(layout.square_center(square)), Some(square));
        }
    }
}
