//! Square rendering component.

use gpui::{div, img, prelude::*, px, rgb};

use crate::domain::Piece;
use crate::ui::theme::{
    CHECK_SQUARE, GHOST_OPACITY, HOVER_SQUARE, LAST_MOVE_SQUARE, SELECTED_SQUARE, TARGET_DOT,
    square_color,
};

/// What a single square shows this frame
#[derive(Clone, Copy, Debug, Default)]
pub struct SquareCell {
    pub row: usize,
    pub col: usize,
    pub piece: Option<Piece>,
    /// Drawn faded while its piece follows the pointer
    pub is_drag_source: bool,
    pub is_selected: bool,
    pub is_last_move: bool,
    pub is_hovered: bool,
    pub is_legal_target: bool,
    pub is_capture_target: bool,
    pub is_checked_king: bool,
}

/// Render a single board square with its highlights and piece
pub fn render_square(cell: SquareCell, square_size: f32, piece_size: f32) -> impl IntoElement {
    let background = if cell.is_checked_king {
        rgb(CHECK_SQUARE)
    } else if cell.is_selected {
        rgb(SELECTED_SQUARE)
    } else if cell.is_hovered {
        rgb(HOVER_SQUARE)
    } else if cell.is_last_move {
        rgb(LAST_MOVE_SQUARE)
    } else {
        square_color(cell.row, cell.col)
    };

    let dot_size = square_size * 0.3;

    div()
        .flex_shrink_0() // never shrink - maintain aspect ratio
        .relative()
        .size(px(square_size))
        .bg(background)
        .flex()
        .items_center()
        .justify_center()
        .when_some(cell.piece, |el, piece| {
            el.child(
                div()
                    .size_full()
                    .flex()
                    .items_center()
                    .justify_center()
                    .when(cell.is_drag_source, |el| el.opacity(GHOST_OPACITY))
                    .child(img(piece.svg_path()).size(px(piece_size))),
            )
        })
        // Ring around capturable pieces, dot on quiet targets
        .when(cell.is_capture_target, |el| {
            el.child(
                div()
                    .absolute()
                    .top_0()
                    .left_0()
                    .size_full()
                    .rounded_full()
                    .border_4()
                    .border_color(rgb(TARGET_DOT))
                    .opacity(0.6),
            )
        })
        .when(cell.is_legal_target && !cell.is_capture_target, |el| {
            el.child(
                div()
                    .absolute()
                    .size(px(dot_size))
                    .rounded_full()
                    .bg(rgb(TARGET_DOT))
                    .opacity(0.6),
            )
        })
}
