//! Theme constants and colors for the chess UI.

use gpui::{Rgba, rgb};

pub const GHOST_OPACITY: f32 = 0.4;

// Initial panel sizes
pub const INITIAL_LEFT_PANEL: f32 = 560.0;
pub const INITIAL_RIGHT_PANEL: f32 = 340.0;

// Board colors
pub const LIGHT_SQUARE: u32 = 0xEFD9B5;
pub const DARK_SQUARE: u32 = 0xB48764;
pub const SELECTED_SQUARE: u32 = 0x7fa650;
pub const LAST_MOVE_SQUARE: u32 = 0xcdd26a;
pub const HOVER_SQUARE: u32 = 0x9fb6cd;
pub const CHECK_SQUARE: u32 = 0xe0474c;
pub const TARGET_DOT: u32 = 0x3b5f2a;

// Panel colors
pub const PANEL_BG: u32 = 0x2a2a2a;
pub const MOVE_LIST_BG: u32 = 0x1e1e1e;
pub const BORDER_COLOR: u32 = 0x4a4a4a;
pub const TEXT_PRIMARY: u32 = 0xffffff;
pub const TEXT_SECONDARY: u32 = 0x888888;
pub const TEXT_ERROR: u32 = 0xff6b6b;

// Clock faces
pub const CLOCK_IDLE_BG: u32 = 0x333333;
pub const CLOCK_ACTIVE_BG: u32 = 0x4a6da7;
pub const CLOCK_LOW_BG: u32 = 0xa73a3a;

// Buttons
pub const BUTTON_BG: u32 = 0x3a3a3a;
pub const BUTTON_HOVER_BG: u32 = 0x4a4a4a;
pub const BUTTON_DISABLED: u32 = 0x555555;

// Overlays
pub const OVERLAY_BG: u32 = 0x000000;
pub const OVERLAY_OPACITY: f32 = 0.55;
pub const DIALOG_BG: u32 = 0x262626;

/// Get the color for a board square based on its screen position
pub fn square_color(row: usize, col: usize) -> Rgba {
    if (row + col) % 2 == 0 {
        rgb(LIGHT_SQUARE)
    } else {
        rgb(DARK_SQUARE)
    }
}
