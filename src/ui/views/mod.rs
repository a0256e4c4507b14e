mod board_view;
mod side_panel;

pub use board_view::SessionView;
pub use side_panel::render_side_panel;
