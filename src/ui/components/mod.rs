mod square;

pub use square::{SquareCell, render_square};
