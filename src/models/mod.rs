//! Application layer: the session controller and its read-only snapshots.

mod intent;
mod session;
mod snapshot;


pub use session::{PromotionRequest, Session};
pub use snapshot::{ClockDisplay, DragView, SessionSnapshot};
