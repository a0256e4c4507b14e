//! Application setup and window creation.

use gpui::{App, Bounds, WindowBounds, WindowOptions, prelude::*, px, size};
use gpui_component::Root;
use tracing::{error, info};

use crate::config::SessionConfig;
use crate::models::Session;
use crate::ui::views::SessionView;

/// Open the session window
pub fn run(config: SessionConfig, cx: &mut App) {
    gpui_component::init(cx);

    info!(
        base_ms = config.time_control.base_ms,
        increment_ms = config.time_control.increment_ms,
        "starting session"
    );
    let session = cx.new(|_| Session::new(config));

    let bounds = Bounds::centered(None, size(px(900.0), px(600.0)), cx);
    let opened = cx.open_window(
        WindowOptions {
            window_bounds: Some(WindowBounds::Windowed(bounds)),
            ..Default::default()
        },
        |window, cx| {
            let view = cx.new(|cx| SessionView::new(session, window, cx));
            cx.new(|cx| Root::new(view, window, cx))
        },
    );
    if let Err(err) = opened {
        error!(%err, "failed to open window");
        cx.quit();
    }
}
