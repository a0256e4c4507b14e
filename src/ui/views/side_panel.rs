//! Side panel - clocks, session controls and the move list.

use gpui::{App, Div, SharedString, WeakEntity, div, prelude::*, px, rgb};

use crate::domain::{PieceColor, TimeControl};
use crate::models::{Session, SessionSnapshot};
use crate::ui::theme::{
    BORDER_COLOR, BUTTON_BG, BUTTON_DISABLED, BUTTON_HOVER_BG, CLOCK_ACTIVE_BG, CLOCK_IDLE_BG,
    CLOCK_LOW_BG, MOVE_LIST_BG, PANEL_BG, TEXT_ERROR, TEXT_PRIMARY, TEXT_SECONDARY,
};
use crate::ui::views::SessionView;

/// Below this a running clock face turns red
const LOW_TIME_MS: i64 = 10_000;

/// Time controls offered as presets, as (minutes, increment seconds)
const PRESETS: [(u64, u64); 4] = [(1, 0), (3, 2), (5, 0), (10, 0)];

/// Render the side panel for a session snapshot.
/// Buttons act through the owning view so cues get played.
pub fn render_side_panel(
    view: WeakEntity<SessionView>,
    snapshot: &SessionSnapshot,
    status: Option<SharedString>,
) -> Div {
    let clocks = div()
        .flex()
        .flex_col()
        .gap_2()
        .child(render_clock_face(
            "Black",
            &snapshot.clock.black_text,
            snapshot.clock.black_ms,
            snapshot.clock.running && snapshot.clock.active == PieceColor::Black,
        ))
        .child(render_clock_face(
            "White",
            &snapshot.clock.white_text,
            snapshot.clock.white_ms,
            snapshot.clock.running && snapshot.clock.active == PieceColor::White,
        ));

    let running = snapshot.clock.running;
    let controls = div()
        .flex()
        .flex_wrap()
        .gap_2()
        .child(render_button(
            "start",
            "Start",
            !running && !snapshot.finished,
            session_action(&view, |session| {
                session.start_clock();
            }),
        ))
        .child(render_button(
            "pause",
            "Pause",
            running,
            session_action(&view, |session| {
                session.pause_clock();
            }),
        ))
        .child(render_button(
            "undo",
            "Undo",
            snapshot.can_undo,
            session_action(&view, |session| {
                session.undo();
            }),
        ))
        .child(render_button(
            "redo",
            "Redo",
            snapshot.can_redo,
            session_action(&view, |session| {
                session.redo();
            }),
        ))
        .child(render_button(
            "flip",
            "Flip",
            true,
            session_action(&view, |session| session.flip_board()),
        ))
        .child(render_button(
            "reset",
            "Reset",
            true,
            session_action(&view, |session| session.reset()),
        ));

    let presets = div()
        .flex()
        .gap_2()
        .children(PRESETS.into_iter().map(|(minutes, increment)| {
            let view = view.clone();
            let label = SharedString::from(format!("{minutes}+{increment}"));
            render_button(
                format!("preset-{minutes}-{increment}"),
                label,
                true,
                move |cx| {
                    let control = TimeControl::minutes(minutes, increment);
                    view.update(cx, |view, cx| view.set_time_control(control, cx))
                        .ok();
                },
            )
        }));

    let view_load = view.clone();
    let view_copy = view.clone();
    let position = div()
        .flex()
        .gap_2()
        .child(render_button("load-fen", "Paste FEN", true, move |cx| {
            view_load
                .update(cx, |view, cx| view.load_from_clipboard(cx))
                .ok();
        }))
        .child(render_button("copy-fen", "Copy FEN", true, move |cx| {
            view_copy
                .update(cx, |view, cx| view.copy_position(cx))
                .ok();
        }));

    let moves_content = if snapshot.move_pairs.is_empty() {
        div().text_color(rgb(TEXT_SECONDARY)).child("No moves yet")
    } else {
        div()
            .flex()
            .flex_col()
            .children(snapshot.move_pairs.iter().map(|pair| {
                div()
                    .flex()
                    .items_center()
                    .gap_2()
                    .py_1()
                    .child(
                        div()
                            .text_color(rgb(TEXT_SECONDARY))
                            .text_sm()
                            .w(px(40.0))
                            .child(format!("{}.", pair.number)),
                    )
                    .child(
                        div()
                            .text_color(rgb(TEXT_PRIMARY))
                            .text_sm()
                            .flex_1()
                            .child(pair.white.clone().unwrap_or_else(|| "...".to_string())),
                    )
                    .child(
                        div()
                            .text_color(rgb(TEXT_PRIMARY))
                            .text_sm()
                            .flex_1()
                            .child(pair.black.clone().unwrap_or_default()),
                    )
            }))
    };

    let move_list = div()
        .flex_1()
        .flex()
        .flex_col()
        .bg(rgb(MOVE_LIST_BG))
        .border_1()
        .border_color(rgb(BORDER_COLOR))
        .rounded_md()
        .overflow_hidden()
        .child(
            div()
                .p_4()
                .pb_2()
                .text_color(rgb(TEXT_PRIMARY))
                .border_b_1()
                .border_color(rgb(BORDER_COLOR))
                .child("Moves"),
        )
        .child(
            div()
                .id("move-list-scroll")
                .flex_1()
                .overflow_y_scroll()
                .p_4()
                .pt_2()
                .child(moves_content),
        );

    div()
        .size_full()
        .flex()
        .flex_col()
        .gap_3()
        .bg(rgb(PANEL_BG))
        .p(px(20.0))
        .child(clocks)
        .child(controls)
        .child(presets)
        .child(position)
        .when_some(status, |el, status| {
            el.child(div().text_sm().text_color(rgb(TEXT_ERROR)).child(status))
        })
        .child(move_list)
}

/// Click handler that runs `action` on the session behind `view`
fn session_action(
    view: &WeakEntity<SessionView>,
    action: impl Fn(&mut Session) + Copy + 'static,
) -> impl Fn(&mut App) + 'static {
    let view = view.clone();
    move |cx| {
        view.update(cx, |view, cx| view.act(cx, action)).ok();
    }
}

fn render_clock_face(label: &'static str, text: &str, remaining_ms: i64, active: bool) -> Div {
    let background = if active && remaining_ms < LOW_TIME_MS {
        CLOCK_LOW_BG
    } else if active {
        CLOCK_ACTIVE_BG
    } else {
        CLOCK_IDLE_BG
    };

    div()
        .flex()
        .justify_between()
        .items_center()
        .px_4()
        .py_2()
        .rounded_md()
        .bg(rgb(background))
        .child(div().text_color(rgb(TEXT_SECONDARY)).child(label))
        .child(
            div()
                .text_color(rgb(TEXT_PRIMARY))
                .text_xl()
                .font_weight(gpui::FontWeight::BOLD)
                .child(text.to_string()),
        )
}

fn render_button(
    id: impl Into<SharedString>,
    label: impl Into<SharedString>,
    enabled: bool,
    on_click: impl Fn(&mut App) + 'static,
) -> impl IntoElement {
    div()
        .id(id.into())
        .px_3()
        .py_1()
        .rounded(px(4.0))
        .text_color(if enabled {
            rgb(TEXT_PRIMARY)
        } else {
            rgb(BUTTON_DISABLED)
        })
        .when(enabled, |el| {
            el.bg(rgb(BUTTON_BG))
                .cursor_pointer()
                .hover(|s| s.bg(rgb(BUTTON_HOVER_BG)))
                .on_click(move |_ev, _window, cx| {
                    on_click(cx);
                })
        })
        .when(!enabled, |el| el.bg(rgb(PANEL_BG)))
        .child(label.into())
}
