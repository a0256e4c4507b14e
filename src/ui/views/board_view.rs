//! Session view - the board, its overlays, and the mouse adapter that feeds
//! the session's gesture unifier.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use gpui::{
    AsyncApp, ClickEvent, ClipboardItem, Context, CursorStyle, Div, Entity, MouseButton,
    MouseDownEvent, MouseMoveEvent, MouseUpEvent, Pixels, SharedString, Subscription, Task,
    WeakEntity, Window, canvas, div, img, prelude::*, px, rgb,
};
use gpui_component::resizable::{h_resizable, resizable_panel};
use shakmaty::Square;
use tracing::debug;

use crate::domain::{
    BOARD_PADDING, InputDevice, NotificationDispatcher, Piece, PieceColor, PieceKind, Point,
    RawInput, TimeControl,
};
use crate::models::{Session, SessionSnapshot};
use crate::ui::components::{SquareCell, render_square};
use crate::ui::theme::{
    BUTTON_BG, BUTTON_HOVER_BG, CHECK_SQUARE, DIALOG_BG, INITIAL_LEFT_PANEL, INITIAL_RIGHT_PANEL,
    OVERLAY_BG, OVERLAY_OPACITY, PANEL_BG, TEXT_PRIMARY, TEXT_SECONDARY,
};
use crate::ui::views::render_side_panel;

/// How often the view pushes wall-clock time into the session
const FRAME_INTERVAL: Duration = Duration::from_millis(16);
/// How long the board border stays red after a check warning
const CHECK_FLASH: Duration = Duration::from_millis(400);

/// Main view: observes the session and translates window events into input
pub struct SessionView {
    session: Entity<Session>,
    dispatcher: NotificationDispatcher,
    started_at: Instant,
    status: Option<SharedString>,
    seen_check_flashes: u32,
    flash_until: Option<Instant>,
    _subscriptions: Vec<Subscription>,
    _ticker: Task<()>,
}

impl SessionView {
    pub fn new(session: Entity<Session>, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let subscriptions = vec![
            cx.observe(&session, |_, _, cx| cx.notify()),
            // Losing focus mid-drag abandons the drag
            cx.observe_window_activation(window, |view, window, cx| {
                if !window.is_window_active() {
                    view.send_input(RawInput::Blur, cx);
                }
            }),
        ];

        let ticker = cx.spawn(async move |this: WeakEntity<SessionView>, cx: &mut AsyncApp| {
            Self::run_ticker(this, cx).await;
        });

        let seen_check_flashes = session.read(cx).check_flashes();
        Self {
            session,
            dispatcher: NotificationDispatcher::default(),
            started_at: Instant::now(),
            status: None,
            seen_check_flashes,
            flash_until: None,
            _subscriptions: subscriptions,
            _ticker: ticker,
        }
    }

    /// Drives the session's scheduler until the view goes away
    async fn run_ticker(this: WeakEntity<SessionView>, cx: &mut AsyncApp) {
        loop {
            cx.background_executor().timer(FRAME_INTERVAL).await;
            if this.update(cx, |view, cx| view.advance(cx)).is_err() {
                break;
            }
        }
    }

    fn advance(&mut self, cx: &mut Context<Self>) {
        let now = self.started_at.elapsed();
        self.session.update(cx, |session, cx| {
            let had_timers = session.active_timer_count() > 0;
            session.advance_to(now);
            if had_timers {
                cx.notify();
            }
        });
        if self.flash_until.is_some() {
            cx.notify();
        }
        self.flush_cues(cx);
    }

    fn send_input(&mut self, input: RawInput, cx: &mut Context<Self>) {
        let now = self.started_at.elapsed();
        self.session.update(cx, |session, cx| {
            session.advance_to(now);
            session.handle_input(input);
            cx.notify();
        });
        self.flush_cues(cx);
    }

    /// Run a session action, then play whatever cues it produced
    pub(super) fn act(&mut self, cx: &mut Context<Self>, action: impl FnOnce(&mut Session)) {
        let now = self.started_at.elapsed();
        self.session.update(cx, |session, cx| {
            session.advance_to(now);
            action(session);
            cx.notify();
        });
        self.flush_cues(cx);
    }

    fn flush_cues(&mut self, cx: &mut Context<Self>) {
        let cues = self.session.update(cx, |session, _| session.drain_cues());
        self.dispatcher.dispatch_all(cues);
    }

    pub(super) fn set_time_control(&mut self, control: TimeControl, cx: &mut Context<Self>) {
        self.act(cx, |session| session.set_time_control(control));
        self.status = None;
    }

    pub(super) fn load_from_clipboard(&mut self, cx: &mut Context<Self>) {
        let Some(text) = cx.read_from_clipboard().and_then(|item| item.text()) else {
            self.status = Some("Clipboard holds no text".into());
            cx.notify();
            return;
        };
        let result = self
            .session
            .update(cx, |session, _| session.load_position(text.trim()));
        self.status = Some(match result {
            Ok(()) => "Position loaded".into(),
            Err(err) => err.to_string().into(),
        });
        cx.notify();
    }

    pub(super) fn copy_position(&mut self, cx: &mut Context<Self>) {
        let fen = self.session.read(cx).export_position();
        debug!(%fen, "copying position");
        cx.write_to_clipboard(ClipboardItem::new_string(fen));
        self.status = Some("Position copied".into());
        cx.notify();
    }

    fn note_check_flash(&mut self, snapshot: &SessionSnapshot) -> bool {
        if snapshot.check_flashes != self.seen_check_flashes {
            self.seen_check_flashes = snapshot.check_flashes;
            self.flash_until = Some(Instant::now() + CHECK_FLASH);
        }
        match self.flash_until {
            Some(until) if Instant::now() < until => true,
            Some(_) => {
                self.flash_until = None;
                false
            }
            None => false,
        }
    }
}

fn point_of(position: gpui::Point<Pixels>) -> Point {
    Point::new(position.x.into(), position.y.into())
}

impl Render for SessionView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let (snapshot, layout) = {
            let session = self.session.read(cx);
            (session.snapshot(), *session.layout())
        };
        let flashing = self.note_check_flash(&snapshot);

        let square_size = layout.square_size();
        let piece_size = layout.piece_size();
        let board_total_size = layout.board_total_size();

        let pieces: HashMap<Square, Piece> = snapshot.pieces.iter().copied().collect();
        let drag_source = snapshot.drag.map(|d| d.source);
        let hovered = snapshot.drag.and_then(|d| d.hovered);
        let last_move = snapshot.last_move;

        // Floating piece follows the pointer during a drag
        let floating_piece = snapshot.drag.and_then(|d| {
            d.piece.map(|piece| {
                div()
                    .absolute()
                    .left(px(d.point.x - piece_size / 2.0))
                    .top(px(d.point.y - piece_size / 2.0))
                    .size(px(piece_size))
                    .child(img(piece.svg_path()).size(px(piece_size)))
            })
        });

        let board = div()
            .flex_shrink_0()
            .flex()
            .flex_col()
            .w(px(board_total_size))
            .h(px(board_total_size))
            .overflow_hidden()
            .rounded_md()
            .when(flashing, |el| el.border_2().border_color(rgb(CHECK_SQUARE)))
            .children((0..8).map(|row| {
                div().flex().flex_shrink_0().children((0..8).map(|col| {
                    let square = layout.square_at_cell(row, col);
                    let cell = SquareCell {
                        row,
                        col,
                        piece: pieces.get(&square).copied(),
                        is_drag_source: drag_source == Some(square),
                        is_selected: snapshot.selection == Some(square),
                        is_last_move: last_move
                            .is_some_and(|(from, to)| from == square || to == square),
                        is_hovered: hovered == Some(square),
                        is_legal_target: snapshot.legal_targets.contains(&square),
                        is_capture_target: snapshot.capture_targets.contains(&square),
                        is_checked_king: snapshot.checked_king == Some(square),
                    };
                    render_square(cell, square_size, piece_size)
                }))
            }));

        let promotion_overlay = snapshot
            .promotion
            .map(|request| self.render_promotion_picker(request.color, piece_size, cx));
        let game_over_overlay = snapshot
            .game_over
            .map(|record| self.render_game_over(record.message(), cx));
        let celebration = snapshot.reveal_pending.then(|| {
            div()
                .absolute()
                .top(px(4.0))
                .left(px(BOARD_PADDING))
                .text_color(rgb(TEXT_PRIMARY))
                .font_weight(gpui::FontWeight::BOLD)
                .child("Game over!")
        });

        let board_panel_content = div()
            .id("board-panel")
            .relative()
            .size_full()
            .overflow_hidden()
            .bg(rgb(PANEL_BG))
            .p(px(BOARD_PADDING))
            .when(snapshot.drag.is_some(), |el| el.cursor(CursorStyle::ClosedHand))
            .child(board)
            .when_some(floating_piece, |el, fp| el.child(fp))
            .when_some(celebration, |el, banner| el.child(banner))
            .when_some(promotion_overlay, |el, overlay| el.child(overlay))
            .when_some(game_over_overlay, |el, overlay| el.child(overlay))
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|view, ev: &MouseDownEvent, _window, cx| {
                    let point = point_of(ev.position);
                    view.send_input(RawInput::press(InputDevice::Mouse, point), cx);
                }),
            )
            .on_mouse_move(cx.listener(|view, ev: &MouseMoveEvent, _window, cx| {
                if ev.pressed_button == Some(MouseButton::Left) {
                    let point = point_of(ev.position);
                    view.send_input(RawInput::moved(InputDevice::Mouse, point), cx);
                }
            }))
            // Mouse has no separate click event here: a release is followed by
            // the click the platform would report, which the unifier may swallow
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|view, ev: &MouseUpEvent, _window, cx| {
                    let point = point_of(ev.position);
                    view.send_input(RawInput::release(InputDevice::Mouse, point), cx);
                    view.send_input(RawInput::Click { point }, cx);
                }),
            )
            .on_mouse_up_out(
                MouseButton::Left,
                cx.listener(|view, ev: &MouseUpEvent, _window, cx| {
                    let point = point_of(ev.position);
                    view.send_input(RawInput::release_outside(InputDevice::Mouse, point), cx);
                }),
            );

        // Canvas to measure actual panel size
        let session_measure = self.session.clone();
        let measure_canvas = canvas(
            move |bounds, _window, cx| {
                session_measure.update(cx, |session, cx| {
                    let width: f32 = bounds.size.width.into();
                    let height: f32 = bounds.size.height.into();
                    let layout = session.layout();
                    if layout.panel_width != width || layout.panel_height != height {
                        session.set_panel_size(width, height);
                        cx.notify();
                    }
                });
            },
            |_, _, _, _| {},
        )
        .absolute()
        .top_0()
        .left_0()
        .size_full();

        let board_panel_with_measure = div()
            .relative()
            .size_full()
            .child(measure_canvas)
            .child(board_panel_content);

        let side_panel = render_side_panel(
            cx.entity().downgrade(),
            &snapshot,
            self.status.clone(),
        );

        div().size_full().font_family("Berkeley Mono").child(
            h_resizable("session-layout")
                .child(
                    resizable_panel()
                        .size(px(INITIAL_LEFT_PANEL))
                        .size_range(px(320.)..px(1200.))
                        .child(board_panel_with_measure),
                )
                .child(
                    resizable_panel()
                        .size(px(INITIAL_RIGHT_PANEL))
                        .size_range(px(200.)..Pixels::MAX)
                        .child(side_panel),
                ),
        )
    }
}

impl SessionView {
    /// Full-panel layer that keeps pointer events away from the board
    fn overlay(id: &'static str) -> gpui::Stateful<Div> {
        div()
            .id(id)
            .absolute()
            .top_0()
            .left_0()
            .size_full()
            .flex()
            .items_center()
            .justify_center()
            .on_mouse_down(MouseButton::Left, |_, _, cx| cx.stop_propagation())
            .on_mouse_up(MouseButton::Left, |_, _, cx| cx.stop_propagation())
            .child(
                div()
                    .absolute()
                    .top_0()
                    .left_0()
                    .size_full()
                    .bg(rgb(OVERLAY_BG))
                    .opacity(OVERLAY_OPACITY),
            )
    }

    fn render_promotion_picker(
        &self,
        color: PieceColor,
        piece_size: f32,
        cx: &mut Context<Self>,
    ) -> impl IntoElement {
        let choices = PieceKind::PROMOTION_CHOICES.into_iter().map(|kind| {
            let piece = Piece { kind, color };
            div()
                .id(SharedString::from(format!("promote-{kind:?}")))
                .size(px(piece_size))
                .rounded_md()
                .cursor_pointer()
                .bg(rgb(BUTTON_BG))
                .hover(|s| s.bg(rgb(BUTTON_HOVER_BG)))
                .child(img(piece.svg_path()).size(px(piece_size)))
                .on_click(cx.listener(move |view, _: &ClickEvent, _window, cx| {
                    view.act(cx, |session| {
                        session.choose_promotion(kind);
                    });
                }))
        });

        Self::overlay("promotion-overlay").child(
            div()
                .relative()
                .flex()
                .flex_col()
                .items_center()
                .gap_2()
                .p_4()
                .rounded_md()
                .bg(rgb(DIALOG_BG))
                .child(
                    div()
                        .text_color(rgb(TEXT_PRIMARY))
                        .child("Promote to"),
                )
                .child(div().flex().gap_2().children(choices))
                .child(
                    div()
                        .id("promotion-cancel")
                        .px_3()
                        .py_1()
                        .cursor_pointer()
                        .text_color(rgb(TEXT_SECONDARY))
                        .hover(|s| s.text_color(rgb(TEXT_PRIMARY)))
                        .child("Cancel")
                        .on_click(cx.listener(|view, _: &ClickEvent, _window, cx| {
                            view.act(cx, |session| {
                                session.cancel_promotion();
                            });
                        })),
                ),
        )
    }

    fn render_game_over(&self, message: &'static str, cx: &mut Context<Self>) -> impl IntoElement {
        let button = |id: &'static str, label: &'static str| {
            div()
                .id(id)
                .px_4()
                .py_2()
                .rounded(px(4.0))
                .cursor_pointer()
                .bg(rgb(BUTTON_BG))
                .hover(|s| s.bg(rgb(BUTTON_HOVER_BG)))
                .text_color(rgb(TEXT_PRIMARY))
                .child(label)
        };

        Self::overlay("game-over-overlay").child(
            div()
                .relative()
                .flex()
                .flex_col()
                .items_center()
                .gap_3()
                .p_6()
                .rounded_md()
                .bg(rgb(DIALOG_BG))
                .child(
                    div()
                        .text_color(rgb(TEXT_PRIMARY))
                        .font_weight(gpui::FontWeight::BOLD)
                        .child(message),
                )
                .child(
                    div()
                        .flex()
                        .gap_2()
                        .child(button("game-over-dismiss", "Dismiss").on_click(cx.listener(
                            |view, _: &ClickEvent, _window, cx| {
                                view.act(cx, |session| {
                                    session.dismiss_game_over();
                                });
                            },
                        )))
                        .child(button("game-over-new", "New game").on_click(cx.listener(
                            |view, _: &ClickEvent, _window, cx| {
                                view.act(cx, |session| session.reset());
                            },
                        ))),
                ),
        )
    }
}
