//! Gesture unifier: one state machine for pointer, mouse and touch input.
//!
//! Device adapters translate native events into [`RawInput`]; the unifier turns
//! them into [`GestureEvent`]s that no longer say which device produced them.
//! A press on a pickable piece is a tap until the pointer travels past the
//! drag threshold, after which it becomes a drag with hover tracking.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use shakmaty::Square;
use tracing::debug;

use crate::domain::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputDevice {
    Pointer,
    Mouse,
    Touch,
}

/// Device-level input after adapter translation
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RawInput {
    Press {
        device: InputDevice,
        point: Point,
        /// Number of simultaneous contacts (1 for mice)
        touches: u8,
    },
    Move {
        device: InputDevice,
        point: Point,
        touches: u8,
    },
    Release {
        device: InputDevice,
        point: Point,
        /// Released outside the board; no click will follow
        outside: bool,
    },
    /// Click the platform reports after a press/release pair
    Click { point: Point },
    /// Platform aborted the gesture (pointercancel, touchcancel)
    Cancel { device: InputDevice },
    Blur,
    VisibilityHidden,
}

impl RawInput {
    pub fn press(device: InputDevice, point: Point) -> Self {
        RawInput::Press {
            device,
            point,
            touches: 1,
        }
    }

    pub fn moved(device: InputDevice, point: Point) -> Self {
        RawInput::Move {
            device,
            point,
            touches: 1,
        }
    }

    pub fn release(device: InputDevice, point: Point) -> Self {
        RawInput::Release {
            device,
            point,
            outside: false,
        }
    }

    pub fn release_outside(device: InputDevice, point: Point) -> Self {
        RawInput::Release {
            device,
            point,
            outside: true,
        }
    }
}

/// Device-independent gesture events
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureEvent {
    Tap(Square),
    DragStarted(Square),
    HoverChanged(Option<Square>),
    Drop { from: Square, to: Option<Square> },
    Cancelled { from: Square, was_dragging: bool },
}

/// What the unifier needs to know about the board under the pointer
pub trait BoardProbe {
    fn square_at(&self, point: Point) -> Option<Square>;

    /// Whether a press on this square may start a gesture
    fn can_pick(&self, square: Square) -> bool;
}

/// Tracks window-level listener registrations held by in-flight gestures
#[derive(Clone, Debug, Default)]
pub struct CaptureRegistry {
    live: Rc<Cell<usize>>,
}

impl CaptureRegistry {
    pub fn acquire(&self, device: InputDevice) -> CaptureGuard {
        self.live.set(self.live.get() + 1);
        CaptureGuard {
            live: Rc::clone(&self.live),
            device,
        }
    }

    /// Registrations currently held
    pub fn live(&self) -> usize {
        self.live.get()
    }
}

/// Releases its registration when dropped
#[derive(Debug)]
pub struct CaptureGuard {
    live: Rc<Cell<usize>>,
    device: InputDevice,
}

impl CaptureGuard {
    pub fn device(&self) -> InputDevice {
        self.device
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.live.set(self.live.get().saturating_sub(1));
    }
}

/// State of the gesture in flight
#[derive(Debug)]
pub struct DragState {
    pub source_square: Square,
    pub pointer_origin: Point,
    pub current_point: Point,
    pub has_crossed_threshold: bool,
    pub hovered_square: Option<Square>,
    capture: CaptureGuard,
}

impl DragState {
    pub fn device(&self) -> InputDevice {
        self.capture.device()
    }
}

#[derive(Debug)]
pub struct GestureUnifier {
    threshold: f32,
    suppression: Duration,
    active: Option<DragState>,
    suppress_clicks_until: Option<Duration>,
    registry: CaptureRegistry,
}

impl GestureUnifier {
    pub fn new(threshold: f32, suppression: Duration) -> Self {
        Self {
            threshold,
            suppression,
            active: None,
            suppress_clicks_until: None,
            registry: CaptureRegistry::default(),
        }
    }

    /// The gesture in flight, whether or not it has become a drag yet
    pub fn active(&self) -> Option<&DragState> {
        self.active.as_ref()
    }

    /// The gesture in flight once it has crossed the drag threshold
    pub fn drag_state(&self) -> Option<&DragState> {
        self.active.as_ref().filter(|s| s.has_crossed_threshold)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_state().is_some()
    }

    /// Device whose window-level listeners are currently registered
    pub fn capturing_device(&self) -> Option<InputDevice> {
        self.active.as_ref().map(DragState::device)
    }

    pub fn registry(&self) -> &CaptureRegistry {
        &self.registry
    }

    pub fn handle(
        &mut self,
        input: RawInput,
        now: Duration,
        probe: &impl BoardProbe,
    ) -> Vec<GestureEvent> {
        match input {
            RawInput::Press {
                device,
                point,
                touches,
            } => {
                if touches > 1 {
                    return self.cancel();
                }
                // Compatibility events from a second device class, or a second press
                if self.active.is_some() {
                    return Vec::new();
                }
                let Some(square) = probe.square_at(point) else {
                    return Vec::new();
                };
                if !probe.can_pick(square) {
                    return Vec::new();
                }
                self.active = Some(DragState {
                    source_square: square,
                    pointer_origin: point,
                    current_point: point,
                    has_crossed_threshold: false,
                    hovered_square: None,
                    capture: self.registry.acquire(device),
                });
                Vec::new()
            }
            RawInput::Move {
                device,
                point,
                touches,
            } => {
                if touches > 1 {
                    return self.cancel();
                }
                let threshold = self.threshold;
                let Some(state) = self.active.as_mut() else {
                    return Vec::new();
                };
                if state.device() != device {
                    return Vec::new();
                }
                state.current_point = point;

                let hovered = probe.square_at(point);
                if !state.has_crossed_threshold {
                    if point.distance_to(state.pointer_origin) < threshold {
                        return Vec::new();
                    }
                    state.has_crossed_threshold = true;
                    state.hovered_square = hovered;
                    return vec![
                        GestureEvent::DragStarted(state.source_square),
                        GestureEvent::HoverChanged(hovered),
                    ];
                }
                if hovered == state.hovered_square {
                    return Vec::new();
                }
                state.hovered_square = hovered;
                vec![GestureEvent::HoverChanged(hovered)]
            }
            RawInput::Release {
                device,
                point,
                outside,
            } => {
                if self.capturing_device() != Some(device) {
                    return Vec::new();
                }
                let Some(state) = self.active.take() else {
                    return Vec::new();
                };
                if !outside {
                    self.suppress_clicks_until = Some(now + self.suppression);
                }

                if state.has_crossed_threshold {
                    vec![GestureEvent::Drop {
                        from: state.source_square,
                        to: probe.square_at(point),
                    }]
                } else {
                    vec![GestureEvent::Tap(state.source_square)]
                }
            }
            RawInput::Click { point } => {
                if self.active.is_some() {
                    return Vec::new();
                }
                if let Some(until) = self.suppress_clicks_until.take() {
                    if now <= until {
                        debug!("suppressed synthetic click after release");
                        return Vec::new();
                    }
                }
                probe
                    .square_at(point)
                    .map(GestureEvent::Tap)
                    .into_iter()
                    .collect()
            }
            RawInput::Cancel { device } => {
                if self.capturing_device() == Some(device) {
                    self.cancel()
                } else {
                    Vec::new()
                }
            }
            RawInput::Blur | RawInput::VisibilityHidden => self.cancel(),
        }
    }

    /// Abandon the gesture in flight. No-op when idle.
    pub fn cancel(&mut self) -> Vec<GestureEvent> {
        match self.active.take() {
            Some(state) => {
                debug!(from = %state.source_square, "gesture cancelled");
                vec![GestureEvent::Cancelled {
                    from: state.source_square,
                    was_dragging: state.has_crossed_threshold,
                }]
            }
            None => Vec::new(),
        }
    }
}
