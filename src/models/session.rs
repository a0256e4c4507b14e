//! Session model - the single writer of all game session state.
//!
//! Input, clock ticks and the deferred game-over reveal all funnel through
//! `&mut self` on one thread, so a commit is always complete before the next
//! event is looked at.

use std::collections::HashSet;
use std::time::Duration;

use shakmaty::Square;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::domain::{
    AppliedMove, BoardLayout, BoardProbe, ChessClock, Cue, DragState, GameOverReason,
    GameOverRecord, GestureEvent, GestureUnifier, MoveHistory, PieceColor, Point, RawInput,
    RulesEngine, Scheduler, ShakmatyRules, TimeControl, TimerHandle, commit_cue,
};
use crate::error::SessionResult;

/// Work the session schedules for itself
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum SessionTask {
    ClockTick,
    RevealGameOver,
}

/// A promotion move waiting for the player to pick a piece
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PromotionRequest {
    pub color: PieceColor,
    pub from: Square,
    pub to: Square,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum CommitKind {
    Fresh,
    Redo,
}

pub struct Session<R: RulesEngine = ShakmatyRules> {
    pub(super) rules: R,
    pub(super) config: SessionConfig,
    pub(super) selection: Option<Square>,
    pub(super) legal_targets: HashSet<Square>,
    pub(super) capture_targets: HashSet<Square>,
    pub(super) promotion_targets: HashSet<Square>,
    pub(super) last_move: Option<(Square, Square)>,
    pub(super) promotion: Option<PromotionRequest>,
    pub(super) history: MoveHistory,
    pub(super) clock: ChessClock,
    pub(super) clock_timer: Option<TimerHandle>,
    /// Visible game-over record
    pub(super) game_over: Option<GameOverRecord>,
    /// Verdict of a finished game, set before the record is revealed
    pub(super) terminal: Option<GameOverRecord>,
    pub(super) pending_reveal: Option<TimerHandle>,
    pub(super) scheduler: Scheduler<SessionTask>,
    pub(super) gestures: GestureUnifier,
    pub(super) layout: BoardLayout,
    /// Selection as it was before the drag in flight picked its piece
    pub(super) pre_drag_selection: Option<Option<Square>>,
    pub(super) cues: Vec<Cue>,
    pub(super) check_flashes: u32,
    pub(super) celebrations: u32,
    /// Move number of the first history entry
    pub(super) first_move_number: usize,
    pub(super) now: Duration,
}

impl Session<ShakmatyRules> {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_rules(ShakmatyRules::new(), config)
    }
}

impl Default for Session<ShakmatyRules> {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl<R: RulesEngine> Session<R> {
    pub fn with_rules(rules: R, config: SessionConfig) -> Self {
        let first_move_number = fullmove_number(&rules.export_position());
        let mut clock = ChessClock::new(config.time_control);
        clock.set_active(rules.turn_to_move());

        Self {
            gestures: GestureUnifier::new(config.drag_threshold_px, config.click_suppression()),
            rules,
            config,
            selection: None,
            legal_targets: HashSet::new(),
            capture_targets: HashSet::new(),
            promotion_targets: HashSet::new(),
            last_move: None,
            promotion: None,
            history: MoveHistory::new(),
            clock,
            clock_timer: None,
            game_over: None,
            terminal: None,
            pending_reveal: None,
            scheduler: Scheduler::new(),
            layout: BoardLayout::default(),
            pre_drag_selection: None,
            cues: Vec::new(),
            check_flashes: 0,
            celebrations: 0,
            first_move_number,
            now: Duration::ZERO,
        }
    }

    // ---- accessors -------------------------------------------------------

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn selection(&self) -> Option<Square> {
        self.selection
    }

    pub fn legal_targets(&self) -> &HashSet<Square> {
        &self.legal_targets
    }

    pub fn capture_targets(&self) -> &HashSet<Square> {
        &self.capture_targets
    }

    pub fn last_move(&self) -> Option<(Square, Square)> {
        self.last_move
    }

    pub fn promotion_request(&self) -> Option<PromotionRequest> {
        self.promotion
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub fn clock(&self) -> &ChessClock {
        &self.clock
    }

    pub fn game_over(&self) -> Option<GameOverRecord> {
        self.game_over
    }

    /// True from the moment a game ends, even before its record is shown
    pub fn is_finished(&self) -> bool {
        self.terminal.is_some()
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    pub fn drag_state(&self) -> Option<&DragState> {
        self.gestures.drag_state()
    }

    pub fn check_flashes(&self) -> u32 {
        self.check_flashes
    }

    pub fn celebrations(&self) -> u32 {
        self.celebrations
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Scheduled timers, counting the clock tick and a pending reveal
    pub fn active_timer_count(&self) -> usize {
        self.scheduler.len()
    }

    /// Window-level input registrations held by the gesture in flight
    pub fn live_input_captures(&self) -> usize {
        self.gestures.registry().live()
    }

    /// Moves are only taken while the clock runs, the game is live and no
    /// promotion choice is outstanding
    pub fn accepts_moves(&self) -> bool {
        self.terminal.is_none() && self.promotion.is_none() && self.clock.is_running()
    }

    pub fn export_position(&self) -> String {
        self.rules.export_position()
    }

    /// Take every cue emitted since the last call
    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    // ---- time ------------------------------------------------------------

    /// Run every task due at or before `now`, in due order.
    ///
    /// Times earlier than the session's current time are ignored.
    pub fn advance_to(&mut self, now: Duration) {
        if now < self.now {
            debug!(?now, current = ?self.now, "ignoring time going backwards");
            return;
        }
        while let Some((due, task)) = self.scheduler.pop_due(now) {
            self.now = due;
            match task {
                SessionTask::ClockTick => self.on_clock_tick(),
                SessionTask::RevealGameOver => self.reveal_game_over(),
            }
        }
        self.now = now;
    }

    fn on_clock_tick(&mut self) {
        if self.promotion.is_some() {
            return;
        }
        let side = self.rules.turn_to_move();
        self.clock.tick(side, self.config.tick_period());
        self.evaluate_game_over(true);
    }

    fn reveal_game_over(&mut self) {
        self.pending_reveal = None;
        if let Some(record) = self.terminal {
            info!(message = record.message(), "showing game over");
            self.game_over = Some(record);
        }
    }

    // ---- input -----------------------------------------------------------

    /// Feed one device event through the gesture unifier
    pub fn handle_input(&mut self, input: RawInput) {
        let probe = SessionProbe {
            layout: &self.layout,
            rules: &self.rules,
            accepting: self.accepts_moves(),
        };
        let events = self.gestures.handle(input, self.now, &probe);
        for event in events {
            self.on_gesture(event);
        }
    }

    fn on_gesture(&mut self, event: GestureEvent) {
        match event {
            GestureEvent::Tap(square) => self.tap(square),
            GestureEvent::DragStarted(square) => self.begin_drag(square),
            GestureEvent::HoverChanged(square) => debug!(?square, "hover"),
            GestureEvent::Drop { from, to } => self.drop_piece(from, to),
            GestureEvent::Cancelled { from, was_dragging } => {
                debug!(%from, was_dragging, "restoring pre-drag selection");
                self.restore_pre_drag();
            }
        }
    }

    /// Abandon whatever gesture is in flight, restoring the pre-drag state
    pub(super) fn cancel_gesture(&mut self) {
        for event in self.gestures.cancel() {
            self.on_gesture(event);
        }
        self.pre_drag_selection = None;
    }

    pub fn set_panel_size(&mut self, width: f32, height: f32) {
        self.layout.panel_width = width;
        self.layout.panel_height = height;
    }

    pub fn flip_board(&mut self) {
        self.cancel_gesture();
        self.layout.flipped = !self.layout.flipped;
        debug!(flipped = self.layout.flipped, "board flipped");
    }

    /// Square under a panel-relative point
    pub fn square_at(&self, point: Point) -> Option<Square> {
        self.layout.square_at(point)
    }

    // ---- commit and game over ---------------------------------------------

    pub(super) fn commit(&mut self, applied: AppliedMove, kind: CommitKind) {
        let mover = applied.color;
        let (from, to, flags) = (applied.from, applied.to, applied.flags);
        info!(san = %applied.san, ?mover, ?kind, "move committed");

        match kind {
            CommitKind::Fresh => self.history.record(applied),
            CommitKind::Redo => self.history.record_redo(applied),
        }
        self.cancel_gesture();
        self.clear_selection();
        self.promotion = None;
        self.last_move = Some((from, to));

        let gives_check = self.rules.is_check();
        let gives_mate = self.rules.is_checkmate();
        if let Some(cue) = commit_cue(flags, gives_check, gives_mate) {
            self.emit(cue);
        }

        self.evaluate_game_over(true);

        self.clock.apply_increment(mover);
        self.clock.set_active(self.rules.turn_to_move());
    }

    /// Checkmate, stalemate, other draws, then flag-fall
    pub(super) fn evaluate_game_over(&mut self, include_flag_fall: bool) {
        if self.terminal.is_some() {
            return;
        }
        let to_move = self.rules.turn_to_move();
        let verdict = if self.rules.is_checkmate() {
            Some(GameOverRecord::checkmate(to_move.opposite()))
        } else if self.rules.is_stalemate() {
            Some(GameOverRecord::drawn(GameOverReason::Stalemate))
        } else if self.rules.is_draw() {
            Some(GameOverRecord::drawn(GameOverReason::Draw))
        } else if include_flag_fall {
            self.clock
                .flagged()
                .map(|loser| GameOverRecord::on_time(loser.opposite()))
        } else {
            None
        };

        if let Some(record) = verdict {
            self.finish_game(record);
        }
    }

    fn finish_game(&mut self, record: GameOverRecord) {
        info!(reason = ?record.reason, winner = ?record.winner, "game over");
        self.stop_clock_timer();
        self.terminal = Some(record);
        self.promotion = None;
        self.cancel_gesture();
        self.clear_selection();

        if record.is_decisive() {
            self.celebrations += 1;
            self.emit(Cue::GameOver);
            let due = self.now + self.config.game_over_reveal_delay();
            self.pending_reveal = Some(
                self.scheduler
                    .schedule_at(due, SessionTask::RevealGameOver),
            );
        } else {
            self.game_over = Some(record);
        }
    }

    fn cancel_pending_reveal(&mut self) {
        if let Some(handle) = self.pending_reveal.take() {
            self.scheduler.cancel(handle);
        }
    }

    /// Hide the game-over record, or stop one that is about to appear.
    ///
    /// The board stays frozen until undo, reset or load.
    pub fn dismiss_game_over(&mut self) -> bool {
        let pending = self.pending_reveal.is_some();
        self.cancel_pending_reveal();
        let shown = self.game_over.take().is_some();
        if pending || shown {
            debug!(pending, shown, "game over dismissed");
        }
        pending || shown
    }

    // ---- clock -----------------------------------------------------------

    /// Start the clock; moves are accepted from now on. Idempotent.
    pub fn start_clock(&mut self) -> bool {
        if self.terminal.is_some() {
            debug!("game is over, clock stays stopped");
            return false;
        }
        if !self.clock.start() {
            return false;
        }
        self.clock.set_active(self.rules.turn_to_move());
        let period = self.config.tick_period();
        self.clock_timer = Some(self.scheduler.schedule_repeating(
            self.now + period,
            period,
            SessionTask::ClockTick,
        ));
        info!(active = ?self.clock.active(), "clock started");
        true
    }

    /// Stop the clock. Idempotent.
    pub fn pause_clock(&mut self) -> bool {
        let was_running = self.stop_clock_timer();
        if was_running {
            info!("clock paused");
        }
        was_running
    }

    fn stop_clock_timer(&mut self) -> bool {
        if let Some(handle) = self.clock_timer.take() {
            self.scheduler.cancel(handle);
        }
        self.clock.pause()
    }

    /// Pauses and fully resets both clocks
    pub fn set_time_control(&mut self, control: TimeControl) {
        self.stop_clock_timer();
        self.config.time_control = control;
        self.clock.set_time_control(control);
        info!(
            base_ms = control.base_ms,
            increment_ms = control.increment_ms,
            "time control changed"
        );
    }

    // ---- history ---------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.history.can_undo() && self.promotion.is_none() && self.game_over.is_none()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
            && self.promotion.is_none()
            && self.game_over.is_none()
            && self.terminal.is_none()
            && self.clock.is_running()
    }

    /// Take back the last move. Reopens a finished game.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        let Some(reverted) = self.rules.undo_last_move() else {
            warn!("history and engine disagree, nothing to undo");
            return false;
        };
        self.history.undo();

        self.cancel_gesture();
        self.clear_selection();
        self.last_move = None;
        self.cancel_pending_reveal();
        self.terminal = None;
        self.clock.set_active(self.rules.turn_to_move());
        self.evaluate_game_over(false);
        self.emit(Cue::Move);

        info!(san = %reverted.san, "move undone");
        true
    }

    /// Replay the most recently undone move as if freshly played
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        let Some(next) = self.history.take_redo() else {
            return false;
        };
        match self.rules.apply_notation(&next.san) {
            Ok(applied) => {
                self.commit(applied, CommitKind::Redo);
                true
            }
            Err(err) => {
                warn!(%err, san = %next.san, "redo failed");
                self.history.restore_redo(next);
                false
            }
        }
    }

    // ---- lifecycle -------------------------------------------------------

    /// New game from the starting position
    pub fn reset(&mut self) {
        self.rules.reset();
        self.reset_session_state();
        info!("session reset");
    }

    /// Replace the game with a FEN position. A rejected position leaves the
    /// session exactly as it was.
    pub fn load_position(&mut self, fen: &str) -> SessionResult<()> {
        if let Err(err) = self.rules.load_position(fen) {
            warn!(%err, "position rejected");
            return Err(err.into());
        }
        self.reset_session_state();
        info!(fen, "position loaded");
        Ok(())
    }

    fn reset_session_state(&mut self) {
        self.cancel_gesture();
        self.clear_selection();
        self.last_move = None;
        self.promotion = None;
        self.history.clear();

        self.stop_clock_timer();
        self.cancel_pending_reveal();
        self.scheduler.clear();
        self.clock.reset();
        self.clock.set_active(self.rules.turn_to_move());

        self.game_over = None;
        self.terminal = None;
        self.first_move_number = fullmove_number(&self.rules.export_position());
    }

    // ---- helpers shared with the intent resolver -------------------------

    pub(super) fn emit(&mut self, cue: Cue) {
        debug!(?cue, "cue");
        self.cues.push(cue);
    }

    pub(super) fn flash_check(&mut self) {
        self.check_flashes += 1;
    }

    pub(super) fn clear_selection(&mut self) {
        self.selection = None;
        self.legal_targets.clear();
        self.capture_targets.clear();
        self.promotion_targets.clear();
    }

    /// Select `square` and recompute its targets
    pub(super) fn select(&mut self, square: Square) {
        self.clear_selection();
        for target in self.rules.legal_moves(square) {
            self.legal_targets.insert(target.to);
            if target.flags.capture {
                self.capture_targets.insert(target.to);
            }
            if target.flags.promotion {
                self.promotion_targets.insert(target.to);
            }
        }
        self.selection = Some(square);
        debug!(%square, targets = self.legal_targets.len(), "selected");
    }

    pub(super) fn is_own_piece(&self, square: Square) -> bool {
        self.rules
            .piece_at(square)
            .is_some_and(|piece| piece.color == self.rules.turn_to_move())
    }
}

/// Board queries the gesture unifier makes while the session is borrowed
struct SessionProbe<'a, R> {
    layout: &'a BoardLayout,
    rules: &'a R,
    accepting: bool,
}

impl<R: RulesEngine> BoardProbe for SessionProbe<'_, R> {
    fn square_at(&self, point: Point) -> Option<Square> {
        self.layout.square_at(point)
    }

    fn can_pick(&self, square: Square) -> bool {
        self.accepting
            && self
                .rules
                .piece_at(square)
                .is_some_and(|piece| piece.color == self.rules.turn_to_move())
    }
}

/// Sixth FEN field, 1 when missing
fn fullmove_number(fen: &str) -> usize {
    fen.split_whitespace()
        .nth(5)
        .and_then(|n| n.parse().ok())
        .unwrap_or(1)
}
