//! Move-intent resolver: what a tap, drag or drop means for the selection.
//!
//! Idle and Selected are `selection == None` / `Some(s)`; PromotionPending is
//! `promotion == Some(_)`, during which every board input is ignored.

use shakmaty::Square;
use tracing::{debug, info, warn};

use crate::domain::{Cue, MoveRequest, PieceKind, RulesEngine};
use crate::models::session::{CommitKind, PromotionRequest, Session};

impl<R: RulesEngine> Session<R> {
    /// A tap or click on `square`
    pub fn tap(&mut self, square: Square) {
        if self.promotion.is_some() {
            debug!(%square, "awaiting promotion choice, tap ignored");
            return;
        }
        if !self.accepts_moves() {
            // Only an illegal destination gets feedback on a frozen board
            if let Some(selected) = self.selection {
                if square != selected
                    && !self.legal_targets.contains(&square)
                    && !self.is_own_piece(square)
                {
                    self.reject_destination();
                }
            }
            return;
        }
        match self.selection {
            None => self.tap_idle(square),
            Some(selected) => self.tap_selected(selected, square),
        }
    }

    fn tap_idle(&mut self, square: Square) {
        if self.is_own_piece(square) {
            self.pick(square);
        } else if self.rules.is_check() {
            self.flash_check();
        }
    }

    fn tap_selected(&mut self, selected: Square, square: Square) {
        if square == selected {
            debug!(%square, "deselected");
            self.clear_selection();
        } else if self.legal_targets.contains(&square) {
            self.attempt_move(selected, square);
        } else if self.is_own_piece(square) {
            self.pick(square);
        } else {
            self.reject_destination();
        }
    }

    /// Select an own piece, unless the king is in check and it cannot help.
    /// Returns whether the selection changed.
    fn pick(&mut self, square: Square) -> bool {
        if self.rules.is_check() && self.rules.legal_moves(square).is_empty() {
            self.flash_check();
            self.emit(Cue::Illegal);
            return false;
        }
        self.select(square);
        true
    }

    fn reject_destination(&mut self) {
        self.emit(Cue::Illegal);
        self.clear_selection();
    }

    fn attempt_move(&mut self, from: Square, to: Square) {
        if self.promotion_targets.contains(&to) {
            let color = self.rules.turn_to_move();
            info!(%from, %to, ?color, "awaiting promotion choice");
            self.promotion = Some(PromotionRequest { color, from, to });
            return;
        }
        match self.rules.apply_move(MoveRequest::new(from, to)) {
            Ok(applied) => self.commit(applied, CommitKind::Fresh),
            Err(err) => {
                warn!(%err, "engine rejected a highlighted target");
                self.reject_destination();
            }
        }
    }

    pub(super) fn begin_drag(&mut self, square: Square) {
        if !self.accepts_moves() {
            return;
        }
        self.pre_drag_selection = Some(self.selection);
        if self.selection != Some(square) {
            self.pick(square);
        }
    }

    /// A drop back on the origin or off the board leaves the selection alone
    pub(super) fn drop_piece(&mut self, from: Square, to: Option<Square>) {
        self.pre_drag_selection = None;
        let Some(to) = to else {
            return;
        };
        if to == from || self.selection != Some(from) {
            return;
        }
        self.tap(to);
    }

    pub(super) fn restore_pre_drag(&mut self) {
        let Some(previous) = self.pre_drag_selection.take() else {
            return;
        };
        match previous {
            Some(square) => self.select(square),
            None => self.clear_selection(),
        }
    }

    /// Finish a pending promotion with the chosen piece
    pub fn choose_promotion(&mut self, kind: PieceKind) -> bool {
        let Some(request) = self.promotion else {
            return false;
        };
        if !kind.is_promotion_choice() {
            debug!(?kind, "not a promotion piece");
            return false;
        }
        // Stays pending while the clock is paused; resuming lets it finish
        if self.terminal.is_some() || !self.clock.is_running() {
            debug!(?kind, "promotion choice while the clock is stopped");
            return false;
        }
        self.promotion = None;
        let move_request = MoveRequest::new(request.from, request.to).with_promotion(kind);
        match self.rules.apply_move(move_request) {
            Ok(applied) => {
                self.commit(applied, CommitKind::Fresh);
                true
            }
            Err(err) => {
                warn!(%err, "promotion rejected");
                self.clear_selection();
                false
            }
        }
    }

    /// Back out of a pending promotion without moving
    pub fn cancel_promotion(&mut self) -> bool {
        if self.promotion.take().is_none() {
            return false;
        }
        debug!("promotion cancelled");
        self.clear_selection();
        true
    }
}
