use serde::Serialize;
use tracing::trace;

use tilebatch_core::PeId;

/// Where a PE is within one launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PeState {
    Idle,
    IteratingBatches,
    EvaluatingTile,
    PoppingSubBatch,
    Dispatching,
    Skipping,
    SignalingCompletion,
}

impl PeState {
    /// Legal edges of the per-PE state machine. There is no edge out of a
    /// tile before its popped sub-batch has been signalled.
    pub fn can_transition_to(self, next: PeState) -> bool {
        use PeState::*;
        matches!(
            (self, next),
            (Idle, IteratingBatches)
                | (IteratingBatches, EvaluatingTile)
                | (IteratingBatches, Idle)
                | (EvaluatingTile, PoppingSubBatch)
                | (EvaluatingTile, IteratingBatches)
                | (PoppingSubBatch, Dispatching)
                | (PoppingSubBatch, Skipping)
                | (Dispatching, SignalingCompletion)
                | (Skipping, SignalingCompletion)
                | (SignalingCompletion, PoppingSubBatch)
                | (SignalingCompletion, IteratingBatches)
        )
    }
}

/// Tracks a PE's current state, optionally keeping the full history.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    pe: PeId,
    state: PeState,
    transitions: usize,
    history: Option<Vec<PeState>>,
}

impl Lifecycle {
    pub fn new(pe: PeId) -> Self {
        Self {
            pe,
            state: PeState::Idle,
            transitions: 0,
            history: None,
        }
    }

    /// Keep every visited state, starting with `Idle`.
    pub fn recording(pe: PeId) -> Self {
        Self {
            history: Some(vec![PeState::Idle]),
            ..Self::new(pe)
        }
    }

    pub fn state(&self) -> PeState {
        self.state
    }

    pub fn transitions(&self) -> usize {
        self.transitions
    }

    pub fn history(&self) -> Option<&[PeState]> {
        self.history.as_deref()
    }

    pub fn advance(&mut self, next: PeState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "PE {} illegal transition {:?} -> {:?}",
            self.pe,
            self.state,
            next
        );
        trace!(pe = self.pe, from = ?self.state, to = ?next, "state transition");
        self.state = next;
        self.transitions += 1;
        if let Some(history) = self.history.as_mut() {
            history.push(next);
        }
    }
}
