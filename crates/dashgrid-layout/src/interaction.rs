//! Drag/resize lifecycle tracking for live visual feedback.
//!
//! ```text
//! Idle --drag_start(id)--> Dragging(id) --drag_stop(id)--> Idle
//! Idle --resize_start(id)--> Resizing(id) --resize_stop(id)--> Idle
//! ```
//!
//! The grid primitive serializes pointer interactions, so a start while
//! another interaction is active replaces the active widget (last writer
//! wins). Every other unexpected event is a [`InteractionEffect::Noop`] with
//! an explicit reason. Nothing here is persisted.

use serde::{Deserialize, Serialize};

/// Interaction lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "widget", rename_all = "snake_case")]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging(String),
    Resizing(String),
}

/// Coarse mode without the widget id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    #[default]
    Idle,
    Dragging,
    Resizing,
}

impl InteractionState {
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        match self {
            Self::Idle => InteractionMode::Idle,
            Self::Dragging(_) => InteractionMode::Dragging,
            Self::Resizing(_) => InteractionMode::Resizing,
        }
    }

    #[must_use]
    pub fn active_widget_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Dragging(id) | Self::Resizing(id) => Some(id),
        }
    }
}

/// Pointer lifecycle event from the grid primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "widget", rename_all = "snake_case")]
pub enum InteractionEvent {
    DragStart(String),
    DragStop(String),
    ResizeStart(String),
    ResizeStop(String),
}

/// Why an event left the state unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionNoopReason {
    /// A stop arrived with nothing active.
    IdleWithoutActiveInteraction,
    /// A drag stop during a resize, or the reverse.
    ModeMismatch,
    /// A stop for a different widget than the active one.
    TargetMismatch,
}

/// Effect of one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum InteractionEffect {
    Started { widget: String },
    /// A start replaced an interaction already in progress.
    Replaced { previous: String, widget: String },
    Finished { widget: String },
    Noop { reason: InteractionNoopReason },
}

/// One state transition with a monotonically increasing id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionTransition {
    pub transition_id: u64,
    pub from: InteractionState,
    pub to: InteractionState,
    pub effect: InteractionEffect,
}

/// Tracks which widget, if any, is being dragged or resized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionTracker {
    state: InteractionState,
    transition_counter: u64,
}

impl InteractionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    #[must_use]
    pub fn active_widget_id(&self) -> Option<&str> {
        self.state.active_widget_id()
    }

    /// True while dragging or resizing; drives background grid highlighting.
    #[must_use]
    pub fn is_grid_active(&self) -> bool {
        !matches!(self.state, InteractionState::Idle)
    }

    /// Return to `Idle` regardless of state. `None` if already idle.
    pub fn reset(&mut self) -> Option<InteractionTransition> {
        let widget = self.state.active_widget_id()?.to_string();
        let from = std::mem::take(&mut self.state);
        Some(self.record(from, InteractionEffect::Finished { widget }))
    }

    /// Apply one lifecycle event.
    pub fn apply(&mut self, event: &InteractionEvent) -> InteractionTransition {
        let from = self.state.clone();
        let effect = match (&from, event) {
            (InteractionState::Idle, InteractionEvent::DragStart(id)) => {
                self.state = InteractionState::Dragging(id.clone());
                InteractionEffect::Started { widget: id.clone() }
            }
            (InteractionState::Idle, InteractionEvent::ResizeStart(id)) => {
                self.state = InteractionState::Resizing(id.clone());
                InteractionEffect::Started { widget: id.clone() }
            }
            (
                InteractionState::Idle,
                InteractionEvent::DragStop(_) | InteractionEvent::ResizeStop(_),
            ) => InteractionEffect::Noop {
                reason: InteractionNoopReason::IdleWithoutActiveInteraction,
            },
            (
                InteractionState::Dragging(active) | InteractionState::Resizing(active),
                InteractionEvent::DragStart(id) | InteractionEvent::ResizeStart(id),
            ) => {
                let previous = active.clone();
                self.state = match event {
                    InteractionEvent::DragStart(_) => InteractionState::Dragging(id.clone()),
                    _ => InteractionState::Resizing(id.clone()),
                };
                InteractionEffect::Replaced {
                    previous,
                    widget: id.clone(),
                }
            }
            (InteractionState::Dragging(active), InteractionEvent::DragStop(id))
            | (InteractionState::Resizing(active), InteractionEvent::ResizeStop(id)) => {
                if active != id {
                    InteractionEffect::Noop {
                        reason: InteractionNoopReason::TargetMismatch,
                    }
                } else {
                    let widget = active.clone();
                    self.state = InteractionState::Idle;
                    InteractionEffect::Finished { widget }
                }
            }
            (InteractionState::Dragging(_), InteractionEvent::ResizeStop(_))
            | (InteractionState::Resizing(_), InteractionEvent::DragStop(_)) => {
                InteractionEffect::Noop {
                    reason: InteractionNoopReason::ModeMismatch,
                }
            }
        };
        self.record(from, effect)
    }

    fn record(&mut self, from: InteractionState, effect: InteractionEffect) -> InteractionTransition {
        self.transition_counter = self.transition_counter.saturating_add(1);
        InteractionTransition {
            transition_id: self.transition_counter,
            from,
            to: self.state.clone(),
            effect,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
