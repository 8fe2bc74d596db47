//! Interaction events and the waiters that gate them.

use crate::protocol::SortPayload;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mouse button used for a pickup click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// Left click: pick up, place, merge or swap the whole stack.
    Primary,
    /// Right click: for container items, swap instead of absorbing.
    Secondary,
}

impl MouseButton {
    /// Host button id.
    pub fn id(self) -> u8 {
        match self {
            MouseButton::Primary => 0,
            MouseButton::Secondary => 1,
        }
    }
}

/// A pickup click on one menu slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Click {
    /// Menu the click targets.
    pub container_id: i32,
    /// Menu slot id.
    pub slot_id: usize,
    /// Button pressed.
    pub button: MouseButton,
    /// Feedback sound pitch, when a sound should accompany the click.
    pub pitch: Option<f32>,
}

impl Click {
    /// Primary-button click without sound.
    pub fn primary(container_id: i32, slot_id: usize) -> Self {
        Self {
            container_id,
            slot_id,
            button: MouseButton::Primary,
            pitch: None,
        }
    }

    /// Switch the button.
    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    /// Attach a feedback sound pitch.
    pub fn with_pitch(mut self, pitch: Option<f32>) -> Self {
        self.pitch = pitch;
        self
    }
}

/// Signals that can release the active waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// An event was just pushed onto an idle queue, or just sent.
    Initial,
    /// The host acknowledged a slot content update.
    SlotUpdate,
    /// The host confirmed a batch of clicks.
    BatchConfirmed,
    /// The carried item changed.
    HeldItemChanged,
    /// Periodic tick. Releases every waiter.
    Tick,
}

/// Predicate deciding when the queue may move past a sent event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waiter {
    /// Next event goes out right away.
    Immediate,
    /// Wait for the next periodic tick.
    Tick,
    /// Wait for a specific host signal (or the tick fallback).
    Signal(TriggerKind),
}

impl Waiter {
    /// Feed a trigger; returns whether the queue may proceed.
    pub fn accepts(&self, kind: TriggerKind) -> bool {
        match (*self, kind) {
            (Waiter::Immediate, _) => true,
            (_, TriggerKind::Tick) => true,
            (Waiter::Tick, _) => false,
            (Waiter::Signal(expected), kind) => kind == expected,
        }
    }
}

/// An arbitrary unit of work run in queue order.
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Unit of work delivered by the dispatch queue.
pub enum InteractionEvent {
    /// Click a slot.
    Click(Click),
    /// Send a remote sort message.
    Sort(SortPayload),
    /// Run a callback.
    Callback(Callback),
}

impl InteractionEvent {
    /// Wrap a closure.
    pub fn callback<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        InteractionEvent::Callback(Box::new(f))
    }

    /// The click, if this is one.
    pub fn as_click(&self) -> Option<&Click> {
        match self {
            InteractionEvent::Click(click) => Some(click),
            _ => None,
        }
    }
}

impl fmt::Debug for InteractionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionEvent::Click(click) => f.debug_tuple("Click").field(click).finish(),
            InteractionEvent::Sort(payload) => f.debug_tuple("Sort").field(payload).finish(),
            InteractionEvent::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

impl fmt::Display for InteractionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionEvent::Click(click) => write!(
                f,
                "click slot {} button {} in menu {}",
                click.slot_id,
                click.button.id(),
                click.container_id
            ),
            InteractionEvent::Sort(payload) => write!(
                f,
                "sort {} pairs in menu {}",
                payload.pair_count(),
                payload.container_id
            ),
            InteractionEvent::Callback(_) => f.write_str("callback"),
        }
    }
}

/// An event together with the waiter that gates the event after it.
#[derive(Debug)]
pub struct QueuedEvent {
    /// The work.
    pub event: InteractionEvent,
    /// Gate installed once `event` is sent.
    pub waiter: Waiter,
}

impl QueuedEvent {
    /// Pair an event with its waiter.
    pub fn new(event: InteractionEvent, waiter: Waiter) -> Self {
        Self { event, waiter }
    }

    /// A click gated by `waiter`.
    pub fn click(click: Click, waiter: Waiter) -> Self {
        Self::new(InteractionEvent::Click(click), waiter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_releases_every_waiter() {
        for waiter in [
            Waiter::Immediate,
            Waiter::Tick,
            Waiter::Signal(TriggerKind::BatchConfirmed),
        ] {
            assert!(waiter.accepts(TriggerKind::Tick), "{waiter:?}");
        }
    }

    #[test]
    fn test_only_immediate_accepts_initial() {
        assert!(Waiter::Immediate.accepts(TriggerKind::Initial));
        assert!(!Waiter::Tick.accepts(TriggerKind::Initial));
        assert!(!Waiter::Signal(TriggerKind::SlotUpdate).accepts(TriggerKind::Initial));
    }

    #[test]
    fn test_signal_waiter() {
        let waiter = Waiter::Signal(TriggerKind::BatchConfirmed);
        assert!(!waiter.accepts(TriggerKind::SlotUpdate));
        assert!(!waiter.accepts(TriggerKind::HeldItemChanged));
        assert!(waiter.accepts(TriggerKind::BatchConfirmed));
    }

    #[test]
    fn test_event_display() {
        let event = InteractionEvent::Click(Click::primary(0, 12).with_button(MouseButton::Secondary));
        assert_eq!(event.to_string(), "click slot 12 button 1 in menu 0");

        let sort = InteractionEvent::Sort(SortPayload::from_pairs(3, [(1, 2), (2, 1)]));
        assert_eq!(sort.to_string(), "sort 2 pairs in menu 3");

        let callback = InteractionEvent::callback(|| {});
        assert_eq!(format!("{callback:?}"), "Callback(..)");
        assert!(callback.as_click().is_none());
    }
}
