//! Rate-limited, trigger-gated interaction queue.
//!
//! [`DispatchState`] is the queue itself: a FIFO of [`QueuedEvent`]s plus the
//! waiter installed by the last sent event. At most one event is in flight;
//! the next one leaves only once that waiter accepts a trigger.
//!
//! [`spawn`] runs a state on a tokio task that owns the host-facing
//! [`InteractionSink`]. Producers talk to it through a cloneable
//! [`DispatchHandle`]; a periodic tick releases any waiter so the queue
//! cannot stall on a dropped acknowledgement.

use crate::interaction::{Click, InteractionEvent, QueuedEvent, TriggerKind, Waiter};
use crate::protocol::SortPayload;
use std::collections::VecDeque;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, trace};

/// Host side of the queue: where events are finally delivered.
pub trait InteractionSink: Send {
    /// Perform a slot click.
    fn click(&mut self, click: &Click);

    /// Send a remote sort message to the authoritative peer.
    fn send_sort(&mut self, payload: &SortPayload);
}

fn deliver(event: InteractionEvent, sink: &mut dyn InteractionSink) {
    trace!(%event, "sending interaction");
    match event {
        InteractionEvent::Click(click) => sink.click(&click),
        InteractionEvent::Sort(payload) => sink.send_sort(&payload),
        InteractionEvent::Callback(callback) => callback(),
    }
}

/// FIFO of pending events and the active waiter.
#[derive(Debug, Default)]
pub struct DispatchState {
    queue: VecDeque<QueuedEvent>,
    waiter: Option<Waiter>,
}

impl DispatchState {
    /// Create an idle queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one event. Sends right away if nothing is in flight.
    ///
    /// Returns how many events were sent.
    pub fn push(&mut self, event: QueuedEvent, sink: &mut dyn InteractionSink) -> usize {
        self.push_all(std::iter::once(event), sink)
    }

    /// Queue events in order. Sends right away if nothing is in flight.
    ///
    /// Returns how many events were sent.
    pub fn push_all<I>(&mut self, events: I, sink: &mut dyn InteractionSink) -> usize
    where
        I: IntoIterator<Item = QueuedEvent>,
    {
        self.queue.extend(events);
        if self.waiter.is_none() {
            self.trigger(TriggerKind::Initial, sink)
        } else {
            0
        }
    }

    /// Offer a trigger to the active waiter. If it accepts (or nothing is in
    /// flight), send events until one installs a waiter that does not accept
    /// [`TriggerKind::Initial`] or the queue runs dry.
    ///
    /// Returns how many events were sent.
    pub fn trigger(&mut self, kind: TriggerKind, sink: &mut dyn InteractionSink) -> usize {
        if let Some(waiter) = &self.waiter {
            if !waiter.accepts(kind) {
                return 0;
            }
        }

        let mut sent = 0;
        loop {
            let Some(next) = self.queue.pop_front() else {
                self.waiter = None;
                break;
            };
            deliver(next.event, sink);
            sent += 1;
            self.waiter = Some(next.waiter);
            if !next.waiter.accepts(TriggerKind::Initial) {
                break;
            }
        }
        sent
    }

    /// Drop every pending event and reset the waiter. Returns the number dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        self.waiter = None;
        dropped
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no events are pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Whether nothing is pending and nothing is in flight.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.waiter.is_none()
    }
}

/// The dispatcher task has stopped; the command was not delivered.
#[derive(Debug, Clone, Copy, Error)]
#[error("interaction dispatcher has stopped")]
pub struct DispatchClosed;

#[derive(Debug)]
enum Command {
    Push(Vec<QueuedEvent>),
    Trigger(TriggerKind),
    Clear,
    SetTickInterval(Duration),
}

/// Cloneable producer side of a spawned dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl DispatchHandle {
    fn send(&self, command: Command) -> Result<(), DispatchClosed> {
        self.commands.send(command).map_err(|_| DispatchClosed)
    }

    /// Queue one event.
    pub fn push(&self, event: QueuedEvent) -> Result<(), DispatchClosed> {
        self.send(Command::Push(vec![event]))
    }

    /// Queue events in order, as one unit.
    pub fn push_all<I>(&self, events: I) -> Result<(), DispatchClosed>
    where
        I: IntoIterator<Item = QueuedEvent>,
    {
        self.send(Command::Push(events.into_iter().collect()))
    }

    /// Forward a host signal to the active waiter.
    pub fn trigger(&self, kind: TriggerKind) -> Result<(), DispatchClosed> {
        self.send(Command::Trigger(kind))
    }

    /// Drop everything pending; used when the menu closes.
    pub fn clear(&self) -> Result<(), DispatchClosed> {
        self.send(Command::Clear)
    }

    /// Change the periodic tick period.
    pub fn set_tick_interval(&self, period: Duration) -> Result<(), DispatchClosed> {
        self.send(Command::SetTickInterval(period))
    }
}

/// Start a dispatcher task delivering to `sink`, ticking every `tick`.
///
/// The task ends once every [`DispatchHandle`] is dropped and hands the sink
/// back through its join handle. Events still pending at that point are
/// dropped.
pub fn spawn<S>(sink: S, tick: Duration) -> (DispatchHandle, JoinHandle<S>)
where
    S: InteractionSink + 'static,
{
    let (commands, receiver) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(sink, receiver, tick));
    (DispatchHandle { commands }, task)
}

fn ticker(period: Duration) -> Interval {
    let period = period.max(Duration::from_millis(1));
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn run<S>(mut sink: S, mut commands: mpsc::UnboundedReceiver<Command>, tick: Duration) -> S
where
    S: InteractionSink,
{
    let mut state = DispatchState::new();
    let mut interval = ticker(tick);

    loop {
        tokio::select! {
            biased;
            command = commands.recv() => {
                let Some(command) = command else { break };
                match command {
                    Command::Push(events) => {
                        state.push_all(events, &mut sink);
                    }
                    Command::Trigger(kind) => {
                        state.trigger(kind, &mut sink);
                    }
                    Command::Clear => {
                        let dropped = state.clear();
                        debug!(dropped, "cleared interaction queue");
                    }
                    Command::SetTickInterval(period) => {
                        debug!(?period, "interaction tick interval changed");
                        interval = ticker(period);
                    }
                }
            }
            _ = interval.tick() => {
                state.trigger(TriggerKind::Tick, &mut sink);
            }
        }
    }

    debug!(pending = state.len(), "interaction dispatcher stopped");
    sink
}
