#![warn(missing_docs)]
//! Interaction plumbing between the sort engine and the host: click and
//! remote-sort events, the paced dispatch queue, and the wire codec for the
//! remote sort channel.

mod codec;
mod dispatch;
mod interaction;
mod protocol;

pub use codec::{decode_client_message, encode_client_message};
pub use dispatch::{spawn, DispatchClosed, DispatchHandle, DispatchState, InteractionSink};
pub use interaction::{
    Callback, Click, InteractionEvent, MouseButton, QueuedEvent, TriggerKind, Waiter,
};
pub use protocol::{ClientMessage, SortPayload, MAX_SLOT_PAIRS};
