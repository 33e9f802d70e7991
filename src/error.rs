//! Error taxonomy shared by every blocking, non-blocking, and select
//! operation in this crate.
//!
//! This mirrors the status-code taxonomy of the C channel library this
//! crate is modeled on (`SUCCESS`, `CLOSED_ERROR`, `CHANNEL_FULL`,
//! `CHANNEL_EMPTY`, `DESTROY_ERROR`, `GEN_ERROR`), recast as an ordinary
//! `Result` error type instead of an out-parameter status code.

use thiserror::Error;

/// Failure modes for channel and select operations.
///
/// `Success` has no corresponding variant: operations that succeed return
/// `Ok(())` or `Ok(value)` rather than an error at all.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ChannelError {
    /// The channel was, or became, closed during the operation.
    ///
    /// For `send`, the value was not enqueued. For `receive`, no value was
    /// produced. For `close`, the channel was already closed. For `select`,
    /// one of the participating channels was closed; the caller learns
    /// which one from the returned index.
    #[error("channel is closed")]
    Closed,

    /// Non-blocking `send`/`try_send` found the buffer full.
    ///
    /// This is a momentary-unavailability signal, not a terminal state.
    #[error("channel is full")]
    Full,

    /// Non-blocking `receive`/`try_receive` found the buffer empty.
    ///
    /// This is a momentary-unavailability signal, not a terminal state.
    #[error("channel is empty")]
    Empty,

    /// `destroy` was called on a channel that has not been `close`d yet.
    #[error("cannot destroy a channel that is still open")]
    Destroy,

    /// Any other failure, e.g. a poisoned mutex recovered during a lock
    /// acquisition, or `destroy` called while other handles are still live.
    #[error("channel operation failed: {0}")]
    Gen(String),
}

impl ChannelError {
    pub fn is_closed(&self) -> bool {
        matches!(self, ChannelError::Closed)
    }

    pub fn is_full(&self) -> bool {
        matches!(self, ChannelError::Full)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ChannelError::Empty)
    }
}

/// Error returned by [`crate::Channel::try_send`].
///
/// Unlike [`ChannelError`], this carries the value back to the caller on
/// failure so a rejected send never silently drops data — the same
/// contract `std::sync::mpsc::SyncSender::try_send` makes with its own
/// `TrySendError<T>`.
#[derive(Debug, PartialEq, Eq)]
pub enum TrySendError<T> {
    /// The buffer is full; the channel is otherwise open.
    Full(T),
    /// The channel was, or became, closed.
    Closed(T),
    /// Any other failure, e.g. a poisoned mutex.
    Gen(T, String),
}

impl<T> TrySendError<T> {
    /// Extracts the value that could not be sent.
    pub fn into_inner(self) -> T {
        match self {
            TrySendError::Full(v) | TrySendError::Closed(v) | TrySendError::Gen(v, _) => v,
        }
    }

    /// Drops the carried value and converts to the shared [`ChannelError`]
    /// taxonomy, as used by [`crate::select`] when re-attempting a send
    /// intent.
    pub fn into_channel_error(self) -> ChannelError {
        match self {
            TrySendError::Full(_) => ChannelError::Full,
            TrySendError::Closed(_) => ChannelError::Closed,
            TrySendError::Gen(_, msg) => ChannelError::Gen(msg),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Display for TrySendError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrySendError::Full(_) => write!(f, "channel is full"),
            TrySendError::Closed(_) => write!(f, "channel is closed"),
            TrySendError::Gen(_, msg) => write!(f, "channel operation failed: {msg}"),
        }
    }
}

impl<T: std::fmt::Debug> std::error::Error for TrySendError<T> {}
