//! The select engine: blocks until one of several heterogeneous send/receive
//! intents on distinct channels becomes ready, per spec.md §4.2.
//!
//! Intents are erased behind the object-safe [`SelectOp`] trait so a single
//! call to [`select`] can mix a `Channel<A>` send with a `Channel<B>`
//! receive — the channels need not share a payload type.

use std::sync::Arc;

use crate::channel::Channel;
use crate::error::{ChannelError, TrySendError};
use crate::registry::RegistrationKey;
use crate::semaphore::Semaphore;

/// One send or receive intent offered to [`select`].
///
/// Implementations must be object-safe: `select` holds a slice of
/// `&mut dyn SelectOp` so intents over channels of different payload types
/// can be mixed in one call.
pub trait SelectOp {
    /// Registers `token` with this intent's channel. Returns
    /// `Err(ChannelError::Closed)` immediately if the channel is already
    /// closed, mirroring spec.md §4.2 step 2.
    fn register(&mut self, token: &Arc<Semaphore>) -> Result<(), ChannelError>;

    /// Deregisters the token registered by [`SelectOp::register`]. Must be
    /// safe to call even if `register` was never called or already failed.
    fn deregister(&mut self);

    /// Attempts the intent's operation non-blockingly.
    ///
    /// `Ok(())` means the operation completed. `Err(ChannelError::Full)` /
    /// `Err(ChannelError::Empty)` mean "not ready yet" and are not terminal.
    /// Any other `Err` ends the select.
    fn attempt(&mut self) -> Result<(), ChannelError>;
}

/// A `send(channel, value)` intent.
pub struct SendIntent<'a, T> {
    channel: &'a Arc<Channel<T>>,
    value: Option<T>,
    key: Option<RegistrationKey>,
}

impl<'a, T> SendIntent<'a, T> {
    pub fn new(channel: &'a Arc<Channel<T>>, value: T) -> Self {
        SendIntent {
            channel,
            value: Some(value),
            key: None,
        }
    }
}

impl<'a, T> SelectOp for SendIntent<'a, T> {
    fn register(&mut self, token: &Arc<Semaphore>) -> Result<(), ChannelError> {
        let key = self.channel.register_selector(Arc::clone(token))?;
        self.key = Some(key);
        Ok(())
    }

    fn deregister(&mut self) {
        if let Some(key) = self.key.take() {
            self.channel.deregister_selector(key);
        }
    }

    fn attempt(&mut self) -> Result<(), ChannelError> {
        let value = self
            .value
            .take()
            .expect("SendIntent::attempt called again after it already succeeded");
        match self.channel.try_send(value) {
            Ok(()) => Ok(()),
            Err(err @ TrySendError::Full(_)) => {
                // Not ready yet: the value is still ours to retry with on
                // the next sweep.
                self.value = Some(err.into_inner());
                Err(ChannelError::Full)
            }
            Err(err) => Err(err.into_channel_error()),
        }
    }
}

/// A `receive(channel, out)` intent. The received value, if any, is written
/// into `out` rather than returned, so the trait object stays uniform
/// across send and receive intents.
pub struct RecvIntent<'a, T> {
    channel: &'a Arc<Channel<T>>,
    out: &'a mut Option<T>,
    key: Option<RegistrationKey>,
}

impl<'a, T> RecvIntent<'a, T> {
    pub fn new(channel: &'a Arc<Channel<T>>, out: &'a mut Option<T>) -> Self {
        RecvIntent {
            channel,
            out,
            key: None,
        }
    }
}

impl<'a, T> SelectOp for RecvIntent<'a, T> {
    fn register(&mut self, token: &Arc<Semaphore>) -> Result<(), ChannelError> {
        let key = self.channel.register_selector(Arc::clone(token))?;
        self.key = Some(key);
        Ok(())
    }

    fn deregister(&mut self) {
        if let Some(key) = self.key.take() {
            self.channel.deregister_selector(key);
        }
    }

    fn attempt(&mut self) -> Result<(), ChannelError> {
        match self.channel.try_receive() {
            Ok(value) => {
                *self.out = Some(value);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

/// Blocks until exactly one of `ops` completes, or any participating
/// channel is observed closed.
///
/// On `Ok(i)`, `ops[i]` is the intent that succeeded. On `Err((i, err))`,
/// `ops[i]` is the intent whose channel produced `err` (e.g. found closed) —
/// this is spec.md §4.2's `out_index`, set on the error path exactly as on
/// the success path, rather than discarded.
///
/// At entry, if any intent is immediately satisfiable, the lowest-index
/// ready intent wins (spec.md §4.2 tie-break); higher-index intents can
/// starve under constant low-index activity, which spec.md permits.
pub fn select(ops: &mut [&mut dyn SelectOp]) -> Result<usize, (usize, ChannelError)> {
    let token = Arc::new(Semaphore::new());

    for i in 0..ops.len() {
        if let Err(err) = ops[i].register(&token) {
            for op in ops[..i].iter_mut() {
                op.deregister();
            }
            return Err((i, err));
        }
    }

    let result = loop {
        let mut ready = None;
        for (i, op) in ops.iter_mut().enumerate() {
            match op.attempt() {
                Ok(()) => {
                    ready = Some(Ok(i));
                    break;
                }
                Err(ChannelError::Full) | Err(ChannelError::Empty) => continue,
                Err(err) => {
                    ready = Some(Err((i, err)));
                    break;
                }
            }
        }

        match ready {
            Some(Ok(i)) => break Ok(i),
            Some(Err((i, err))) => break Err((i, err)),
            None => token.wait(),
        }
    };

    for op in ops.iter_mut() {
        op.deregister();
    }

    result
}
