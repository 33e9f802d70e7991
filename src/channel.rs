//! The bounded channel: one buffer, one mutex, two condition variables, a
//! closed flag, and a selector registry, exactly as laid out in spec.md §3.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use log::{debug, trace, warn};

use crate::buffer::Storage;
use crate::error::{ChannelError, TrySendError};
use crate::registry::{RegistrationKey, SelectorRegistry};
use crate::semaphore::Semaphore;

struct Inner<T> {
    storage: Storage<T>,
    closed: bool,
    registry: SelectorRegistry,
}

/// A bounded, thread-safe, multi-producer multi-consumer channel.
///
/// Always used behind an `Arc` (returned by [`Channel::bounded`] and
/// [`Channel::rendezvous`]) so it can be shared across sender and receiver
/// threads and registered with [`crate::select`].
pub struct Channel<T> {
    shared: Mutex<Inner<T>>,
    cond_not_empty: Condvar,
    cond_not_full: Condvar,
}

impl<T> Channel<T> {
    /// Creates a buffered channel with room for `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`. A 0-capacity buffer can never accept a
    /// value (see `SPEC_FULL.md` §4.3); use [`Channel::rendezvous`] for a
    /// true zero-capacity hand-off instead.
    pub fn bounded(capacity: usize) -> Arc<Self> {
        debug!("creating bounded channel with capacity {capacity}");
        Arc::new(Channel {
            shared: Mutex::new(Inner {
                storage: Storage::bounded(capacity),
                closed: false,
                registry: SelectorRegistry::new(),
            }),
            cond_not_empty: Condvar::new(),
            cond_not_full: Condvar::new(),
        })
    }

    /// Creates a rendezvous channel: a synchronous hand-off with no
    /// buffering. `send` only returns once a concurrent `receive` has
    /// actually taken the value.
    pub fn rendezvous() -> Arc<Self> {
        debug!("creating rendezvous channel");
        Arc::new(Channel {
            shared: Mutex::new(Inner {
                storage: Storage::rendezvous(),
                closed: false,
                registry: SelectorRegistry::new(),
            }),
            cond_not_empty: Condvar::new(),
            cond_not_full: Condvar::new(),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner<T>>, ChannelError> {
        self.shared
            .lock()
            .map_err(|_| ChannelError::Gen("channel mutex poisoned".to_string()))
    }

    /// Blocking send. Waits until the buffer accepts `value`, or the
    /// channel closes, whichever happens first.
    pub fn send(&self, value: T) -> Result<(), ChannelError> {
        let mut inner = self.lock()?;
        if inner.closed {
            return Err(ChannelError::Closed);
        }

        let mut value = value;
        let ticket = loop {
            match inner.storage.try_add(value) {
                Ok(ticket) => {
                    self.cond_not_empty.notify_one();
                    inner.registry.post_all();
                    break ticket;
                }
                Err(rejected) => {
                    value = rejected;
                    if inner.closed {
                        return Err(ChannelError::Closed);
                    }
                    trace!("send blocking: buffer full, waiting on cond_not_full");
                    inner = self
                        .cond_not_full
                        .wait(inner)
                        .map_err(|_| ChannelError::Gen("channel mutex poisoned".to_string()))?;
                    if inner.closed {
                        return Err(ChannelError::Closed);
                    }
                }
            }
        };

        // On a rendezvous channel, wait for *this* hand-off's own ticket,
        // not just "the slot is empty" — another sender may have already
        // refilled the slot with a different value by the time we wake.
        if let Some(ticket) = ticket {
            while !ticket.load(Ordering::Relaxed) {
                if inner.closed {
                    return Err(ChannelError::Closed);
                }
                trace!("send blocking: waiting for rendezvous hand-off to complete");
                inner = self
                    .cond_not_full
                    .wait(inner)
                    .map_err(|_| ChannelError::Gen("channel mutex poisoned".to_string()))?;
            }
        }

        Ok(())
    }

    /// Blocking receive. Waits until an element is available, or the
    /// channel closes, whichever happens first.
    pub fn receive(&self) -> Result<T, ChannelError> {
        let mut inner = self.lock()?;
        if inner.closed {
            return Err(ChannelError::Closed);
        }

        loop {
            match inner.storage.try_remove() {
                Some(value) => {
                    self.cond_not_full.notify_one();
                    inner.registry.post_all();
                    return Ok(value);
                }
                None => {
                    if inner.closed {
                        return Err(ChannelError::Closed);
                    }

                    inner.storage.mark_receiver_waiting();
                    // Wakes a sender parked on a rendezvous channel waiting
                    // for a receiver to show up.
                    self.cond_not_full.notify_one();

                    trace!("receive blocking: buffer empty, waiting on cond_not_empty");
                    let wait_result = self.cond_not_empty.wait(inner);
                    inner = wait_result
                        .map_err(|_| ChannelError::Gen("channel mutex poisoned".to_string()))?;
                    inner.storage.unmark_receiver_waiting();

                    if inner.closed {
                        return Err(ChannelError::Closed);
                    }
                }
            }
        }
    }

    /// Non-blocking send. Never waits; returns the value back to the
    /// caller via [`TrySendError`] instead of blocking when the buffer
    /// rejects it.
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        let mut inner = match self.lock() {
            Ok(inner) => inner,
            Err(_) => return Err(TrySendError::Gen(value, "channel mutex poisoned".to_string())),
        };
        if inner.closed {
            return Err(TrySendError::Closed(value));
        }
        match inner.storage.try_add(value) {
            Ok(_ticket) => {
                self.cond_not_empty.notify_one();
                inner.registry.post_all();
                Ok(())
            }
            Err(rejected) => Err(TrySendError::Full(rejected)),
        }
    }

    /// Non-blocking receive. Never waits; returns `Err(ChannelError::Empty)`
    /// instead of blocking when the buffer has nothing to give.
    pub fn try_receive(&self) -> Result<T, ChannelError> {
        let mut inner = self.lock()?;
        if inner.closed {
            return Err(ChannelError::Closed);
        }
        match inner.storage.try_remove() {
            Some(value) => {
                self.cond_not_full.notify_one();
                inner.registry.post_all();
                Ok(value)
            }
            None => Err(ChannelError::Empty),
        }
    }

    /// Marks the channel closed. Wakes every blocked `send`/`receive` and
    /// every `select` that has this channel registered; all of them observe
    /// `ChannelError::Closed` on their next check.
    pub fn close(&self) -> Result<(), ChannelError> {
        let mut inner = self.lock()?;
        if inner.closed {
            return Err(ChannelError::Closed);
        }
        inner.closed = true;
        self.cond_not_empty.notify_all();
        self.cond_not_full.notify_all();
        inner.registry.post_all();
        debug!("channel closed");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        match self.shared.lock() {
            Ok(inner) => inner.closed,
            Err(poisoned) => poisoned.into_inner().closed,
        }
    }

    pub fn len(&self) -> usize {
        match self.shared.lock() {
            Ok(inner) => inner.storage.len(),
            Err(poisoned) => poisoned.into_inner().storage.len(),
        }
    }

    pub fn capacity(&self) -> usize {
        match self.shared.lock() {
            Ok(inner) => inner.storage.capacity(),
            Err(poisoned) => poisoned.into_inner().storage.capacity(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        match self.shared.lock() {
            Ok(inner) => inner.storage.is_full(),
            Err(poisoned) => poisoned.into_inner().storage.is_full(),
        }
    }

    /// Registers a waiter token with this channel's selector registry.
    /// Used by [`crate::select`]; not part of the public send/receive API.
    pub(crate) fn register_selector(
        &self,
        token: Arc<Semaphore>,
    ) -> Result<RegistrationKey, ChannelError> {
        let mut inner = self.lock()?;
        if inner.closed {
            return Err(ChannelError::Closed);
        }
        Ok(inner.registry.insert(token))
    }

    /// Deregisters a previously-registered waiter token. Always succeeds
    /// (or is a no-op on a poisoned/already-empty registry) so that
    /// `select`'s cleanup path never itself fails.
    pub(crate) fn deregister_selector(&self, key: RegistrationKey) {
        match self.shared.lock() {
            Ok(mut inner) => inner.registry.remove(key),
            Err(poisoned) => poisoned.into_inner().registry.remove(key),
        }
    }
}

/// Releases a channel's mutex, condition variables, buffer, and selector
/// registry.
///
/// Returns [`ChannelError::Destroy`] if the channel has not been [`Channel::close`]d
/// yet. Returns [`ChannelError::Gen`] if other `Arc<Channel<T>>` handles (including
/// ones held internally by a still-running `select`) are still live: the
/// caller's quiescence obligation from spec.md §4.1 is enforced here via
/// `Arc::try_unwrap` rather than left undefined.
pub fn destroy<T>(chan: Arc<Channel<T>>) -> Result<(), ChannelError> {
    if !chan.is_closed() {
        return Err(ChannelError::Destroy);
    }
    match Arc::try_unwrap(chan) {
        Ok(inner) => {
            debug!("channel destroyed");
            drop(inner);
            Ok(())
        }
        Err(_still_shared) => {
            warn!("destroy called while other channel handles are still live");
            Err(ChannelError::Gen(
                "channel has other live references".to_string(),
            ))
        }
    }
}
