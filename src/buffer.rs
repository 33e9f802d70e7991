//! The bounded FIFO buffer backing a [`crate::Channel`].
//!
//! spec.md treats this as an external collaborator (a sequential container
//! with `try-add`/`try-remove`/`size`/`free`); there is no process boundary
//! to put it behind in a single crate, so it is a private module instead.
//!
//! Two storage strategies exist:
//!
//! - [`Storage::Bounded`] — a `VecDeque` with a fixed capacity, used by
//!   [`crate::Channel::bounded`].
//! - [`Storage::Rendezvous`] — a single slot that is only ever written to
//!   once a receiver has registered itself as waiting, used by
//!   [`crate::Channel::rendezvous`]. See `SPEC_FULL.md` §4.3 for why
//!   capacity-0 buffered channels are not offered: the literal C source this
//!   crate is modeled on has a 0-capacity buffer that is permanently full to
//!   senders and permanently empty to receivers, so no value can ever cross
//!   it. Each rendezvous hand-off carries its own delivery ticket (an
//!   `Arc<AtomicBool>`) rather than relying on "is the slot empty" as a
//!   stand-in for "was *my* value taken" — with more than one sender
//!   contending for the same slot, those two questions have different
//!   answers.

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub enum Storage<T> {
    Bounded {
        queue: VecDeque<T>,
        capacity: usize,
    },
    Rendezvous {
        /// The value plus a per-hand-off delivery ticket: `try_remove` sets
        /// it to `true` when it takes this exact value, so a sender waiting
        /// on its own ticket can't be fooled by a different sender's value
        /// occupying the slot.
        slot: Option<(T, Arc<AtomicBool>)>,
        waiting_receivers: usize,
    },
}

impl<T> Storage<T> {
    pub fn bounded(capacity: usize) -> Self {
        assert!(capacity > 0, "bounded channel capacity must be >= 1; use Channel::rendezvous() for capacity 0");
        Storage::Bounded {
            queue: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn rendezvous() -> Self {
        Storage::Rendezvous {
            slot: None,
            waiting_receivers: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        match self {
            Storage::Bounded { capacity, .. } => *capacity,
            Storage::Rendezvous { .. } => 0,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Storage::Bounded { queue, .. } => queue.len(),
            Storage::Rendezvous { slot, .. } => slot.is_some() as usize,
        }
    }

    pub fn is_full(&self) -> bool {
        match self {
            Storage::Bounded { queue, capacity } => queue.len() >= *capacity,
            Storage::Rendezvous { slot, waiting_receivers } => {
                slot.is_some() || *waiting_receivers == 0
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Storage::Bounded { queue, .. } => queue.is_empty(),
            Storage::Rendezvous { slot, .. } => slot.is_none(),
        }
    }

    /// Non-blocking add. Returns `false` (caller's `CHANNEL_FULL`) if the
    /// buffer rejects the value.
    ///
    /// For rendezvous storage, the returned ticket flips to `true` once
    /// `try_remove` takes this specific value; a blocking `send` must not
    /// return success until then. Bounded storage never needs a ticket.
    pub fn try_add(&mut self, value: T) -> Result<Option<Arc<AtomicBool>>, T> {
        if self.is_full() {
            return Err(value);
        }
        match self {
            Storage::Bounded { queue, .. } => {
                queue.push_back(value);
                Ok(None)
            }
            Storage::Rendezvous { slot, .. } => {
                let ticket = Arc::new(AtomicBool::new(false));
                *slot = Some((value, Arc::clone(&ticket)));
                Ok(Some(ticket))
            }
        }
    }

    /// Non-blocking remove. Returns `None` (caller's `CHANNEL_EMPTY`) if the
    /// buffer has nothing to give.
    pub fn try_remove(&mut self) -> Option<T> {
        match self {
            Storage::Bounded { queue, .. } => queue.pop_front(),
            Storage::Rendezvous { slot, .. } => {
                let (value, ticket) = slot.take()?;
                ticket.store(true, std::sync::atomic::Ordering::Relaxed);
                Some(value)
            }
        }
    }

    /// Marks a receiver as waiting for a rendezvous hand-off. No-op on a
    /// buffered channel.
    pub fn mark_receiver_waiting(&mut self) {
        if let Storage::Rendezvous { waiting_receivers, .. } = self {
            *waiting_receivers += 1;
        }
    }

    /// Reverses [`Storage::mark_receiver_waiting`]; called whether the
    /// receiver woke up because it was satisfied or because the channel
    /// closed.
    pub fn unmark_receiver_waiting(&mut self) {
        if let Storage::Rendezvous { waiting_receivers, .. } = self {
            *waiting_receivers = waiting_receivers.saturating_sub(1);
        }
    }
}
