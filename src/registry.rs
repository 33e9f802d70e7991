//! The per-channel selector registry.
//!
//! spec.md treats this as an external intrusive doubly-linked list of
//! waiter tokens with O(1) insert/find-by-identity/remove-by-node. A slab
//! gives the same O(1) insert/remove behavior without requiring unsafe
//! intrusive pointers, and is the same family of data structure
//! `futures-util`'s `FuturesUnordered` node table uses for the analogous
//! problem (registering and deregistering wake-ups in O(1)).
//!
//! Ownership is asymmetric, per spec.md's I5: the waiter token is owned by
//! the selecting thread; the registry here holds only a shared reference
//! (`Arc<Semaphore>`), and the select engine is responsible for removing its
//! key from every channel's registry before the token is dropped.

use std::sync::Arc;

use slab::Slab;

use crate::semaphore::Semaphore;

/// Key returned by [`SelectorRegistry::insert`]; hand it back to
/// [`SelectorRegistry::remove`] to deregister.
pub type RegistrationKey = usize;

#[derive(Default)]
pub struct SelectorRegistry {
    tokens: Slab<Arc<Semaphore>>,
}

impl SelectorRegistry {
    pub fn new() -> Self {
        SelectorRegistry { tokens: Slab::new() }
    }

    pub fn insert(&mut self, token: Arc<Semaphore>) -> RegistrationKey {
        self.tokens.insert(token)
    }

    pub fn remove(&mut self, key: RegistrationKey) {
        // `try_remove` rather than `remove`: double-deregistration (e.g. a
        // select racing its own early-exit path) must not panic.
        self.tokens.try_remove(key);
    }

    /// Posts to every currently-registered token. Called while the
    /// channel's mutex is held, per spec.md invariant I4.
    pub fn post_all(&self) {
        for (_, token) in self.tokens.iter() {
            token.post();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
