//! A thread-safe, in-process, bounded message-passing channel with
//! blocking and non-blocking send/receive, explicit closure, and a
//! multi-channel [`select`] that blocks until one of several heterogeneous
//! send/receive intents on distinct channels becomes ready.
//!
//! ## Example
//!
//! ```
//! use chansel::Channel;
//!
//! let chan = Channel::bounded(2);
//! chan.send(1).unwrap();
//! chan.send(2).unwrap();
//! assert_eq!(chan.receive().unwrap(), 1);
//! assert_eq!(chan.receive().unwrap(), 2);
//! ```
//!
//! ## Select
//!
//! ```
//! use chansel::{select, Channel, RecvIntent, SelectOp, SendIntent};
//!
//! let c1 = Channel::bounded(1);
//! let c2 = Channel::bounded(1);
//! c1.try_send(9).unwrap();
//!
//! let mut out = None;
//! let mut recv = RecvIntent::new(&c1, &mut out);
//! let mut send = SendIntent::new(&c2, 5);
//! let mut ops: Vec<&mut dyn SelectOp> = vec![&mut recv, &mut send];
//!
//! let winner = select(&mut ops).unwrap();
//! assert_eq!(winner, 0);
//! assert_eq!(out, Some(9));
//! ```
//!
//! This crate does not cross process or machine boundaries, does not
//! broadcast a single value to more than one receiver, and has no
//! deadline/timeout-based cancellation: closing a channel is the only
//! externally driven way to unblock a waiter that isn't already satisfied.

mod buffer;
mod channel;
mod error;
mod registry;
mod select;
mod semaphore;

pub use channel::{destroy, Channel};
pub use error::{ChannelError, TrySendError};
pub use select::{select, RecvIntent, SelectOp, SendIntent};
