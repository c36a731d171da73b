//! # pointq
//!
//! `pointq` is a bounded, thread safe, First-In, First-Out queue of 2-D points.
//!
//! Any number of producer and consumer threads may share a queue. Pushing and popping never
//! block: a full queue rejects the push, an empty queue rejects the pop. Consumers that want to
//! sleep until data shows up use [`PointQueue::wait`], which blocks for at most the given timeout.
//!
//! The backing storage is a ring of `capacity + 1` slots addressed by a write cursor and a read
//! cursor. One slot always stays unused, so "cursors are equal" unambiguously means "empty" and
//! no separate occupancy counter is needed.
//!
//! ## Local usage
//!
//! ```rust
//! use pointq::{Error, Point, PointQueue};
//!
//! // Create a queue with room for two points
//! let queue = PointQueue::new(2).unwrap();
//!
//! queue.try_push(Point::new(1.0, 2.0)).unwrap();
//! queue.push_xy(3.0, 4.0).unwrap();
//!
//! // No more room!
//! assert_eq!(queue.try_push(Point::new(5.0, 6.0)), Err(Error::Full));
//! assert_eq!(queue.len(), 2);
//!
//! assert_eq!(queue.try_pop(), Ok(Point::new(1.0, 2.0)));
//! assert_eq!(queue.try_pop(), Ok(Point::new(3.0, 4.0)));
//! assert_eq!(queue.try_pop(), Err(Error::Empty));
//! ```
//!
//! ## Threaded usage
//!
//! ```rust
//! use pointq::{ArcPointQueue, Point};
//! use std::{thread::spawn, time::Duration};
//!
//! let queue = ArcPointQueue::new(8).unwrap();
//! let cons = queue.consumer();
//!
//! let hdl = spawn(move || {
//!     // Sleep until the producer sends something, but not forever
//!     cons.recv_timeout(Duration::from_secs(10)).unwrap()
//! });
//!
//! queue.producer().push_xy(10.0, 20.0).unwrap();
//!
//! assert_eq!(hdl.join().unwrap(), Point::new(10.0, 20.0));
//! ```

#![deny(missing_docs)]
#![deny(warnings)]

pub mod handle;
pub mod point;
pub mod prod_cons;
pub mod queue;
mod ring;

pub use handle::QueueHandle;
pub use point::Point;
pub use prod_cons::{Consumer, Producer, TryIter};
pub use queue::{ArcPointQueue, PointQueue};

use core::result::Result as CoreResult;

/// Result type used by the `pointq` interfaces
pub type Result<T> = CoreResult<T, Error>;

/// Error type used by the `pointq` interfaces
#[derive(Debug, PartialEq, Eq, Copy, Clone, thiserror::Error)]
#[cfg_attr(feature = "defmt_0_3", derive(defmt::Format))]
pub enum Error {
    /// A queue must be able to hold at least one point
    #[error("queue capacity must be at least one")]
    ZeroCapacity,

    /// The backing storage for the requested capacity could not be allocated
    #[error("unable to allocate queue storage")]
    AllocationFailed,

    /// The queue holds `capacity` points, the push was rejected
    #[error("queue is full")]
    Full,

    /// The queue holds no points, the pop was rejected
    #[error("queue is empty")]
    Empty,

    /// The deadline passed without a point becoming available
    #[error("timed out waiting for a point")]
    TimedOut,

    /// The lock guarding the queue was poisoned by a thread that panicked
    /// while holding it.
    ///
    /// The queue's synchronization state can no longer be trusted. Unlike
    /// every other variant this is not a normal control flow outcome, see
    /// [`Error::is_fatal`].
    #[error("queue lock poisoned, synchronization state is corrupt")]
    Poisoned,
}

impl Error {
    /// Returns true if no local recovery from this error is possible.
    ///
    /// ```rust
    /// use pointq::Error;
    ///
    /// assert!(Error::Poisoned.is_fatal());
    /// assert!(!Error::Full.is_fatal());
    /// assert!(!Error::TimedOut.is_fatal());
    /// ```
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Poisoned)
    }
}
