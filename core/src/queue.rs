//! The queue itself, and its reference counted flavor

use std::{
    ops::Deref,
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use tracing::{debug, error, trace};

use crate::{ring::Ring, Error, Point, Result};

/// A bounded, thread safe, FIFO queue of points.
///
/// All cursor and slot accesses happen under a single lock. A condition
/// variable is signalled once per successful push, which is what
/// [`PointQueue::wait`] sleeps on.
pub struct PointQueue {
    ring: Mutex<Ring>,
    not_empty: Condvar,
    capacity: usize,
}

impl PointQueue {
    /// Create a queue able to hold `capacity` points.
    ///
    /// Fails with [`Error::ZeroCapacity`] when `capacity` is zero and with
    /// [`Error::AllocationFailed`] when the storage cannot be allocated.
    ///
    /// ```rust
    /// use pointq::{Error, PointQueue};
    ///
    /// let queue = PointQueue::new(6).unwrap();
    /// assert_eq!(queue.capacity(), 6);
    ///
    /// assert!(matches!(PointQueue::new(0), Err(Error::ZeroCapacity)));
    /// ```
    pub fn new(capacity: usize) -> Result<Self> {
        let ring = Ring::with_capacity(capacity)?;
        debug!(capacity, slots = ring.size(), "created point queue");

        Ok(Self {
            ring: Mutex::new(ring),
            not_empty: Condvar::new(),
            capacity,
        })
    }

    /// Returns the maximum number of points this queue can hold.
    ///
    /// This does not take the lock.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of points currently in the queue.
    ///
    /// The value is a snapshot, other threads may push or pop right after
    /// it was taken.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Returns how many more points can be pushed before the queue is full.
    pub fn free_len(&self) -> usize {
        self.capacity - self.len()
    }

    /// Returns true if the queue currently holds no points.
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Push a point without blocking.
    ///
    /// Returns [`Error::Full`] if the queue already holds `capacity` points.
    /// On success one thread sleeping in [`PointQueue::wait`] is woken.
    pub fn try_push(&self, point: Point) -> Result<()> {
        {
            let mut ring = self.lock()?;
            if let Err(e) = ring.push(point) {
                trace!(capacity = self.capacity, "push rejected, queue full");
                return Err(e);
            }
        }
        self.not_empty.notify_one();
        Ok(())
    }

    /// Push the point `(x, y)` without blocking.
    ///
    /// See [`PointQueue::try_push`].
    pub fn push_xy(&self, x: f64, y: f64) -> Result<()> {
        self.try_push(Point::new(x, y))
    }

    /// Pop the oldest point without blocking.
    ///
    /// Returns [`Error::Empty`] if there is nothing to pop.
    pub fn try_pop(&self) -> Result<Point> {
        self.lock()?.pop()
    }

    /// Block until the queue is non-empty, for at most `timeout`.
    ///
    /// Returns `Ok(())` if a point is available and [`Error::TimedOut`] if
    /// the deadline passed first. Returns immediately if the queue already
    /// holds a point. This does NOT pop: another consumer may take the point
    /// before this thread calls [`PointQueue::try_pop`], so a following pop
    /// can still fail with [`Error::Empty`].
    ///
    /// ```rust
    /// use pointq::{Error, PointQueue};
    /// use std::time::Duration;
    ///
    /// let queue = PointQueue::new(4).unwrap();
    /// assert_eq!(queue.wait(Duration::from_millis(5)), Err(Error::TimedOut));
    ///
    /// queue.push_xy(1.0, 1.0).unwrap();
    /// assert_eq!(queue.wait(Duration::from_millis(5)), Ok(()));
    /// assert_eq!(queue.len(), 1);
    /// ```
    pub fn wait(&self, timeout: Duration) -> Result<()> {
        // The deadline is fixed here, retries below only ever shrink the remaining time
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.wait_until(deadline),
            None => self.wait_forever(),
        }
    }

    /// Block until the queue is non-empty or `deadline` has passed.
    ///
    /// See [`PointQueue::wait`].
    pub fn wait_until(&self, deadline: Instant) -> Result<()> {
        let mut ring = self.lock()?;

        while ring.is_empty() {
            let now = Instant::now();
            if now >= deadline {
                trace!("wait timed out");
                return Err(Error::TimedOut);
            }

            // Spurious wakeups, and wakeups where another consumer got there
            // first, both land back at the emptiness check
            let (guard, _timeout) = self
                .not_empty
                .wait_timeout(ring, deadline - now)
                .map_err(Self::poisoned)?;
            ring = guard;
        }

        Ok(())
    }

    fn wait_forever(&self) -> Result<()> {
        let mut ring = self.lock()?;
        while ring.is_empty() {
            ring = self.not_empty.wait(ring).map_err(Self::poisoned)?;
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Ring>> {
        self.ring.lock().map_err(Self::poisoned)
    }

    // Reading both cursors is fine even after another thread panicked with
    // the lock held: cursors are only moved after the slot access finished.
    fn snapshot(&self) -> MutexGuard<'_, Ring> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn poisoned<T>(_: PoisonError<T>) -> Error {
        error!("point queue lock poisoned");
        Error::Poisoned
    }
}

/// A [`PointQueue`] wrapped in an [`Arc`], for sharing with spawned threads
#[derive(Clone)]
pub struct ArcPointQueue(pub(crate) Arc<PointQueue>);

impl ArcPointQueue {
    /// Create a reference counted queue able to hold `capacity` points.
    pub fn new(capacity: usize) -> Result<Self> {
        PointQueue::new(capacity).map(|q| Self(Arc::new(q)))
    }
}

impl Deref for ArcPointQueue {
    type Target = PointQueue;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<PointQueue> for ArcPointQueue {
    fn from(queue: PointQueue) -> Self {
        Self(Arc::new(queue))
    }
}
