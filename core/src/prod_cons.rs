//! Producer and consumer halves of a queue
//!
//! Both halves are `Clone`: the queue supports any number of each. They are
//! thin wrappers, every call goes straight to the shared [`PointQueue`].

use std::time::{Duration, Instant};

use crate::{
    handle::QueueHandle,
    queue::{ArcPointQueue, PointQueue},
    Error, Point, Result,
};

impl PointQueue {
    /// Obtain a producer borrowing this queue
    pub fn producer(&self) -> Producer<&'_ Self> {
        Producer::new(&self)
    }

    /// Obtain a consumer borrowing this queue
    pub fn consumer(&self) -> Consumer<&'_ Self> {
        Consumer::new(&self)
    }
}

impl ArcPointQueue {
    /// Obtain a producer holding a reference count on this queue
    pub fn producer(&self) -> Producer<ArcPointQueue> {
        Producer::new(self)
    }

    /// Obtain a consumer holding a reference count on this queue
    pub fn consumer(&self) -> Consumer<ArcPointQueue> {
        Consumer::new(self)
    }
}

/// `Producer` is the interface for pushing points into a [`PointQueue`].
pub struct Producer<Q>
where
    Q: QueueHandle,
{
    queue: Q::Target,
}

impl<Q: QueueHandle> Clone for Producer<Q> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
        }
    }
}

impl<Q> Producer<Q>
where
    Q: QueueHandle,
{
    /// Create a producer for the queue behind `handle`
    pub fn new(handle: &Q) -> Self {
        Self {
            queue: handle.queue_ref(),
        }
    }

    /// Push a point, see [`PointQueue::try_push`]
    pub fn try_push(&self, point: Point) -> Result<()> {
        self.queue.try_push(point)
    }

    /// Push the point `(x, y)`, see [`PointQueue::try_push`]
    pub fn push_xy(&self, x: f64, y: f64) -> Result<()> {
        self.queue.push_xy(x, y)
    }

    /// Maximum number of points the queue can hold
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Number of points that can currently be pushed before the queue is full
    pub fn free_len(&self) -> usize {
        self.queue.free_len()
    }
}

/// `Consumer` is the interface for taking points out of a [`PointQueue`].
pub struct Consumer<Q>
where
    Q: QueueHandle,
{
    queue: Q::Target,
}

impl<Q: QueueHandle> Clone for Consumer<Q> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
        }
    }
}

impl<Q> Consumer<Q>
where
    Q: QueueHandle,
{
    /// Create a consumer for the queue behind `handle`
    pub fn new(handle: &Q) -> Self {
        Self {
            queue: handle.queue_ref(),
        }
    }

    /// Pop a point, see [`PointQueue::try_pop`]
    pub fn try_pop(&self) -> Result<Point> {
        self.queue.try_pop()
    }

    /// Wait for a point to become available, see [`PointQueue::wait`]
    pub fn wait(&self, timeout: Duration) -> Result<()> {
        self.queue.wait(timeout)
    }

    /// Number of points currently queued
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is currently queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Wait up to `timeout` for a point, and pop it.
    ///
    /// If another consumer takes the point between the wake up and the pop,
    /// this goes back to waiting with whatever is left of the original
    /// deadline. Returns [`Error::TimedOut`] once the deadline passes.
    ///
    /// ```rust
    /// use pointq::{Error, Point, PointQueue};
    /// use std::time::Duration;
    ///
    /// let queue = PointQueue::new(2).unwrap();
    /// let cons = queue.consumer();
    ///
    /// assert_eq!(cons.recv_timeout(Duration::from_millis(1)), Err(Error::TimedOut));
    ///
    /// queue.producer().push_xy(3.0, 4.0).unwrap();
    /// assert_eq!(cons.recv_timeout(Duration::from_millis(1)), Ok(Point::new(3.0, 4.0)));
    /// ```
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Point> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.recv_with(|q| q.wait(timeout));
        };
        self.recv_with(|q| q.wait_until(deadline))
    }

    fn recv_with(&self, wait: impl Fn(&PointQueue) -> Result<()>) -> Result<Point> {
        loop {
            wait(&*self.queue)?;
            match self.queue.try_pop() {
                Err(Error::Empty) => continue,
                res => return res,
            }
        }
    }

    /// Pop every point that is queued right now, oldest first.
    ///
    /// The iterator never blocks. It ends as soon as a pop fails, which
    /// includes the queue being found empty.
    pub fn try_iter(&self) -> TryIter<'_, Q> {
        TryIter { cons: self }
    }
}

/// Draining iterator returned by [`Consumer::try_iter`]
pub struct TryIter<'a, Q>
where
    Q: QueueHandle,
{
    cons: &'a Consumer<Q>,
}

impl<Q> Iterator for TryIter<'_, Q>
where
    Q: QueueHandle,
{
    type Item = Point;

    fn next(&mut self) -> Option<Self::Item> {
        self.cons.try_pop().ok()
    }
}
