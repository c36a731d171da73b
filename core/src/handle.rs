//! Abstraction over the ways a queue can be held by its producers and consumers

use core::ops::Deref;
use std::sync::Arc;

use crate::queue::{ArcPointQueue, PointQueue};

/// Something that can hand out references to a [`PointQueue`].
///
/// Implemented for plain borrows, which tie producers and consumers to the
/// queue's scope, and for [`Arc`], which lets them move into spawned threads.
pub trait QueueHandle {
    /// The reference stored inside a [`Producer`](crate::Producer) or
    /// [`Consumer`](crate::Consumer)
    type Target: Deref<Target = PointQueue> + Clone;

    /// Obtain a new reference to the queue
    fn queue_ref(&self) -> Self::Target;
}

impl QueueHandle for &'_ PointQueue {
    type Target = Self;

    #[inline(always)]
    fn queue_ref(&self) -> Self::Target {
        *self
    }
}

impl QueueHandle for Arc<PointQueue> {
    type Target = Self;

    #[inline(always)]
    fn queue_ref(&self) -> Self::Target {
        self.clone()
    }
}

impl QueueHandle for ArcPointQueue {
    type Target = Arc<PointQueue>;

    #[inline(always)]
    fn queue_ref(&self) -> Self::Target {
        self.0.clone()
    }
}
