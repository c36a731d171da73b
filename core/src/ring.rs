//! Ring storage and cursor arithmetic
//!
//! The ring is never touched without the queue's lock held, so nothing in
//! here is synchronized.

use crate::{Error, Point, Result};

pub(crate) struct Ring {
    /// `capacity + 1` slots. One is always left unused.
    slots: Box<[Point]>,

    /// Where the next point will be written
    write: usize,

    /// Where the next point will be read from
    read: usize,
}

impl Ring {
    pub(crate) fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        let size = capacity.checked_add(1).ok_or(Error::AllocationFailed)?;

        let mut slots: Vec<Point> = Vec::new();
        slots
            .try_reserve_exact(size)
            .map_err(|_| Error::AllocationFailed)?;
        slots.resize(size, Point::default());

        Ok(Self {
            slots: slots.into_boxed_slice(),
            write: 0,
            read: 0,
        })
    }

    /// Number of slots, including the sacrificed one
    pub(crate) fn size(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn advance(&self, idx: usize) -> usize {
        let next = idx + 1;
        if next == self.size() {
            0
        } else {
            next
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.write == self.read
    }

    pub(crate) fn len(&self) -> usize {
        if self.write >= self.read {
            self.write - self.read
        } else {
            // Inverted, the write cursor has wrapped and the read cursor has not
            self.size() - self.read + self.write
        }
    }

    pub(crate) fn push(&mut self, point: Point) -> Result<()> {
        let next = self.advance(self.write);

        // Write must never catch up with read, or full would look like empty
        if next == self.read {
            return Err(Error::Full);
        }

        self.slots[self.write] = point;
        self.write = next;
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Result<Point> {
        if self.is_empty() {
            return Err(Error::Empty);
        }

        let point = self.slots[self.read];
        self.read = self.advance(self.read);
        Ok(point)
    }
}

#[cfg(test)]
mod test {
    use super::Ring;
    use crate::{Error, Point};

    #[test]
    fn zero_capacity() {
        assert!(matches!(Ring::with_capacity(0), Err(Error::ZeroCapacity)));
    }

    #[test]
    fn unrepresentable_capacity() {
        assert!(matches!(
            Ring::with_capacity(usize::MAX),
            Err(Error::AllocationFailed)
        ));
    }

    #[test]
    fn one_slot_sacrificed() {
        let mut ring = Ring::with_capacity(3).unwrap();
        assert_eq!(ring.size(), 4);

        for i in 0..3 {
            ring.push(Point::new(i as f64, 0.0)).unwrap();
        }
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.push(Point::default()), Err(Error::Full));

        // Three slots written, write sits right behind read
        assert_eq!(ring.write, 3);
        assert_eq!(ring.read, 0);
    }

    #[test]
    fn len_across_the_wrap() {
        let mut ring = Ring::with_capacity(4).unwrap();

        // Walk the cursors around the ring a few times at every occupancy
        for fill in 0..=4 {
            for _ in 0..(3 * ring.size()) {
                for i in 0..fill {
                    ring.push(Point::new(i as f64, i as f64)).unwrap();
                }
                assert_eq!(ring.len(), fill);
                assert!(ring.write < ring.size());
                for i in 0..fill {
                    assert_eq!(ring.pop(), Ok(Point::new(i as f64, i as f64)));
                }
                assert!(ring.is_empty());

                // Nudge both cursors by one so the next round starts elsewhere
                ring.push(Point::default()).unwrap();
                ring.pop().unwrap();
            }
        }
    }

    #[test]
    fn inverted_len() {
        let mut ring = Ring::with_capacity(4).unwrap();
        for _ in 0..4 {
            ring.push(Point::default()).unwrap();
        }
        for _ in 0..3 {
            ring.pop().unwrap();
        }
        // write = 4, read = 3
        ring.push(Point::default()).unwrap();
        ring.push(Point::default()).unwrap();
        // write = 1, read = 3
        assert!(ring.write < ring.read);
        assert_eq!(ring.len(), 3);
    }
}
