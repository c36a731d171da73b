use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use pointq::{Point, PointQueue};

/// Slowest a fly will ever go, in steps per second
const MIN_SPEED: f64 = 2.0;

struct Flight {
    pos: Point,
    /// Heading, in radians
    angle: f64,
    /// Steps per second
    speed: f64,
}

/// A fly buzzing around the screen, one unit per step.
///
/// Destinations are handed to the fly through a bounded queue, so a fly that
/// is still busy with earlier destinations refuses new ones.
pub struct Fly {
    mark: char,
    flight: Mutex<Flight>,
    destinations: PointQueue,
}

impl Fly {
    /// A fly resting at the center of a `width` x `height` screen, able to
    /// queue up `queue_size` destinations.
    pub fn at_center(mark: char, width: u16, height: u16, queue_size: usize) -> pointq::Result<Self> {
        Ok(Self {
            mark,
            flight: Mutex::new(Flight {
                pos: Point::new(f64::from(width) / 2.0, f64::from(height) / 2.0),
                angle: 0.0,
                speed: MIN_SPEED,
            }),
            destinations: PointQueue::new(queue_size)?,
        })
    }

    pub fn mark(&self) -> char {
        self.mark
    }

    pub fn position(&self) -> Point {
        self.flight().pos
    }

    pub fn speed(&self) -> f64 {
        self.flight().speed
    }

    /// Queue up a destination. Fails with `Full` while the fly is busy.
    pub fn set_destination(&self, dest: Point) -> pointq::Result<()> {
        self.destinations.try_push(dest)
    }

    /// Wait up to `timeout` for the next destination.
    pub fn wait_for_destination(&self, timeout: Duration) -> pointq::Result<Point> {
        self.destinations.consumer().recv_timeout(timeout)
    }

    /// Point the fly at `dest`. The further away, the faster it flies.
    pub fn head_towards(&self, dest: Point) {
        let mut flight = self.flight();
        let pos = flight.pos;
        flight.angle = pos.angle_to(dest);
        flight.speed = (pos.distance(dest) / 2.0).max(MIN_SPEED);
    }

    /// Move one unit along the current heading
    pub fn step(&self) {
        let mut flight = self.flight();
        let (dy, dx) = flight.angle.sin_cos();
        flight.pos.x += dx;
        flight.pos.y += dy;
    }

    pub fn distance_to(&self, dest: Point) -> f64 {
        self.flight().pos.distance(dest)
    }

    /// Is the fly inside the character cell at `(col, row)`?
    pub fn is_at(&self, col: i64, row: i64) -> bool {
        let pos = self.flight().pos;
        pos.x as i64 == col && pos.y as i64 == row
    }

    // Flight state is plain data, always consistent between statements
    fn flight(&self) -> MutexGuard<'_, Flight> {
        self.flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
