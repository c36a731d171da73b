#[cfg(test)]
mod tests {
    use pointq::{Error, Point, PointQueue};
    use std::thread::{scope, sleep};
    use std::time::{Duration, Instant};

    #[test]
    fn times_out_after_deadline() {
        let queue = PointQueue::new(4).unwrap();

        for ms in [0u64, 1, 20, 150] {
            let timeout = Duration::from_millis(ms);
            let start = Instant::now();
            assert_eq!(queue.wait(timeout), Err(Error::TimedOut));
            let elapsed = start.elapsed();

            assert!(elapsed >= timeout, "woke early: {:?} < {:?}", elapsed, timeout);
            // Generous slack for loaded CI machines
            assert!(elapsed < timeout + Duration::from_secs(2));
        }
    }

    #[test]
    fn sub_second_carry() {
        // 1.9s: the sub-second part must carry into whole seconds, not wrap
        let queue = PointQueue::new(1).unwrap();
        let start = Instant::now();
        assert_eq!(queue.wait(Duration::from_millis(1_900)), Err(Error::TimedOut));
        assert!(start.elapsed() >= Duration::from_millis(1_900));
    }

    #[test]
    fn push_wakes_waiter_promptly() {
        let queue = PointQueue::new(4).unwrap();
        let timeout = Duration::from_secs(30);

        let elapsed = scope(|s| {
            let waiter = s.spawn(|| {
                let start = Instant::now();
                let res = queue.wait(timeout);
                (res, start.elapsed())
            });

            sleep(Duration::from_millis(50));
            queue.push_xy(1.0, 2.0).unwrap();

            let (res, elapsed) = waiter.join().unwrap();
            assert_eq!(res, Ok(()));
            elapsed
        });

        assert!(elapsed < timeout / 2, "waiter slept {:?}", elapsed);

        // Waiting does not consume
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.try_pop(), Ok(Point::new(1.0, 2.0)));
    }

    #[test]
    fn several_waiters_all_observe_data() {
        let queue = PointQueue::new(8).unwrap();

        scope(|s| {
            let waiters: Vec<_> = (0..4)
                .map(|_| s.spawn(|| queue.wait(Duration::from_secs(30))))
                .collect();

            sleep(Duration::from_millis(50));

            // One push per waiter, each push signals one waiter
            for i in 0..4 {
                queue.push_xy(i as f64, i as f64).unwrap();
            }

            for w in waiters {
                assert_eq!(w.join().unwrap(), Ok(()));
            }
        });

        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn lost_race_is_recoverable() {
        let queue = PointQueue::new(2).unwrap();
        queue.push_xy(3.0, 3.0).unwrap();

        // Two consumers both see availability, only one gets the point
        assert_eq!(queue.wait(Duration::from_millis(1)), Ok(()));
        assert_eq!(queue.wait(Duration::from_millis(1)), Ok(()));
        assert_eq!(queue.try_pop(), Ok(Point::new(3.0, 3.0)));
        assert_eq!(queue.try_pop(), Err(Error::Empty));

        // The loser goes back to waiting
        assert_eq!(queue.wait(Duration::from_millis(1)), Err(Error::TimedOut));
    }

    #[test]
    fn stop_flag_polling() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let queue = PointQueue::new(16).unwrap();
        let stop = AtomicBool::new(false);

        let popped = scope(|s| {
            let cons = s.spawn(|| {
                let mut popped = 0;
                while !stop.load(Ordering::Acquire) {
                    if queue.wait(Duration::from_millis(10)).is_ok() && queue.try_pop().is_ok() {
                        popped += 1;
                    }
                }
                popped
            });

            for i in 0..10 {
                queue.push_xy(i as f64, 0.0).unwrap();
                sleep(Duration::from_millis(2));
            }
            while !queue.is_empty() {
                sleep(Duration::from_millis(1));
            }
            stop.store(true, Ordering::Release);
            cons.join().unwrap()
        });

        assert_eq!(popped, 10);
    }
}
