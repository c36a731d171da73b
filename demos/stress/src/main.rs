//! Many producers, one consumer, and a tally at the end.
//!
//! Every producer pushes points with `x == y`, so the consumer can spot a
//! torn or corrupted point. The run fails if anything pushed was not popped.

use std::{
    fmt,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    thread,
    time::Duration,
};

use anyhow::{bail, Context};
use clap::Parser;
use pointq::{Error, PointQueue};
use rand::{thread_rng, Rng};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Hammer a point queue from many threads")]
struct Args {
    /// Number of producer threads
    #[arg(long, default_value_t = 1000)]
    producers: usize,

    /// Queue capacity
    #[arg(long, default_value_t = 10_000)]
    queue_size: usize,

    /// Points pushed by each producer
    #[arg(long, default_value_t = 10)]
    repeat: usize,

    /// Upper bound of the random pause between pushes, in milliseconds
    #[arg(long, default_value_t = 100)]
    max_sleep_ms: u64,

    /// How long the consumer waits for data per round, in milliseconds
    #[arg(long, default_value_t = 100)]
    wait_ms: u64,
}

#[derive(Default)]
struct Tally {
    pushed: AtomicUsize,
    rejected: AtomicUsize,
    popped: AtomicUsize,
    corrupt: AtomicUsize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!(
        "{} producers x {} points into a queue of {}",
        args.producers, args.repeat, args.queue_size
    );

    let summary = run(&args)?;
    println!("{}", summary);
    summary.check()
}

/// Counts taken at the end of a run
#[derive(Debug, PartialEq)]
struct Summary {
    pushed: usize,
    rejected: usize,
    popped: usize,
    corrupt: usize,
}

impl Summary {
    fn check(&self) -> anyhow::Result<()> {
        if self.pushed != self.popped {
            bail!("{} points pushed but {} popped", self.pushed, self.popped);
        }
        if self.corrupt != 0 {
            bail!("{} corrupt points", self.corrupt);
        }
        Ok(())
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pushed: {}, rejected: {}, popped: {}, corrupt: {}",
            self.pushed, self.rejected, self.popped, self.corrupt
        )
    }
}

/// Run every producer to completion, then drain the queue and tally up
fn run(args: &Args) -> anyhow::Result<Summary> {
    let queue = PointQueue::new(args.queue_size).context("creating the queue")?;
    let tally = Tally::default();
    let stop = AtomicBool::new(false);

    thread::scope(|s| -> anyhow::Result<()> {
        let consumer = s.spawn(|| consume(&queue, &tally, &stop, Duration::from_millis(args.wait_ms)));

        let producers: Vec<_> = (0..args.producers)
            .map(|id| {
                let (queue, tally) = (&queue, &tally);
                thread::Builder::new()
                    .name(format!("producer-{}", id))
                    .spawn_scoped(s, move || produce(id, queue, tally, args))
            })
            .collect::<Result<_, _>>()
            .context("spawning producers")?;

        let mut res = Ok(());
        for producer in producers {
            match producer.join() {
                Ok(r) => res = res.and(r),
                Err(_) => res = res.and(Err(anyhow::anyhow!("producer panicked"))),
            }
        }
        stop.store(true, Ordering::Release);

        let consumed = consumer
            .join()
            .map_err(|_| anyhow::anyhow!("consumer panicked"))?;
        res.and(consumed)
    })?;

    Ok(Summary {
        pushed: tally.pushed.into_inner(),
        rejected: tally.rejected.into_inner(),
        popped: tally.popped.into_inner(),
        corrupt: tally.corrupt.into_inner(),
    })
}

fn produce(id: usize, queue: &PointQueue, tally: &Tally, args: &Args) -> anyhow::Result<()> {
    let mut rng = thread_rng();

    for _ in 0..args.repeat {
        let x = f64::from(rng.gen_range(0..10_000u32));
        match queue.push_xy(x, x) {
            Ok(()) => {
                tally.pushed.fetch_add(1, Ordering::Relaxed);
            }
            Err(Error::Full) => {
                warn!("producer {}: queue full, dropping {}", id, x);
                tally.rejected.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => return Err(e).with_context(|| format!("producer {}", id)),
        }

        if args.max_sleep_ms > 0 {
            thread::sleep(Duration::from_millis(rng.gen_range(0..args.max_sleep_ms)));
        }
    }
    debug!("producer {} done", id);
    Ok(())
}

fn consume(queue: &PointQueue, tally: &Tally, stop: &AtomicBool, wait: Duration) -> anyhow::Result<()> {
    loop {
        match queue.wait(wait) {
            Ok(()) => {}
            Err(Error::TimedOut) => {
                // Producers are all joined before stop is set, so an empty
                // queue at that point stays empty
                if stop.load(Ordering::Acquire) && queue.is_empty() {
                    return Ok(());
                }
                continue;
            }
            Err(e) => return Err(e).context("consumer wait"),
        }

        match queue.try_pop() {
            Ok(p) => {
                tally.popped.fetch_add(1, Ordering::Relaxed);
                if p.x.to_bits() != p.y.to_bits() {
                    error!("corrupt point {}", p);
                    tally.corrupt.fetch_add(1, Ordering::Relaxed);
                }
            }
            Err(Error::Empty) => warn!("lost the race for a point"),
            Err(e) => return Err(e).context("consumer pop"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{consume, run, Args, Summary, Tally};
    use pointq::PointQueue;
    use std::{
        sync::atomic::{AtomicBool, Ordering},
        time::Duration,
    };

    fn args(producers: usize, queue_size: usize) -> Args {
        Args {
            producers,
            queue_size,
            repeat: 10,
            max_sleep_ms: 0,
            wait_ms: 10,
        }
    }

    #[test]
    fn small_run_balances() {
        let summary = run(&args(4, 100)).unwrap();
        assert_eq!(
            summary,
            Summary {
                pushed: 40,
                rejected: 0,
                popped: 40,
                corrupt: 0
            }
        );
        summary.check().unwrap();
    }

    #[test]
    fn rejected_points_are_not_lost() {
        let summary = run(&args(8, 1)).unwrap();
        assert_eq!(summary.pushed + summary.rejected, 80);
        assert_eq!(summary.pushed, summary.popped);
        summary.check().unwrap();
    }

    #[test]
    fn consumer_drains_before_stopping() {
        let queue = PointQueue::new(8).unwrap();
        let tally = Tally::default();
        for i in 0..5 {
            queue.push_xy(i as f64, i as f64).unwrap();
        }
        queue.push_xy(1.0, 2.0).unwrap();

        // Stop is already raised, everything queued is still consumed
        let stop = AtomicBool::new(true);
        consume(&queue, &tally, &stop, Duration::from_millis(1)).unwrap();

        assert!(queue.is_empty());
        assert_eq!(tally.popped.load(Ordering::Relaxed), 6);
        assert_eq!(tally.corrupt.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn mismatched_tally_fails() {
        let lost = Summary {
            pushed: 3,
            rejected: 0,
            popped: 2,
            corrupt: 0,
        };
        assert!(lost.check().is_err());

        let torn = Summary {
            pushed: 3,
            rejected: 0,
            popped: 3,
            corrupt: 1,
        };
        assert!(torn.check().is_err());
        assert_eq!(torn.to_string(), "pushed: 3, rejected: 0, popped: 3, corrupt: 1");
    }
}
