//! A fly on the terminal, steered by destinations typed on stdin.
//!
//! The destinations travel from the input loop to the fly through a bounded
//! point queue. Type `x y` to send the fly somewhere, `stop` to quit.

mod command;
mod fly;
mod screen;

use std::{
    io::{self, BufRead, Write},
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::Duration,
};

use anyhow::Context;
use clap::Parser;
use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use pointq::Error;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::{
    command::{parse_command, Command},
    fly::Fly,
    screen::{Redraw, Screen},
};

const TICK: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(version, about = "Steer a fly around the terminal")]
struct Args {
    /// Screen width, in columns
    #[arg(long, default_value_t = 78, value_parser = clap::value_parser!(u16).range(3..=1000))]
    width: u16,

    /// Screen height, in rows
    #[arg(long, default_value_t = 23, value_parser = clap::value_parser!(u16).range(3..=1000))]
    height: u16,

    /// How many destinations the fly remembers
    #[arg(long, default_value_t = 10)]
    queue_size: usize,

    /// Character drawn for the fly
    #[arg(long, default_value_t = '@')]
    mark: char,
}

fn main() -> anyhow::Result<()> {
    // The screen belongs to the fly, keep logs quiet unless asked
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let fly = Fly::at_center(args.mark, args.width, args.height, args.queue_size)
        .context("creating the fly")?;
    let screen = Screen::new(args.width, args.height);
    let redraw = Redraw::default();
    let stop = AtomicBool::new(false);

    screen.clear(&mut io::stdout()).context("clearing the screen")?;
    redraw.request();
    let lines = spawn_stdin_reader()?;

    thread::scope(|s| {
        let mover = s.spawn(|| {
            let res = fly_around(&fly, &redraw, &stop);
            stop.store(true, Ordering::Release);
            res
        });
        let drawer = s.spawn(|| draw(&screen, &fly, &redraw, &stop));

        let res = read_destinations(&fly, &lines, &stop, &mut io::stdout());
        stop.store(true, Ordering::Release);

        let mover = mover.join().map_err(|_| anyhow::anyhow!("mover thread panicked"))?;
        let drawer = drawer.join().map_err(|_| anyhow::anyhow!("draw thread panicked"))?;
        res.and(mover).and(drawer)
    })
}

/// Follow destinations off the queue until told to stop
fn fly_around(fly: &Fly, redraw: &Redraw, stop: &AtomicBool) -> anyhow::Result<()> {
    while !stop.load(Ordering::Acquire) {
        let dest = match fly.wait_for_destination(TICK) {
            Ok(dest) => dest,
            Err(Error::TimedOut) => continue,
            Err(e) => {
                error!("fly lost track of its destinations: {}", e);
                return Err(e).context("waiting for a destination");
            }
        };

        fly.head_towards(dest);
        debug!("flying from {} to {} at speed {:.1}", fly.position(), dest, fly.speed());

        let pause = Duration::from_secs_f64(1.0 / fly.speed());
        while fly.distance_to(dest) >= 1.0 && !stop.load(Ordering::Acquire) {
            fly.step();
            redraw.request();
            thread::sleep(pause);
        }
        info!("fly arrived at {}", fly.position());
    }
    Ok(())
}

fn draw(screen: &Screen, fly: &Fly, redraw: &Redraw, stop: &AtomicBool) -> anyhow::Result<()> {
    let stdout = io::stdout();
    while !stop.load(Ordering::Acquire) {
        if redraw.take(TICK) {
            screen
                .draw(&[fly], &mut stdout.lock())
                .context("drawing the screen")?;
        }
    }
    Ok(())
}

/// Forward stdin lines to the input loop. The thread is detached: it may sit
/// in a blocking read long after the demo decided to stop.
fn spawn_stdin_reader() -> anyhow::Result<Receiver<io::Result<String>>> {
    let (tx, rx) = channel::unbounded();
    thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .context("spawning the stdin reader")?;
    Ok(rx)
}

/// Prompt for destinations until `stop`, end of input, or the fly gives up
fn read_destinations(
    fly: &Fly,
    lines: &Receiver<io::Result<String>>,
    stop: &AtomicBool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    'prompt: while !stop.load(Ordering::Acquire) {
        write!(out, "Destination? ")?;
        out.flush()?;

        // Poll, so a stop raised by another thread is seen without new input
        let line = loop {
            match lines.recv_timeout(TICK) {
                Ok(line) => break line.context("reading a destination")?,
                Err(RecvTimeoutError::Timeout) if stop.load(Ordering::Acquire) => break 'prompt,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("end of input");
                    break 'prompt;
                }
            }
        };

        match parse_command(&line) {
            Command::Stop => break,
            Command::Goto(dest) => match fly.set_destination(dest) {
                Ok(()) => {}
                Err(Error::Full) => writeln!(out, "The fly is busy now")?,
                Err(e) => return Err(e).context("sending the fly a destination"),
            },
            Command::Invalid => writeln!(out, "Expected `x y` or `stop`, got {:?}", line.trim())?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::{read_destinations, Args};
    use crate::fly::Fly;
    use clap::Parser;
    use crossbeam::channel;
    use pointq::Point;
    use std::{
        sync::atomic::{AtomicBool, Ordering},
        thread,
        time::{Duration, Instant},
    };

    #[test]
    fn screen_size_is_bounded() {
        let args = Args::try_parse_from(["fly", "--height", "1000", "--width", "3"]).unwrap();
        assert_eq!((args.width, args.height), (3, 1000));
        assert_eq!(args.queue_size, 10);

        for bad in [["--height", "65535"], ["--height", "2"], ["--width", "1001"]] {
            assert!(Args::try_parse_from(["fly", bad[0], bad[1]]).is_err(), "{:?}", bad);
        }
    }

    #[test]
    fn destinations_and_commands() {
        let fly = Fly::at_center('@', 20, 10, 1).unwrap();
        let (tx, rx) = channel::unbounded();
        for line in ["3 4", "5 6", "nope", "stop", "7 8"] {
            tx.send(Ok(line.to_string())).unwrap();
        }

        let mut out = Vec::new();
        read_destinations(&fly, &rx, &AtomicBool::new(false), &mut out).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out,
            "Destination? Destination? The fly is busy now\n\
             Destination? Expected `x y` or `stop`, got \"nope\"\n\
             Destination? "
        );
        assert_eq!(fly.wait_for_destination(Duration::from_millis(1)), Ok(Point::new(3.0, 4.0)));
        // Input after `stop` is left alone
        assert_eq!(rx.len(), 1);
    }

    #[test]
    fn end_of_input() {
        let fly = Fly::at_center('@', 20, 10, 1).unwrap();
        let (tx, rx) = channel::unbounded();
        drop(tx);
        read_destinations(&fly, &rx, &AtomicBool::new(false), &mut Vec::new()).unwrap();
    }

    #[test]
    fn stop_without_input() {
        let fly = Fly::at_center('@', 20, 10, 1).unwrap();
        // Sender kept alive: nobody ever types anything
        let (_tx, rx) = channel::unbounded();
        let stop = AtomicBool::new(false);

        let start = Instant::now();
        thread::scope(|s| {
            s.spawn(|| {
                thread::sleep(Duration::from_millis(50));
                stop.store(true, Ordering::Release);
            });
            read_destinations(&fly, &rx, &stop, &mut Vec::new()).unwrap();
        });
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
