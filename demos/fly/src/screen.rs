//! Character screen drawn with ANSI escapes, and the redraw signal

use std::{
    io::{self, Write},
    mem,
    sync::{Condvar, Mutex, PoisonError},
    time::Duration,
};

use crate::fly::Fly;

const CLEAR: &str = "\x1b[2J";
const SAVE_CURSOR: &str = "\x1b7";
const RESTORE_CURSOR: &str = "\x1b8";

fn move_cursor(out: &mut impl Write, col: u32, row: u32) -> io::Result<()> {
    write!(out, "\x1b[{};{}H", row, col)
}

pub struct Screen {
    width: u16,
    height: u16,
}

impl Screen {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Clear the terminal and park the cursor under the frame
    pub fn clear(&self, out: &mut impl Write) -> io::Result<()> {
        out.write_all(CLEAR.as_bytes())?;
        move_cursor(out, 1, u32::from(self.height) + 2)?;
        out.flush()
    }

    /// One frame of text: a border of `-` and `|` with the flies on top
    pub fn render(&self, flies: &[&Fly]) -> String {
        let (w, h) = (i64::from(self.width), i64::from(self.height));
        let mut frame = String::with_capacity(((w + 1) * h) as usize);

        for row in 0..h {
            for col in 0..w {
                let ch = match flies.iter().find(|f| f.is_at(col, row)) {
                    Some(fly) => fly.mark(),
                    None if row == 0 || row == h - 1 => '-',
                    None if col == 0 || col == w - 1 => '|',
                    None => ' ',
                };
                frame.push(ch);
            }
            frame.push('\n');
        }
        frame
    }

    /// Draw a frame at the top left corner, leaving the cursor where it was
    pub fn draw(&self, flies: &[&Fly], out: &mut impl Write) -> io::Result<()> {
        let frame = self.render(flies);
        out.write_all(SAVE_CURSOR.as_bytes())?;
        move_cursor(out, 1, 1)?;
        out.write_all(frame.as_bytes())?;
        out.write_all(RESTORE_CURSOR.as_bytes())?;
        out.flush()
    }
}

/// Pending redraw flag, set by whoever changed the picture
#[derive(Default)]
pub struct Redraw {
    requested: Mutex<bool>,
    cond: Condvar,
}

impl Redraw {
    pub fn request(&self) {
        let mut requested = self.requested.lock().unwrap_or_else(PoisonError::into_inner);
        *requested = true;
        self.cond.notify_one();
    }

    /// Wait up to `timeout` for a request, and clear it. Returns true if one
    /// was pending.
    pub fn take(&self, timeout: Duration) -> bool {
        let requested = self.requested.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut requested, _) = self
            .cond
            .wait_timeout_while(requested, timeout, |r| !*r)
            .unwrap_or_else(PoisonError::into_inner);
        mem::take(&mut *requested)
    }
}
