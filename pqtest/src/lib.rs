//! NOTE: this crate is really just a shim for testing
//! the pointq crate.

mod wait;
