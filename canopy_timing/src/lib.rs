// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Timing: injectable clocks and notification coalescing.
//!
//! - [`Clock`]: a monotonic millisecond source. [`ManualClock`] is driven by
//!   hand for deterministic tests; `SystemClock` (behind the default `std`
//!   feature) reads real time.
//! - [`Coalescer`]: passes the first value through, then holds later values
//!   (latest wins) until the window has elapsed.
//!
//! ```rust
//! use canopy_timing::{Clock, Coalescer, ManualClock};
//!
//! let clock = ManualClock::new(0);
//! let mut camera_moves = Coalescer::new(16);
//!
//! assert_eq!(camera_moves.push("pan 1", clock.now_ms()), Some("pan 1"));
//! clock.advance(5);
//! assert_eq!(camera_moves.push("pan 2", clock.now_ms()), None);
//! clock.advance(11);
//! assert_eq!(camera_moves.poll(clock.now_ms()), Some("pan 2"));
//! ```
//!
//! This crate is `no_std`; the `std` feature only adds `SystemClock`.

#![no_std]

mod clock;
mod coalesce;

#[cfg(feature = "std")]
pub use clock::SystemClock;
pub use clock::{Clock, ManualClock};
pub use coalesce::Coalescer;
