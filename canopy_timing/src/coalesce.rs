// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Rate-limits a stream of values to at most one delivery per window.
///
/// The first value after a quiet period is delivered immediately. Values that
/// arrive inside the window replace each other (latest wins) and are handed
/// out by [`Coalescer::poll`] once the window has passed.
///
/// Time is supplied by the caller in milliseconds, typically from a
/// [`Clock`](crate::Clock).
#[derive(Clone, Debug)]
pub struct Coalescer<T> {
    window_ms: u64,
    last_delivery_ms: Option<u64>,
    pending: Option<T>,
}

impl<T> Coalescer<T> {
    /// Creates a coalescer with the given window.
    #[must_use]
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last_delivery_ms: None,
            pending: None,
        }
    }

    /// Length of the window in milliseconds.
    #[must_use]
    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Offers a value. Returns it straight back if the window is open.
    pub fn push(&mut self, value: T, now_ms: u64) -> Option<T> {
        if self.is_open(now_ms) {
            self.pending = None;
            self.last_delivery_ms = Some(now_ms);
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    /// Delivers the pending value if the window has passed.
    pub fn poll(&mut self, now_ms: u64) -> Option<T> {
        if self.pending.is_some() && self.is_open(now_ms) {
            self.last_delivery_ms = Some(now_ms);
            self.pending.take()
        } else {
            None
        }
    }

    /// Takes the pending value regardless of the window.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Returns `true` if a value is waiting for the window to pass.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes deliverable.
    #[must_use]
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.pending.as_ref()?;
        Some(
            self.last_delivery_ms
                .map_or(0, |last| last.saturating_add(self.window_ms)),
        )
    }

    fn is_open(&self, now_ms: u64) -> bool {
        self.last_delivery_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.window_ms)
    }
}
