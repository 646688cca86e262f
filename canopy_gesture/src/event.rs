// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw pointer input and recognized gestures.

use core::fmt;

use kurbo::{Point, Vec2};

/// Identifies one pointer (finger, pen, mouse) for the lifetime of a contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u64);

/// Phase of a [`PointerEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    /// Contact started.
    Down,
    /// Contact moved.
    Move,
    /// Contact ended normally.
    Up,
    /// The input source aborted the contact.
    Cancel,
}

/// One pointer sample in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// What happened.
    pub phase: PointerPhase,
    /// Which pointer.
    pub pointer: PointerId,
    /// Screen position in pixels.
    pub position: Point,
    /// Source timestamp in milliseconds.
    pub timestamp_ms: u64,
}

impl PointerEvent {
    /// Creates an event.
    #[must_use]
    pub fn new(phase: PointerPhase, pointer: PointerId, position: Point, timestamp_ms: u64) -> Self {
        Self {
            phase,
            pointer,
            position,
            timestamp_ms,
        }
    }

    /// A [`PointerPhase::Down`] event.
    #[must_use]
    pub fn down(pointer: PointerId, position: Point, timestamp_ms: u64) -> Self {
        Self::new(PointerPhase::Down, pointer, position, timestamp_ms)
    }

    /// A [`PointerPhase::Move`] event.
    #[must_use]
    pub fn moved(pointer: PointerId, position: Point, timestamp_ms: u64) -> Self {
        Self::new(PointerPhase::Move, pointer, position, timestamp_ms)
    }

    /// A [`PointerPhase::Up`] event.
    #[must_use]
    pub fn up(pointer: PointerId, position: Point, timestamp_ms: u64) -> Self {
        Self::new(PointerPhase::Up, pointer, position, timestamp_ms)
    }

    /// A [`PointerPhase::Cancel`] event.
    #[must_use]
    pub fn cancel(pointer: PointerId, position: Point, timestamp_ms: u64) -> Self {
        Self::new(PointerPhase::Cancel, pointer, position, timestamp_ms)
    }
}

/// A recognized gesture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureOutput {
    /// A short, stationary press was released at `position`.
    Tap {
        /// Release point in screen space.
        position: Point,
    },
    /// A stationary press was held past the long-press threshold.
    LongPress {
        /// Press point in screen space.
        position: Point,
    },
    /// Single-pointer drag; `delta` is in screen pixels.
    Pan {
        /// Movement since the previous pan output.
        delta: Vec2,
    },
    /// Two-pointer pinch.
    Zoom {
        /// Ratio of the new pointer distance to the previous one.
        factor: f64,
        /// Centroid of the two pointers in screen space.
        anchor: Point,
    },
    /// The input source cancelled an active gesture.
    Cancelled,
}

/// Input that does not fit the pointer protocol.
///
/// Anomalies are logged and counted by the recognizer, never returned as errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureAnomaly {
    /// A move, up or cancel for a pointer that is not down.
    UnknownPointer {
        /// The pointer.
        pointer: PointerId,
        /// The offending phase.
        phase: PointerPhase,
    },
    /// A down for a pointer that is already down.
    DuplicateDown {
        /// The pointer.
        pointer: PointerId,
    },
    /// An event timestamp earlier than the previous one.
    TimeWentBackwards {
        /// Previous timestamp.
        last_ms: u64,
        /// Offending timestamp.
        now_ms: u64,
    },
}

impl fmt::Display for GestureAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPointer { pointer, phase } => {
                write!(f, "{phase:?} for pointer {} which is not down", pointer.0)
            }
            Self::DuplicateDown { pointer } => {
                write!(f, "duplicate down for pointer {}", pointer.0)
            }
            Self::TimeWentBackwards { last_ms, now_ms } => {
                write!(f, "timestamp went backwards from {last_ms}ms to {now_ms}ms")
            }
        }
    }
}

impl core::error::Error for GestureAnomaly {}
