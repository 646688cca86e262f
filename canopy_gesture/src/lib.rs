// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Gesture: pointer gesture disambiguation.
//!
//! [`GestureRecognizer`] consumes raw [`PointerEvent`]s and decides what the
//! user meant. It owns no camera and knows nothing about nodes: it emits
//! [`GestureOutput`]s in screen space and leaves resolving taps and applying
//! pans and zooms to the caller.
//!
//! ## States
//!
//! - `Idle` → pointer down → `TapPending`.
//! - `TapPending` → released within `tap_timeout_ms` and `tap_slop_px` →
//!   [`GestureOutput::Tap`] at the release point, back to `Idle`.
//! - `TapPending` → moved beyond `tap_slop_px` → `Dragging`; moves become
//!   [`GestureOutput::Pan`].
//! - `TapPending` held still for `long_press_ms` → [`GestureOutput::LongPress`]
//!   and `LongPressed` until release. No tap follows.
//! - A second pointer during `TapPending` or `Dragging` → `Pinching`; changes
//!   in the distance between the two become [`GestureOutput::Zoom`] anchored
//!   at their centroid. Translation is ignored while pinching.
//! - Lifting either pinch pointer ends the gesture; the other pointer is
//!   ignored until it lifts too.
//! - Cancel from the input source → [`GestureOutput::Cancelled`] and `Idle`.
//!
//! Up or move without a down, a duplicate down and timestamps that go
//! backwards are [anomalies](GestureAnomaly): logged at debug level with
//! `tracing`, counted and otherwise ignored.
//!
//! ## Example
//!
//! ```rust
//! use canopy_gesture::{GestureOutput, GestureRecognizer, PointerEvent, PointerId};
//! use kurbo::Point;
//!
//! let mut gestures = GestureRecognizer::default();
//! let finger = PointerId(7);
//! gestures.handle(PointerEvent::down(finger, Point::new(100.0, 100.0), 0));
//! gestures.handle(PointerEvent::moved(finger, Point::new(102.0, 100.0), 40));
//! let out = gestures.handle(PointerEvent::up(finger, Point::new(102.0, 100.0), 80));
//! assert_eq!(out, Some(GestureOutput::Tap { position: Point::new(102.0, 100.0) }));
//! ```

mod config;
mod event;
mod recognizer;

pub use config::GestureConfig;
pub use event::{GestureAnomaly, GestureOutput, PointerEvent, PointerId, PointerPhase};
pub use recognizer::{GestureContext, GestureRecognizer, GestureState};
