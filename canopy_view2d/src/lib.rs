// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy View 2D: the camera over a radial map.
//!
//! [`Camera`] is a small, headless pan/zoom model. It converts between
//! world coordinates (where the layout places nodes) and screen pixels
//! (where pointers land), and provides:
//! - Anchored zoom: the world point under the anchor stays under it.
//! - Silent clamping of the scale to `[min_scale, max_scale]`.
//! - Fitting a world rectangle into the viewport, and centering on a point.
//! - The visible world rectangle, for culling.
//!
//! The camera never owns or invalidates layout. Moving it only changes the
//! projection.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use canopy_view2d::Camera;
//!
//! let mut camera = Camera::new(Size::new(800.0, 600.0));
//! let anchor = Point::new(200.0, 150.0);
//! let under_anchor = camera.screen_to_world(anchor);
//!
//! camera.zoom(2.0, anchor);
//! let after = camera.screen_to_world(anchor);
//! assert!((after - under_anchor).hypot() < 1e-9);
//! ```
//!
//! ## Design notes
//!
//! - Axis-aligned with a **uniform** scale; no rotation.
//! - `screen = world * scale + offset`, where `offset` is the screen position
//!   of the world origin.
//! - [`CameraState`] is a plain snapshot used for change notifications. It is
//!   never persisted with node data.
//!
//! This crate is `no_std`.

#![no_std]

mod camera;
mod modes;

pub use camera::{Camera, CameraConfig, CameraState};
pub use modes::FitMode;
