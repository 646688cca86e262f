// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, Point, Rect, Size, Vec2};

use crate::modes::FitMode;

/// Scale limits for a [`Camera`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CameraConfig {
    /// Smallest allowed scale (screen pixels per world unit).
    pub min_scale: f64,
    /// Largest allowed scale.
    pub max_scale: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.05,
            max_scale: 8.0,
        }
    }
}

/// Plain snapshot of a camera, suitable for notifications.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CameraState {
    /// Screen position of the world origin.
    pub offset: Vec2,
    /// Screen pixels per world unit.
    pub scale: f64,
    /// Viewport size in screen pixels.
    pub viewport: Size,
}

/// Pan and zoom over the world plane.
///
/// The camera maps world coordinates to screen pixels with a uniform scale
/// followed by a translation: `screen = world * scale + offset`. The screen
/// origin is the viewport's top-left corner.
///
/// Camera changes never touch layout; they only change this projection.
#[derive(Clone, Debug)]
pub struct Camera {
    viewport: Size,
    scale: f64,
    offset: Vec2,
    min_scale: f64,
    max_scale: f64,
    fit_mode: FitMode,
    world_to_screen: Affine,
    screen_to_world: Affine,
}

impl Camera {
    /// Creates a camera over a viewport of `viewport` pixels.
    ///
    /// - Initial scale is `1.0`.
    /// - The world origin starts at the viewport center.
    /// - Scale limits come from [`CameraConfig::default`].
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self::with_config(viewport, &CameraConfig::default())
    }

    /// Creates a camera with explicit scale limits.
    #[must_use]
    pub fn with_config(viewport: Size, config: &CameraConfig) -> Self {
        let mut camera = Self {
            viewport,
            scale: 1.0,
            offset: viewport.to_vec2() / 2.0,
            min_scale: 1.0,
            max_scale: 1.0,
            fit_mode: FitMode::default(),
            world_to_screen: Affine::IDENTITY,
            screen_to_world: Affine::IDENTITY,
        };
        camera.set_scale_limits(config.min_scale, config.max_scale);
        camera.rebuild_transforms();
        camera
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> CameraState {
        CameraState {
            offset: self.offset,
            scale: self.scale,
            viewport: self.viewport,
        }
    }

    /// Restores a snapshot, clamping its scale into this camera's limits.
    pub fn set_state(&mut self, state: CameraState) {
        self.viewport = state.viewport;
        self.offset = state.offset;
        self.scale = state.scale.clamp(self.min_scale, self.max_scale);
        self.rebuild_transforms();
    }

    /// Viewport size in screen pixels.
    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// The viewport as a screen-space rectangle at the origin.
    #[must_use]
    pub fn viewport_rect(&self) -> Rect {
        self.viewport.to_rect()
    }

    /// Resizes the viewport, keeping the world point at its center fixed.
    pub fn set_viewport_size(&mut self, viewport: Size) {
        if self.viewport == viewport {
            return;
        }
        let center_world = self.screen_to_world(self.viewport_rect().center());
        self.viewport = viewport;
        self.rebuild_transforms();
        self.center_on(center_world);
    }

    /// Screen pixels per world unit.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Screen position of the world origin.
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Current `(min, max)` scale limits.
    #[must_use]
    pub fn scale_limits(&self) -> (f64, f64) {
        (self.min_scale, self.max_scale)
    }

    /// Sets the scale limits.
    ///
    /// The range is normalized so that `min <= max`, and the current scale is
    /// clamped into it.
    pub fn set_scale_limits(&mut self, min_scale: f64, max_scale: f64) {
        let (min_scale, max_scale) = if min_scale <= max_scale {
            (min_scale, max_scale)
        } else {
            (max_scale, min_scale)
        };
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self.set_scale(self.scale);
    }

    /// Sets how [`Camera::fit_rect`] positions content.
    pub fn set_fit_mode(&mut self, mode: FitMode) {
        self.fit_mode = mode;
    }

    /// Current fit mode.
    #[must_use]
    pub fn fit_mode(&self) -> FitMode {
        self.fit_mode
    }

    /// Sets the scale about the viewport origin, clamped silently.
    pub fn set_scale(&mut self, scale: f64) {
        let clamped = scale.clamp(self.min_scale, self.max_scale);
        if (self.scale - clamped).abs() < f64::EPSILON {
            return;
        }
        self.scale = clamped;
        self.rebuild_transforms();
    }

    /// Moves the view by `delta` screen pixels.
    pub fn pan(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }
        self.offset += delta;
        self.rebuild_transforms();
    }

    /// Multiplies the scale by `factor`, keeping the world point under
    /// `anchor` (screen coordinates) fixed.
    ///
    /// The resulting scale is clamped; non-positive factors are ignored.
    /// Returns `true` if the camera changed.
    pub fn zoom(&mut self, factor: f64, anchor: Point) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let old_scale = self.scale;
        let new_scale = (old_scale * factor).clamp(self.min_scale, self.max_scale);
        if (new_scale - old_scale).abs() < f64::EPSILON {
            return false;
        }

        let world_at_anchor = self.screen_to_world(anchor);
        self.scale = new_scale;
        self.rebuild_transforms();
        let drifted = self.world_to_screen(world_at_anchor);
        self.pan(anchor - drifted);
        true
    }

    /// Fits a world rectangle into the viewport, preserving aspect ratio.
    ///
    /// `padding` is kept free on every side, in screen pixels.
    pub fn fit_rect(&mut self, rect: Rect, padding: f64) {
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }
        let avail = Size::new(
            self.viewport.width - 2.0 * padding,
            self.viewport.height - 2.0 * padding,
        );
        if avail.width <= 0.0 || avail.height <= 0.0 {
            return;
        }

        let sx = avail.width / rect.width().max(f64::MIN_POSITIVE);
        let sy = avail.height / rect.height().max(f64::MIN_POSITIVE);
        let scale = sx.min(sy).clamp(self.min_scale, self.max_scale);
        self.scale = scale;

        self.offset = match self.fit_mode {
            FitMode::Center => {
                let view_center = self.viewport_rect().center().to_vec2();
                view_center - rect.center().to_vec2() * scale
            }
            FitMode::AlignMin => Vec2::new(padding, padding) - rect.origin().to_vec2() * scale,
        };
        self.rebuild_transforms();
    }

    /// Pans so `world` sits at the viewport center.
    pub fn center_on(&mut self, world: Point) {
        let view_center = self.viewport_rect().center();
        let delta = view_center - self.world_to_screen(world);
        self.pan(delta);
    }

    /// World-space rectangle currently visible.
    #[must_use]
    pub fn visible_world_rect(&self) -> Rect {
        self.screen_to_world_rect(self.viewport_rect())
    }

    /// Converts a world point to screen pixels.
    #[must_use]
    pub fn world_to_screen(&self, pt: Point) -> Point {
        self.world_to_screen * pt
    }

    /// Converts a screen point to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, pt: Point) -> Point {
        self.screen_to_world * pt
    }

    /// Converts a world rectangle to screen pixels.
    #[must_use]
    pub fn world_to_screen_rect(&self, rect: Rect) -> Rect {
        // Uniform scale plus translation maps corners to corners.
        Rect::from_points(
            self.world_to_screen(rect.origin()),
            self.world_to_screen(Point::new(rect.x1, rect.y1)),
        )
    }

    /// Converts a screen rectangle to world coordinates.
    #[must_use]
    pub fn screen_to_world_rect(&self, rect: Rect) -> Rect {
        Rect::from_points(
            self.screen_to_world(rect.origin()),
            self.screen_to_world(Point::new(rect.x1, rect.y1)),
        )
    }

    /// Length in screen pixels of a world-space length.
    #[must_use]
    pub fn world_to_screen_len(&self, len: f64) -> f64 {
        len * self.scale
    }

    /// Length in world units of a screen-space length.
    #[must_use]
    pub fn screen_to_world_len(&self, len: f64) -> f64 {
        len / self.scale
    }

    fn rebuild_transforms(&mut self) {
        self.world_to_screen = Affine::translate(self.offset) * Affine::scale(self.scale);
        self.screen_to_world = self.world_to_screen.inverse();
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect, Size, Vec2};

    use super::{Camera, CameraConfig, FitMode};

    #[test]
    fn basic_world_screen_roundtrip() {
        let cam = Camera::new(Size::new(800.0, 600.0));

        let world_pt = Point::new(10.0, -5.0);
        let screen_pt = cam.world_to_screen(world_pt);
        let world_back = cam.screen_to_world(screen_pt);
        assert!((world_back.x - world_pt.x).abs() < 1e-9);
        assert!((world_back.y - world_pt.y).abs() < 1e-9);
    }

    #[test]
    fn world_origin_starts_at_viewport_center() {
        let cam = Camera::new(Size::new(800.0, 600.0));
        assert_eq!(cam.world_to_screen(Point::ORIGIN), Point::new(400.0, 300.0));
    }

    #[test]
    fn zoom_about_anchor_keeps_anchor_fixed() {
        let mut cam = Camera::new(Size::new(800.0, 600.0));

        let anchor = Point::new(120.0, 470.0);
        let world_before = cam.screen_to_world(anchor);

        assert!(cam.zoom(2.0, anchor));
        let world_after = cam.screen_to_world(anchor);

        assert!((world_after.x - world_before.x).abs() < 1e-9);
        assert!((world_after.y - world_before.y).abs() < 1e-9);
    }

    #[test]
    fn zoom_is_clamped_silently() {
        let mut cam = Camera::with_config(
            Size::new(100.0, 100.0),
            &CameraConfig {
                min_scale: 0.5,
                max_scale: 2.0,
            },
        );
        cam.zoom(10.0, Point::new(50.0, 50.0));
        assert_eq!(cam.scale(), 2.0);
        assert!(!cam.zoom(3.0, Point::new(50.0, 50.0)), "already at the limit");
        cam.zoom(0.01, Point::new(50.0, 50.0));
        assert_eq!(cam.scale(), 0.5);
        assert!(!cam.zoom(-1.0, Point::ORIGIN));
        assert!(!cam.zoom(f64::NAN, Point::ORIGIN));
    }

    #[test]
    fn fit_rect_shows_whole_rect() {
        let mut cam = Camera::new(Size::new(200.0, 100.0));

        let bounds = Rect::new(-50.0, -25.0, 50.0, 25.0);
        cam.fit_rect(bounds, 0.0);

        let visible = cam.visible_world_rect();
        assert!(visible.min_x() <= bounds.min_x() + 1e-9);
        assert!(visible.max_x() >= bounds.max_x() - 1e-9);
        assert!(visible.min_y() <= bounds.min_y() + 1e-9);
        assert!(visible.max_y() >= bounds.max_y() - 1e-9);
    }

    #[test]
    fn fit_mode_align_min_aligns_world_min_to_viewport_origin() {
        let mut cam = Camera::new(Size::new(200.0, 100.0));
        cam.set_fit_mode(FitMode::AlignMin);

        let bounds = Rect::new(-50.0, -20.0, 150.0, 80.0);
        cam.fit_rect(bounds, 4.0);

        let corner = cam.world_to_screen(bounds.origin());
        assert!((corner.x - 4.0).abs() < 1e-6);
        assert!((corner.y - 4.0).abs() < 1e-6);
    }

    #[test]
    fn pan_moves_world_with_the_pointer() {
        let mut cam = Camera::new(Size::new(100.0, 100.0));
        cam.set_scale(2.0);
        let before = cam.world_to_screen(Point::new(3.0, 4.0));
        cam.pan(Vec2::new(10.0, -5.0));
        let after = cam.world_to_screen(Point::new(3.0, 4.0));
        assert_eq!(after - before, Vec2::new(10.0, -5.0));
    }

    #[test]
    fn resize_keeps_center_fixed() {
        let mut cam = Camera::new(Size::new(100.0, 100.0));
        cam.center_on(Point::new(30.0, 40.0));
        cam.set_viewport_size(Size::new(300.0, 50.0));
        let center = cam.screen_to_world(Point::new(150.0, 25.0));
        assert!((center.x - 30.0).abs() < 1e-9 && (center.y - 40.0).abs() < 1e-9);
    }

    #[test]
    fn state_round_trips_through_snapshot() {
        let mut cam = Camera::new(Size::new(640.0, 480.0));
        cam.zoom(1.5, Point::new(10.0, 10.0));
        cam.pan(Vec2::new(7.0, 3.0));
        let state = cam.state();

        let mut other = Camera::new(Size::new(1.0, 1.0));
        other.set_state(state);
        assert_eq!(other.state(), state);
    }
}
