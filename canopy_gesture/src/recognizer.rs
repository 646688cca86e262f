// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Vec2};
use smallvec::SmallVec;

use crate::config::GestureConfig;
use crate::event::{GestureAnomaly, GestureOutput, PointerEvent, PointerId, PointerPhase};

/// Recognizer state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GestureState {
    /// No pointer is taking part in a gesture.
    #[default]
    Idle,
    /// One pointer is down and has not moved beyond the tap slop.
    TapPending,
    /// One pointer is dragging; moves become pans.
    Dragging,
    /// Two pointers are down; distance changes become zooms.
    Pinching,
    /// A long press fired; everything until release is swallowed.
    LongPressed,
}

/// The gesture in progress.
///
/// Exists from the first pointer-down until the gesture ends or is cancelled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureContext {
    /// Current gesture kind. Never [`GestureState::Idle`].
    pub kind: GestureState,
    /// Where the first pointer went down.
    pub start_position: Point,
    /// When the first pointer went down.
    pub start_ms: u64,
    /// Sum of all emitted pan deltas.
    pub total_pan: Vec2,
    /// Product of all emitted zoom factors.
    pub total_zoom: f64,
}

#[derive(Clone, Copy, Debug)]
struct Contact {
    pointer: PointerId,
    position: Point,
}

/// Turns a stream of [`PointerEvent`]s into [`GestureOutput`]s.
///
/// Feed every event to [`GestureRecognizer::handle`]. Long presses are only
/// noticed when time is observed, so also call [`GestureRecognizer::tick`]
/// periodically while a press may be pending.
///
/// Input that breaks the pointer protocol is logged at debug level, counted
/// in [`GestureRecognizer::anomaly_count`] and otherwise ignored.
#[derive(Clone, Debug, Default)]
pub struct GestureRecognizer {
    config: GestureConfig,
    context: Option<GestureContext>,
    // Pointers taking part in the current gesture, in down order.
    active: SmallVec<[Contact; 2]>,
    // Pointers still down but excluded until they lift.
    ignored: SmallVec<[PointerId; 2]>,
    last_ms: Option<u64>,
    anomalies: u64,
}

impl GestureRecognizer {
    /// Creates an idle recognizer.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Current thresholds.
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Replaces the thresholds. A gesture in progress continues under the new ones.
    pub fn set_config(&mut self, config: GestureConfig) {
        self.config = config;
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> GestureState {
        self.context.map_or(GestureState::Idle, |ctx| ctx.kind)
    }

    /// The gesture in progress, if any.
    #[must_use]
    pub fn context(&self) -> Option<&GestureContext> {
        self.context.as_ref()
    }

    /// Number of pointers taking part in the current gesture.
    #[must_use]
    pub fn active_pointers(&self) -> usize {
        self.active.len()
    }

    /// Number of anomalies seen so far.
    #[must_use]
    pub fn anomaly_count(&self) -> u64 {
        self.anomalies
    }

    /// Drops all gesture and pointer state without emitting anything.
    ///
    /// The anomaly count and last timestamp survive.
    pub fn reset(&mut self) {
        self.context = None;
        self.active.clear();
        self.ignored.clear();
    }

    /// Processes one pointer event.
    pub fn handle(&mut self, event: PointerEvent) -> Option<GestureOutput> {
        let now = self.observe(event.timestamp_ms);
        if self.ignored.contains(&event.pointer) {
            match event.phase {
                PointerPhase::Up => self.ignored.retain(|p| *p != event.pointer),
                PointerPhase::Cancel => {
                    // The source cancels the whole interaction, not one pointer.
                    self.ignored.retain(|p| *p != event.pointer);
                    return self.cancel_active(event.pointer);
                }
                PointerPhase::Down => self.anomaly(GestureAnomaly::DuplicateDown {
                    pointer: event.pointer,
                }),
                PointerPhase::Move => {}
            }
            return None;
        }
        match event.phase {
            PointerPhase::Down => self.on_down(event.pointer, event.position, now),
            PointerPhase::Move => self.on_move(event.pointer, event.position, now),
            PointerPhase::Up => self.on_up(event.pointer, event.position, now),
            PointerPhase::Cancel => self.on_cancel(event.pointer),
        }
    }

    /// Observes the passage of time without input; fires a pending long press.
    pub fn tick(&mut self, now_ms: u64) -> Option<GestureOutput> {
        self.long_press_due(now_ms)
    }

    /// Earliest time at which [`GestureRecognizer::tick`] could fire a long press.
    #[must_use]
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.context
            .filter(|ctx| ctx.kind == GestureState::TapPending)
            .map(|ctx| ctx.start_ms.saturating_add(self.config.long_press_ms))
    }

    fn on_down(&mut self, pointer: PointerId, position: Point, now: u64) -> Option<GestureOutput> {
        if self.active.iter().any(|c| c.pointer == pointer) {
            self.anomaly(GestureAnomaly::DuplicateDown { pointer });
            return None;
        }
        match self.state() {
            GestureState::Idle => {
                self.active.push(Contact { pointer, position });
                self.context = Some(GestureContext {
                    kind: GestureState::TapPending,
                    start_position: position,
                    start_ms: now,
                    total_pan: Vec2::ZERO,
                    total_zoom: 1.0,
                });
                None
            }
            GestureState::TapPending | GestureState::Dragging => {
                if let Some(fired) = self.long_press_due(now) {
                    self.ignored.push(pointer);
                    return Some(fired);
                }
                self.active.push(Contact { pointer, position });
                self.set_kind(GestureState::Pinching);
                None
            }
            GestureState::Pinching | GestureState::LongPressed => {
                self.ignored.push(pointer);
                None
            }
        }
    }

    fn on_move(&mut self, pointer: PointerId, position: Point, now: u64) -> Option<GestureOutput> {
        let slot = self.slot_of(pointer, PointerPhase::Move)?;
        let ctx = self.context?;
        match ctx.kind {
            GestureState::TapPending => {
                self.active[slot].position = position;
                if let Some(fired) = self.long_press_due(now) {
                    return Some(fired);
                }
                if (position - ctx.start_position).hypot() <= self.config.tap_slop_px {
                    return None;
                }
                self.set_kind(GestureState::Dragging);
                self.pan(position - ctx.start_position)
            }
            GestureState::Dragging => {
                let delta = position - self.active[slot].position;
                self.active[slot].position = position;
                self.pan(delta)
            }
            GestureState::Pinching => {
                let before = self.pinch_span();
                self.active[slot].position = position;
                let (after, anchor) = self.pinch_span()?;
                let (before, _) = before?;
                if before <= 0.0 || after <= 0.0 || before == after {
                    return None;
                }
                let factor = after / before;
                if let Some(ctx) = self.context.as_mut() {
                    ctx.total_zoom *= factor;
                }
                Some(GestureOutput::Zoom { factor, anchor })
            }
            GestureState::LongPressed | GestureState::Idle => {
                self.active[slot].position = position;
                None
            }
        }
    }

    fn on_up(&mut self, pointer: PointerId, position: Point, now: u64) -> Option<GestureOutput> {
        self.slot_of(pointer, PointerPhase::Up)?;
        let ctx = self.context?;
        let out = match ctx.kind {
            GestureState::TapPending => {
                if let Some(fired) = self.long_press_due(now) {
                    Some(fired)
                } else if now.saturating_sub(ctx.start_ms) <= self.config.tap_timeout_ms
                    && (position - ctx.start_position).hypot() <= self.config.tap_slop_px
                {
                    Some(GestureOutput::Tap { position })
                } else {
                    None
                }
            }
            GestureState::Pinching => {
                // The other pinch pointer sits out until it lifts.
                let rest = self.active.iter().map(|c| c.pointer).filter(|p| *p != pointer);
                self.ignored.extend(rest);
                None
            }
            GestureState::Dragging | GestureState::LongPressed | GestureState::Idle => None,
        };
        self.context = None;
        self.active.clear();
        out
    }

    fn on_cancel(&mut self, pointer: PointerId) -> Option<GestureOutput> {
        self.slot_of(pointer, PointerPhase::Cancel)?;
        self.cancel_active(pointer)
    }

    /// Ends the current gesture, if any; pointers other than `pointer` stay
    /// ignored until they lift.
    fn cancel_active(&mut self, pointer: PointerId) -> Option<GestureOutput> {
        self.context?;
        let rest = self.active.iter().map(|c| c.pointer).filter(|p| *p != pointer);
        self.ignored.extend(rest);
        self.context = None;
        self.active.clear();
        tracing::trace!(pointer = pointer.0, "gesture cancelled");
        Some(GestureOutput::Cancelled)
    }

    fn long_press_due(&mut self, now: u64) -> Option<GestureOutput> {
        let ctx = self.context.as_mut()?;
        if ctx.kind != GestureState::TapPending
            || now.saturating_sub(ctx.start_ms) < self.config.long_press_ms
        {
            return None;
        }
        ctx.kind = GestureState::LongPressed;
        Some(GestureOutput::LongPress {
            position: ctx.start_position,
        })
    }

    fn pan(&mut self, delta: Vec2) -> Option<GestureOutput> {
        if delta == Vec2::ZERO {
            return None;
        }
        if let Some(ctx) = self.context.as_mut() {
            ctx.total_pan += delta;
        }
        Some(GestureOutput::Pan { delta })
    }

    /// Distance and centroid of the two pinch pointers.
    fn pinch_span(&self) -> Option<(f64, Point)> {
        let [a, b] = self.active.as_slice() else {
            return None;
        };
        Some((a.position.distance(b.position), a.position.midpoint(b.position)))
    }

    fn slot_of(&mut self, pointer: PointerId, phase: PointerPhase) -> Option<usize> {
        let slot = self.active.iter().position(|c| c.pointer == pointer);
        if slot.is_none() {
            self.anomaly(GestureAnomaly::UnknownPointer { pointer, phase });
        }
        slot
    }

    fn set_kind(&mut self, kind: GestureState) {
        if let Some(ctx) = self.context.as_mut() {
            tracing::trace!(from = ?ctx.kind, to = ?kind, "gesture transition");
            ctx.kind = kind;
        }
    }

    /// Records the event time, clamping it if the source went backwards.
    fn observe(&mut self, timestamp_ms: u64) -> u64 {
        match self.last_ms {
            Some(last) if timestamp_ms < last => {
                self.anomaly(GestureAnomaly::TimeWentBackwards {
                    last_ms: last,
                    now_ms: timestamp_ms,
                });
                last
            }
            _ => {
                self.last_ms = Some(timestamp_ms);
                timestamp_ms
            }
        }
    }

    fn anomaly(&mut self, anomaly: GestureAnomaly) {
        self.anomalies += 1;
        tracing::debug!(%anomaly, count = self.anomalies, "ignoring pointer anomaly");
    }
}
