// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use canopy_gesture::{GestureOutput, GestureRecognizer, PointerEvent};
use canopy_layout::LayoutCache;
use canopy_lod::{VisibleSet, select_visible};
use canopy_reconcile::{ConflictRecord, ReconcileError, Reconciliation, reconcile};
use canopy_timing::{Clock, Coalescer};
use canopy_tree::{Direction, NodeId, NodeRecord, StructuralError, Tree};
use canopy_view2d::{Camera, CameraState};
use kurbo::{Point, Size};

use crate::config::EngineConfig;
use crate::engine::SessionHandle;
use crate::error::EngineError;
use crate::scene::{Scene, SceneReader};
use crate::worker::{Job, Outcome, Worker};

/// Something the host should react to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EngineEvent {
    /// A tap landed on `node`.
    Selected {
        /// The tapped node.
        node: NodeId,
    },
    /// A long press landed on `node`.
    LongPressed {
        /// The pressed node.
        node: NodeId,
    },
    /// The camera moved. Coalesced: at most one per configured window.
    CameraChanged(CameraState),
}

/// One displayed tree with its camera, gestures and derived scene.
///
/// The session owns the tree. Edits go through copy-on-write, so a rebuild
/// running on a background thread keeps reading the revision it was given.
/// Every structural edit schedules a scene rebuild: inline for small trees,
/// on a worker thread for large ones. Until a rebuild lands, queries use the
/// last good scene.
///
/// Pointer timestamps and the session clock must share a timeline.
pub struct Session {
    handle: SessionHandle,
    config: EngineConfig,
    clock: Arc<dyn Clock + Send + Sync>,
    tree: Arc<Tree>,
    focus: NodeId,
    camera: Camera,
    gestures: GestureRecognizer,
    camera_events: Coalescer<CameraState>,
    events: Vec<EngineEvent>,
    cache: LayoutCache,
    scene: SceneReader,
    // Newest requested scene generation.
    latest: Arc<AtomicU64>,
    // Generation of the newest rebuild that failed, if it has not been superseded.
    failed: Option<u64>,
    worker: Option<Worker>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("handle", &self.handle)
            .field("nodes", &self.tree.len())
            .field("revision", &self.tree.revision())
            .field("focus", &self.focus)
            .field("scene_generation", &self.scene.load().generation())
            .field("background", &self.worker.is_some())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub(crate) fn new(
        handle: SessionHandle,
        records: impl IntoIterator<Item = NodeRecord>,
        focus: NodeId,
        config: EngineConfig,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Result<Self, EngineError> {
        let tree = checked_tree(records, focus)?;
        let mut cache = LayoutCache::new(config.layout);
        let scene = Scene::build(0, &tree, focus, &mut cache, &config.index)?;
        tracing::info!(
            session = %handle,
            nodes = tree.len(),
            revision = tree.revision(),
            "session loaded"
        );
        Ok(Self {
            handle,
            camera: Camera::with_config(Size::ZERO, &config.camera),
            gestures: GestureRecognizer::new(config.gesture),
            camera_events: Coalescer::new(config.coalesce_window_ms),
            events: Vec::new(),
            cache,
            scene: SceneReader::new(scene),
            latest: Arc::new(AtomicU64::new(0)),
            failed: None,
            worker: None,
            tree: Arc::new(tree),
            focus,
            config,
            clock,
        })
    }

    /// This session's handle.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        self.handle
    }

    /// The configuration the session was created with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The current tree. Cloning the `Arc` gives a stable snapshot.
    #[must_use]
    pub fn tree(&self) -> &Arc<Tree> {
        &self.tree
    }

    /// The node at the center of the layout.
    #[must_use]
    pub fn focus(&self) -> NodeId {
        self.focus
    }

    /// The camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The gesture recognizer, for inspecting state and anomaly counts.
    #[must_use]
    pub fn gestures(&self) -> &GestureRecognizer {
        &self.gestures
    }

    /// The scene queries currently run against.
    #[must_use]
    pub fn scene(&self) -> Arc<Scene> {
        self.scene.load()
    }

    /// A handle for reading scenes from another thread.
    #[must_use]
    pub fn scene_reader(&self) -> SceneReader {
        self.scene.clone()
    }

    /// Returns `true` if the installed scene matches the current tree shape and focus.
    #[must_use]
    pub fn is_scene_current(&self) -> bool {
        self.scene.load().is_current_for(&self.tree, self.focus)
    }

    /// Returns `true` if rebuilds run on a background thread.
    #[must_use]
    pub fn is_background(&self) -> bool {
        self.worker.is_some()
    }

    /// Replaces the whole tree. On error nothing changes.
    pub fn reload(
        &mut self,
        records: impl IntoIterator<Item = NodeRecord>,
        focus: NodeId,
    ) -> Result<(), EngineError> {
        let tree = checked_tree(records, focus)?;
        tracing::info!(
            session = %self.handle,
            nodes = tree.len(),
            revision = tree.revision(),
            "session reloaded"
        );
        self.tree = Arc::new(tree);
        self.focus = focus;
        self.gestures.reset();
        self.schedule_rebuild();
        Ok(())
    }

    // ── Edits ───────────────────────────────────────────────────────────

    /// Appends a child. See [`Tree::add_child`].
    pub fn add_child(
        &mut self,
        parent: NodeId,
        id: NodeId,
        label: impl Into<String>,
    ) -> Result<(), EngineError> {
        self.edit(|tree| tree.add_child(parent, id, label))
    }

    /// Appends a child in a compass slot. See [`Tree::add_child_in_slot`].
    pub fn add_child_in_slot(
        &mut self,
        parent: NodeId,
        id: NodeId,
        label: impl Into<String>,
        slot: Direction,
    ) -> Result<(), EngineError> {
        self.edit(|tree| tree.add_child_in_slot(parent, id, label, slot))
    }

    /// Re-parents a subtree. See [`Tree::move_node`].
    pub fn move_node(
        &mut self,
        id: NodeId,
        new_parent: NodeId,
        slot: Option<Direction>,
    ) -> Result<(), EngineError> {
        self.edit(|tree| tree.move_node(id, new_parent, slot))
    }

    /// Changes a node's compass slot. See [`Tree::set_slot`].
    pub fn set_slot(&mut self, id: NodeId, slot: Option<Direction>) -> Result<(), EngineError> {
        self.edit(|tree| tree.set_slot(id, slot))
    }

    /// Removes a subtree. If it held the focus, the focus returns to the root.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<Vec<NodeId>, EngineError> {
        self.edit(|tree| tree.remove_subtree(id))
    }

    /// Relabels a node. Never triggers a rebuild.
    pub fn set_label(&mut self, id: NodeId, label: impl Into<String>) -> Result<(), EngineError> {
        self.edit(|tree| tree.set_label(id, label))
    }

    /// Re-centers the layout on `id`.
    pub fn set_focus(&mut self, id: NodeId) -> Result<(), EngineError> {
        if !self.tree.contains(id) {
            return Err(StructuralError::UnknownNode(id).into());
        }
        if self.focus != id {
            self.focus = id;
            self.schedule_rebuild();
        }
        Ok(())
    }

    /// Merges `incoming` into the current tree against their common ancestor
    /// `base` and installs the result. Returns the conflicts.
    pub fn reconcile(&mut self, base: &Tree, incoming: &Tree) -> Result<Vec<ConflictRecord>, EngineError> {
        let result = reconcile(base, &self.tree, incoming)?;
        self.apply_reconciled(result)
    }

    /// Installs a merged tree as the next revision. Returns its conflicts.
    pub fn apply_reconciled(&mut self, result: Reconciliation) -> Result<Vec<ConflictRecord>, EngineError> {
        let Reconciliation { merged, conflicts } = result;
        if merged.root() != self.tree.root() {
            return Err(ReconcileError::RootMismatch {
                base: self.tree.root(),
                local: self.tree.root(),
                incoming: merged.root(),
            }
            .into());
        }
        tracing::info!(
            session = %self.handle,
            nodes = merged.len(),
            revision = merged.revision(),
            conflicts = conflicts.len(),
            "applied reconciled tree"
        );
        self.tree = Arc::new(merged);
        if !self.tree.contains(self.focus) {
            self.focus = self.tree.root();
        }
        self.schedule_rebuild();
        Ok(conflicts)
    }

    // ── Input and camera ────────────────────────────────────────────────

    /// Feeds one pointer event through gesture recognition.
    ///
    /// Pans and zooms move the camera immediately; taps and long presses are
    /// resolved against the current scene and queued as events.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.pump();
        if let Some(output) = self.gestures.handle(event) {
            self.apply(output);
        }
    }

    /// Lets time pass: fires pending long presses, flushes coalesced camera
    /// notifications and collects finished background rebuilds.
    pub fn tick(&mut self) {
        self.pump();
        let now = self.clock.now_ms();
        if let Some(output) = self.gestures.tick(now) {
            self.apply(output);
        }
        if let Some(state) = self.camera_events.poll(now) {
            self.events.push(EngineEvent::CameraChanged(state));
        }
    }

    /// Earliest clock time at which [`Session::tick`] has something to deliver.
    #[must_use]
    pub fn next_deadline_ms(&self) -> Option<u64> {
        match (
            self.gestures.next_deadline_ms(),
            self.camera_events.next_deadline_ms(),
        ) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Takes every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        core::mem::take(&mut self.events)
    }

    /// Resizes the viewport, keeping its center on the same world point.
    pub fn set_viewport(&mut self, size: Size) {
        self.camera.set_viewport_size(size);
        self.camera_moved();
    }

    /// Zooms and pans so the whole layout fits with `padding` pixels to spare.
    pub fn fit_to_view(&mut self, padding: f64) {
        let scene = self.scene.load();
        self.camera.fit_rect(scene.layout().bounds(), padding);
        self.camera_moved();
    }

    /// Nodes to draw this frame and their detail levels.
    pub fn visible_nodes(&mut self) -> VisibleSet {
        self.pump();
        let scene = self.scene.load();
        select_visible(&self.camera, scene.index(), scene.layout(), &self.config.lod)
    }

    /// Projects a world point to screen pixels.
    #[must_use]
    pub fn world_to_screen(&self, pt: Point) -> Point {
        self.camera.world_to_screen(pt)
    }

    /// Node under a screen point, within the tap hit radius.
    #[must_use]
    pub fn node_at(&self, screen_pt: Point) -> Option<NodeId> {
        let scene = self.scene.load();
        scene
            .index()
            .nearest(&self.camera, screen_pt, self.config.tap_hit_radius_px)
            .filter(|id| self.tree.contains(*id))
    }

    // ── Rebuilds ────────────────────────────────────────────────────────

    /// Blocks until the newest requested scene is installed.
    ///
    /// Returns `false` on timeout or if that rebuild failed.
    pub fn wait_for_rebuild(&mut self, timeout: Duration) -> bool {
        let target = self.latest.load(Ordering::Acquire);
        let deadline = Instant::now() + timeout;
        loop {
            self.pump();
            if self.scene.load().generation() >= target {
                return true;
            }
            if self.failed.is_some_and(|g| g >= target) {
                return false;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            let received = self
                .worker
                .as_ref()
                .map(|worker| worker.outcomes().recv_timeout(remaining));
            match received {
                Some(Ok(outcome)) => self.record(outcome),
                Some(Err(_)) | None => return false,
            }
        }
    }

    fn edit<T, E>(&mut self, f: impl FnOnce(&mut Tree) -> Result<T, E>) -> Result<T, EngineError>
    where
        EngineError: From<E>,
    {
        let topology = self.tree.topology_revision();
        let value = f(Arc::make_mut(&mut self.tree))?;
        if !self.tree.contains(self.focus) {
            tracing::debug!(session = %self.handle, focus = %self.focus, "focus removed; refocusing on root");
            self.focus = self.tree.root();
        }
        if self.tree.topology_revision() != topology {
            self.schedule_rebuild();
        }
        Ok(value)
    }

    fn schedule_rebuild(&mut self) {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        if self.tree.len() < self.config.background_threshold {
            self.rebuild_inline(generation);
            return;
        }
        if self.worker.is_none() {
            match Worker::spawn(
                self.handle.get(),
                self.config.layout,
                self.config.index,
                Arc::clone(&self.latest),
                self.scene.clone(),
            ) {
                Ok(worker) => self.worker = Some(worker),
                Err(error) => {
                    tracing::warn!(session = %self.handle, %error, "cannot start rebuild worker; rebuilding inline");
                    self.rebuild_inline(generation);
                    return;
                }
            }
        }
        let job = Job {
            generation,
            tree: Arc::clone(&self.tree),
            focus: self.focus,
        };
        if self.worker.as_ref().is_some_and(|worker| worker.submit(job)) {
            tracing::debug!(
                session = %self.handle,
                generation,
                nodes = self.tree.len(),
                revision = self.tree.revision(),
                "rebuild scheduled"
            );
        } else {
            tracing::warn!(session = %self.handle, generation, "rebuild worker gone; rebuilding inline");
            self.worker = None;
            self.rebuild_inline(generation);
        }
    }

    fn rebuild_inline(&mut self, generation: u64) {
        match Scene::build(
            generation,
            &self.tree,
            self.focus,
            &mut self.cache,
            &self.config.index,
        ) {
            Ok(scene) => {
                let nodes = scene.layout().len();
                if self.scene.install(scene) {
                    self.failed = None;
                }
                tracing::debug!(session = %self.handle, generation, nodes, "rebuilt inline");
            }
            Err(error) => {
                tracing::warn!(session = %self.handle, generation, %error, "rebuild failed; keeping last scene");
                self.failed = Some(generation);
            }
        }
    }

    /// Collects finished background rebuilds without blocking.
    fn pump(&mut self) {
        while let Some(outcome) = self
            .worker
            .as_ref()
            .and_then(|worker| worker.outcomes().try_recv().ok())
        {
            self.record(outcome);
        }
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Installed { generation } => {
                if self.failed.is_some_and(|g| g < generation) {
                    self.failed = None;
                }
            }
            Outcome::Failed { generation } => self.failed = Some(generation),
            Outcome::Stale { generation } => {
                tracing::trace!(session = %self.handle, generation, "stale rebuild dropped");
            }
        }
    }

    fn apply(&mut self, output: GestureOutput) {
        match output {
            GestureOutput::Tap { position } => {
                if let Some(node) = self.node_at(position) {
                    tracing::debug!(session = %self.handle, %node, "selected");
                    self.events.push(EngineEvent::Selected { node });
                }
            }
            GestureOutput::LongPress { position } => {
                if let Some(node) = self.node_at(position) {
                    tracing::debug!(session = %self.handle, %node, "long pressed");
                    self.events.push(EngineEvent::LongPressed { node });
                }
            }
            GestureOutput::Pan { delta } => {
                self.camera.pan(delta);
                self.camera_moved();
            }
            GestureOutput::Zoom { factor, anchor } => {
                if self.camera.zoom(factor, anchor) {
                    self.camera_moved();
                }
            }
            GestureOutput::Cancelled => {}
        }
    }

    fn camera_moved(&mut self) {
        let now = self.clock.now_ms();
        if let Some(state) = self.camera_events.push(self.camera.state(), now) {
            self.events.push(EngineEvent::CameraChanged(state));
        }
    }
}

fn checked_tree(
    records: impl IntoIterator<Item = NodeRecord>,
    focus: NodeId,
) -> Result<Tree, EngineError> {
    let tree = Tree::from_records(records)?;
    if !tree.contains(focus) {
        return Err(StructuralError::UnknownNode(focus).into());
    }
    Ok(tree)
}
