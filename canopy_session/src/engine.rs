// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;
use std::sync::Arc;

use canopy_gesture::PointerEvent;
use canopy_lod::VisibleSet;
use canopy_reconcile::{ConflictRecord, Reconciliation};
use canopy_timing::{Clock, SystemClock};
use canopy_tree::{NodeId, NodeRecord};
use hashbrown::HashMap;
use kurbo::{Point, Size};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::session::{EngineEvent, Session};

/// Names one session of an [`Engine`]. Never reused within an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionHandle(u64);

impl SessionHandle {
    /// The raw handle value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Registry of live sessions.
///
/// Every call names its session by [`SessionHandle`]; there is no global
/// state, and engines are independent of each other.
pub struct Engine {
    config: EngineConfig,
    clock: Arc<dyn Clock + Send + Sync>,
    sessions: HashMap<SessionHandle, Session>,
    next: u64,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    /// Creates an engine reading wall-clock time.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock::new()))
    }

    /// Creates an engine reading time from `clock`.
    #[must_use]
    pub fn with_clock(config: EngineConfig, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            config,
            clock,
            sessions: HashMap::new(),
            next: 1,
        }
    }

    /// Configuration given to new sessions.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no session is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Validates `records`, lays them out around `focus` and opens a session.
    pub fn load_tree(
        &mut self,
        records: impl IntoIterator<Item = NodeRecord>,
        focus: NodeId,
    ) -> Result<SessionHandle, EngineError> {
        let handle = SessionHandle(self.next);
        let session = Session::new(
            handle,
            records,
            focus,
            self.config.clone(),
            Arc::clone(&self.clock),
        )?;
        self.next += 1;
        self.sessions.insert(handle, session);
        Ok(handle)
    }

    /// Replaces a session's tree. On error the session is untouched.
    pub fn reload_tree(
        &mut self,
        handle: SessionHandle,
        records: impl IntoIterator<Item = NodeRecord>,
        focus: NodeId,
    ) -> Result<(), EngineError> {
        self.session_mut(handle)?.reload(records, focus)
    }

    /// Closes a session, stopping its rebuild worker. Returns `false` if it was not live.
    pub fn close(&mut self, handle: SessionHandle) -> bool {
        let closed = self.sessions.remove(&handle).is_some();
        if closed {
            tracing::info!(session = %handle, "session closed");
        }
        closed
    }

    /// The session behind `handle`.
    pub fn session(&self, handle: SessionHandle) -> Result<&Session, EngineError> {
        self.sessions
            .get(&handle)
            .ok_or(EngineError::UnknownSession(handle))
    }

    /// The session behind `handle`, for edits.
    pub fn session_mut(&mut self, handle: SessionHandle) -> Result<&mut Session, EngineError> {
        self.sessions
            .get_mut(&handle)
            .ok_or(EngineError::UnknownSession(handle))
    }

    /// See [`Session::handle_pointer`].
    pub fn handle_pointer(&mut self, handle: SessionHandle, event: PointerEvent) -> Result<(), EngineError> {
        self.session_mut(handle)?.handle_pointer(event);
        Ok(())
    }

    /// See [`Session::tick`]. Ticks every session.
    pub fn tick(&mut self) {
        for session in self.sessions.values_mut() {
            session.tick();
        }
    }

    /// See [`Session::drain_events`].
    pub fn drain_events(&mut self, handle: SessionHandle) -> Result<Vec<EngineEvent>, EngineError> {
        Ok(self.session_mut(handle)?.drain_events())
    }

    /// See [`Session::set_viewport`].
    pub fn set_viewport(&mut self, handle: SessionHandle, size: Size) -> Result<(), EngineError> {
        self.session_mut(handle)?.set_viewport(size);
        Ok(())
    }

    /// See [`Session::visible_nodes`].
    pub fn visible_nodes(&mut self, handle: SessionHandle) -> Result<VisibleSet, EngineError> {
        Ok(self.session_mut(handle)?.visible_nodes())
    }

    /// See [`Session::world_to_screen`].
    pub fn world_to_screen(&self, handle: SessionHandle, pt: Point) -> Result<Point, EngineError> {
        Ok(self.session(handle)?.world_to_screen(pt))
    }

    /// See [`Session::apply_reconciled`].
    pub fn apply_reconciled(
        &mut self,
        handle: SessionHandle,
        result: Reconciliation,
    ) -> Result<Vec<ConflictRecord>, EngineError> {
        self.session_mut(handle)?.apply_reconciled(result)
    }
}
