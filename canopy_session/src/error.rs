// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_layout::LayoutError;
use canopy_reconcile::ReconcileError;
use canopy_tree::{SlotConflictError, StructuralError, TreeError};

use crate::engine::SessionHandle;

/// Errors returned by [`Engine`](crate::Engine) and [`Session`](crate::Session) calls.
///
/// A call that fails leaves the session exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The handle does not name a live session.
    #[error("unknown session {0}")]
    UnknownSession(SessionHandle),
    /// Ingested records or a requested edit break the tree invariants.
    #[error(transparent)]
    Structural(#[from] StructuralError),
    /// A compass slot is already taken.
    #[error(transparent)]
    SlotConflict(#[from] SlotConflictError),
    /// The tree could not be laid out.
    #[error(transparent)]
    Layout(#[from] LayoutError),
    /// Snapshots could not be reconciled.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    /// Reading or writing a config file failed.
    #[error("config i/o: {0}")]
    Io(#[from] std::io::Error),
    /// A config document did not parse.
    #[error("config parse: {0}")]
    ConfigParse(#[from] toml::de::Error),
    /// A config could not be rendered as TOML.
    #[error("config write: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

impl From<TreeError> for EngineError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::Structural(err) => Self::Structural(err),
            TreeError::SlotConflict(err) => Self::SlotConflict(err),
        }
    }
}
