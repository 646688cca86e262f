// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use canopy_tree::{NodeId, StructuralError};

/// Reconciliation could not produce a tree at all.
///
/// Disagreements between snapshots are never errors; they are reported as
/// [`ConflictRecord`](crate::ConflictRecord)s.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconcileError {
    /// The three snapshots do not share a root, so they are different trees.
    RootMismatch {
        /// Root of the common ancestor.
        base: NodeId,
        /// Root of the local snapshot.
        local: NodeId,
        /// Root of the incoming snapshot.
        incoming: NodeId,
    },
    /// The merged records failed validation.
    Structural(StructuralError),
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootMismatch {
                base,
                local,
                incoming,
            } => write!(
                f,
                "snapshots have different roots (base {base}, local {local}, incoming {incoming})"
            ),
            Self::Structural(err) => write!(f, "merged tree is invalid: {err}"),
        }
    }
}

impl core::error::Error for ReconcileError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Structural(err) => Some(err),
            Self::RootMismatch { .. } => None,
        }
    }
}

impl From<StructuralError> for ReconcileError {
    fn from(err: StructuralError) -> Self {
        Self::Structural(err)
    }
}
