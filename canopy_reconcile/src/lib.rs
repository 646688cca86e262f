// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Reconcile: three-way merge of divergent tree snapshots.
//!
//! When two copies of a map are edited independently (say, on two devices),
//! [`reconcile`] merges them against their common ancestor. Changes made on
//! only one side are applied silently. Nodes changed differently on both
//! sides keep their base version and are reported as [`ConflictRecord`]s so
//! the host can ask the user. Conflicts are data, not errors: the only
//! failure is being handed snapshots of different trees.
//!
//! The merged tree always satisfies every tree invariant. Merges that would
//! leave a node without a parent, or parents in a loop, are repaired and the
//! repair is reported as a conflict too. See [`reconcile`] for the rules.
//!
//! Transport is out of scope: this crate only compares snapshots.
//!
//! ## Example
//!
//! ```rust
//! use canopy_reconcile::{ConflictKind, reconcile};
//! use canopy_tree::{NodeId, Tree};
//!
//! let mut base = Tree::with_root(NodeId(1), "root");
//! base.add_child(NodeId(1), NodeId(2), "idea").unwrap();
//!
//! let mut local = base.clone();
//! local.set_label(NodeId(2), "better idea").unwrap();
//! let mut incoming = base.clone();
//! incoming.set_label(NodeId(2), "other idea").unwrap();
//!
//! let result = reconcile(&base, &local, &incoming).unwrap();
//! assert_eq!(result.conflicts.len(), 1);
//! assert_eq!(result.conflicts[0].kind, ConflictKind::Content);
//! // The base label is kept until someone decides.
//! assert_eq!(result.merged.get(NodeId(2)).unwrap().label(), "idea");
//! ```

mod error;
mod merge;

pub use error::ReconcileError;
pub use merge::{ConflictKind, ConflictRecord, Reconciliation, reconcile};
