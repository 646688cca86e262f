// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Session: the engine that ties the Canopy crates together.
//!
//! An [`Engine`] holds any number of [`Session`]s, each addressed by a
//! [`SessionHandle`]. A session owns one tree and everything derived from it:
//!
//! - the tree itself, edited copy-on-write so snapshots stay consistent;
//! - a [`Scene`] (layout plus hit-test index) rebuilt after every structural
//!   edit and swapped in atomically;
//! - a camera driven by recognized gestures;
//! - an outbox of [`EngineEvent`]s: selections, long presses and coalesced
//!   camera notifications.
//!
//! Small trees rebuild inline. Trees of at least
//! [`EngineConfig::background_threshold`] nodes rebuild on a worker thread;
//! queries keep using the last good scene until the new one lands, and a
//! failed rebuild is logged and leaves that scene in place.
//!
//! Configuration loads from TOML with [`EngineConfig::load_from_path`].
//! Logging goes through `tracing`; install a subscriber to see it.
//!
//! ## Example
//!
//! ```rust
//! use canopy_gesture::{PointerEvent, PointerId};
//! use canopy_session::{Engine, EngineEvent};
//! use canopy_tree::{NodeId, NodeRecord};
//! use kurbo::{Point, Size};
//!
//! let mut engine = Engine::default();
//! let records = [
//!     NodeRecord::new(NodeId(1), None).with_children([NodeId(2)]).with_label("root"),
//!     NodeRecord::new(NodeId(2), Some(NodeId(1))).with_label("child"),
//! ];
//! let map = engine.load_tree(records, NodeId(1)).unwrap();
//! engine.set_viewport(map, Size::new(800.0, 600.0)).unwrap();
//!
//! // Tap the child where it is drawn.
//! let scene = engine.session(map).unwrap().scene();
//! let at = engine
//!     .world_to_screen(map, scene.layout().get(NodeId(2)).unwrap().position)
//!     .unwrap();
//! let finger = PointerId(0);
//! engine.handle_pointer(map, PointerEvent::down(finger, at, 0)).unwrap();
//! engine.handle_pointer(map, PointerEvent::up(finger, at, 50)).unwrap();
//!
//! let events = engine.drain_events(map).unwrap();
//! assert!(events.contains(&EngineEvent::Selected { node: NodeId(2) }));
//! ```

mod config;
mod engine;
mod error;
mod scene;
mod session;
mod worker;

pub use config::EngineConfig;
pub use engine::{Engine, SessionHandle};
pub use error::EngineError;
pub use scene::{Scene, SceneReader};
pub use session::{EngineEvent, Session};
