// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Background scene rebuilds.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;

use canopy_index::IndexConfig;
use canopy_layout::{LayoutCache, LayoutConfig};
use canopy_tree::{NodeId, Tree};
use crossbeam_channel::{Receiver, Sender};

use crate::scene::{Scene, SceneReader};

/// One rebuild request.
#[derive(Debug)]
pub(crate) struct Job {
    pub(crate) generation: u64,
    pub(crate) tree: Arc<Tree>,
    pub(crate) focus: NodeId,
}

/// What happened to a job.
#[derive(Debug)]
pub(crate) enum Outcome {
    /// The scene for `generation` was installed.
    Installed { generation: u64 },
    /// A newer request superseded the job before or after it ran.
    Stale { generation: u64 },
    /// Layout failed; the previous scene stays.
    Failed { generation: u64 },
}

/// A thread that turns [`Job`]s into [`Scene`]s and installs them.
///
/// Jobs carry the generation they were requested at. The worker skips any
/// job older than the newest requested generation, and the reader refuses
/// to install a scene older than the one it holds, so results can never go
/// backwards.
#[derive(Debug)]
pub(crate) struct Worker {
    jobs: Option<Sender<Job>>,
    outcomes: Receiver<Outcome>,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    pub(crate) fn spawn(
        session: u64,
        layout: LayoutConfig,
        index: IndexConfig,
        latest: Arc<AtomicU64>,
        reader: SceneReader,
    ) -> std::io::Result<Self> {
        let (jobs, job_rx) = crossbeam_channel::unbounded::<Job>();
        let (outcome_tx, outcomes) = crossbeam_channel::unbounded();
        let thread = std::thread::Builder::new()
            .name(format!("canopy-rebuild-{session}"))
            .spawn(move || {
                run(session, &job_rx, &outcome_tx, layout, &index, &latest, &reader);
            })?;
        Ok(Self {
            jobs: Some(jobs),
            outcomes,
            thread: Some(thread),
        })
    }

    /// Queues a job. Returns `false` if the thread has gone away.
    pub(crate) fn submit(&self, job: Job) -> bool {
        self.jobs.as_ref().is_some_and(|jobs| jobs.send(job).is_ok())
    }

    pub(crate) fn outcomes(&self) -> &Receiver<Outcome> {
        &self.outcomes
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Closing the queue ends the loop.
        self.jobs = None;
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::warn!("rebuild worker panicked");
        }
    }
}

fn run(
    session: u64,
    jobs: &Receiver<Job>,
    outcomes: &Sender<Outcome>,
    layout: LayoutConfig,
    index: &IndexConfig,
    latest: &AtomicU64,
    reader: &SceneReader,
) {
    let mut cache = LayoutCache::new(layout);
    while let Ok(mut job) = jobs.recv() {
        // Only the newest queued job matters.
        while let Ok(newer) = jobs.try_recv() {
            let skipped = std::mem::replace(&mut job, newer);
            let _ = outcomes.send(Outcome::Stale {
                generation: skipped.generation,
            });
        }
        let generation = job.generation;
        if generation < latest.load(Ordering::Acquire) {
            tracing::debug!(session, generation, "dropping stale rebuild");
            let _ = outcomes.send(Outcome::Stale { generation });
            continue;
        }
        let outcome = match Scene::build(generation, &job.tree, job.focus, &mut cache, index) {
            Ok(scene) => {
                let nodes = scene.layout().len();
                if reader.install(scene) {
                    tracing::debug!(session, generation, nodes, "background rebuild installed");
                    Outcome::Installed { generation }
                } else {
                    tracing::debug!(session, generation, "discarding superseded rebuild");
                    Outcome::Stale { generation }
                }
            }
            Err(error) => {
                tracing::warn!(session, generation, %error, "background rebuild failed; keeping last scene");
                Outcome::Failed { generation }
            }
        };
        if outcomes.send(outcome).is_err() {
            break;
        }
    }
}
