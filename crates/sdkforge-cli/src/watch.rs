//! Continuous development loop: rebuild whenever the spec or a template
//! directory changes. Two states, Idle and Building; at most one build is
//! ever in flight, and change events observed while Building are
//! coalesced away rather than queued.

use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use log::{error, info};
use notify::{EventKind, RecursiveMode, Watcher};

use crate::orchestrator::BuildOrchestrator;

pub fn run(orchestrator: &BuildOrchestrator) -> Result<()> {
    let config = orchestrator.config();
    let mut roots: Vec<PathBuf> = Vec::new();
    if let Some(parent) = config.spec.parent() {
        if !parent.as_os_str().is_empty() {
            roots.push(parent.to_path_buf());
        }
    }
    for generator in &config.generators {
        roots.push(generator.templates.clone());
    }
    roots.extend(config.watch.roots.iter().cloned());
    roots.dedup();

    for root in &roots {
        if !root.exists() {
            bail!("watched source directory {} does not exist", root.display());
        }
    }

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
        if let Ok(event) = res {
            if matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            ) {
                let _ = tx.send(());
            }
        }
    })
    .context("failed to initialize filesystem watcher")?;

    for root in &roots {
        watcher
            .watch(root, RecursiveMode::Recursive)
            .with_context(|| format!("failed to watch {}", root.display()))?;
    }

    // The watcher delivers nothing from before registration, so reaching
    // this point is the readiness gate: the loop starts Idle.
    let debounce = Duration::from_millis(config.watch.debounce_ms);
    info!(
        "watching {} root(s); waiting for changes",
        roots.len()
    );

    loop {
        // Idle: block until something changes.
        if rx.recv().is_err() {
            return Ok(());
        }

        // Batch rapid successive edits: keep draining until the channel
        // stays quiet for a full debounce window.
        while rx.recv_timeout(debounce).is_ok() {}

        // A vanished source directory is unrecoverable for this session.
        for root in &roots {
            if !root.exists() {
                bail!("watched source directory {} vanished", root.display());
            }
        }

        // Building. A failure returns the loop to Idle; the next save
        // retries.
        info!("change detected; rebuilding");
        match orchestrator.build() {
            Ok(()) => info!("build finished; waiting for changes"),
            Err(err) => error!("build failed: {err:#}"),
        }

        // Events that arrived while Building imply at most the rebuild
        // that just ran; drop them rather than queueing another.
        while rx.try_recv().is_ok() {}
    }
}
