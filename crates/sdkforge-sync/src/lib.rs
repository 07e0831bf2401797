//! Converges a destination directory onto a source directory using a
//! content-hash three-way diff: files are added, updated when their
//! SHA-256 digests differ, and deleted when the source no longer has
//! them. Used to promote a generator's scratch tree into the stable
//! output tree so incremental rebuilds only touch changed files.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::info;
use sha2::{Digest, Sha256};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("sync I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("path {0} escaped its sync root")]
    OutsideRoot(PathBuf),
}

/// One applied reconciliation step, carrying the path relative to the
/// sync roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    Added(PathBuf),
    Modified(PathBuf),
    Deleted(PathBuf),
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Added(path) => write!(f, "added {}", path.display()),
            SyncAction::Modified(path) => write!(f, "updated {}", path.display()),
            SyncAction::Deleted(path) => write!(f, "removed {}", path.display()),
        }
    }
}

/// Outcome of one `synchronize` call.
#[derive(Debug)]
pub struct SyncReport {
    pub actions: Vec<SyncAction>,
    pub elapsed: Duration,
}

impl SyncReport {
    pub fn changed(&self) -> bool {
        !self.actions.is_empty()
    }
}

/// Make `dest`'s file set and contents byte-identical to `source`'s.
///
/// Additions and modifications are decided from a single snapshot pair
/// and applied before any deletion, so a rename shows up as an
/// independent add plus delete. Not transactional: an interrupted run
/// leaves a partially converged tree that the next run finishes, because
/// hashing the already-copied files yields no further actions.
pub fn synchronize(source: &Path, dest: &Path) -> Result<SyncReport, SyncError> {
    let start = Instant::now();
    let source_files = snapshot(source)?;
    let dest_files = snapshot(dest)?;

    let mut actions = Vec::new();

    for rel in &source_files {
        let from = source.join(rel);
        let to = dest.join(rel);
        if !dest_files.contains(rel) {
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&from, &to)?;
            apply_log(&mut actions, SyncAction::Added(rel.clone()));
        } else if digest(&from)? != digest(&to)? {
            fs::copy(&from, &to)?;
            apply_log(&mut actions, SyncAction::Modified(rel.clone()));
        }
    }

    for rel in dest_files.difference(&source_files) {
        let target = dest.join(rel);
        fs::remove_file(&target)?;
        // A deletion that empties its immediate parent removes that
        // directory as well, one level only and never the root.
        if let Some(parent) = target.parent() {
            if parent != dest && fs::read_dir(parent)?.next().is_none() {
                fs::remove_dir(parent)?;
            }
        }
        apply_log(&mut actions, SyncAction::Deleted(rel.clone()));
    }

    let report = SyncReport {
        actions,
        elapsed: start.elapsed(),
    };
    info!(
        "sync finished in {:.1?}: {}",
        report.elapsed,
        if report.changed() {
            format!("{} change(s)", report.actions.len())
        } else {
            "no changes".to_string()
        }
    );
    Ok(report)
}

fn apply_log(actions: &mut Vec<SyncAction>, action: SyncAction) {
    info!("{action}");
    actions.push(action);
}

/// Relative paths of every file (not directory) under `root`. A missing
/// root is an empty snapshot; the first sync into a fresh destination
/// creates it file by file.
fn snapshot(root: &Path) -> Result<BTreeSet<PathBuf>, SyncError> {
    let mut files = BTreeSet::new();
    if !root.exists() {
        return Ok(files);
    }
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| SyncError::OutsideRoot(entry.path().to_path_buf()))?;
        files.insert(rel.to_path_buf());
    }
    Ok(files)
}

fn digest(path: &Path) -> Result<[u8; 32], SyncError> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize().into())
}
