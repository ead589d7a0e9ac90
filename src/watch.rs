//! File system watcher for live regeneration.
//!
//! Monitors the content and template roots and re-runs the full generation
//! pipeline when a relevant change settles.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       Event Loop                           │
//! │                                                            │
//! │  ┌──────────┐   ┌────────────┐   ┌──────────┐   ┌────────┐ │
//! │  │ notify   │──▶│ ChangeKind │──▶│ Debouncer│──▶│generate│ │
//! │  │ events   │   │  (per-OS)  │   │ (300ms)  │   │ (full) │ │
//! │  └──────────┘   └────────────┘   └──────────┘   └────────┘ │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Which operations trigger a run depends on the platform: on Windows a
//! save surfaces as create events, elsewhere as writes. Removals trigger
//! everywhere.

use crate::{build::generate_site, config::SiteConfig, log};
use anyhow::{Context, Result};
use notify::{
    Event, EventKind, RecursiveMode, Watcher,
    event::{ModifyKind, RenameMode},
};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    sync::{Arc, mpsc},
    time::{Duration, Instant},
};

// =============================================================================
// Constants
// =============================================================================

const DEBOUNCE_MS: u64 = 300;

// =============================================================================
// Event Classification
// =============================================================================

/// Operation behind a file system event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Write,
    Remove,
    Other,
}

impl ChangeKind {
    pub const fn classify(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => Self::Create,
            EventKind::Remove(_) => Self::Remove,
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => Self::Remove,
            EventKind::Modify(ModifyKind::Name(_) | ModifyKind::Metadata(_)) => Self::Other,
            EventKind::Modify(_) => Self::Write,
            _ => Self::Other,
        }
    }
}

/// Whether `kind` should trigger a run on the current platform.
pub const fn should_regenerate(kind: ChangeKind) -> bool {
    regenerates_on(cfg!(windows), kind)
}

const fn regenerates_on(windows: bool, kind: ChangeKind) -> bool {
    match kind {
        ChangeKind::Remove => true,
        ChangeKind::Create => windows,
        ChangeKind::Write => !windows,
        ChangeKind::Other => false,
    }
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

// =============================================================================
// Debounce State
// =============================================================================

/// Batches rapid file events until they settle.
struct Debouncer {
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            pending: FxHashSet::default(),
            last_event: None,
        }
    }

    /// Record the relevant paths of `event`; returns whether any were kept.
    fn add(&mut self, event: Event) -> bool {
        let mut added = false;
        for path in event.paths {
            if !is_temp_file(&path) {
                self.pending.insert(path);
                added = true;
            }
        }
        if added {
            self.last_event = Some(Instant::now());
        }
        added
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        let mut paths: Vec<_> = self.pending.drain().collect();
        paths.sort();
        paths
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}

// =============================================================================
// Event Handler
// =============================================================================

/// Regenerate after `paths` changed, logging instead of failing.
fn regenerate(paths: &[PathBuf], config: &Arc<SiteConfig>) {
    let root = &config.site_root;
    let changed: Vec<_> = paths
        .iter()
        .map(|p| p.strip_prefix(root).unwrap_or(p).display().to_string())
        .collect();
    log!("watch"; "{} changed, regenerating...", changed.join(", "));

    match generate_site(config) {
        Ok(files) => log!("watch"; "regenerated {} files", files.len()),
        Err(err) => log!("error"; "generate failed: {:#}", err),
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Watch content and templates, regenerating until the channel closes.
pub fn watch_for_changes_blocking(config: &Arc<SiteConfig>) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;

    for dir in [&config.content, &config.template.path] {
        watcher
            .watch(dir, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;
        log!("watch"; "{}", dir.display());
    }

    let mut debouncer = Debouncer::new();

    loop {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Ok(event)) => {
                if should_regenerate(ChangeKind::classify(&event.kind)) {
                    debouncer.add(event);
                }
            }
            Ok(Err(err)) => log!("error"; "watch: {err}"),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if debouncer.ready() {
                    regenerate(&debouncer.take(), config);
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}
