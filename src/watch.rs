//! File watcher: runs `check` on startup, then re-runs on document changes.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::OutputFormat;
use crate::commands::{self, Refresh};
use crate::config::Config;
use crate::diagnostics::{self, FindingStore};
use crate::error::Error;

/// Debounce delay between filesystem events and re-check.
const DEBOUNCE_MS: u64 = 100;

/// Create a filesystem watcher that sends events on the given channel.
///
/// # Errors
///
/// Returns `Error::WatcherFailed` if the watcher cannot be created.
fn create_watcher(tx: crossbeam_channel::Sender<()>) -> Result<notify::RecommendedWatcher, Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_)
                    | notify::EventKind::Modify(_)
                    | notify::EventKind::Remove(_)
            )
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return Error::WatcherFailed {
            reason: e.to_string(),
        };
    });
}

/// Print what changed since the previous scan: fresh findings for documents
/// that still have some, a line for documents that are now clean.
///
/// # Errors
///
/// Returns `Error::JsonSer` if JSON rendering fails.
fn report_changes(
    store: &FindingStore,
    refresh: &Refresh,
    root: &Path,
    format: OutputFormat,
) -> Result<(), Error> {
    if refresh.changed.is_empty() {
        eprintln!("watch: no changes in findings");
        return Ok(());
    }

    let changed = refresh.changed.iter().map(|id| return (id, store.findings(id)));
    match format {
        OutputFormat::Json => println!("{}", diagnostics::render_findings_json(changed, root)?),
        OutputFormat::Text => {
            for id in &refresh.changed {
                if store.findings(id).is_empty() {
                    eprintln!("watch: {} is clean", diagnostics::display_path(id, root));
                }
            }
            print!("{}", diagnostics::render_findings_text(changed, root));
        },
    }
    return Ok(());
}

/// Entry point for the watch command.
///
/// Runs an initial check, then watches `paths` recursively and rescans on
/// every change. Each rescan replaces every document's findings.
///
/// # Errors
///
/// Returns errors from config loading, the initial scan, or watcher setup.
pub fn run(paths: &[PathBuf], format: OutputFormat) -> Result<ExitCode, Error> {
    let root = std::env::current_dir()?;
    let config = Config::load(&root)?;
    let mut store = FindingStore::default();

    eprintln!("watch: initial check");
    let initial = commands::refresh(&root, paths, &config, &mut store)?;
    commands::print_findings(&store, &root, format)?;
    eprintln!(
        "watch: {} broken references in {} documents",
        store.total(),
        initial.documents
    );

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx)?;

    let mut watched = 0_usize;
    for path in paths {
        let target = root.join(path);
        match watcher.watch(&target, RecursiveMode::Recursive) {
            Ok(()) => watched = watched.saturating_add(1),
            Err(e) => tracing::warn!(path = %target.display(), error = %e, "cannot watch path"),
        }
    }
    eprintln!("watch: monitoring {watched} paths, press Ctrl+C to stop");

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        eprintln!("watch: change detected, re-checking...");
        match commands::refresh(&root, paths, &config, &mut store) {
            Ok(refresh) => report_changes(&store, &refresh, &root, format)?,
            Err(e) => diagnostics::print_error(&e),
        }
    }

    if store.total() > 0 {
        return Ok(ExitCode::from(2));
    }
    return Ok(ExitCode::SUCCESS);
}
