// ── Autosync evaluator ──
//
// Decides whether a pass after the first may mutate remote state. Only the
// `update` mode looks at history: the pass is live when a commit since the
// previously observed head touched the managed directory.

use std::fmt::Debug;
use std::path::Path;

use strum::Display;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::AutoSyncMode;

/// Whether a pass may mutate remote state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PassMode {
    Live,
    DryRun,
}

impl PassMode {
    pub fn is_dry_run(self) -> bool {
        self == Self::DryRun
    }
}

/// Read access to a repository's commit graph.
pub trait CommitHistory {
    type Id: Clone + Eq + Debug;

    /// Commits reachable from `head`, newest first.
    fn commits_from(
        &self,
        head: &Self::Id,
    ) -> Result<Box<dyn Iterator<Item = Result<Self::Id, CoreError>> + '_>, CoreError>;

    /// Whether `ancestor` is reachable from `commit` (a commit is not its own descendant).
    fn is_descendant(&self, commit: &Self::Id, ancestor: &Self::Id) -> Result<bool, CoreError>;

    /// Whether `commit` changed any file under `path` relative to its first parent.
    fn touches_path(&self, commit: &Self::Id, path: &Path) -> Result<bool, CoreError>;
}

/// Decide the mode of a scheduled pass.
pub fn evaluate<H: CommitHistory>(
    mode: AutoSyncMode,
    history: &H,
    previous: &H::Id,
    current: &H::Id,
    path: &Path,
) -> PassMode {
    match mode {
        AutoSyncMode::Manual => PassMode::DryRun,
        AutoSyncMode::Enforce => PassMode::Live,
        AutoSyncMode::Update => match path_changed(history, previous, current, path) {
            Ok(true) => PassMode::Live,
            Ok(false) => PassMode::DryRun,
            Err(e) => {
                warn!(error = %e, "failed to inspect history; running dry");
                PassMode::DryRun
            }
        },
    }
}

fn path_changed<H: CommitHistory>(
    history: &H,
    previous: &H::Id,
    current: &H::Id,
    path: &Path,
) -> Result<bool, CoreError> {
    for commit in history.commits_from(current)? {
        let commit = commit?;
        if &commit == previous {
            break;
        }
        if !history.is_descendant(&commit, previous)? {
            debug!(?commit, "history diverged from previous head");
            break;
        }
        if history.touches_path(&commit, path)? {
            debug!(?commit, path = %path.display(), "managed path changed");
            return Ok(true);
        }
    }
    Ok(false)
}
