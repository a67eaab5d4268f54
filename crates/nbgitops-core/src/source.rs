// ── Git source ──
//
// A private, read-only checkout of one branch in a temporary directory.
// The directory is removed when the checkout is dropped.

use std::path::{Path, PathBuf};

use git2::build::RepoBuilder;
use git2::{Cred, DiffOptions, FetchOptions, Oid, RemoteCallbacks, Repository, ResetType, Sort};
use secrecy::ExposeSecret;
use tempfile::TempDir;
use tracing::{debug, info};

use crate::autosync::CommitHistory;
use crate::config::{GitAuth, RepositoryConfig};
use crate::error::CoreError;

/// Clone of the configuration repository.
pub struct GitCheckout {
    repo: Repository,
    dir: TempDir,
    branch: String,
    relative_path: PathBuf,
    auth: GitAuth,
}

impl std::fmt::Debug for GitCheckout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitCheckout")
            .field("dir", &self.dir.path())
            .field("branch", &self.branch)
            .field("relative_path", &self.relative_path)
            .finish_non_exhaustive()
    }
}

impl GitCheckout {
    /// Clone `config.branch` of `config.url` into a fresh temporary directory.
    pub fn clone_repository(config: &RepositoryConfig) -> Result<Self, CoreError> {
        let dir = tempfile::Builder::new()
            .prefix("nbgitops-")
            .tempdir()
            .map_err(|source| CoreError::Io {
                path: std::env::temp_dir().display().to_string(),
                source,
            })?;

        info!(url = %config.url, branch = %config.branch, dir = %dir.path().display(), "cloning repository");
        let repo = RepoBuilder::new()
            .branch(&config.branch)
            .fetch_options(fetch_options(&config.auth))
            .clone(&config.url, dir.path())?;

        Ok(Self {
            repo,
            dir,
            branch: config.branch.clone(),
            relative_path: config.relative_path.clone(),
            auth: config.auth.clone(),
        })
    }

    /// Fetch the branch and move the checkout to the fetched commit.
    pub fn pull(&self) -> Result<Oid, CoreError> {
        let tracking = format!("refs/remotes/origin/{}", self.branch);
        let refspec = format!("+refs/heads/{}:{tracking}", self.branch);

        let mut remote = self.repo.find_remote("origin")?;
        remote.fetch(&[refspec.as_str()], Some(&mut fetch_options(&self.auth)), None)?;

        let fetched = self.repo.find_reference(&tracking)?.peel_to_commit()?;
        self.repo
            .reset(fetched.as_object(), ResetType::Hard, None)?;
        debug!(head = %fetched.id(), "checkout updated");
        Ok(fetched.id())
    }

    /// Commit currently checked out.
    pub fn head(&self) -> Result<Oid, CoreError> {
        Ok(self.repo.head()?.peel_to_commit()?.id())
    }

    /// Managed directory inside the checkout.
    pub fn config_dir(&self) -> PathBuf {
        self.dir.path().join(&self.relative_path)
    }

    /// Managed directory relative to the repository root.
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }
}

/// Credential callbacks for `auth`. libgit2 re-invokes the callback after a
/// rejection, so each fetch offers credentials exactly once.
fn fetch_options(auth: &GitAuth) -> FetchOptions<'_> {
    let mut options = FetchOptions::new();
    if matches!(auth, GitAuth::None) {
        return options;
    }

    let mut offered = false;
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, username_from_url, _allowed| {
        if offered {
            return Err(git2::Error::from_str("git credentials were rejected"));
        }
        offered = true;
        match auth {
            GitAuth::None => Cred::default(),
            GitAuth::Basic { username, password } => {
                Cred::userpass_plaintext(username, password.expose_secret())
            }
            GitAuth::SshKey {
                private_key,
                passphrase,
            } => Cred::ssh_key(
                username_from_url.unwrap_or("git"),
                None,
                private_key,
                passphrase.as_ref().map(ExposeSecret::expose_secret),
            ),
        }
    });
    options.remote_callbacks(callbacks);
    options
}

impl CommitHistory for GitCheckout {
    type Id = Oid;

    fn commits_from(
        &self,
        head: &Oid,
    ) -> Result<Box<dyn Iterator<Item = Result<Oid, CoreError>> + '_>, CoreError> {
        let mut walk = self.repo.revwalk()?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        walk.push(*head)?;
        Ok(Box::new(walk.map(|oid| oid.map_err(CoreError::from))))
    }

    fn is_descendant(&self, commit: &Oid, ancestor: &Oid) -> Result<bool, CoreError> {
        Ok(self.repo.graph_descendant_of(*commit, *ancestor)?)
    }

    fn touches_path(&self, commit: &Oid, path: &Path) -> Result<bool, CoreError> {
        let commit = self.repo.find_commit(*commit)?;
        let tree = commit.tree()?;
        let parent_tree = match commit.parents().next() {
            Some(parent) => Some(parent.tree()?),
            None => None,
        };

        let mut options = DiffOptions::new();
        if !path.as_os_str().is_empty() && path != Path::new(".") {
            options.pathspec(path);
        }
        let diff =
            self.repo
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut options))?;
        Ok(diff.deltas().next().is_some())
    }
}
