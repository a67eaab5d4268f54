//! Reconciliation engine between a git repository of YAML and a NetBird
//! management service.
//!
//! - **[`Controller`]**: Clones the repository, runs an initial pass and then
//!   one pass per poll interval until cancelled. [`ControllerConfig::sync_once`]
//!   runs a single live pass instead.
//!
//! - **[`run_pass`]**: One ordered reconciliation pass (groups, users, peers,
//!   memberships, routes, posture checks, policies, DNS, pruning) under a
//!   single dry-run flag. Fail-fast: the first error aborts the pass as
//!   [`CoreError::StageFailed`].
//!
//! - **[`ManagementApi`]**: The seam between reconcilers and the service.
//!   Implemented for [`nbgitops_api::ManagementClient`].
//!
//! - **[`autosync`]**: Whether a scheduled pass may mutate (`manual`,
//!   `update`, `enforce`), driven by commit history through [`CommitHistory`].
//!
//! - **Domain model** ([`model`]): Desired and remote shapes for every
//!   managed resource, with order-insensitive `matches` comparisons.

pub mod autosync;
pub mod config;
pub mod controller;
pub mod convert;
pub mod desired;
pub mod error;
pub mod model;
pub mod notify;
pub mod reconcile;
pub mod remote;
pub mod source;
pub mod sync;

// ── Primary re-exports ──────────────────────────────────────────────
pub use autosync::{CommitHistory, PassMode};
pub use config::{ControllerConfig, GitAuth, RepositoryConfig};
pub use controller::Controller;
pub use error::CoreError;
pub use notify::{NoopNotifier, Notifier, Notifiers, SlackNotifier};
pub use reconcile::{GroupIndex, Reconciler};
pub use remote::ManagementApi;
pub use source::GitCheckout;
pub use sync::{PassSummary, SyncStage, run_pass};

pub use model::{AutoSyncMode, DesiredState};
