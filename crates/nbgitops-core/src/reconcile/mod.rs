// ── Entity reconcilers ──
//
// One submodule per resource type. Each step fetches the remote collection,
// builds the desired one with names translated to identifiers, and issues the
// minimal set of mutating calls. Every planned mutation is logged at `warn`
// and announced to the notifier before the call is made.

mod dns;
mod groups;
mod membership;
mod peers;
mod policies;
mod posture_checks;
mod routes;
mod users;

#[cfg(test)]
pub(crate) mod testing;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::warn;

use crate::error::CoreError;
use crate::notify::Notifier;
use crate::remote::ManagementApi;

pub use groups::GroupIndex;
pub use membership::{MembershipDelta, desired_memberships, membership_delta};

/// Name → identifier map for posture checks, produced before policies run.
pub type PostureCheckIds = HashMap<String, String>;

/// Runs individual reconciliation steps against one API and notifier.
pub struct Reconciler<'a, A> {
    api: &'a A,
    notifier: &'a dyn Notifier,
    mutations: AtomicUsize,
}

impl<'a, A: ManagementApi> Reconciler<'a, A> {
    pub fn new(api: &'a A, notifier: &'a dyn Notifier) -> Self {
        Self {
            api,
            notifier,
            mutations: AtomicUsize::new(0),
        }
    }

    /// Number of mutating calls planned so far (dry-run or live).
    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::Relaxed)
    }

    /// Log and notify a planned mutation.
    fn announce(&self, message: &str) {
        self.report(message);
        self.mutations.fetch_add(1, Ordering::Relaxed);
    }

    /// Log and notify a finding that needs no mutation.
    fn report(&self, message: &str) {
        warn!("{message}");
        self.notifier.notify("", message);
    }
}

/// Translate names through `ids`, failing on the first unknown one.
fn resolve_all(
    kind: &str,
    names: &[String],
    ids: &HashMap<String, String>,
) -> Result<Vec<String>, CoreError> {
    names
        .iter()
        .map(|name| {
            ids.get(name)
                .filter(|id| !id.is_empty())
                .cloned()
                .ok_or_else(|| CoreError::validation(format!("unknown {kind} {name:?}")))
        })
        .collect()
}
