// ── Reconciliation pass ──
//
// One pass runs every step in a fixed order under a single dry-run flag.
// The first failing step aborts the pass; steps already applied stay applied
// and the next scheduled pass starts over from the top.

use strum::Display;
use tracing::{error, info, info_span, Instrument};

use crate::error::CoreError;
use crate::model::DesiredState;
use crate::notify::Notifier;
use crate::reconcile::Reconciler;
use crate::remote::ManagementApi;

/// Steps of a pass, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SyncStage {
    Groups,
    Users,
    Peers,
    Memberships,
    Routes,
    PostureChecks,
    Policies,
    PostureCheckPrune,
    DnsSettings,
    Nameservers,
    GroupPrune,
}

/// Outcome of a successful pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub dry_run: bool,
    /// Mutations planned (and, unless dry-run, applied).
    pub mutations: usize,
}

trait StageExt<T> {
    fn at(self, stage: SyncStage) -> Result<T, CoreError>;
}

impl<T> StageExt<T> for Result<T, CoreError> {
    fn at(self, stage: SyncStage) -> Result<T, CoreError> {
        self.map_err(|source| CoreError::StageFailed {
            stage,
            source: Box::new(source),
        })
    }
}

/// Run one reconciliation pass of `desired` against `api`.
///
/// The failure notification is sent here; callers only need to log.
pub async fn run_pass<A: ManagementApi>(
    api: &A,
    notifier: &dyn Notifier,
    desired: &DesiredState,
    dry_run: bool,
) -> Result<PassSummary, CoreError> {
    api.set_dry_run(dry_run);
    let span = info_span!("pass", dry_run);
    let result = run_steps(api, notifier, desired).instrument(span).await;
    api.set_dry_run(false);

    match result {
        Ok(mutations) => {
            info!(dry_run, mutations, "sync pass finished");
            Ok(PassSummary { dry_run, mutations })
        }
        Err(e) => {
            error!(error = %e, "sync pass failed");
            notifier.notify("Sync failed", &e.to_string());
            Err(e)
        }
    }
}

async fn run_steps<A: ManagementApi>(
    api: &A,
    notifier: &dyn Notifier,
    desired: &DesiredState,
) -> Result<usize, CoreError> {
    let r = Reconciler::new(api, notifier);

    let groups = r.resolve_groups(desired).await.at(SyncStage::Groups)?;
    let users = r
        .reconcile_users(desired, &groups)
        .await
        .at(SyncStage::Users)?;
    let peers = r.reconcile_peers(desired).await.at(SyncStage::Peers)?;
    r.reconcile_memberships(desired, &groups, &users, &peers)
        .await
        .at(SyncStage::Memberships)?;
    r.reconcile_routes(desired, &groups)
        .await
        .at(SyncStage::Routes)?;
    let checks = r
        .reconcile_posture_checks(desired)
        .await
        .at(SyncStage::PostureChecks)?;
    r.reconcile_policies(desired, &groups, &checks)
        .await
        .at(SyncStage::Policies)?;
    r.prune_posture_checks(desired)
        .await
        .at(SyncStage::PostureCheckPrune)?;
    r.reconcile_dns_settings(desired, &groups)
        .await
        .at(SyncStage::DnsSettings)?;
    r.reconcile_nameservers(desired, &groups)
        .await
        .at(SyncStage::Nameservers)?;
    r.prune_groups(&groups).await.at(SyncStage::GroupPrune)?;

    Ok(r.mutations())
}
