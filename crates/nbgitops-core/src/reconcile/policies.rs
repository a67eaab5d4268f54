// ── Policy reconciliation ──

use std::collections::HashMap;

use tracing::debug;

use super::{GroupIndex, PostureCheckIds, Reconciler, resolve_all};
use crate::error::CoreError;
use crate::model::{DesiredState, Policy};
use crate::remote::ManagementApi;

fn resolve_policy(
    policy: &Policy,
    groups: &GroupIndex,
    checks: &PostureCheckIds,
) -> Result<Policy, CoreError> {
    let mut resolved = policy.clone();
    resolved.sources = groups.ids(&policy.sources)?;
    resolved.destinations = groups.ids(&policy.destinations)?;
    resolved.source_posture_checks =
        resolve_all("posture check", &policy.source_posture_checks, checks)?;
    Ok(resolved)
}

impl<A: ManagementApi> Reconciler<'_, A> {
    /// Create, update or delete policies keyed by name.
    pub async fn reconcile_policies(
        &self,
        desired: &DesiredState,
        groups: &GroupIndex,
        checks: &PostureCheckIds,
    ) -> Result<(), CoreError> {
        let mut remote: HashMap<String, Policy> = self
            .api
            .list_policies()
            .await?
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect();

        for policy in &desired.policies {
            let mut wanted = resolve_policy(policy, groups, checks)?;
            match remote.remove(&wanted.name) {
                Some(current) if wanted.matches(&current) => {
                    debug!(name = %wanted.name, "policy matches");
                }
                Some(current) => {
                    self.announce(&format!("Updating policy {}", wanted.name));
                    wanted.id = current.id;
                    self.api.update_policy(&wanted).await?;
                }
                None => {
                    self.announce(&format!("Creating policy {}", wanted.name));
                    self.api.create_policy(&wanted).await?;
                }
            }
        }

        for stale in remote.into_values() {
            self.announce(&format!(
                "Deleting policy {} as it's not in source control",
                stale.name
            ));
            self.api.delete_policy(&stale).await?;
        }
        Ok(())
    }
}
