// ── Posture check reconciliation ──
//
// Creation and update run before policies so that policies can reference
// fresh identifiers; deletion runs after policies so no policy is left
// pointing at a removed check.

use std::collections::HashMap;

use tracing::debug;

use super::{PostureCheckIds, Reconciler};
use crate::error::CoreError;
use crate::model::{DesiredState, PostureCheck};
use crate::remote::ManagementApi;

impl<A: ManagementApi> Reconciler<'_, A> {
    /// Create or update every configured posture check and return the
    /// name → id map policies resolve against.
    pub async fn reconcile_posture_checks(
        &self,
        desired: &DesiredState,
    ) -> Result<PostureCheckIds, CoreError> {
        let remote: HashMap<String, PostureCheck> = self
            .api
            .list_posture_checks()
            .await?
            .into_iter()
            .map(|pc| (pc.name.clone(), pc))
            .collect();

        let mut ids = PostureCheckIds::new();
        for check in &desired.posture_checks {
            let id = match remote.get(&check.name) {
                Some(current) if check.matches(current) => {
                    debug!(name = %check.name, "posture check matches");
                    current.id.clone()
                }
                Some(current) => {
                    self.announce(&format!("Updating posture check {}", check.name));
                    let mut wanted = check.clone();
                    wanted.id.clone_from(&current.id);
                    self.api.update_posture_check(&wanted).await?;
                    wanted.id
                }
                None => {
                    self.announce(&format!("Creating posture check {}", check.name));
                    self.api.create_posture_check(check).await?.id
                }
            };
            ids.insert(check.name.clone(), id);
        }
        Ok(ids)
    }

    /// Delete remote posture checks that are no longer configured.
    pub async fn prune_posture_checks(&self, desired: &DesiredState) -> Result<(), CoreError> {
        for check in self.api.list_posture_checks().await? {
            if desired.posture_checks.iter().any(|pc| pc.name == check.name) {
                continue;
            }
            self.announce(&format!(
                "Deleting posture check {} as it's not in source control",
                check.name
            ));
            self.api.delete_posture_check(&check).await?;
        }
        Ok(())
    }
}
