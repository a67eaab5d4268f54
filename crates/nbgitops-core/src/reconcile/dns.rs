// ── DNS settings & nameserver groups ──

use std::collections::HashMap;

use tracing::debug;

use super::{GroupIndex, Reconciler};
use crate::error::CoreError;
use crate::model::set::same_set;
use crate::model::{DesiredState, DnsSettings, Nameserver};
use crate::remote::ManagementApi;

impl<A: ManagementApi> Reconciler<'_, A> {
    /// Update the account's DNS-management opt-out groups when they differ.
    pub async fn reconcile_dns_settings(
        &self,
        desired: &DesiredState,
        groups: &GroupIndex,
    ) -> Result<(), CoreError> {
        let wanted = DnsSettings {
            disabled_management_groups: groups.ids(&desired.dns.disabled_management_groups)?,
        };
        let current = self.api.get_dns_settings().await?;
        if same_set(
            &wanted.disabled_management_groups,
            &current.disabled_management_groups,
        ) {
            debug!("dns settings match");
            return Ok(());
        }

        self.announce(&format!(
            "Updating DNS management disabled groups to {:?}",
            desired.dns.disabled_management_groups
        ));
        self.api.update_dns_settings(&wanted).await
    }

    /// Create, update or delete nameserver groups keyed by name.
    pub async fn reconcile_nameservers(
        &self,
        desired: &DesiredState,
        groups: &GroupIndex,
    ) -> Result<(), CoreError> {
        let mut remote: HashMap<String, Nameserver> = self
            .api
            .list_nameservers()
            .await?
            .into_iter()
            .map(|ns| (ns.name.clone(), ns))
            .collect();

        for ns in &desired.nameservers {
            let mut wanted = ns.clone();
            wanted.groups = groups.ids(&ns.groups)?;
            match remote.remove(&wanted.name) {
                Some(current) if wanted.matches(&current) => {
                    debug!(name = %wanted.name, "nameserver group matches");
                }
                Some(current) => {
                    self.announce(&format!("Updating nameserver group {}", wanted.name));
                    wanted.id = current.id;
                    self.api.update_nameserver(&wanted).await?;
                }
                None => {
                    self.announce(&format!("Creating nameserver group {}", wanted.name));
                    self.api.create_nameserver(&wanted).await?;
                }
            }
        }

        for stale in remote.into_values() {
            self.announce(&format!(
                "Deleting nameserver group {} as it's not in source control",
                stale.name
            ));
            self.api.delete_nameserver(&stale).await?;
        }
        Ok(())
    }
}
