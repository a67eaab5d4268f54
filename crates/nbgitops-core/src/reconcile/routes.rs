// ── Network route reconciliation ──

use std::collections::HashMap;

use tracing::debug;

use super::{GroupIndex, Reconciler};
use crate::error::CoreError;
use crate::model::{DesiredState, NetworkRoute, RoutingPeer};
use crate::remote::ManagementApi;

/// Copy of `route` with distribution and routing group names replaced by ids.
fn resolve_route(route: &NetworkRoute, groups: &GroupIndex) -> Result<NetworkRoute, CoreError> {
    let mut resolved = route.clone();
    resolved.groups = groups.ids(&route.groups)?;
    if let RoutingPeer::Groups(names) = &route.routing {
        resolved.routing = RoutingPeer::Groups(groups.ids(names)?);
    }
    Ok(resolved)
}

impl<A: ManagementApi> Reconciler<'_, A> {
    /// Create, update or delete routes keyed by `network_id`.
    pub async fn reconcile_routes(
        &self,
        desired: &DesiredState,
        groups: &GroupIndex,
    ) -> Result<(), CoreError> {
        let mut remote: HashMap<String, NetworkRoute> = self
            .api
            .list_routes()
            .await?
            .into_iter()
            .map(|r| (r.network_id.clone(), r))
            .collect();

        for route in &desired.network_routes {
            let mut wanted = resolve_route(route, groups)?;
            match remote.remove(&wanted.network_id) {
                Some(current) if wanted.matches(&current) => {
                    debug!(network_id = %wanted.network_id, "route matches");
                }
                Some(current) => {
                    self.announce(&format!("Updating network route {}", wanted.network_id));
                    wanted.id = current.id;
                    if wanted.network_type.is_empty() {
                        wanted.network_type = current.network_type;
                    }
                    self.api.update_route(&wanted).await?;
                }
                None => {
                    self.announce(&format!("Creating network route {}", wanted.network_id));
                    let created = self.api.create_route(&wanted).await?;
                    debug!(network_id = %wanted.network_id, id = %created.id, "created route");
                }
            }
        }

        for stale in remote.into_values() {
            self.announce(&format!(
                "Deleting network route {} as it's not in source control",
                stale.network_id
            ));
            self.api.delete_route(&stale).await?;
        }
        Ok(())
    }
}
