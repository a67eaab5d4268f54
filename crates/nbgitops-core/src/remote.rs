// ── Remote management API seam ──
//
// Reconcilers talk to the management service only through `ManagementApi`,
// in domain types. `ManagementClient` is the production implementation;
// tests substitute an in-memory fake.

use nbgitops_api::ManagementClient;
use nbgitops_api::types;

use crate::error::CoreError;
use crate::model::{
    DnsSettings, Group, Nameserver, NetworkRoute, Peer, Policy, PostureCheck, User,
};

/// Typed list/create/update/delete operations per resource type.
///
/// While dry-run is on, mutating calls must not reach the service and must
/// return an object whose id is the natural key.
#[allow(async_fn_in_trait)]
pub trait ManagementApi {
    fn set_dry_run(&self, enabled: bool);

    // ── Groups ───────────────────────────────────────────────────────
    async fn list_groups(&self) -> Result<Vec<Group>, CoreError>;
    async fn create_group(&self, name: &str) -> Result<Group, CoreError>;
    /// Replace the full member list of `group` with `peers`.
    async fn set_group_peers(&self, group: &Group, peers: &[String]) -> Result<(), CoreError>;
    async fn delete_group(&self, group: &Group) -> Result<(), CoreError>;

    // ── Peers & users ────────────────────────────────────────────────
    async fn list_peers(&self) -> Result<Vec<Peer>, CoreError>;
    async fn update_peer(&self, peer: &Peer) -> Result<(), CoreError>;
    async fn list_users(&self) -> Result<Vec<User>, CoreError>;
    async fn update_user(&self, user: &User) -> Result<(), CoreError>;

    // ── Policies ─────────────────────────────────────────────────────
    async fn list_policies(&self) -> Result<Vec<Policy>, CoreError>;
    async fn create_policy(&self, policy: &Policy) -> Result<Policy, CoreError>;
    async fn update_policy(&self, policy: &Policy) -> Result<(), CoreError>;
    async fn delete_policy(&self, policy: &Policy) -> Result<(), CoreError>;

    // ── Posture checks ───────────────────────────────────────────────
    async fn list_posture_checks(&self) -> Result<Vec<PostureCheck>, CoreError>;
    async fn create_posture_check(&self, check: &PostureCheck)
    -> Result<PostureCheck, CoreError>;
    async fn update_posture_check(&self, check: &PostureCheck) -> Result<(), CoreError>;
    async fn delete_posture_check(&self, check: &PostureCheck) -> Result<(), CoreError>;

    // ── Network routes ───────────────────────────────────────────────
    async fn list_routes(&self) -> Result<Vec<NetworkRoute>, CoreError>;
    async fn create_route(&self, route: &NetworkRoute) -> Result<NetworkRoute, CoreError>;
    async fn update_route(&self, route: &NetworkRoute) -> Result<(), CoreError>;
    async fn delete_route(&self, route: &NetworkRoute) -> Result<(), CoreError>;

    // ── DNS ──────────────────────────────────────────────────────────
    async fn get_dns_settings(&self) -> Result<DnsSettings, CoreError>;
    async fn update_dns_settings(&self, settings: &DnsSettings) -> Result<(), CoreError>;
    async fn list_nameservers(&self) -> Result<Vec<Nameserver>, CoreError>;
    async fn create_nameserver(&self, ns: &Nameserver) -> Result<Nameserver, CoreError>;
    async fn update_nameserver(&self, ns: &Nameserver) -> Result<(), CoreError>;
    async fn delete_nameserver(&self, ns: &Nameserver) -> Result<(), CoreError>;
}

impl ManagementApi for ManagementClient {
    fn set_dry_run(&self, enabled: bool) {
        ManagementClient::set_dry_run(self, enabled);
    }

    async fn list_groups(&self) -> Result<Vec<Group>, CoreError> {
        let groups = ManagementClient::list_groups(self).await?;
        Ok(groups.into_iter().map(Group::from).collect())
    }

    async fn create_group(&self, name: &str) -> Result<Group, CoreError> {
        let body = types::GroupRequest {
            name: name.to_owned(),
            peers: None,
        };
        Ok(ManagementClient::create_group(self, &body).await?.into())
    }

    async fn set_group_peers(&self, group: &Group, peers: &[String]) -> Result<(), CoreError> {
        let body = types::GroupRequest {
            name: group.name.clone(),
            peers: Some(peers.to_vec()),
        };
        ManagementClient::update_group(self, &group.id, &body).await?;
        Ok(())
    }

    async fn delete_group(&self, group: &Group) -> Result<(), CoreError> {
        Ok(ManagementClient::delete_group(self, &group.id).await?)
    }

    async fn list_peers(&self) -> Result<Vec<Peer>, CoreError> {
        let peers = ManagementClient::list_peers(self).await?;
        Ok(peers.into_iter().map(Peer::from).collect())
    }

    async fn update_peer(&self, peer: &Peer) -> Result<(), CoreError> {
        ManagementClient::update_peer(self, &peer.id, &peer.into()).await?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, CoreError> {
        let users = ManagementClient::list_users(self).await?;
        Ok(users.into_iter().map(User::from).collect())
    }

    async fn update_user(&self, user: &User) -> Result<(), CoreError> {
        ManagementClient::update_user(self, &user.id, &user.into()).await?;
        Ok(())
    }

    async fn list_policies(&self) -> Result<Vec<Policy>, CoreError> {
        ManagementClient::list_policies(self)
            .await?
            .into_iter()
            .map(Policy::try_from)
            .collect()
    }

    async fn create_policy(&self, policy: &Policy) -> Result<Policy, CoreError> {
        let created = ManagementClient::create_policy(self, &policy.into()).await?;
        Policy::try_from(created)
    }

    async fn update_policy(&self, policy: &Policy) -> Result<(), CoreError> {
        ManagementClient::update_policy(self, &policy.id, &policy.into()).await?;
        Ok(())
    }

    async fn delete_policy(&self, policy: &Policy) -> Result<(), CoreError> {
        Ok(ManagementClient::delete_policy(self, &policy.id).await?)
    }

    async fn list_posture_checks(&self) -> Result<Vec<PostureCheck>, CoreError> {
        let checks = ManagementClient::list_posture_checks(self).await?;
        Ok(checks.into_iter().map(PostureCheck::from).collect())
    }

    async fn create_posture_check(
        &self,
        check: &PostureCheck,
    ) -> Result<PostureCheck, CoreError> {
        Ok(ManagementClient::create_posture_check(self, &check.into())
            .await?
            .into())
    }

    async fn update_posture_check(&self, check: &PostureCheck) -> Result<(), CoreError> {
        ManagementClient::update_posture_check(self, &check.id, &check.into()).await?;
        Ok(())
    }

    async fn delete_posture_check(&self, check: &PostureCheck) -> Result<(), CoreError> {
        Ok(ManagementClient::delete_posture_check(self, &check.id).await?)
    }

    async fn list_routes(&self) -> Result<Vec<NetworkRoute>, CoreError> {
        let routes = ManagementClient::list_routes(self).await?;
        Ok(routes.into_iter().map(NetworkRoute::from).collect())
    }

    async fn create_route(&self, route: &NetworkRoute) -> Result<NetworkRoute, CoreError> {
        Ok(ManagementClient::create_route(self, &route.into())
            .await?
            .into())
    }

    async fn update_route(&self, route: &NetworkRoute) -> Result<(), CoreError> {
        ManagementClient::update_route(self, &route.id, &route.into()).await?;
        Ok(())
    }

    async fn delete_route(&self, route: &NetworkRoute) -> Result<(), CoreError> {
        Ok(ManagementClient::delete_route(self, &route.id).await?)
    }

    async fn get_dns_settings(&self) -> Result<DnsSettings, CoreError> {
        Ok(ManagementClient::get_dns_settings(self).await?.into())
    }

    async fn update_dns_settings(&self, settings: &DnsSettings) -> Result<(), CoreError> {
        ManagementClient::update_dns_settings(self, &settings.into()).await?;
        Ok(())
    }

    async fn list_nameservers(&self) -> Result<Vec<Nameserver>, CoreError> {
        let groups = ManagementClient::list_nameserver_groups(self).await?;
        Ok(groups.into_iter().map(Nameserver::from).collect())
    }

    async fn create_nameserver(&self, ns: &Nameserver) -> Result<Nameserver, CoreError> {
        Ok(ManagementClient::create_nameserver_group(self, &ns.into())
            .await?
            .into())
    }

    async fn update_nameserver(&self, ns: &Nameserver) -> Result<(), CoreError> {
        ManagementClient::update_nameserver_group(self, &ns.id, &ns.into()).await?;
        Ok(())
    }

    async fn delete_nameserver(&self, ns: &Nameserver) -> Result<(), CoreError> {
        Ok(ManagementClient::delete_nameserver_group(self, &ns.id).await?)
    }
}
