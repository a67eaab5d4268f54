// In-memory `ManagementApi` for reconciler and orchestrator tests.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use crate::desired;
use crate::error::CoreError;
use crate::model::{
    DesiredState, DnsSettings, Group, Nameserver, NetworkRoute, Peer, Policy, PostureCheck, Role,
    User,
};
use crate::notify::{NoopNotifier, Notifier};
use crate::remote::ManagementApi;

use super::Reconciler;

/// A mutating call that reached the fake "service".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateGroup(String),
    SetGroupPeers(String, Vec<String>),
    DeleteGroup(String),
    UpdatePeer(Peer),
    UpdateUser(User),
    CreatePolicy(Policy),
    UpdatePolicy(Policy),
    DeletePolicy(String),
    CreatePostureCheck(String),
    UpdatePostureCheck(String),
    DeletePostureCheck(String),
    CreateRoute(String),
    UpdateRoute(String),
    DeleteRoute(String),
    UpdateDns(Vec<String>),
    CreateNameserver(String),
    UpdateNameserver(String),
    DeleteNameserver(String),
}

#[derive(Default)]
struct State {
    groups: Vec<Group>,
    peers: Vec<Peer>,
    users: Vec<User>,
    policies: Vec<Policy>,
    posture_checks: Vec<PostureCheck>,
    routes: Vec<NetworkRoute>,
    dns: DnsSettings,
    nameservers: Vec<Nameserver>,
    next_id: usize,
    dry_run: bool,
    calls: Vec<Call>,
    suppressed: usize,
    fail_on: Option<&'static str>,
}

impl State {
    fn new_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// Fake management service. Live mutations update the in-memory state and
/// are recorded; dry-run mutations are counted and answered with the
/// natural key as id.
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<State>,
}

impl FakeApi {
    pub fn reconciler(&self) -> Reconciler<'_, Self> {
        Reconciler::new(self, &NoopNotifier)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn suppressed(&self) -> usize {
        self.state.lock().unwrap().suppressed
    }

    pub fn fail_on(&self, operation: &'static str) {
        self.state.lock().unwrap().fail_on = Some(operation);
    }

    pub fn groups(&self) -> Vec<Group> {
        self.state.lock().unwrap().groups.clone()
    }

    pub fn group_named(&self, name: &str) -> Option<Group> {
        self.groups().into_iter().find(|g| g.name == name)
    }

    pub fn peers(&self) -> Vec<Peer> {
        self.state.lock().unwrap().peers.clone()
    }

    pub fn users(&self) -> Vec<User> {
        self.state.lock().unwrap().users.clone()
    }

    pub fn policies(&self) -> Vec<Policy> {
        self.state.lock().unwrap().policies.clone()
    }

    // ── Builders ─────────────────────────────────────────────────────

    pub fn with_group(self, id: &str, name: &str, peers: &[&str]) -> Self {
        self.state.lock().unwrap().groups.push(Group {
            id: id.into(),
            name: name.into(),
            peers: peers.iter().map(|p| (*p).to_owned()).collect(),
        });
        self
    }

    pub fn with_peer(self, peer: Peer) -> Self {
        self.state.lock().unwrap().peers.push(peer);
        self
    }

    pub fn with_user(self, user: User) -> Self {
        self.state.lock().unwrap().users.push(user);
        self
    }

    pub fn with_policy(self, policy: Policy) -> Self {
        self.state.lock().unwrap().policies.push(policy);
        self
    }

    pub fn with_posture_check(self, check: PostureCheck) -> Self {
        self.state.lock().unwrap().posture_checks.push(check);
        self
    }

    pub fn with_route(self, route: NetworkRoute) -> Self {
        self.state.lock().unwrap().routes.push(route);
        self
    }

    pub fn with_dns(self, groups: &[&str]) -> Self {
        self.state.lock().unwrap().dns.disabled_management_groups =
            groups.iter().map(|g| (*g).to_owned()).collect();
        self
    }

    pub fn with_nameserver(self, ns: Nameserver) -> Self {
        self.state.lock().unwrap().nameservers.push(ns);
        self
    }

    // ── Internals ────────────────────────────────────────────────────

    fn check(&self, operation: &'static str) -> Result<(), CoreError> {
        if self.state.lock().unwrap().fail_on == Some(operation) {
            return Err(CoreError::Api {
                message: format!("{operation}: injected failure"),
                status: Some(500),
            });
        }
        Ok(())
    }

    /// Returns `true` when the mutation should be applied.
    fn mutate(&self, call: Call) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.dry_run {
            state.suppressed += 1;
            false
        } else {
            state.calls.push(call);
            true
        }
    }
}

impl ManagementApi for FakeApi {
    fn set_dry_run(&self, enabled: bool) {
        self.state.lock().unwrap().dry_run = enabled;
    }

    async fn list_groups(&self) -> Result<Vec<Group>, CoreError> {
        self.check("list_groups")?;
        Ok(self.groups())
    }

    async fn create_group(&self, name: &str) -> Result<Group, CoreError> {
        self.check("create_group")?;
        if !self.mutate(Call::CreateGroup(name.into())) {
            return Ok(Group {
                id: name.into(),
                name: name.into(),
                peers: vec![],
            });
        }
        let mut state = self.state.lock().unwrap();
        let group = Group {
            id: state.new_id("group"),
            name: name.into(),
            peers: vec![],
        };
        state.groups.push(group.clone());
        Ok(group)
    }

    async fn set_group_peers(&self, group: &Group, peers: &[String]) -> Result<(), CoreError> {
        self.check("set_group_peers")?;
        if self.mutate(Call::SetGroupPeers(group.name.clone(), peers.to_vec())) {
            let mut state = self.state.lock().unwrap();
            if let Some(g) = state.groups.iter_mut().find(|g| g.id == group.id) {
                g.peers = peers.to_vec();
            }
        }
        Ok(())
    }

    async fn delete_group(&self, group: &Group) -> Result<(), CoreError> {
        self.check("delete_group")?;
        if self.mutate(Call::DeleteGroup(group.name.clone())) {
            self.state
                .lock()
                .unwrap()
                .groups
                .retain(|g| g.id != group.id);
        }
        Ok(())
    }

    async fn list_peers(&self) -> Result<Vec<Peer>, CoreError> {
        self.check("list_peers")?;
        Ok(self.peers())
    }

    async fn update_peer(&self, peer: &Peer) -> Result<(), CoreError> {
        self.check("update_peer")?;
        if self.mutate(Call::UpdatePeer(peer.clone())) {
            let mut state = self.state.lock().unwrap();
            if let Some(p) = state.peers.iter_mut().find(|p| p.id == peer.id) {
                p.name.clone_from(&peer.name);
                p.ssh_enabled = peer.ssh_enabled;
                p.login_expiration_enabled = peer.login_expiration_enabled;
            }
        }
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, CoreError> {
        self.check("list_users")?;
        Ok(self.users())
    }

    async fn update_user(&self, user: &User) -> Result<(), CoreError> {
        self.check("update_user")?;
        if self.mutate(Call::UpdateUser(user.clone())) {
            let mut state = self.state.lock().unwrap();
            if let Some(u) = state.users.iter_mut().find(|u| u.id == user.id) {
                u.role = user.role;
                u.groups.clone_from(&user.groups);
                u.blocked = user.blocked;
            }
        }
        Ok(())
    }

    async fn list_policies(&self) -> Result<Vec<Policy>, CoreError> {
        self.check("list_policies")?;
        Ok(self.policies())
    }

    async fn create_policy(&self, policy: &Policy) -> Result<Policy, CoreError> {
        self.check("create_policy")?;
        let mut created = policy.clone();
        if self.mutate(Call::CreatePolicy(policy.clone())) {
            let mut state = self.state.lock().unwrap();
            created.id = state.new_id("policy");
            state.policies.push(created.clone());
        } else {
            created.id.clone_from(&policy.name);
        }
        Ok(created)
    }

    async fn update_policy(&self, policy: &Policy) -> Result<(), CoreError> {
        self.check("update_policy")?;
        if self.mutate(Call::UpdatePolicy(policy.clone())) {
            let mut state = self.state.lock().unwrap();
            if let Some(p) = state.policies.iter_mut().find(|p| p.id == policy.id) {
                *p = policy.clone();
            }
        }
        Ok(())
    }

    async fn delete_policy(&self, policy: &Policy) -> Result<(), CoreError> {
        self.check("delete_policy")?;
        if self.mutate(Call::DeletePolicy(policy.name.clone())) {
            self.state
                .lock()
                .unwrap()
                .policies
                .retain(|p| p.id != policy.id);
        }
        Ok(())
    }

    async fn list_posture_checks(&self) -> Result<Vec<PostureCheck>, CoreError> {
        self.check("list_posture_checks")?;
        Ok(self.state.lock().unwrap().posture_checks.clone())
    }

    async fn create_posture_check(
        &self,
        check: &PostureCheck,
    ) -> Result<PostureCheck, CoreError> {
        self.check("create_posture_check")?;
        let mut created = check.clone();
        if self.mutate(Call::CreatePostureCheck(check.name.clone())) {
            let mut state = self.state.lock().unwrap();
            created.id = state.new_id("pc");
            state.posture_checks.push(created.clone());
        } else {
            created.id.clone_from(&check.name);
        }
        Ok(created)
    }

    async fn update_posture_check(&self, check: &PostureCheck) -> Result<(), CoreError> {
        self.check("update_posture_check")?;
        if self.mutate(Call::UpdatePostureCheck(check.name.clone())) {
            let mut state = self.state.lock().unwrap();
            if let Some(pc) = state.posture_checks.iter_mut().find(|pc| pc.id == check.id) {
                *pc = check.clone();
            }
        }
        Ok(())
    }

    async fn delete_posture_check(&self, check: &PostureCheck) -> Result<(), CoreError> {
        self.check("delete_posture_check")?;
        if self.mutate(Call::DeletePostureCheck(check.name.clone())) {
            self.state
                .lock()
                .unwrap()
                .posture_checks
                .retain(|pc| pc.id != check.id);
        }
        Ok(())
    }

    async fn list_routes(&self) -> Result<Vec<NetworkRoute>, CoreError> {
        self.check("list_routes")?;
        Ok(self.state.lock().unwrap().routes.clone())
    }

    async fn create_route(&self, route: &NetworkRoute) -> Result<NetworkRoute, CoreError> {
        self.check("create_route")?;
        let mut created = route.clone();
        if self.mutate(Call::CreateRoute(route.network_id.clone())) {
            let mut state = self.state.lock().unwrap();
            created.id = state.new_id("route");
            state.routes.push(created.clone());
        } else {
            created.id.clone_from(&route.network_id);
        }
        Ok(created)
    }

    async fn update_route(&self, route: &NetworkRoute) -> Result<(), CoreError> {
        self.check("update_route")?;
        if self.mutate(Call::UpdateRoute(route.network_id.clone())) {
            let mut state = self.state.lock().unwrap();
            if let Some(r) = state.routes.iter_mut().find(|r| r.id == route.id) {
                *r = route.clone();
            }
        }
        Ok(())
    }

    async fn delete_route(&self, route: &NetworkRoute) -> Result<(), CoreError> {
        self.check("delete_route")?;
        if self.mutate(Call::DeleteRoute(route.network_id.clone())) {
            self.state
                .lock()
                .unwrap()
                .routes
                .retain(|r| r.id != route.id);
        }
        Ok(())
    }

    async fn get_dns_settings(&self) -> Result<DnsSettings, CoreError> {
        self.check("get_dns_settings")?;
        Ok(self.state.lock().unwrap().dns.clone())
    }

    async fn update_dns_settings(&self, settings: &DnsSettings) -> Result<(), CoreError> {
        self.check("update_dns_settings")?;
        if self.mutate(Call::UpdateDns(
            settings.disabled_management_groups.clone(),
        )) {
            self.state.lock().unwrap().dns = settings.clone();
        }
        Ok(())
    }

    async fn list_nameservers(&self) -> Result<Vec<Nameserver>, CoreError> {
        self.check("list_nameservers")?;
        Ok(self.state.lock().unwrap().nameservers.clone())
    }

    async fn create_nameserver(&self, ns: &Nameserver) -> Result<Nameserver, CoreError> {
        self.check("create_nameserver")?;
        let mut created = ns.clone();
        if self.mutate(Call::CreateNameserver(ns.name.clone())) {
            let mut state = self.state.lock().unwrap();
            created.id = state.new_id("ns");
            state.nameservers.push(created.clone());
        } else {
            created.id.clone_from(&ns.name);
        }
        Ok(created)
    }

    async fn update_nameserver(&self, ns: &Nameserver) -> Result<(), CoreError> {
        self.check("update_nameserver")?;
        if self.mutate(Call::UpdateNameserver(ns.name.clone())) {
            let mut state = self.state.lock().unwrap();
            if let Some(n) = state.nameservers.iter_mut().find(|n| n.id == ns.id) {
                *n = ns.clone();
            }
        }
        Ok(())
    }

    async fn delete_nameserver(&self, ns: &Nameserver) -> Result<(), CoreError> {
        self.check("delete_nameserver")?;
        if self.mutate(Call::DeleteNameserver(ns.name.clone())) {
            self.state
                .lock()
                .unwrap()
                .nameservers
                .retain(|n| n.id != ns.id);
        }
        Ok(())
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

/// Parse a single YAML document into desired state.
pub fn desired(yaml: &str) -> DesiredState {
    desired::parse_sources([("test.yaml".to_owned(), yaml.to_owned())]).unwrap()
}

pub fn remote_peer(id: &str, name: &str, user_id: &str, ssh: bool, expiration: bool) -> Peer {
    Peer {
        id: id.into(),
        name: name.into(),
        user_id: user_id.into(),
        ssh_enabled: ssh,
        login_expiration_enabled: expiration,
        groups: vec![],
    }
}

pub fn remote_user(id: &str, email: &str, role: Role, groups: &[&str]) -> User {
    User {
        id: id.into(),
        email: email.into(),
        role,
        groups: groups.iter().map(|g| (*g).to_owned()).collect(),
        blocked: false,
        service_user: false,
    }
}

/// Notifier that keeps every message for assertions.
#[derive(Clone, Default)]
pub struct RecordingNotifier(Arc<Mutex<Vec<String>>>);

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, subject: &str, message: &str) {
        let line = if subject.is_empty() {
            message.to_owned()
        } else {
            format!("{subject}: {message}")
        };
        self.0.lock().unwrap().push(line);
    }
}
