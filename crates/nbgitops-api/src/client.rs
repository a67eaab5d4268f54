// Async HTTP client for the NetBird management API.
//
// Base path: <management-url>/api/
// Auth: `Authorization: Token <pat>` default header

use std::sync::atomic::{AtomicBool, Ordering};

use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::auth::auth_headers;
use crate::types;
use crate::{Error, TransportConfig};

// ── Error response shape from the management API ─────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the NetBird management API.
///
/// When dry-run is enabled every mutating call is logged and answered with
/// a synthetic response instead of being sent. Synthetic objects use the
/// natural key (name, email, network id) as their id so later steps in the
/// same pass can still reference them.
pub struct ManagementClient {
    http: reqwest::Client,
    base_url: Url,
    dry_run: AtomicBool,
}

impl ManagementClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a personal access token and transport config.
    pub fn from_token(
        base_url: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let headers = auth_headers(token)?;
        let http = transport.build_client_with_headers(headers)?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            dry_run: AtomicBool::new(false),
        })
    }

    /// Append `/api/` to the management URL unless it is already there.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/api") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/"));
        }

        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Dry-run switch ───────────────────────────────────────────────

    pub fn set_dry_run(&self, enabled: bool) {
        self.dry_run.store(enabled, Ordering::SeqCst);
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run.load(Ordering::SeqCst)
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        handle_response(path, resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        handle_response(path, resp).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        handle_response(path, resp).await
    }

    async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        handle_empty(path, resp).await
    }

    fn skip(&self, action: &str, kind: &str, key: &str) -> bool {
        if self.is_dry_run() {
            info!(kind, key, "dry-run: would {action}");
            true
        } else {
            false
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Groups ───────────────────────────────────────────────────────

    pub async fn list_groups(&self) -> Result<Vec<types::GroupResponse>, Error> {
        self.get("groups").await
    }

    pub async fn create_group(
        &self,
        body: &types::GroupRequest,
    ) -> Result<types::GroupResponse, Error> {
        if self.skip("create", "group", &body.name) {
            return Ok(synthetic_group(&body.name, body));
        }
        self.post("groups", body).await
    }

    pub async fn update_group(
        &self,
        id: &str,
        body: &types::GroupRequest,
    ) -> Result<types::GroupResponse, Error> {
        if self.skip("update", "group", &body.name) {
            return Ok(synthetic_group(id, body));
        }
        self.put(&format!("groups/{id}"), body).await
    }

    pub async fn delete_group(&self, id: &str) -> Result<(), Error> {
        if self.skip("delete", "group", id) {
            return Ok(());
        }
        self.delete(&format!("groups/{id}")).await
    }

    // ── Peers ────────────────────────────────────────────────────────

    pub async fn list_peers(&self) -> Result<Vec<types::PeerResponse>, Error> {
        self.get("peers").await
    }

    pub async fn update_peer(
        &self,
        id: &str,
        body: &types::PeerRequest,
    ) -> Result<types::PeerResponse, Error> {
        if self.skip("update", "peer", &body.name) {
            return Ok(types::PeerResponse {
                id: id.to_owned(),
                name: body.name.clone(),
                ssh_enabled: body.ssh_enabled,
                login_expiration_enabled: body.login_expiration_enabled,
                user_id: String::new(),
                groups: Vec::new(),
            });
        }
        self.put(&format!("peers/{id}"), body).await
    }

    // ── Users ────────────────────────────────────────────────────────

    pub async fn list_users(&self) -> Result<Vec<types::UserResponse>, Error> {
        self.get("users").await
    }

    pub async fn update_user(
        &self,
        id: &str,
        body: &types::UserRequest,
    ) -> Result<types::UserResponse, Error> {
        if self.skip("update", "user", id) {
            return Ok(types::UserResponse {
                id: id.to_owned(),
                email: String::new(),
                role: body.role.clone(),
                auto_groups: body.auto_groups.clone(),
                is_blocked: body.is_blocked,
                is_service_user: false,
            });
        }
        self.put(&format!("users/{id}"), body).await
    }

    // ── Policies ─────────────────────────────────────────────────────

    pub async fn list_policies(&self) -> Result<Vec<types::PolicyResponse>, Error> {
        self.get("policies").await
    }

    pub async fn create_policy(
        &self,
        body: &types::PolicyRequest,
    ) -> Result<types::PolicyResponse, Error> {
        if self.skip("create", "policy", &body.name) {
            return Ok(synthetic_policy(&body.name, body));
        }
        self.post("policies", body).await
    }

    pub async fn update_policy(
        &self,
        id: &str,
        body: &types::PolicyRequest,
    ) -> Result<types::PolicyResponse, Error> {
        if self.skip("update", "policy", &body.name) {
            return Ok(synthetic_policy(id, body));
        }
        self.put(&format!("policies/{id}"), body).await
    }

    pub async fn delete_policy(&self, id: &str) -> Result<(), Error> {
        if self.skip("delete", "policy", id) {
            return Ok(());
        }
        self.delete(&format!("policies/{id}")).await
    }

    // ── Posture checks ───────────────────────────────────────────────

    pub async fn list_posture_checks(&self) -> Result<Vec<types::PostureCheckResponse>, Error> {
        self.get("posture-checks").await
    }

    pub async fn create_posture_check(
        &self,
        body: &types::PostureCheckRequest,
    ) -> Result<types::PostureCheckResponse, Error> {
        if self.skip("create", "posture check", &body.name) {
            return Ok(synthetic_posture_check(&body.name, body));
        }
        self.post("posture-checks", body).await
    }

    pub async fn update_posture_check(
        &self,
        id: &str,
        body: &types::PostureCheckRequest,
    ) -> Result<types::PostureCheckResponse, Error> {
        if self.skip("update", "posture check", &body.name) {
            return Ok(synthetic_posture_check(id, body));
        }
        self.put(&format!("posture-checks/{id}"), body).await
    }

    pub async fn delete_posture_check(&self, id: &str) -> Result<(), Error> {
        if self.skip("delete", "posture check", id) {
            return Ok(());
        }
        self.delete(&format!("posture-checks/{id}")).await
    }

    // ── Network routes ───────────────────────────────────────────────

    pub async fn list_routes(&self) -> Result<Vec<types::RouteResponse>, Error> {
        self.get("routes").await
    }

    pub async fn create_route(
        &self,
        body: &types::RouteRequest,
    ) -> Result<types::RouteResponse, Error> {
        if self.skip("create", "route", &body.network_id) {
            return Ok(synthetic_route(&body.network_id, body));
        }
        self.post("routes", body).await
    }

    pub async fn update_route(
        &self,
        id: &str,
        body: &types::RouteRequest,
    ) -> Result<types::RouteResponse, Error> {
        if self.skip("update", "route", &body.network_id) {
            return Ok(synthetic_route(id, body));
        }
        self.put(&format!("routes/{id}"), body).await
    }

    pub async fn delete_route(&self, id: &str) -> Result<(), Error> {
        if self.skip("delete", "route", id) {
            return Ok(());
        }
        self.delete(&format!("routes/{id}")).await
    }

    // ── DNS settings ─────────────────────────────────────────────────

    pub async fn get_dns_settings(&self) -> Result<types::DnsSettingsBody, Error> {
        let resp: types::DnsSettingsResponse = self.get("dns/settings").await?;
        Ok(resp.into_body())
    }

    pub async fn update_dns_settings(
        &self,
        body: &types::DnsSettingsBody,
    ) -> Result<types::DnsSettingsBody, Error> {
        if self.skip("update", "dns settings", "disabled_management_groups") {
            return Ok(body.clone());
        }
        let resp: types::DnsSettingsResponse = self.put("dns/settings", body).await?;
        Ok(resp.into_body())
    }

    // ── Nameserver groups ────────────────────────────────────────────

    pub async fn list_nameserver_groups(
        &self,
    ) -> Result<Vec<types::NameserverGroupResponse>, Error> {
        self.get("dns/nameservers").await
    }

    pub async fn create_nameserver_group(
        &self,
        body: &types::NameserverGroupRequest,
    ) -> Result<types::NameserverGroupResponse, Error> {
        if self.skip("create", "nameserver group", &body.name) {
            return Ok(synthetic_nameserver_group(&body.name, body));
        }
        self.post("dns/nameservers", body).await
    }

    pub async fn update_nameserver_group(
        &self,
        id: &str,
        body: &types::NameserverGroupRequest,
    ) -> Result<types::NameserverGroupResponse, Error> {
        if self.skip("update", "nameserver group", &body.name) {
            return Ok(synthetic_nameserver_group(id, body));
        }
        self.put(&format!("dns/nameservers/{id}"), body).await
    }

    pub async fn delete_nameserver_group(&self, id: &str) -> Result<(), Error> {
        if self.skip("delete", "nameserver group", id) {
            return Ok(());
        }
        self.delete(&format!("dns/nameservers/{id}")).await
    }
}

// ── Response handling ────────────────────────────────────────────

async fn handle_response<T: DeserializeOwned>(
    path: &str,
    resp: reqwest::Response,
) -> Result<T, Error> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{path}: {e} (body preview: {preview:?})"),
                body,
            }
        })
    } else {
        Err(parse_error(path, status, resp).await)
    }
}

async fn handle_empty(path: &str, resp: reqwest::Response) -> Result<(), Error> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(parse_error(path, status, resp).await)
    }
}

async fn parse_error(
    path: &str,
    status: reqwest::StatusCode,
    resp: reqwest::Response,
) -> Error {
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Error::InvalidToken;
    }

    let raw = resp.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorResponse>(&raw) {
        Ok(ErrorResponse { message: Some(m) }) => m,
        _ if raw.is_empty() => status.to_string(),
        _ => raw,
    };

    Error::Api {
        operation: operation_for(path),
        status: status.as_u16(),
        message,
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Map a request path to the resource name used in error messages.
fn operation_for(path: &str) -> &'static str {
    let head = path.split('/').next().unwrap_or_default();
    match head {
        "groups" => "groups",
        "peers" => "peers",
        "users" => "users",
        "policies" => "policies",
        "posture-checks" => "posture-checks",
        "routes" => "routes",
        "dns" if path.starts_with("dns/nameservers") => "dns/nameservers",
        "dns" => "dns/settings",
        _ => "request",
    }
}

fn synthetic_group(id: &str, body: &types::GroupRequest) -> types::GroupResponse {
    types::GroupResponse {
        id: id.to_owned(),
        name: body.name.clone(),
        peers: body
            .peers
            .iter()
            .flatten()
            .map(|p| types::PeerMinimum {
                id: p.clone(),
                name: String::new(),
            })
            .collect(),
    }
}

fn synthetic_policy(id: &str, body: &types::PolicyRequest) -> types::PolicyResponse {
    let group_refs = |ids: &[String]| -> Vec<types::GroupMinimum> {
        ids.iter()
            .map(|g| types::GroupMinimum {
                id: g.clone(),
                name: String::new(),
            })
            .collect()
    };

    types::PolicyResponse {
        id: id.to_owned(),
        name: body.name.clone(),
        description: body.description.clone(),
        enabled: body.enabled,
        source_posture_checks: body.source_posture_checks.clone(),
        rules: body
            .rules
            .iter()
            .map(|r| types::PolicyRuleResponse {
                id: None,
                name: r.name.clone(),
                description: r.description.clone(),
                enabled: r.enabled,
                action: r.action.clone(),
                bidirectional: r.bidirectional,
                protocol: r.protocol.clone(),
                ports: r.ports.clone(),
                sources: group_refs(&r.sources),
                destinations: group_refs(&r.destinations),
            })
            .collect(),
    }
}

fn synthetic_posture_check(
    id: &str,
    body: &types::PostureCheckRequest,
) -> types::PostureCheckResponse {
    types::PostureCheckResponse {
        id: id.to_owned(),
        name: body.name.clone(),
        description: body.description.clone(),
        checks: body.checks.clone(),
    }
}

fn synthetic_route(id: &str, body: &types::RouteRequest) -> types::RouteResponse {
    types::RouteResponse {
        id: id.to_owned(),
        network_type: String::new(),
        description: body.description.clone(),
        network_id: body.network_id.clone(),
        enabled: body.enabled,
        peer: body.peer.clone(),
        peer_groups: body.peer_groups.clone(),
        network: body.network.clone(),
        domains: body.domains.clone(),
        metric: body.metric,
        masquerade: body.masquerade,
        groups: body.groups.clone(),
        keep_route: body.keep_route,
    }
}

fn synthetic_nameserver_group(
    id: &str,
    body: &types::NameserverGroupRequest,
) -> types::NameserverGroupResponse {
    types::NameserverGroupResponse {
        id: id.to_owned(),
        name: body.name.clone(),
        description: body.description.clone(),
        nameservers: body.nameservers.clone(),
        enabled: body.enabled,
        groups: body.groups.clone(),
        primary: body.primary,
        domains: body.domains.clone(),
        search_domains_enabled: body.search_domains_enabled,
    }
}
