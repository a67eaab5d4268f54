// ── Desired-state loading ──
//
// Reads every `*.yaml` / `*.yml` file directly under the managed directory
// (file-name order), splits multi-document files, and merges the documents
// into one `DesiredState`.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::model::{DesiredDocument, DesiredState};

/// Load and merge every configuration file under `dir`.
pub fn load_dir(dir: &Path) -> Result<DesiredState, CoreError> {
    let io_err = |source| CoreError::Io {
        path: dir.display().to_string(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == "yaml" || e == "yml");
        if is_yaml && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut sources = Vec::with_capacity(files.len());
    for path in files {
        let text = std::fs::read_to_string(&path).map_err(|source| CoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        sources.push((name, text));
    }

    info!(dir = %dir.display(), files = sources.len(), "loading desired state");
    parse_sources(sources)
}

/// Merge `(file name, contents)` pairs into one desired state.
pub fn parse_sources(
    sources: impl IntoIterator<Item = (String, String)>,
) -> Result<DesiredState, CoreError> {
    let mut merger = Merger::default();
    for (file, text) in sources {
        for document in serde_yaml::Deserializer::from_str(&text) {
            let value = serde_yaml::Value::deserialize(document).map_err(|source| {
                CoreError::Yaml {
                    file: file.clone(),
                    source,
                }
            })?;
            if value.is_null() {
                continue;
            }
            let doc: DesiredDocument =
                serde_yaml::from_value(value).map_err(|source| CoreError::Yaml {
                    file: file.clone(),
                    source,
                })?;
            merger.add(&file, doc)?;
        }
    }
    let state = merger.finish();
    validate_unique(&state)?;
    debug!(
        peers = state.peers.len(),
        users = state.users.len(),
        policies = state.policies.len(),
        routes = state.network_routes.len(),
        "desired state parsed"
    );
    Ok(state)
}

#[derive(Default)]
struct Merger {
    state: DesiredState,
    config_from: Option<String>,
    dns_from: Option<String>,
}

impl Merger {
    fn add(&mut self, file: &str, doc: DesiredDocument) -> Result<(), CoreError> {
        if let Some(settings) = doc.config {
            claim_singleton("config", &mut self.config_from, file)?;
            self.state.settings = settings;
        }
        if let Some(dns) = doc.dns {
            claim_singleton("dns", &mut self.dns_from, file)?;
            self.state.dns = dns;
        }
        self.state.nameservers.extend(doc.nameservers);
        self.state.peers.extend(doc.peers);
        self.state.policies.extend(doc.policies);
        self.state.posture_checks.extend(doc.posture_checks);
        self.state.network_routes.extend(doc.network_routes);
        self.state.users.extend(doc.users);
        Ok(())
    }

    fn finish(self) -> DesiredState {
        self.state
    }
}

fn claim_singleton(key: &str, seen: &mut Option<String>, file: &str) -> Result<(), CoreError> {
    if let Some(first) = seen {
        return Err(CoreError::config(format!(
            "`{key}` defined more than once (in {first} and {file})"
        )));
    }
    *seen = Some(file.to_owned());
    Ok(())
}

fn validate_unique(state: &DesiredState) -> Result<(), CoreError> {
    check_unique("peer", state.peers.iter().map(|p| p.id.as_str()))?;
    check_unique("user", state.users.iter().map(|u| u.email.as_str()))?;
    check_unique("policy", state.policies.iter().map(|p| p.name.as_str()))?;
    check_unique(
        "posture check",
        state.posture_checks.iter().map(|pc| pc.name.as_str()),
    )?;
    check_unique(
        "network route",
        state.network_routes.iter().map(|r| r.network_id.as_str()),
    )?;
    check_unique(
        "nameserver group",
        state.nameservers.iter().map(|ns| ns.name.as_str()),
    )
}

fn check_unique<'a>(kind: &str, keys: impl Iterator<Item = &'a str>) -> Result<(), CoreError> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(CoreError::validation(format!("duplicate {kind} {key:?}")));
        }
    }
    Ok(())
}
