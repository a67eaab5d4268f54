//! Startup configuration for nbgitops.
//!
//! Validates the raw startup settings (flags / environment) into a
//! `nbgitops_core::ControllerConfig`, and loads the notification services
//! file (YAML layered with `NOTIFY_`-prefixed environment) into a ready
//! `Notifiers` fan-out.

use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use strum::{Display, EnumString};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use nbgitops_core::{ControllerConfig, GitAuth, Notifiers, RepositoryConfig, SlackNotifier};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("notification config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Startup settings ────────────────────────────────────────────────

/// Git authentication method names accepted on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum GitAuthMethod {
    #[default]
    None,
    Basic,
    Ssh,
}

/// Raw, unvalidated startup settings. Empty strings count as unset.
#[derive(Debug, Clone, Default)]
pub struct StartupSettings {
    pub repo_url: Option<String>,
    pub relative_path: Option<PathBuf>,
    pub branch: String,
    pub auth_method: String,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub private_key_path: Option<PathBuf>,
    pub private_key_password: Option<SecretString>,
    pub api_url: Option<String>,
    pub api_token: Option<SecretString>,
    pub sync_frequency: Duration,
    pub sync_once: bool,
    pub ca_cert: Option<PathBuf>,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

/// Repository-relative form of `raw`. A leading `/` is dropped so the
/// directory always resolves inside the checkout; `..` is rejected.
fn repository_path(raw: &Path) -> Result<PathBuf, ConfigError> {
    let mut path = PathBuf::new();
    for component in raw.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::Normal(part) => path.push(part),
            Component::ParentDir => {
                return Err(ConfigError::Validation {
                    field: "--git-relative-path",
                    reason: format!("{} points outside the repository", raw.display()),
                });
            }
        }
    }
    Ok(path)
}

fn present_secret(value: Option<&SecretString>) -> Option<SecretString> {
    value
        .filter(|s| !s.expose_secret().is_empty())
        .cloned()
}

impl StartupSettings {
    /// Validate into a controller configuration.
    pub fn into_controller_config(self) -> Result<ControllerConfig, ConfigError> {
        let api_token = present_secret(self.api_token.as_ref()).ok_or(ConfigError::Missing {
            field: "--netbird-token",
        })?;
        let api_url = present(self.api_url.as_ref()).ok_or(ConfigError::Missing {
            field: "--netbird-mgmt-api",
        })?;
        let api_url = Url::parse(api_url).map_err(|e| ConfigError::Validation {
            field: "--netbird-mgmt-api",
            reason: format!("{api_url}: {e}"),
        })?;
        let repo_url = present(self.repo_url.as_ref()).ok_or(ConfigError::Missing {
            field: "--git-repo-url",
        })?;

        if self.sync_frequency.is_zero() {
            return Err(ConfigError::Validation {
                field: "--sync-frequency",
                reason: "must be greater than zero".into(),
            });
        }

        let auth = self.git_auth()?;
        let relative_path = match &self.relative_path {
            Some(raw) => repository_path(raw)?,
            None => PathBuf::new(),
        };
        let ca_cert = self.ca_cert.clone().filter(|p| !p.as_os_str().is_empty());
        if let Some(path) = ca_cert.as_ref().filter(|p| !p.is_file()) {
            return Err(ConfigError::Validation {
                field: "--netbird-ca-cert",
                reason: format!("CA certificate not found at {}", path.display()),
            });
        }
        let branch = if self.branch.is_empty() {
            "main".to_owned()
        } else {
            self.branch.clone()
        };

        Ok(ControllerConfig {
            repository: RepositoryConfig {
                url: repo_url.to_owned(),
                branch,
                relative_path,
                auth,
            },
            api_url,
            api_token,
            poll_interval: self.sync_frequency,
            sync_once: self.sync_once,
            ca_cert,
        })
    }

    fn git_auth(&self) -> Result<GitAuth, ConfigError> {
        let method = if self.auth_method.is_empty() {
            GitAuthMethod::None
        } else {
            GitAuthMethod::from_str(&self.auth_method).map_err(|_| ConfigError::Validation {
                field: "--git-auth-method",
                reason: format!(
                    "expected 'none', 'basic' or 'ssh', got '{}'",
                    self.auth_method
                ),
            })?
        };

        match method {
            GitAuthMethod::None => Ok(GitAuth::None),
            GitAuthMethod::Basic => {
                let username = present(self.username.as_ref());
                let password = present_secret(self.password.as_ref());
                match (username, password) {
                    (Some(username), Some(password)) => Ok(GitAuth::Basic {
                        username: username.to_owned(),
                        password,
                    }),
                    _ => Err(ConfigError::Validation {
                        field: "--git-auth-method",
                        reason: "basic requires both --git-username and --git-password".into(),
                    }),
                }
            }
            GitAuthMethod::Ssh => {
                let key = self
                    .private_key_path
                    .clone()
                    .filter(|p| !p.as_os_str().is_empty())
                    .ok_or(ConfigError::Missing {
                        field: "--git-private-key-path",
                    })?;
                if !key.is_file() {
                    return Err(ConfigError::Validation {
                        field: "--git-private-key-path",
                        reason: format!("private key not found at {}", key.display()),
                    });
                }
                Ok(GitAuth::SshKey {
                    private_key: key,
                    passphrase: present_secret(self.private_key_password.as_ref()),
                })
            }
        }
    }
}

// ── Notification services ───────────────────────────────────────────

/// The notification services file.
#[derive(Debug, Default, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub slack: Option<SlackConfig>,
}

#[derive(Debug, Deserialize)]
pub struct SlackConfig {
    pub token: SecretString,
    #[serde(default)]
    pub channels: Vec<String>,
}

/// Load `path` layered with `NOTIFY_*` environment variables
/// (e.g. `NOTIFY_SLACK_TOKEN`). A missing file only disables the file layer.
pub fn load_notify_config(path: &Path) -> Result<NotifyConfig, ConfigError> {
    if !path.exists() {
        warn!(path = %path.display(), "notification services file not found");
    }

    let figment = Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed("NOTIFY_").split("_"));

    Ok(figment.extract()?)
}

/// Build the notifier fan-out for `config`.
pub fn build_notifiers(config: &NotifyConfig) -> Result<Notifiers, ConfigError> {
    let mut notifiers = Notifiers::new();
    if let Some(slack) = &config.slack {
        if slack.channels.is_empty() {
            warn!("slack configured without channels; notifications disabled");
        } else {
            let notifier = SlackNotifier::new(slack.token.clone(), slack.channels.clone())
                .map_err(|e| ConfigError::Validation {
                    field: "slack",
                    reason: e.to_string(),
                })?;
            info!(channels = slack.channels.len(), "slack notifications enabled");
            notifiers.push(notifier);
        }
    }
    Ok(notifiers)
}
