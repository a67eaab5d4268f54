// ── Controller ──
//
// Owns the git checkout, the management API handle and the notifier, and
// drives reconciliation: one pass at startup, then one pass per tick until
// cancelled. A tick that fails (pull, parse or pass) is logged, notified and
// retried on the next tick.

use git2::Oid;
use nbgitops_api::{ManagementClient, TransportConfig};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::autosync::{self, PassMode};
use crate::config::ControllerConfig;
use crate::desired;
use crate::error::CoreError;
use crate::model::{AutoSyncMode, DesiredState};
use crate::notify::Notifier;
use crate::remote::ManagementApi;
use crate::source::GitCheckout;
use crate::sync::{PassSummary, run_pass};

/// Build the production API client for `config`.
pub fn management_client(config: &ControllerConfig) -> Result<ManagementClient, CoreError> {
    let transport = TransportConfig::with_ca_cert(config.ca_cert.clone());
    Ok(ManagementClient::from_token(
        config.api_url.as_str(),
        &config.api_token,
        &transport,
    )?)
}

/// The reconciliation controller.
pub struct Controller<A> {
    config: ControllerConfig,
    api: A,
    notifier: Box<dyn Notifier>,
}

impl Controller<ManagementClient> {
    /// Controller talking to the management API named in `config`.
    pub fn new(config: ControllerConfig, notifier: Box<dyn Notifier>) -> Result<Self, CoreError> {
        let api = management_client(&config)?;
        Ok(Self::with_api(config, api, notifier))
    }
}

impl<A: ManagementApi> Controller<A> {
    pub fn with_api(config: ControllerConfig, api: A, notifier: Box<dyn Notifier>) -> Self {
        Self {
            config,
            api,
            notifier,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Clone the repository and reconcile until `cancel` fires.
    ///
    /// With `sync_once` a single live pass runs and its result is returned.
    /// Otherwise startup errors are returned and later failures only logged.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), CoreError> {
        let checkout = GitCheckout::clone_repository(&self.config.repository)?;
        let mut previous = checkout.head()?;
        let state = desired::load_dir(&checkout.config_dir())?;

        let first = if !self.config.sync_once && state.settings.auto_sync == AutoSyncMode::Manual {
            PassMode::DryRun
        } else {
            PassMode::Live
        };
        info!(head = %previous, mode = %state.settings.auto_sync, pass = %first, "initial sync");
        let result = self.pass(&state, first).await;
        if self.config.sync_once {
            return result.map(|_| ());
        }

        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval.tick().await; // consume the immediate first tick

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    if let Some(head) = self.tick(&checkout, &previous).await {
                        previous = head;
                    }
                }
            }
        }

        info!("controller stopped");
        Ok(())
    }

    /// One scheduled pass. Returns the new baseline head, or `None` when the
    /// checkout could not be updated.
    async fn tick(&self, checkout: &GitCheckout, previous: &Oid) -> Option<Oid> {
        let head = match checkout.pull() {
            Ok(head) => head,
            Err(e) => {
                warn!(error = %e, "failed to pull repository");
                self.notifier.notify("Git pull failed", &e.to_string());
                return None;
            }
        };

        let state = match desired::load_dir(&checkout.config_dir()) {
            Ok(state) => state,
            Err(e) => {
                error!(error = %e, head = %head, "failed to load configuration");
                self.notifier
                    .notify("Failed to load configuration", &e.to_string());
                return Some(head);
            }
        };

        let mode = autosync::evaluate(
            state.settings.auto_sync,
            checkout,
            previous,
            &head,
            checkout.relative_path(),
        );
        debug!(head = %head, previous = %previous, pass = %mode, "scheduled sync");
        if self.pass(&state, mode).await.is_err() {
            debug!("retrying on next tick");
        }
        Some(head)
    }

    async fn pass(
        &self,
        state: &DesiredState,
        mode: PassMode,
    ) -> Result<PassSummary, CoreError> {
        run_pass(&self.api, self.notifier.as_ref(), state, mode.is_dry_run()).await
    }
}

impl std::fmt::Debug for Controller<ManagementClient> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("repository", &self.config.repository.url)
            .field("api", &self.api.base_url().as_str())
            .finish_non_exhaustive()
    }
}
