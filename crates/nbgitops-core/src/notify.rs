// ── Change notifications ──
//
// Best-effort, fire-and-forget messages about planned mutations and failed
// passes. Delivery never blocks the caller and failures are only logged.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

const SLACK_POST_MESSAGE: &str = "https://slack.com/api/chat.postMessage";

/// A sink for human-readable change notifications.
pub trait Notifier: Send + Sync {
    /// Queue a message. Must return immediately.
    fn notify(&self, subject: &str, message: &str);
}

/// Discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _subject: &str, _message: &str) {}
}

/// Fan-out over every configured notifier.
#[derive(Default)]
pub struct Notifiers {
    sinks: Vec<Box<dyn Notifier>>,
}

impl Notifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: impl Notifier + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl Notifier for Notifiers {
    fn notify(&self, subject: &str, message: &str) {
        for sink in &self.sinks {
            sink.notify(subject, message);
        }
    }
}

// ── Slack ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Posts each message to every configured Slack channel via `chat.postMessage`.
pub struct SlackNotifier {
    http: reqwest::Client,
    token: SecretString,
    channels: Vec<String>,
    endpoint: Url,
}

impl SlackNotifier {
    pub fn new(token: SecretString, channels: Vec<String>) -> Result<Self, url::ParseError> {
        Ok(Self {
            http: reqwest::Client::new(),
            token,
            channels,
            endpoint: Url::parse(SLACK_POST_MESSAGE)?,
        })
    }

    /// Point at a different `chat.postMessage` URL (self-hosted proxies, tests).
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }
}

impl Notifier for SlackNotifier {
    fn notify(&self, subject: &str, message: &str) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no async runtime; dropping slack notification");
            return;
        };

        let text = if subject.is_empty() {
            message.to_owned()
        } else {
            format!("*{subject}*\n{message}")
        };

        for channel in &self.channels {
            let request = self
                .http
                .post(self.endpoint.clone())
                .bearer_auth(self.token.expose_secret())
                .json(&serde_json::json!({ "channel": channel, "text": text }));
            let channel = channel.clone();

            runtime.spawn(async move {
                match request.send().await {
                    Ok(resp) => match resp.json::<SlackResponse>().await {
                        Ok(SlackResponse { ok: true, .. }) => {
                            debug!(channel, "slack notification delivered");
                        }
                        Ok(SlackResponse { error, .. }) => {
                            warn!(channel, error = ?error, "slack rejected notification");
                        }
                        Err(e) => warn!(channel, error = %e, "unreadable slack response"),
                    },
                    Err(e) => warn!(channel, error = %e, "failed to send slack notification"),
                }
            });
        }
    }
}
