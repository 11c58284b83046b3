//! HTTP liveness probes

use super::{Probe, ProbeOutcome};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct HealthBody {
    #[serde(default)]
    status: String,
}

/// Asks a relay's `/health` endpoint
///
/// Success with `status: "ok"` is reachable and a readable body with any
/// other status is unreachable. Error statuses and unreadable bodies are
/// unreachable for a definitive probe and inconclusive otherwise. Transport
/// errors are always inconclusive.
pub struct RelayHealthProbe {
    name: String,
    client: Client,
    url: String,
    definitive: bool,
}

impl RelayHealthProbe {
    /// Create a probe for `<relay_base>/health`
    pub fn new(name: &str, client: Client, relay_base: &str, definitive: bool) -> Self {
        Self {
            name: name.to_string(),
            client,
            url: format!("{}/health", relay_base.trim_end_matches('/')),
            definitive,
        }
    }

    fn negative(&self) -> ProbeOutcome {
        if self.definitive {
            ProbeOutcome::Unreachable
        } else {
            ProbeOutcome::Inconclusive
        }
    }
}

#[async_trait]
impl Probe for RelayHealthProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn probe(&self) -> ProbeOutcome {
        let response = match self.client.get(&self.url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(url = %self.url, "Relay health request failed: {}", e);
                return ProbeOutcome::Inconclusive;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(url = %self.url, status = %response.status(), "Relay reports model server down");
            return self.negative();
        }

        match response.json::<HealthBody>().await {
            Ok(body) if body.status == "ok" => ProbeOutcome::Reachable,
            Ok(body) => {
                tracing::debug!(status = %body.status, "Relay health status is not ok");
                ProbeOutcome::Unreachable
            }
            Err(e) => {
                tracing::debug!("Unreadable relay health body: {}", e);
                self.negative()
            }
        }
    }
}

/// HEAD request straight at the model server with a cache-busting query
pub struct DirectHeadProbe {
    client: Client,
    url: String,
    ambiguous_errors_reachable: bool,
}

impl DirectHeadProbe {
    /// Create a probe for `url` (normally `<upstream>/tags`)
    pub fn new(client: Client, url: &str, ambiguous_errors_reachable: bool) -> Self {
        Self {
            client,
            url: url.to_string(),
            ambiguous_errors_reachable,
        }
    }
}

#[async_trait]
impl Probe for DirectHeadProbe {
    fn name(&self) -> &str {
        "direct-head"
    }

    async fn probe(&self) -> ProbeOutcome {
        let stamp = chrono::Utc::now().timestamp_millis().to_string();
        match self
            .client
            .head(&self.url)
            .query(&[("_", stamp.as_str())])
            .send()
            .await
        {
            Ok(response) if response.status().is_success() || response.status().is_redirection() => {
                ProbeOutcome::Reachable
            }
            Ok(response) => {
                tracing::debug!(status = %response.status(), "Direct HEAD returned an error status");
                ProbeOutcome::Inconclusive
            }
            Err(e) if e.is_timeout() => ProbeOutcome::Inconclusive,
            Err(e) => {
                tracing::debug!("Direct HEAD failed: {}", e);
                if self.ambiguous_errors_reachable {
                    ProbeOutcome::Reachable
                } else {
                    ProbeOutcome::Inconclusive
                }
            }
        }
    }
}

/// Request whose body is never read; any completed exchange is reachable
pub struct OpaqueProbe {
    client: Client,
    url: String,
}

impl OpaqueProbe {
    /// Create a probe for `url`
    pub fn new(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl Probe for OpaqueProbe {
    fn name(&self) -> &str {
        "opaque"
    }

    async fn probe(&self) -> ProbeOutcome {
        match self
            .client
            .head(&self.url)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
        {
            Ok(_) => ProbeOutcome::Reachable,
            Err(e) => {
                tracing::debug!("Opaque request failed: {}", e);
                ProbeOutcome::Inconclusive
            }
        }
    }
}

/// Loads the URL as an image resource
///
/// Any answer proves an HTTP server is listening, decodable or not. Only a
/// timeout is negative, and a transport error is negative when ambiguous
/// errors are not counted as reachable.
pub struct ResourcePingProbe {
    client: Client,
    url: String,
    ambiguous_errors_reachable: bool,
}

impl ResourcePingProbe {
    /// Create a probe for `url`
    pub fn new(client: Client, url: &str, ambiguous_errors_reachable: bool) -> Self {
        Self {
            client,
            url: url.to_string(),
            ambiguous_errors_reachable,
        }
    }
}

#[async_trait]
impl Probe for ResourcePingProbe {
    fn name(&self) -> &str {
        "resource-ping"
    }

    async fn probe(&self) -> ProbeOutcome {
        match self
            .client
            .get(&self.url)
            .header(ACCEPT, "image/*")
            .send()
            .await
        {
            Ok(_) => ProbeOutcome::Reachable,
            Err(e) if e.is_timeout() => ProbeOutcome::Unreachable,
            Err(e) => {
                tracing::debug!("Resource ping failed: {}", e);
                if self.ambiguous_errors_reachable {
                    ProbeOutcome::Reachable
                } else {
                    ProbeOutcome::Unreachable
                }
            }
        }
    }

    fn on_timeout(&self) -> ProbeOutcome {
        ProbeOutcome::Unreachable
    }
}
