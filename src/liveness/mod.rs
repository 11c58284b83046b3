//! Model server liveness detection
//!
//! The detector runs an ordered list of probes. Each probe answers
//! reachable, unreachable or inconclusive; the first answer that is not
//! inconclusive wins and an all-inconclusive run counts as unreachable.
//! A positive answer is cached for the lifetime of the detector.

pub mod probes;

use crate::config::ClientConfig;
use crate::error::{DocchatError, Result};
use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub use probes::{DirectHeadProbe, OpaqueProbe, RelayHealthProbe, ResourcePingProbe};

/// Whether a transport error on a direct probe counts as "something answered"
///
/// A refused cross-origin read still needs a server on the other end, so
/// an unreadable failure is taken as reachable. Flipping this trades false
/// positives for false negatives.
pub const AMBIGUOUS_ERROR_MEANS_REACHABLE: bool = true;

/// Result of a single probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The model server answered
    Reachable,
    /// The probe observed a definitive negative
    Unreachable,
    /// The probe could not tell; try the next one
    Inconclusive,
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reachable => write!(f, "reachable"),
            Self::Unreachable => write!(f, "unreachable"),
            Self::Inconclusive => write!(f, "inconclusive"),
        }
    }
}

/// A single liveness strategy
#[async_trait]
pub trait Probe: Send + Sync {
    /// Name used in logs and reports
    fn name(&self) -> &str;

    /// Run the probe once
    async fn probe(&self) -> ProbeOutcome;

    /// Outcome when the probe exceeds the detector's time bound
    fn on_timeout(&self) -> ProbeOutcome {
        ProbeOutcome::Inconclusive
    }
}

/// One line of a probe report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    /// Probe name
    pub probe: String,
    /// What it answered
    pub outcome: ProbeOutcome,
}

/// Ordered probe cascade with a sticky positive cache
///
/// # Examples
///
/// ```
/// use docchat::config::ClientConfig;
/// use docchat::liveness::LivenessDetector;
///
/// let detector = LivenessDetector::from_config(&ClientConfig::default()).unwrap();
/// assert_eq!(detector.probe_names().len(), 5);
/// assert!(!detector.is_cached());
/// ```
pub struct LivenessDetector {
    probes: Vec<Box<dyn Probe>>,
    probe_timeout: Duration,
    reachable: AtomicBool,
}

impl LivenessDetector {
    /// Create a detector from explicit probes
    ///
    /// # Arguments
    ///
    /// * `probes` - Probes in the order they are tried
    /// * `probe_timeout` - Upper bound for each probe
    pub fn new(probes: Vec<Box<dyn Probe>>, probe_timeout: Duration) -> Self {
        Self {
            probes,
            probe_timeout,
            reachable: AtomicBool::new(false),
        }
    }

    /// Build the standard cascade from client configuration
    ///
    /// Order: primary relay health, fallback relay health (when configured),
    /// direct HEAD, opaque request, resource ping.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.probe_timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .user_agent(concat!("docchat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DocchatError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let ambiguous = config.ambiguous_errors_reachable;
        let upstream_tags = format!("{}/tags", config.upstream_url.trim_end_matches('/'));

        let mut probes: Vec<Box<dyn Probe>> = vec![Box::new(RelayHealthProbe::new(
            "relay-health",
            client.clone(),
            &config.relay_url,
            true,
        ))];
        if let Some(fallback) = &config.fallback_relay_url {
            probes.push(Box::new(RelayHealthProbe::new(
                "relay-health-fallback",
                client.clone(),
                fallback,
                false,
            )));
        }
        probes.push(Box::new(DirectHeadProbe::new(
            client.clone(),
            &upstream_tags,
            ambiguous,
        )));
        probes.push(Box::new(OpaqueProbe::new(client.clone(), &upstream_tags)));
        probes.push(Box::new(ResourcePingProbe::new(
            client,
            &upstream_tags,
            ambiguous,
        )));

        Ok(Self::new(probes, timeout))
    }

    /// Names of the configured probes, in order
    pub fn probe_names(&self) -> Vec<&str> {
        self.probes.iter().map(|p| p.name()).collect()
    }

    /// Whether a positive result is cached
    pub fn is_cached(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }

    /// Whether the model server is reachable
    ///
    /// Returns the cached answer once any run was positive; otherwise runs
    /// the cascade. Never fails and never waits longer than the probe
    /// timeout per probe.
    pub async fn is_reachable(&self) -> bool {
        if self.is_cached() {
            tracing::debug!("Liveness cached as reachable");
            return true;
        }
        self.run().await
    }

    /// Forget a cached positive and probe again
    pub async fn recheck(&self) -> bool {
        self.reachable.store(false, Ordering::SeqCst);
        self.run().await
    }

    /// Run every probe and report each outcome, ignoring the cache
    ///
    /// The cache is updated when any probe reports reachable.
    pub async fn report(&self) -> Vec<ProbeReport> {
        let mut reports = Vec::with_capacity(self.probes.len());
        for probe in &self.probes {
            let outcome = self.run_probe(probe.as_ref()).await;
            reports.push(ProbeReport {
                probe: probe.name().to_string(),
                outcome,
            });
        }
        if reports.iter().any(|r| r.outcome == ProbeOutcome::Reachable) {
            self.reachable.store(true, Ordering::SeqCst);
        }
        reports
    }

    async fn run(&self) -> bool {
        for probe in &self.probes {
            match self.run_probe(probe.as_ref()).await {
                ProbeOutcome::Reachable => {
                    tracing::info!(probe = probe.name(), "Model server is reachable");
                    self.reachable.store(true, Ordering::SeqCst);
                    return true;
                }
                ProbeOutcome::Unreachable => {
                    tracing::warn!(probe = probe.name(), "Model server is not reachable");
                    return false;
                }
                ProbeOutcome::Inconclusive => continue,
            }
        }
        tracing::warn!("All liveness probes were inconclusive; treating as unreachable");
        false
    }

    async fn run_probe(&self, probe: &dyn Probe) -> ProbeOutcome {
        let outcome = match tokio::time::timeout(self.probe_timeout, probe.probe()).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::debug!(probe = probe.name(), "Probe timed out");
                probe.on_timeout()
            }
        };
        tracing::debug!(probe = probe.name(), %outcome, "Probe finished");
        outcome
    }
}

impl fmt::Debug for LivenessDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LivenessDetector")
            .field("probes", &self.probe_names())
            .field("probe_timeout", &self.probe_timeout)
            .field("reachable", &self.is_cached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    struct FixedProbe {
        name: String,
        outcome: ProbeOutcome,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Probe for FixedProbe {
        fn name(&self) -> &str {
            &self.name
        }

        async fn probe(&self) -> ProbeOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome
        }
    }

    struct SlowProbe {
        timeout_outcome: ProbeOutcome,
    }

    #[async_trait]
    impl Probe for SlowProbe {
        fn name(&self) -> &str {
            "slow"
        }

        async fn probe(&self) -> ProbeOutcome {
            tokio::time::sleep(Duration::from_secs(30)).await;
            ProbeOutcome::Reachable
        }

        fn on_timeout(&self) -> ProbeOutcome {
            self.timeout_outcome
        }
    }

    fn fixed(name: &str, outcome: ProbeOutcome) -> (Box<dyn Probe>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let probe = FixedProbe {
            name: name.to_string(),
            outcome,
            calls: calls.clone(),
        };
        (Box::new(probe), calls)
    }

    #[tokio::test]
    async fn test_first_decisive_outcome_wins() {
        let (a, a_calls) = fixed("a", ProbeOutcome::Inconclusive);
        let (b, b_calls) = fixed("b", ProbeOutcome::Unreachable);
        let (c, c_calls) = fixed("c", ProbeOutcome::Reachable);
        let detector = LivenessDetector::new(vec![a, b, c], Duration::from_millis(100));

        assert!(!detector.is_reachable().await);
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
        assert_eq!(c_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_all_inconclusive_is_unreachable() {
        let (a, _) = fixed("a", ProbeOutcome::Inconclusive);
        let (b, _) = fixed("b", ProbeOutcome::Inconclusive);
        let detector = LivenessDetector::new(vec![a, b], Duration::from_millis(100));
        assert!(!detector.is_reachable().await);
        assert!(!detector.is_cached());
    }

    #[tokio::test]
    async fn test_no_probes_is_unreachable() {
        let detector = LivenessDetector::new(Vec::new(), Duration::from_millis(100));
        assert!(!detector.is_reachable().await);
    }

    #[tokio::test]
    async fn test_positive_result_is_cached() {
        let (a, calls) = fixed("a", ProbeOutcome::Reachable);
        let detector = LivenessDetector::new(vec![a], Duration::from_millis(100));

        assert!(detector.is_reachable().await);
        assert!(detector.is_reachable().await);
        assert!(detector.is_reachable().await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(detector.is_cached());
    }

    #[tokio::test]
    async fn test_negative_result_is_not_cached() {
        let (a, calls) = fixed("a", ProbeOutcome::Unreachable);
        let detector = LivenessDetector::new(vec![a], Duration::from_millis(100));

        assert!(!detector.is_reachable().await);
        assert!(!detector.is_reachable().await);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_recheck_probes_again() {
        let (a, calls) = fixed("a", ProbeOutcome::Reachable);
        let detector = LivenessDetector::new(vec![a], Duration::from_millis(100));

        assert!(detector.is_reachable().await);
        assert!(detector.recheck().await);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timeout_uses_probe_timeout_outcome() {
        let (next, next_calls) = fixed("next", ProbeOutcome::Reachable);
        let detector = LivenessDetector::new(
            vec![
                Box::new(SlowProbe {
                    timeout_outcome: ProbeOutcome::Inconclusive,
                }),
                next,
            ],
            Duration::from_millis(50),
        );
        assert!(detector.is_reachable().await);
        assert_eq!(next_calls.load(Ordering::SeqCst), 1);

        let detector = LivenessDetector::new(
            vec![Box::new(SlowProbe {
                timeout_outcome: ProbeOutcome::Unreachable,
            })],
            Duration::from_millis(50),
        );
        assert!(!detector.is_reachable().await);
    }

    #[tokio::test]
    async fn test_report_runs_every_probe() {
        let (a, _) = fixed("a", ProbeOutcome::Unreachable);
        let (b, _) = fixed("b", ProbeOutcome::Reachable);
        let detector = LivenessDetector::new(vec![a, b], Duration::from_millis(100));

        let reports = detector.report().await;
        assert_eq!(
            reports,
            vec![
                ProbeReport {
                    probe: "a".to_string(),
                    outcome: ProbeOutcome::Unreachable
                },
                ProbeReport {
                    probe: "b".to_string(),
                    outcome: ProbeOutcome::Reachable
                },
            ]
        );
        assert!(detector.is_cached());
    }

    #[test]
    fn test_from_config_without_fallback() {
        let config = ClientConfig {
            fallback_relay_url: None,
            ..ClientConfig::default()
        };
        let detector = LivenessDetector::from_config(&config).unwrap();
        assert_eq!(
            detector.probe_names(),
            vec!["relay-health", "direct-head", "opaque", "resource-ping"]
        );
    }
}
