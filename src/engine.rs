use std::time::Duration;

use anyhow::{Context, Result};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::{
    Aggregator, NamespaceSummary, PodRecord, Report, ScanResult, Severity, decode_pod_list,
};
use crate::rules::{Thresholds, evaluate_condition, evaluate_restarts};
use crate::source::PodSource;

/// Headline printed when the scan was aborted before any verdict.
pub const CONNECTION_FAILURE_HEADLINE: &str = "UNKNOWN - unable to connect to Kubernetes cluster!";

/// Smallest document that can still be a pod list: `{"items":[]}`.
const MIN_PAYLOAD_BYTES: usize = r#"{"items":[]}"#.len();

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub thresholds: Thresholds,
    pub verbose: bool,
    pub show_progress: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceTarget {
    All,
    Only(String),
}

impl NamespaceTarget {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("all") => NamespaceTarget::All,
            Some(ns) => NamespaceTarget::Only(ns.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct Engine {
    opts: EngineOptions,
}

impl Engine {
    pub fn new(opts: EngineOptions) -> Self {
        Self { opts }
    }

    /// One full pass over the targeted namespaces. Any acquisition failure
    /// aborts the whole scan; remaining namespaces are not fetched.
    pub fn scan(&self, source: &dyn PodSource, target: &NamespaceTarget) -> Result<Report> {
        log::debug!(
            "scanning via {} (warn={} critical={})",
            source.describe(),
            self.opts.thresholds.warn,
            self.opts.thresholds.critical
        );

        let namespaces = match target {
            NamespaceTarget::All => source.namespaces().context("namespace discovery")?,
            NamespaceTarget::Only(ns) => vec![ns.clone()],
        };

        use std::io::IsTerminal;
        let pb = if self.opts.show_progress && std::io::stderr().is_terminal() {
            let pb = indicatif::ProgressBar::new_spinner();
            pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
            pb.enable_steady_tick(Duration::from_millis(120));
            Some(pb)
        } else {
            None
        };

        let mut agg = Aggregator::new();
        let mut summaries = Vec::with_capacity(namespaces.len());
        for ns in &namespaces {
            if let Some(pb) = &pb {
                pb.set_message(format!("scanning namespace {ns}"));
            }
            let pods = match self.fetch_pods(source, ns) {
                Ok(pods) => pods,
                Err(err) => {
                    if let Some(pb) = &pb {
                        pb.finish_and_clear();
                    }
                    return Err(err);
                }
            };
            log::debug!("namespace {ns}: {} pods", pods.len());

            for pod in &pods {
                self.evaluate_pod(pod, &mut agg);
            }
            summaries.push(NamespaceSummary {
                name: ns.clone(),
                pods: pods.len(),
            });
        }

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        Ok(report_from_result(agg.finalize(), summaries))
    }

    fn fetch_pods(&self, source: &dyn PodSource, ns: &str) -> Result<Vec<PodRecord>> {
        let payload = source
            .pods(ns)
            .with_context(|| format!("namespace {ns}"))?;
        check_payload(&payload).with_context(|| format!("namespace {ns}"))?;
        decode_pod_list(&payload)
            .with_context(|| format!("namespace {ns}"))
            .map_err(crate::exit::connection_err)
    }

    /// Conditions first, then containers, each in payload order.
    pub fn evaluate_pod(&self, pod: &PodRecord, agg: &mut Aggregator) {
        for condition in &pod.conditions {
            if let Some(finding) = evaluate_condition(
                &pod.name,
                &condition.condition_type,
                &condition.status,
                self.opts.verbose,
            ) {
                agg.record(finding);
            }
        }

        for container in &pod.containers {
            if let Some(finding) = evaluate_restarts(
                &pod.name,
                &container.name,
                container.ready,
                container.restart_count,
                self.opts.thresholds,
            ) {
                agg.record(finding);
            }
        }
    }
}

fn check_payload(payload: &str) -> Result<()> {
    let len = payload.trim().len();
    if len < MIN_PAYLOAD_BYTES {
        return Err(crate::exit::connection(format!(
            "pod list payload too small ({len} bytes)"
        )));
    }
    Ok(())
}

fn report_from_result(result: ScanResult, namespaces: Vec<NamespaceSummary>) -> Report {
    Report {
        schema_version: "1.0".to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        generated_at: now_rfc3339(),
        status: result.severity,
        exit_code: result.severity.exit_code(),
        headline: result.severity.headline().to_string(),
        namespaces,
        lines: result.lines,
    }
}

/// Report for a scan aborted before any verdict: UNKNOWN, no findings.
pub fn connection_failure_report() -> Report {
    Report {
        schema_version: "1.0".to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        generated_at: now_rfc3339(),
        status: Severity::Unknown,
        exit_code: Severity::Unknown.exit_code(),
        headline: CONNECTION_FAILURE_HEADLINE.to_string(),
        namespaces: vec![],
        lines: vec![],
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}
