use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::rules::Thresholds;

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub thresholds: Thresholds,
    pub scan: ScanConfig,
    pub kubectl: KubectlConfig,
    pub api: ApiConfig,
    pub probe: ProbeConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanConfig {
    /// `None` or `all` scans every namespace.
    pub namespace: Option<String>,
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct KubectlConfig {
    pub path: String,
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub url: Option<String>,
    pub credentials: Option<PathBuf>,
    pub insecure: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeConfig {
    pub timeout_secs: u64,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            scan: ScanConfig {
                namespace: None,
                verbose: false,
            },
            kubectl: KubectlConfig {
                path: "kubectl".to_string(),
                kubeconfig: None,
                context: None,
            },
            api: ApiConfig {
                url: None,
                credentials: None,
                insecure: false,
            },
            probe: ProbeConfig { timeout_secs: 30 },
            config_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    thresholds: Option<RawThresholdsConfig>,
    scan: Option<RawScanConfig>,
    kubectl: Option<RawKubectlConfig>,
    api: Option<RawApiConfig>,
    probe: Option<RawProbeConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawThresholdsConfig {
    warn: Option<i64>,
    critical: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScanConfig {
    namespace: Option<String>,
    verbose: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawKubectlConfig {
    path: Option<String>,
    kubeconfig: Option<PathBuf>,
    context: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawApiConfig {
    url: Option<String>,
    credentials: Option<PathBuf>,
    insecure: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProbeConfig {
    timeout_secs: Option<u64>,
}

pub fn default_config_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/kubepods-probe/config.toml")
}

/// Defaults, then the TOML file, then `KUBEPODS_PROBE_*` environment variables.
/// Command-line flags are layered on top by the caller.
pub fn load(config_path: Option<&Path>, home_dir: Option<&Path>) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::default();

    let path = config_path
        .map(ToOwned::to_owned)
        .or_else(|| home_dir.map(default_config_path));

    if let Some(path) = path {
        // An explicitly named file must exist; the default one is optional.
        if path.exists() || config_path.is_some() {
            let s = std::fs::read_to_string(&path).with_context(|| {
                format!("failed to read config file: {}", path.display())
            })?;
            let raw: RawConfig = toml::from_str(&s)
                .with_context(|| format!("failed to parse config file (TOML): {}", path.display()))?;
            apply_raw_config(&mut cfg, raw);
            cfg.config_path = Some(path.display().to_string());
        }
    }

    apply_env_overrides(&mut cfg)?;

    Ok(cfg)
}

fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig) {
    if let Some(thresholds) = raw.thresholds {
        if let Some(warn) = thresholds.warn {
            cfg.thresholds.warn = warn;
        }
        if let Some(critical) = thresholds.critical {
            cfg.thresholds.critical = critical;
        }
    }

    if let Some(scan) = raw.scan {
        if let Some(namespace) = scan.namespace {
            cfg.scan.namespace = Some(namespace);
        }
        if let Some(verbose) = scan.verbose {
            cfg.scan.verbose = verbose;
        }
    }

    if let Some(kubectl) = raw.kubectl {
        if let Some(path) = kubectl.path {
            cfg.kubectl.path = path;
        }
        if kubectl.kubeconfig.is_some() {
            cfg.kubectl.kubeconfig = kubectl.kubeconfig;
        }
        if kubectl.context.is_some() {
            cfg.kubectl.context = kubectl.context;
        }
    }

    if let Some(api) = raw.api {
        if api.url.is_some() {
            cfg.api.url = api.url;
        }
        if api.credentials.is_some() {
            cfg.api.credentials = api.credentials;
        }
        if let Some(insecure) = api.insecure {
            cfg.api.insecure = insecure;
        }
    }

    if let Some(probe) = raw.probe {
        if let Some(timeout_secs) = probe.timeout_secs {
            cfg.probe.timeout_secs = timeout_secs;
        }
    }
}

fn apply_env_overrides(cfg: &mut EffectiveConfig) -> Result<()> {
    if let Ok(v) = std::env::var("KUBEPODS_PROBE_WARN") {
        cfg.thresholds.warn = parse_threshold(&v).with_context(|| "KUBEPODS_PROBE_WARN")?;
    }
    if let Ok(v) = std::env::var("KUBEPODS_PROBE_CRITICAL") {
        cfg.thresholds.critical =
            parse_threshold(&v).with_context(|| "KUBEPODS_PROBE_CRITICAL")?;
    }
    if let Ok(v) = std::env::var("KUBEPODS_PROBE_NAMESPACE") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.scan.namespace = Some(v.to_string());
        }
    }
    if let Ok(v) = std::env::var("KUBEPODS_PROBE_VERBOSE") {
        cfg.scan.verbose = parse_bool(&v).with_context(|| "KUBEPODS_PROBE_VERBOSE")?;
    }
    if let Ok(v) = std::env::var("KUBEPODS_PROBE_TIMEOUT") {
        cfg.probe.timeout_secs = v
            .trim()
            .parse::<u64>()
            .with_context(|| "KUBEPODS_PROBE_TIMEOUT")?;
    }

    Ok(())
}

/// Checks that only make sense once every layer has been applied.
pub fn validate(cfg: &EffectiveConfig) -> Result<()> {
    if cfg.probe.timeout_secs == 0 {
        return Err(anyhow::anyhow!(
            "timeout must be at least 1 second (got 0)"
        ));
    }
    Ok(())
}

/// Thresholds must be integers; nothing is coerced to zero.
pub fn parse_threshold(s: &str) -> Result<i64> {
    let s = s.trim();
    s.parse::<i64>()
        .map_err(|_| anyhow::anyhow!("threshold must be an integer: {s:?}"))
}

fn parse_bool(s: &str) -> Result<bool> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!(
            "invalid boolean: {s} (expected true|false|1|0|yes|no|on|off)"
        )),
    }
}
