use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use crate::config::EffectiveConfig;
use crate::engine::{Engine, EngineOptions, NamespaceTarget};
use crate::exit::ExitCode;
use crate::rules::Thresholds;
use crate::source::{ApiSource, KubectlSource, PodSource};

#[derive(Debug, Parser)]
#[command(
    name = "kubepods-probe",
    version,
    about = "Check Kubernetes pod conditions and container restarts (monitoring-plugin exit codes)"
)]
pub struct Cli {
    /// Restart count above which a container is WARNING
    #[arg(short = 'w', long)]
    pub warn: Option<i64>,
    /// Restart count above which a container is CRITICAL
    #[arg(short = 'c', long)]
    pub critical: Option<i64>,
    /// Namespace to check; `all` scans every namespace
    #[arg(short = 'n', long)]
    pub namespace: Option<String>,
    /// Also report conditions that are True
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// kubectl binary to run
    #[arg(long)]
    pub kubectl: Option<String>,
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,
    #[arg(long)]
    pub context: Option<String>,

    /// Kubernetes API server URL; switches from kubectl to direct API access
    #[arg(short = 't', long = "api-url")]
    pub api_url: Option<String>,
    /// File holding the bearer token for --api-url
    #[arg(short = 'T', long)]
    pub credentials: Option<PathBuf>,
    /// Skip TLS certificate verification for --api-url
    #[arg(long)]
    pub insecure: bool,

    /// Seconds allowed per kubectl call or HTTP request
    #[arg(long)]
    pub timeout: Option<u64>,
    #[arg(long)]
    pub json: bool,
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Print the effective configuration and exit
    #[arg(long)]
    pub show_config: bool,
    /// Debug logging on stderr
    #[arg(long)]
    pub debug: bool,
    /// Print a shell completion script (bash|zsh|fish) and exit
    #[arg(long, value_name = "SHELL")]
    pub completion: Option<String>,
}

impl Cli {
    fn init_logging(&self) {
        let level = if self.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        };
        let _ = env_logger::Builder::from_default_env()
            .filter_level(level)
            .target(env_logger::Target::Stderr)
            .try_init();
    }
}

/// Runs one probe invocation and returns the process exit code.
pub fn run() -> Result<i32> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return Ok(if err.use_stderr() {
                ExitCode::InvalidConfig.as_i32()
            } else {
                ExitCode::Ok.as_i32()
            });
        }
    };
    cli.init_logging();

    if let Some(shell) = &cli.completion {
        let shell = parse_shell(shell)?;
        let mut cmd = Cli::command();
        let mut out = std::io::stdout().lock();
        clap_complete::generate(shell, &mut cmd, "kubepods-probe", &mut out);
        return Ok(ExitCode::Ok.as_i32());
    }

    let home_dir = crate::platform::effective_home_dir().ok();
    let env_config_path = std::env::var_os("KUBEPODS_PROBE_CONFIG").map(PathBuf::from);
    let mut cfg = crate::config::load(
        cli.config.as_deref().or(env_config_path.as_deref()),
        home_dir.as_deref(),
    )
    .map_err(crate::exit::invalid_config_err)?;
    apply_cli_overrides(&mut cfg, &cli);
    crate::config::validate(&cfg).map_err(crate::exit::invalid_config_err)?;
    if let Some(path) = &cfg.config_path {
        log::debug!("loaded config from {path}");
    }

    if cli.show_config {
        if cli.json {
            write_json(&cfg)?;
        } else {
            print!("{}", toml::to_string_pretty(&cfg)?);
        }
        return Ok(ExitCode::Ok.as_i32());
    }

    let source = build_source(&cfg)?;
    let target = NamespaceTarget::parse(cfg.scan.namespace.as_deref());
    let engine = Engine::new(EngineOptions {
        thresholds: cfg.thresholds,
        verbose: cfg.scan.verbose,
        show_progress: !cli.json && !cli.debug,
    });

    let report = match engine.scan(source.as_ref(), &target) {
        Ok(report) => report,
        Err(err) => {
            if crate::exit::is_connection_failure(&err) {
                if cli.json {
                    write_json(&crate::engine::connection_failure_report())?;
                } else {
                    crate::ui::print_connection_failure();
                }
            }
            return Err(err);
        }
    };
    if cli.json {
        write_json(&report)?;
    } else {
        crate::ui::print_report(&report);
    }

    Ok(ExitCode::from_severity(report.status).as_i32())
}

fn apply_cli_overrides(cfg: &mut EffectiveConfig, cli: &Cli) {
    let Thresholds { warn, critical } = cfg.thresholds;
    cfg.thresholds = Thresholds {
        warn: cli.warn.unwrap_or(warn),
        critical: cli.critical.unwrap_or(critical),
    };
    if let Some(namespace) = &cli.namespace {
        cfg.scan.namespace = Some(namespace.clone());
    }
    if cli.verbose {
        cfg.scan.verbose = true;
    }
    if let Some(kubectl) = &cli.kubectl {
        cfg.kubectl.path = kubectl.clone();
    }
    if cli.kubeconfig.is_some() {
        cfg.kubectl.kubeconfig = cli.kubeconfig.clone();
    }
    if cli.context.is_some() {
        cfg.kubectl.context = cli.context.clone();
    }
    if cli.api_url.is_some() {
        cfg.api.url = cli.api_url.clone();
    }
    if cli.credentials.is_some() {
        cfg.api.credentials = cli.credentials.clone();
    }
    if cli.insecure {
        cfg.api.insecure = true;
    }
    if let Some(timeout) = cli.timeout {
        cfg.probe.timeout_secs = timeout;
    }
}

fn build_source(cfg: &EffectiveConfig) -> Result<Box<dyn PodSource>> {
    let timeout = Duration::from_secs(cfg.probe.timeout_secs);
    if let Some(url) = &cfg.api.url {
        let Some(credentials) = &cfg.api.credentials else {
            return Err(crate::exit::invalid_config(
                "--api-url requires a credentials file (--credentials)",
            ));
        };
        return Ok(Box::new(ApiSource::new(
            url,
            credentials,
            cfg.api.insecure,
            timeout,
        )?));
    }

    Ok(Box::new(KubectlSource {
        program: cfg.kubectl.path.clone(),
        kubeconfig: cfg.kubectl.kubeconfig.clone(),
        context: cfg.kubectl.context.clone(),
        timeout,
    }))
}

fn write_json<T: serde::Serialize>(value: &T) -> Result<()> {
    use std::io::Write;

    let buf = serde_json::to_vec_pretty(value)?;

    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(&buf) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => return Ok(()),
        Err(err) => return Err(err.into()),
    }
    match stdout.write_all(b"\n") {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn parse_shell(s: &str) -> Result<clap_complete::Shell> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "bash" => Ok(clap_complete::Shell::Bash),
        "zsh" => Ok(clap_complete::Shell::Zsh),
        "fish" => Ok(clap_complete::Shell::Fish),
        other => Err(crate::exit::invalid_config(format!(
            "unsupported shell: {other} (expected bash|zsh|fish)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn non_numeric_threshold_is_rejected_by_the_parser() {
        let err = Cli::try_parse_from(["kubepods-probe", "-w", "five"]).expect_err("reject");
        assert!(err.use_stderr());
    }

    #[test]
    fn cli_flags_override_config() {
        let cli = Cli::try_parse_from([
            "kubepods-probe",
            "-w",
            "2",
            "-n",
            "payments",
            "-v",
            "--kubectl",
            "/opt/bin/kubectl",
        ])
        .expect("parse");
        let mut cfg = EffectiveConfig::default();
        cfg.thresholds.critical = 20;
        apply_cli_overrides(&mut cfg, &cli);
        assert_eq!(cfg.thresholds, Thresholds { warn: 2, critical: 20 });
        assert_eq!(cfg.scan.namespace.as_deref(), Some("payments"));
        assert!(cfg.scan.verbose);
        assert_eq!(cfg.kubectl.path, "/opt/bin/kubectl");
    }

    #[test]
    fn api_url_without_credentials_is_a_config_error() {
        let mut cfg = EffectiveConfig::default();
        cfg.api.url = Some("https://k8s.example:6443".to_string());
        let err = build_source(&cfg).err().expect("should fail");
        assert_eq!(crate::exit::exit_code(&err), 4);
    }

    #[test]
    fn kubectl_is_the_default_source() {
        let cfg = EffectiveConfig::default();
        let source = build_source(&cfg).expect("source");
        assert_eq!(source.describe(), "kubectl");
    }

    #[test]
    fn parse_shell_rejects_unknown() {
        assert!(parse_shell("Bash").is_ok());
        assert!(parse_shell("powershell").is_err());
    }
}
