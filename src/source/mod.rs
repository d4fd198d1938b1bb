use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::core::decode_namespace_list;
use crate::platform::run_command;

mod api;

pub use api::{ApiSource, load_token};

/// Where pod-list payloads come from. The scan engine never talks to the cluster itself.
pub trait PodSource {
    /// Names of every namespace visible to the probe.
    fn namespaces(&self) -> Result<Vec<String>>;

    /// Raw `PodList` JSON for one namespace.
    fn pods(&self, namespace: &str) -> Result<String>;

    /// Short description for logs, e.g. `kubectl` or the API URL.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct KubectlSource {
    pub program: String,
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub timeout: Duration,
}

impl KubectlSource {
    fn global_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(kubeconfig) = &self.kubeconfig {
            args.push("--kubeconfig".to_string());
            args.push(kubeconfig.display().to_string());
        }
        if let Some(context) = &self.context {
            args.push("--context".to_string());
            args.push(context.clone());
        }
        args
    }

    fn get_json(&self, extra: &[&str]) -> Result<String> {
        let mut args = self.global_args();
        args.extend(extra.iter().map(|s| s.to_string()));
        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        log::debug!("running {} {}", self.program, argv.join(" "));

        let output = run_command(&self.program, &argv, self.timeout)
            .map_err(crate::exit::connection_err)?;
        if output.exit_code != 0 {
            return Err(crate::exit::connection(format!(
                "{} {} exited with {}: {}",
                self.program,
                argv.join(" "),
                output.exit_code,
                output.stderr.trim()
            )));
        }
        log::debug!("kubectl returned {} bytes", output.stdout.len());
        Ok(output.stdout)
    }
}

impl PodSource for KubectlSource {
    fn namespaces(&self) -> Result<Vec<String>> {
        let payload = self.get_json(&["get", "namespaces", "-o", "json"])?;
        decode_namespace_list(&payload)
            .context("kubectl get namespaces")
            .map_err(crate::exit::connection_err)
    }

    fn pods(&self, namespace: &str) -> Result<String> {
        self.get_json(&["get", "pods", "-n", namespace, "-o", "json"])
    }

    fn describe(&self) -> String {
        self.program.clone()
    }
}
