use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use crate::core::decode_namespace_list;
use crate::source::PodSource;

/// Reads pods straight from the Kubernetes API server with a bearer token.
#[derive(Debug, Clone)]
pub struct ApiSource {
    base_url: String,
    token: String,
    client: reqwest::blocking::Client,
}

impl ApiSource {
    pub fn new(base_url: &str, credentials: &Path, insecure: bool, timeout: Duration) -> Result<Self> {
        let token = load_token(credentials).map_err(crate::exit::invalid_config_err)?;
        let client = reqwest::blocking::Client::builder()
            .user_agent(format!("kubepods-probe/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .danger_accept_invalid_certs(insecure)
            .build()
            .context("failed to build HTTP client")
            .map_err(crate::exit::invalid_config_err)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn get(&self, path: &str) -> Result<String> {
        let url = format!("{}{path}", self.base_url);
        log::debug!("GET {url}");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .send()
            .with_context(|| format!("request failed: {url}"))
            .map_err(crate::exit::connection_err)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(crate::exit::connection(format!("{url} returned HTTP {status}")));
        }

        let body = resp
            .text()
            .with_context(|| format!("failed to read response body: {url}"))
            .map_err(crate::exit::connection_err)?;
        log::debug!("{url} returned {} bytes", body.len());
        Ok(body)
    }
}

impl PodSource for ApiSource {
    fn namespaces(&self) -> Result<Vec<String>> {
        let payload = self.get("/api/v1/namespaces")?;
        decode_namespace_list(&payload)
            .context("GET /api/v1/namespaces")
            .map_err(crate::exit::connection_err)
    }

    fn pods(&self, namespace: &str) -> Result<String> {
        self.get(&format!("/api/v1/namespaces/{namespace}/pods"))
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Reads a bearer token: the first non-empty line of the credentials file.
pub fn load_token(path: &Path) -> Result<String> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read credentials file: {}", path.display()))?;
    s.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .ok_or_else(|| anyhow!("credentials file is empty: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn temp_file(contents: &str) -> std::path::PathBuf {
        static SEQ: AtomicU64 = AtomicU64::new(0);
        let seq = SEQ.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "kubepods-probe-token-{}-{seq}",
            std::process::id()
        ));
        std::fs::write(&path, contents).expect("write token");
        path
    }

    #[test]
    fn token_is_first_non_empty_line() {
        let path = temp_file("\n  eyJhbGciOi.token  \nignored\n");
        assert_eq!(load_token(&path).expect("token"), "eyJhbGciOi.token");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn empty_credentials_file_is_rejected() {
        let path = temp_file("\n \n");
        assert!(load_token(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_credentials_file_is_a_config_error() {
        let err = ApiSource::new(
            "https://127.0.0.1:6443",
            Path::new("/nonexistent/token"),
            false,
            Duration::from_secs(1),
        )
        .expect_err("should fail");
        assert_eq!(crate::exit::exit_code(&err), 4);
    }
}
