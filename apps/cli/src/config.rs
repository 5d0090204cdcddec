//! Uploader configuration.
//!
//! Read from `~/.config/reportdrop/config.json` (`%APPDATA%\reportdrop` on
//! Windows) unless `--config` points elsewhere. Every field is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use reportdrop_protocol::{ReportType, default_report_types};
use reportdrop_transfer::DEFAULT_CHUNK_SIZE;

fn default_upload_url() -> String {
    "http://localhost:8080/api/upload".into()
}

fn default_chunk_size() -> u64 {
    DEFAULT_CHUNK_SIZE
}

fn default_request_timeout_secs() -> u64 {
    300
}

fn default_chunked() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Endpoint receiving the multipart requests.
    #[serde(default = "default_upload_url")]
    pub upload_url: String,

    /// Chunk size in bytes.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,

    /// Per-request timeout in seconds; 0 disables it.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Split files into chunks; `false` sends each file in one request.
    #[serde(default = "default_chunked")]
    pub chunked: bool,

    /// Upload slots, in upload order.
    #[serde(default = "default_report_types")]
    pub report_types: Vec<ReportType>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upload_url: default_upload_url(),
            chunk_size: default_chunk_size(),
            request_timeout_secs: default_request_timeout_secs(),
            chunked: default_chunked(),
            report_types: default_report_types(),
        }
    }
}

impl AppConfig {
    /// Loads from `path`, or from the default location when `None`.
    ///
    /// A missing file yields the defaults. A file that fails to parse is
    /// logged and also yields the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => config_path()?,
        };
        Self::load_from(&path)
    }

    fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config, using defaults"
                );
                Ok(Self::default())
            }
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

fn config_path() -> anyhow::Result<PathBuf> {
    Ok(config_base_dir()?.join("reportdrop").join("config.json"))
}

fn config_base_dir() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let appdata = std::env::var("APPDATA")
            .map_err(|_| anyhow::anyhow!("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata))
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home).join(".config"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load(Some(&dir.path().join("nope.json"))).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.chunk_size, 5 * 1024 * 1024);
        assert_eq!(cfg.report_types.len(), 4);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"upload_url":"https://reports.example.com/upload","chunked":false}"#,
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.upload_url, "https://reports.example.com/upload");
        assert!(!cfg.chunked);
        assert_eq!(cfg.request_timeout_secs, 300);
        assert_eq!(cfg.report_types, default_report_types());
    }

    #[test]
    fn custom_report_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"report_types":[{"key":"payroll","label":"Payroll Export"}]}"#,
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.report_types, vec![ReportType::new("payroll", "Payroll Export")]);
    }

    #[test]
    fn unparsable_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(AppConfig::load(Some(&path)).unwrap(), AppConfig::default());
    }

    #[test]
    fn zero_timeout_disables_it() {
        let cfg = AppConfig {
            request_timeout_secs: 0,
            ..AppConfig::default()
        };
        assert_eq!(cfg.request_timeout(), None);
        assert_eq!(
            AppConfig::default().request_timeout(),
            Some(Duration::from_secs(300))
        );
    }
}
