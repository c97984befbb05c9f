use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// External acquisition tool parameters (optional `[acquisition]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Executable invoked once per attempt (looked up on PATH).
    pub program: String,
    /// Target audio codec passed as `--audio-format`.
    pub audio_format: String,
    /// Match filter excluding short-form clips.
    pub match_filter: String,
    /// Deadline per attempt in seconds; 0 disables the deadline.
    pub timeout_secs: u64,
    /// Treat exit 0 without a file at the output path as a failure.
    pub verify_output: bool,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            audio_format: "mp3".to_string(),
            match_filter: "!is_short".to_string(),
            timeout_secs: 600,
            verify_output: true,
        }
    }
}

impl AcquisitionConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Global configuration loaded from `~/.config/tdm/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TdmConfig {
    /// Base directory collections are downloaded into (None = current directory).
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// Directory of collection manifests for the file catalog (None = XDG data dir).
    #[serde(default)]
    pub catalog_dir: Option<PathBuf>,
    /// Number of jobs processed concurrently.
    pub worker_count: usize,
    /// Jobs admitted beyond the busy workers before submissions are rejected.
    pub queue_capacity: usize,
    /// Append the collection id to each destination directory name.
    #[serde(default = "default_true")]
    pub namespace_dirs: bool,
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
}

fn default_true() -> bool {
    true
}

impl Default for TdmConfig {
    fn default() -> Self {
        Self {
            download_dir: None,
            catalog_dir: None,
            worker_count: 10,
            queue_capacity: 32,
            namespace_dirs: true,
            acquisition: AcquisitionConfig::default(),
        }
    }
}

impl TdmConfig {
    /// Manifest directory, falling back to `~/.local/share/tdm/catalog`.
    pub fn resolved_catalog_dir(&self) -> Result<PathBuf> {
        match &self.catalog_dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let xdg_dirs = xdg::BaseDirectories::with_prefix("tdm")?;
                Ok(xdg_dirs.get_data_home().join("catalog"))
            }
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tdm")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<TdmConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = TdmConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: TdmConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = TdmConfig::default();
        assert_eq!(cfg.worker_count, 10);
        assert_eq!(cfg.queue_capacity, 32);
        assert!(cfg.namespace_dirs);
        assert_eq!(cfg.acquisition.program, "yt-dlp");
        assert_eq!(cfg.acquisition.audio_format, "mp3");
        assert_eq!(cfg.acquisition.timeout(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = TdmConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: TdmConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.worker_count, cfg.worker_count);
        assert_eq!(parsed.queue_capacity, cfg.queue_capacity);
        assert_eq!(parsed.acquisition.match_filter, cfg.acquisition.match_filter);
    }

    #[test]
    fn config_toml_minimal_uses_defaults() {
        let toml = r#"
            worker_count = 2
            queue_capacity = 4
        "#;
        let cfg: TdmConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.worker_count, 2);
        assert_eq!(cfg.queue_capacity, 4);
        assert!(cfg.download_dir.is_none());
        assert!(cfg.namespace_dirs);
        assert_eq!(cfg.acquisition.program, "yt-dlp");
        assert!(cfg.acquisition.verify_output);
    }

    #[test]
    fn config_toml_acquisition_section() {
        let toml = r#"
            download_dir = "/srv/music"
            worker_count = 1
            queue_capacity = 0
            namespace_dirs = false

            [acquisition]
            program = "/usr/local/bin/yt-dlp"
            timeout_secs = 0
        "#;
        let cfg: TdmConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.download_dir.as_deref(), Some(std::path::Path::new("/srv/music")));
        assert!(!cfg.namespace_dirs);
        assert_eq!(cfg.acquisition.program, "/usr/local/bin/yt-dlp");
        assert_eq!(cfg.acquisition.audio_format, "mp3");
        assert_eq!(cfg.acquisition.timeout(), None);
    }
}
