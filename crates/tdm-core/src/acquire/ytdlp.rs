//! [`Acquirer`] backed by a yt-dlp compatible command-line tool.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

use super::{Acquirer, AcquisitionError};
use crate::config::AcquisitionConfig;

/// How long to wait for the output pipes to close once the tool has exited or been killed.
const OUTPUT_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Runs `<program> -x --audio-format <fmt> --match-filter <filter> -o <path> <query>`
/// once per attempt, capturing stdout and stderr.
#[derive(Debug, Clone)]
pub struct YtDlpAcquirer {
    program: String,
    audio_format: String,
    match_filter: String,
    timeout: Option<Duration>,
    verify_output: bool,
}

impl YtDlpAcquirer {
    pub fn from_config(cfg: &AcquisitionConfig) -> Self {
        Self {
            program: cfg.program.clone(),
            audio_format: cfg.audio_format.clone(),
            match_filter: cfg.match_filter.clone(),
            timeout: cfg.timeout(),
            verify_output: cfg.verify_output,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Audio codec requested from the tool; also the track file extension.
    pub fn audio_format(&self) -> &str {
        &self.audio_format
    }

    pub fn args(&self, query: &str, output_path: &Path) -> Vec<OsString> {
        vec![
            "-x".into(),
            "--audio-format".into(),
            self.audio_format.clone().into(),
            "--match-filter".into(),
            self.match_filter.clone().into(),
            "-o".into(),
            output_path.as_os_str().to_owned(),
            query.into(),
        ]
    }
}

fn drain<R>(reader: Option<R>) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut reader) = reader {
            let _ = reader.read_to_end(&mut buf).await;
        }
        buf
    })
}

/// stdout followed by stderr, lossily decoded and trimmed.
async fn combined_output(stdout: JoinHandle<Vec<u8>>, stderr: JoinHandle<Vec<u8>>) -> String {
    let collect = async {
        let mut combined = stdout.await.unwrap_or_default();
        let err = stderr.await.unwrap_or_default();
        if !combined.is_empty() && !err.is_empty() && !combined.ends_with(b"\n") {
            combined.push(b'\n');
        }
        combined.extend_from_slice(&err);
        String::from_utf8_lossy(&combined).trim().to_string()
    };
    // A grandchild may keep the pipes open after the tool itself is gone.
    tokio::time::timeout(OUTPUT_DRAIN_GRACE, collect)
        .await
        .unwrap_or_default()
}

#[async_trait]
impl Acquirer for YtDlpAcquirer {
    async fn acquire(&self, query: &str, output_path: &Path) -> Result<(), AcquisitionError> {
        tracing::info!(query, path = %output_path.display(), "acquiring track");
        let mut child = Command::new(&self.program)
            .args(self.args(query, output_path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AcquisitionError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let waited = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(waited) => waited,
                Err(_) => {
                    if let Err(e) = child.kill().await {
                        tracing::warn!("failed to kill {} after timeout: {}", self.program, e);
                    }
                    let output = combined_output(stdout, stderr).await;
                    tracing::warn!(query, ?limit, "acquisition timed out");
                    return Err(AcquisitionError::TimedOut {
                        after: limit,
                        output,
                    });
                }
            },
            None => child.wait().await,
        };
        let status = waited.map_err(|source| AcquisitionError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        let output = combined_output(stdout, stderr).await;

        match status.code() {
            Some(0) => {
                if !output.is_empty() {
                    tracing::debug!("{} output: {}", self.program, output);
                }
                if self.verify_output && !tokio::fs::try_exists(output_path).await.unwrap_or(false) {
                    tracing::warn!(path = %output_path.display(), "tool exited 0 without producing a file");
                    return Err(AcquisitionError::MissingOutput {
                        path: output_path.to_path_buf(),
                    });
                }
                tracing::info!(path = %output_path.display(), "track saved");
                Ok(())
            }
            Some(code) => {
                tracing::warn!("{} failed ({}): {}", self.program, code, output);
                Err(AcquisitionError::Exited { code, output })
            }
            None => {
                tracing::warn!("{} terminated by signal: {}", self.program, output);
                Err(AcquisitionError::Terminated { output })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_follow_tool_contract() {
        let acquirer = YtDlpAcquirer::from_config(&AcquisitionConfig::default());
        let args = acquirer.args(r#"ytsearch1:"A" "B""#, Path::new("/music/Mix/B.mp3"));
        let args: Vec<String> = args
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-x",
                "--audio-format",
                "mp3",
                "--match-filter",
                "!is_short",
                "-o",
                "/music/Mix/B.mp3",
                r#"ytsearch1:"A" "B""#,
            ]
        );
    }

    #[test]
    fn from_config_copies_settings() {
        let cfg = AcquisitionConfig {
            program: "/opt/yt-dlp".into(),
            audio_format: "opus".into(),
            timeout_secs: 0,
            ..AcquisitionConfig::default()
        };
        let acquirer = YtDlpAcquirer::from_config(&cfg);
        assert_eq!(acquirer.program(), "/opt/yt-dlp");
        assert_eq!(acquirer.audio_format(), "opus");
        assert_eq!(acquirer.timeout, None);
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let cfg = AcquisitionConfig {
            program: "/nonexistent/tdm-test-tool".into(),
            ..AcquisitionConfig::default()
        };
        let acquirer = YtDlpAcquirer::from_config(&cfg);
        let err = acquirer
            .acquire("ytsearch1:x", Path::new("/tmp/never.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, AcquisitionError::Spawn { .. }));
        assert_eq!(err.exit_code(), None);
    }
}
