//! External downloader invocation
//!
//! [`ToolExecutor`] is the seam between orchestration and the actual
//! subprocess: production code uses [`YtDlpExecutor`], tests substitute stubs.

use crate::config::{FetchConfig, ToolsConfig};
use crate::types::ExecutionOutcome;
use crate::{Error, Result, runner, tools};
use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Executes the external download tool against a URL
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Run the tool, directing its output file into `output_template`
    ///
    /// The template carries the tool's extension placeholder (`%(ext)s`); the
    /// tool substitutes the real extension when it writes the file.
    async fn execute(
        &self,
        url: &str,
        output_template: &Path,
        working_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<ExecutionOutcome>;

    /// Name of the underlying tool, for diagnostics
    fn tool_name(&self) -> &str;
}

/// [`ToolExecutor`] backed by the yt-dlp command-line program
///
/// The binary is resolved fresh on every execution so a tool installed after
/// startup is picked up without a restart.
pub struct YtDlpExecutor {
    tools: ToolsConfig,
    fetch: FetchConfig,
}

impl YtDlpExecutor {
    /// Create an executor from tool and fetch configuration
    pub fn new(tools: ToolsConfig, fetch: FetchConfig) -> Self {
        Self { tools, fetch }
    }

    /// Build the argument vector for one download
    ///
    /// Arguments are discrete argv entries, never joined through a shell, so
    /// URLs and paths containing spaces or quotes arrive at the tool intact.
    fn build_args(&self, url: &str, output_template: &Path) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            output_template.to_string_lossy().into_owned(),
        ];
        if self.fetch.no_playlist {
            args.push("--no-playlist".to_string());
        }
        args.push("--format".to_string());
        args.push(self.fetch.format.clone());
        args.push(url.to_string());
        args
    }
}

#[async_trait]
impl ToolExecutor for YtDlpExecutor {
    async fn execute(
        &self,
        url: &str,
        output_template: &Path,
        working_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<ExecutionOutcome> {
        let binary = tools::resolve(
            &self.tools.downloader,
            self.tools.downloader_path.as_deref(),
            self.tools.search_path,
        )
        .ok_or_else(|| Error::ToolUnavailable {
            tool: self.tools.downloader.clone(),
        })?;

        tracing::info!(url, tool = %binary.display(), "starting media download");
        runner::run(&binary, &self.build_args(url, output_template), working_dir, cancel).await
    }

    fn tool_name(&self) -> &str {
        &self.tools.downloader
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_build_args_shape() {
        let executor = YtDlpExecutor::new(ToolsConfig::default(), FetchConfig::default());
        let args = executor.build_args(
            "https://example.com/watch?v=abc",
            Path::new("/data/downloads/clip_1a2b3c4d.%(ext)s"),
        );

        assert_eq!(
            args,
            vec![
                "-o",
                "/data/downloads/clip_1a2b3c4d.%(ext)s",
                "--no-playlist",
                "--format",
                "best[ext=mp4]/best",
                "https://example.com/watch?v=abc",
            ]
        );
    }

    #[test]
    fn test_build_args_without_no_playlist() {
        let mut fetch = FetchConfig::default();
        fetch.no_playlist = false;
        let executor = YtDlpExecutor::new(ToolsConfig::default(), fetch);
        let args = executor.build_args("https://example.com/a", Path::new("/t/x.%(ext)s"));

        assert!(!args.contains(&"--no-playlist".to_string()));
    }

    #[test]
    fn test_special_characters_survive_as_single_arguments() {
        let executor = YtDlpExecutor::new(ToolsConfig::default(), FetchConfig::default());
        let url = "https://example.com/a video \"quoted\"&x=1";
        let template = PathBuf::from("/dir with spaces/name_1a2b3c4d.%(ext)s");
        let args = executor.build_args(url, &template);

        // One argv entry each, no shell quoting applied or needed
        assert_eq!(args.last().map(String::as_str), Some(url));
        assert!(args.contains(&"/dir with spaces/name_1a2b3c4d.%(ext)s".to_string()));
    }

    #[tokio::test]
    async fn test_unresolvable_tool_is_unavailable() {
        let tools = ToolsConfig {
            downloader: "nonexistent-downloader-binary-xyz".to_string(),
            downloader_path: None,
            search_path: true,
        };
        let executor = YtDlpExecutor::new(tools, FetchConfig::default());
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();

        let result = executor
            .execute(
                "https://example.com/clip.mp4",
                &dir.path().join("clip_1a2b3c4d.%(ext)s"),
                dir.path(),
                &cancel,
            )
            .await;

        match result {
            Err(Error::ToolUnavailable { tool }) => {
                assert_eq!(tool, "nonexistent-downloader-binary-xyz");
            }
            other => panic!("expected ToolUnavailable, got {other:?}"),
        }
    }
}
