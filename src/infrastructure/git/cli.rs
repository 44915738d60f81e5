use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// A git subcommand failure carrying the captured exit status and stderr.
#[derive(Debug, Error)]
#[error("command '{command}' failed with exit code {exit_code}: {stderr}")]
pub struct GitCommandError {
    pub command: String,
    pub exit_code: i32,
    pub stderr: String,
}

impl GitCommandError {
    pub fn new(command: impl Into<String>, exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }

    fn spawn_failed(command: String, source: std::io::Error) -> Self {
        // The process never ran, so there is no real exit status to report.
        Self {
            command,
            exit_code: -1,
            stderr: source.to_string(),
        }
    }
}

/// Runs git subcommands against a fixed working directory.
///
/// All repository mutations go through an external `git` executable; this type
/// only spawns it and captures output. LFS operations run as the `git lfs`
/// subcommand, so a single executable path covers both.
#[derive(Debug, Clone)]
pub struct GitCli {
    git_executable: String,
    working_dir: PathBuf,
}

impl GitCli {
    /// Create a runner bound to the given working directory.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            git_executable: "git".to_string(),
            working_dir: working_dir.into(),
        }
    }

    /// Create a runner with a custom executable path.
    pub fn with_executable(working_dir: impl Into<PathBuf>, executable: impl Into<String>) -> Self {
        Self {
            git_executable: executable.into(),
            working_dir: working_dir.into(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Execute a git command and check for success, returning trimmed stdout.
    async fn execute(&self, args: &[&str]) -> Result<String, GitCommandError> {
        let command_line = format!("{} {}", self.git_executable, args.join(" "));

        let output = Command::new(&self.git_executable)
            .args(args)
            .current_dir(&self.working_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| GitCommandError::spawn_failed(command_line.clone(), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitCommandError::new(
                command_line,
                output.status.code().unwrap_or(-1),
                stderr.trim().to_string(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    pub async fn init(&self) -> Result<String, GitCommandError> {
        self.execute(&["init"]).await
    }

    pub async fn config(&self, key: &str, value: &str) -> Result<String, GitCommandError> {
        self.execute(&["config", key, value]).await
    }

    pub async fn config_unset(&self, key: &str) -> Result<String, GitCommandError> {
        self.execute(&["config", "--unset", key]).await
    }

    pub async fn remote_add(&self, name: &str, url: &str) -> Result<String, GitCommandError> {
        self.execute(&["remote", "add", name, url]).await
    }

    pub async fn fetch(&self, remote: &str) -> Result<String, GitCommandError> {
        self.execute(&["fetch", remote]).await
    }

    pub async fn checkout(&self, refname: &str) -> Result<String, GitCommandError> {
        self.execute(&["checkout", refname]).await
    }

    pub async fn reset_hard(&self, refname: &str) -> Result<String, GitCommandError> {
        self.execute(&["reset", "--hard", refname]).await
    }

    pub async fn rev_parse(&self, flag: &str) -> Result<String, GitCommandError> {
        self.execute(&["rev-parse", flag]).await
    }

    pub async fn submodule(&self, subcommand: &str) -> Result<String, GitCommandError> {
        self.execute(&["submodule", subcommand]).await
    }

    pub async fn lfs(&self, args: &[&str]) -> Result<String, GitCommandError> {
        let mut full_args = vec!["lfs"];
        full_args.extend_from_slice(args);
        self.execute(&full_args).await
    }
}
