use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;

use crate::application::services::cloner::{ClonerConfig, GitCloner};
use crate::domain::entities::repository::RepositoryConfig;
use crate::domain::entities::session_manifest::SessionManifest;
use crate::domain::entities::user::User;

/// gitseed - Initialize a session workspace with git repositories
#[derive(Parser)]
#[command(name = "gitseed")]
#[command(about = "Initialize a session workspace with git repositories")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clone the session's repositories into the workspace
    Clone {
        /// JSON list of repositories ({namespace, project, branch, commit_sha, url})
        #[arg(long, env = "GITSEED_REPOSITORIES")]
        repositories: String,

        /// Workspace mount path the repositories are cloned under
        #[arg(long, env = "GITSEED_WORKSPACE_MOUNT_PATH")]
        workspace_mount_path: PathBuf,

        /// Git server URL used for the reachability probe
        #[arg(long, env = "GITSEED_REPOSITORY_URL")]
        repository_url: String,

        /// Automatically fetch LFS content after checkout
        #[arg(long, env = "GITSEED_LFS_AUTO_FETCH")]
        lfs_auto_fetch: bool,

        /// Email written to the repository's git config
        #[arg(long, env = "GITSEED_USER_EMAIL")]
        user_email: Option<String>,

        /// Full name written to the repository's git config
        #[arg(long, env = "GITSEED_USER_FULL_NAME")]
        user_full_name: Option<String>,

        /// Treat the session as anonymous (no identity, no credentials)
        #[arg(long, env = "GITSEED_ANONYMOUS")]
        anonymous: bool,

        /// OAuth token used for authenticated clones
        #[arg(long, env = "GITSEED_OAUTH_TOKEN", hide_env_values = true)]
        oauth_token: Option<String>,

        /// Cloud storage mount paths to exclude from version control
        #[arg(long = "storage-mount", env = "GITSEED_STORAGE_MOUNTS", value_delimiter = ',')]
        storage_mounts: Vec<PathBuf>,

        /// Give up waiting for the git server after this many minutes
        #[arg(long, env = "GITSEED_WAIT_TIMEOUT_MINUTES")]
        wait_timeout_minutes: Option<u64>,

        /// Git executable to run (mainly for testing)
        #[arg(long, env = "GITSEED_GIT_EXECUTABLE", default_value = "git", hide = true)]
        git_executable: String,

        /// Credential file location (mainly for testing)
        #[arg(
            long,
            env = "GITSEED_CREDENTIALS_FILE",
            default_value = crate::infrastructure::git::DEFAULT_CREDENTIALS_PATH,
            hide = true
        )]
        credentials_file: PathBuf,
    },

    /// Print display metadata extracted from a deployed session manifest
    Manifest {
        /// Manifest file (YAML or JSON)
        manifest_file: PathBuf,
    },
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        // Set up colored output
        if self.cli.no_color {
            colored::control::set_override(false);
        }

        self.handle_command().await
    }

    async fn handle_command(&self) -> anyhow::Result<()> {
        match &self.cli.command {
            Commands::Clone {
                repositories,
                workspace_mount_path,
                repository_url,
                lfs_auto_fetch,
                user_email,
                user_full_name,
                anonymous,
                oauth_token,
                storage_mounts,
                wait_timeout_minutes,
                git_executable,
                credentials_file,
            } => {
                let user = if *anonymous {
                    User::anonymous()
                } else {
                    User {
                        email: user_email.clone(),
                        full_name: user_full_name.clone(),
                        is_anonymous: false,
                        oauth_token: oauth_token.clone(),
                    }
                };
                self.handle_clone_command(
                    repositories,
                    workspace_mount_path,
                    repository_url,
                    *lfs_auto_fetch,
                    user,
                    storage_mounts,
                    *wait_timeout_minutes,
                    git_executable,
                    credentials_file,
                )
                .await
            }
            Commands::Manifest { manifest_file } => {
                self.handle_manifest_command(manifest_file).await
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn handle_clone_command(
        &self,
        repositories_json: &str,
        workspace_mount_path: &PathBuf,
        repository_url: &str,
        lfs_auto_fetch: bool,
        user: User,
        storage_mounts: &[PathBuf],
        wait_timeout_minutes: Option<u64>,
        git_executable: &str,
        credentials_file: &PathBuf,
    ) -> anyhow::Result<()> {
        let repositories: Vec<RepositoryConfig> = serde_json::from_str(repositories_json)
            .context("failed to parse the repositories JSON list")?;

        let mut config = ClonerConfig::new(
            repositories,
            workspace_mount_path,
            user,
            repository_url,
        )
        .with_lfs_auto_fetch(lfs_auto_fetch)
        .with_git_executable(git_executable)
        .with_credentials_file(credentials_file);
        if let Some(minutes) = wait_timeout_minutes {
            config = config.with_wait_timeout(Duration::from_secs(minutes * 60));
        }

        println!("{} Cloning session repositories...", "::".blue().bold());

        let mut cloner = GitCloner::new(config).await?;
        cloner.run(storage_mounts).await?;

        println!("{} Workspace initialized!", "✓".green().bold());
        if self.cli.verbose {
            println!("  Workspace: {}", workspace_mount_path.display());
        }
        Ok(())
    }

    async fn handle_manifest_command(&self, manifest_file: &PathBuf) -> anyhow::Result<()> {
        let manifest = SessionManifest::from_file(manifest_file)
            .with_context(|| format!("failed to load manifest {}", manifest_file.display()))?;

        let metadata = serde_json::json!({
            "name": manifest.name(),
            "image": manifest.image(),
            "default_url": manifest.default_url(),
            "resources": manifest.resource_requests(),
            "lfs_auto_fetch": manifest.lfs_auto_fetch(),
            "hibernation": manifest.hibernation(),
            "dirty": manifest.dirty(),
            "url": manifest.url(),
        });
        println!("{}", serde_json::to_string_pretty(&metadata)?);
        Ok(())
    }
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}
